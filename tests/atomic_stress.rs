// tests/atomic_stress.rs

//! Many writers hammering one slot must not lose updates.

use kernel_prims::{atomic_add, bf16, f16, AtomicFloat};
use std::sync::atomic::Ordering;
use std::thread;

const THREADS: usize = 16;
const ADDS_PER_THREAD: usize = 20_000;

/// Raw slot pointer handed to worker threads, the way a kernel executor
/// shares an output tensor.
#[derive(Clone, Copy)]
struct SharedSlot<T>(*mut T);

unsafe impl<T> Send for SharedSlot<T> {}
unsafe impl<T> Sync for SharedSlot<T> {}

impl<T> SharedSlot<T> {
    // Going through a method makes closures capture the whole wrapper
    // rather than the raw pointer field.
    fn get(self) -> *mut T {
        self.0
    }
}

#[test_log::test]
fn raw_f32_slot_counts_every_add() {
    let mut total = 0.0f32;
    let slot = SharedSlot(&mut total as *mut f32);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(move || {
                for _ in 0..ADDS_PER_THREAD {
                    unsafe { atomic_add(slot.get(), 1.0f32) };
                }
            });
        }
    });
    // 320_000 < 2^24, so every partial sum is exact in f32.
    assert_eq!(total, (THREADS * ADDS_PER_THREAD) as f32);
}

#[test_log::test]
fn raw_f64_slot_counts_fractional_adds() {
    let mut total = 0.0f64;
    let slot = SharedSlot(&mut total as *mut f64);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(move || {
                for _ in 0..ADDS_PER_THREAD {
                    unsafe { atomic_add(slot.get(), 0.25f64) };
                }
            });
        }
    });
    assert_eq!(total, (THREADS * ADDS_PER_THREAD) as f64 * 0.25);
}

#[test_log::test]
fn half_precision_slots_stay_exact_within_their_integer_range() {
    // f16 represents every integer up to 2048, bf16 up to 256.
    let half_cell = AtomicFloat::new(f16::ZERO);
    let brain_cell = AtomicFloat::new(bf16::ZERO);
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..256 {
                    half_cell.fetch_add(f16::ONE);
                }
                for _ in 0..32 {
                    brain_cell.fetch_add(bf16::ONE);
                }
            });
        }
    });
    assert_eq!(half_cell.into_inner().to_f32(), 2048.0);
    assert_eq!(brain_cell.into_inner().to_f32(), 256.0);
}

#[test_log::test]
fn shared_buffer_reduction_hits_every_slot() {
    const SLOTS: usize = 64;
    let mut buf = vec![0.0f32; SLOTS];
    {
        let cells = AtomicFloat::from_mut_slice(&mut buf);
        thread::scope(|s| {
            for t in 0..THREADS {
                s.spawn(move || {
                    // Each thread walks the buffer from a different start so
                    // writers collide on every slot.
                    for i in 0..SLOTS * 100 {
                        cells[(i + t) % SLOTS].fetch_add(1.0);
                    }
                });
            }
        });
        for cell in cells {
            assert_eq!(cell.load(Ordering::Acquire), (THREADS * 100) as f32);
        }
    }
    assert!(buf.iter().all(|v| *v == (THREADS * 100) as f32));
}

#[test_log::test]
fn fetch_add_hands_out_distinct_previous_values() {
    let counter = AtomicFloat::new(0.0f32);
    let mut seen: Vec<f32> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| (0..500).map(|_| counter.fetch_add(1.0)).collect::<Vec<_>>()))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().expect("worker panicked"))
            .collect()
    });
    seen.sort_by(|a, b| a.partial_cmp(b).expect("no NaN"));
    let expected: Vec<f32> = (0..4000).map(|i| i as f32).collect();
    assert_eq!(seen, expected);
}

#[test_log::test]
fn integer_counter_through_cas_loop() {
    let counter = AtomicFloat::new(0i64);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ADDS_PER_THREAD {
                    counter.fetch_add(3);
                }
            });
        }
    });
    assert_eq!(counter.into_inner(), (THREADS * ADDS_PER_THREAD * 3) as i64);
}
