// src/simd/tests.rs

//! Checks the int-lane register path against the store/convert/reload path
//! on every backend the test machine supports.

#[cfg(test)]
mod simd_tests {
    use crate::mask::flag_to_float_batch;
    use crate::simd::*;
    use log::warn;

    const SAMPLE: [i32; 20] = [
        0,
        1,
        -1,
        i32::MIN,
        i32::MAX,
        0,
        2,
        0,
        -7,
        0,
        0,
        1 << 30,
        3,
        0,
        0,
        9,
        0,
        0,
        0,
        0,
    ];

    fn bits(v: &[f32]) -> Vec<u32> {
        v.iter().map(|f| f.to_bits()).collect()
    }

    fn reference(src: &[i32]) -> Vec<u32> {
        let mut dst = vec![0.0f32; src.len()];
        flag_to_float_batch(src, &mut dst);
        bits(&dst)
    }

    fn assert_only_mask_patterns(lanes: &[u32]) {
        for (i, lane) in lanes.iter().enumerate() {
            assert!(
                *lane == 0 || *lane == u32::MAX,
                "lane {} holds partial pattern {:#010x}",
                i,
                lane
            );
        }
    }

    /// Every window of SAMPLE through both paths of backend `B`.
    fn check_int_paths_agree<B: Backend>(backend: B) {
        for window in SAMPLE.windows(B::LANES) {
            let v = backend.load_i32(window);

            let mut fast = [0.0f32; MAX_LANES];
            v.to_float_mask().store(&mut fast[..B::LANES]);

            let mut generic = [0.0f32; MAX_LANES];
            to_float_mask_generic::<B::I32, B::F32>(v).store(&mut generic[..B::LANES]);

            let fast = bits(&fast[..B::LANES]);
            assert_eq!(fast, bits(&generic[..B::LANES]), "{:?} on {:?}", window, B::ISA);
            assert_eq!(fast, reference(window), "{:?} on {:?}", window, B::ISA);
            assert_only_mask_patterns(&fast);
        }
    }

    fn check_float_and_unsigned_lanes<B: Backend>(backend: B) {
        let floats: Vec<f32> = [0.0, -0.0, 1.5, f32::NAN, -3.0, 0.0, f32::INFINITY, 1e-40]
            .iter()
            .copied()
            .cycle()
            .take(MAX_LANES)
            .collect();
        let mut out = [0.0f32; MAX_LANES];
        backend.load_f32(&floats).to_float_mask().store(&mut out[..B::LANES]);
        let mut expected = vec![0.0f32; B::LANES];
        flag_to_float_batch(&floats[..B::LANES], &mut expected);
        assert_eq!(bits(&out[..B::LANES]), bits(&expected));

        let unsigned: Vec<u32> = (0..MAX_LANES as u32).map(|i| i % 3).collect();
        backend.load_u32(&unsigned).to_float_mask().store(&mut out[..B::LANES]);
        let mut expected = vec![0.0f32; B::LANES];
        flag_to_float_batch(&unsigned[..B::LANES], &mut expected);
        assert_eq!(bits(&out[..B::LANES]), bits(&expected));
    }

    fn check_batch_with<B: Backend>(backend: B) {
        for len in 0..=SAMPLE.len() {
            let src = &SAMPLE[..len];
            let mut dst = vec![0.5f32; len];
            i32_to_float_mask_with(backend, src, &mut dst);
            assert_eq!(bits(&dst), reference(src), "len {} on {:?}", len, B::ISA);
        }
    }

    /// The whole-register batch loop against one register at a time.
    fn check_body_matches_register_path<B: Backend>(backend: B) {
        let n = SAMPLE.len() - SAMPLE.len() % B::LANES;
        let mut body = vec![0.5f32; n];
        backend.i32_masks_body(&SAMPLE[..n], &mut body);

        let mut per_register = vec![0.5f32; n];
        for (s, d) in SAMPLE[..n]
            .chunks_exact(B::LANES)
            .zip(per_register.chunks_exact_mut(B::LANES))
        {
            backend.load_i32(s).to_float_mask().store(d);
        }
        assert_eq!(bits(&body), bits(&per_register), "on {:?}", B::ISA);
        assert_eq!(bits(&body), reference(&SAMPLE[..n]), "on {:?}", B::ISA);
    }

    // --- Scalar Backend ---

    #[test_log::test]
    fn scalar_int_paths_agree() {
        check_int_paths_agree(Scalar);
        check_float_and_unsigned_lanes(Scalar);
        check_batch_with(Scalar);
        check_body_matches_register_path(Scalar);
    }

    // --- x86 Backends ---

    #[cfg(target_arch = "x86_64")]
    #[test_log::test]
    fn avx2_int_paths_agree() {
        match Avx2::try_new() {
            Some(avx2) => {
                check_int_paths_agree(avx2);
                check_float_and_unsigned_lanes(avx2);
                check_batch_with(avx2);
                check_body_matches_register_path(avx2);
            }
            None => warn!("AVX2 not available, skipping"),
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test_log::test]
    fn avx512_int_paths_agree() {
        match Avx512::try_new() {
            Some(avx512) => {
                check_int_paths_agree(avx512);
                check_float_and_unsigned_lanes(avx512);
                check_batch_with(avx512);
                check_body_matches_register_path(avx512);
            }
            None => warn!("AVX-512F not available, skipping"),
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test_log::test]
    fn avx2_vector_debug_shows_lanes() {
        if let Some(avx2) = Avx2::try_new() {
            let v = avx2.load_i32(&[1, 2, 3, 4, 5, 6, 7, 8]);
            assert_eq!(format!("{:?}", v), "I32x8([1, 2, 3, 4, 5, 6, 7, 8])");
        }
    }

    // --- ARM Backend ---

    #[cfg(target_arch = "aarch64")]
    #[test_log::test]
    fn neon_int_paths_agree() {
        match Neon::try_new() {
            Some(neon) => {
                check_int_paths_agree(neon);
                check_float_and_unsigned_lanes(neon);
                check_batch_with(neon);
                check_body_matches_register_path(neon);
            }
            None => warn!("NEON not available, skipping"),
        }
    }

    // --- Dispatch ---

    #[test_log::test]
    fn dispatcher_matches_scalar_reference() {
        let src: Vec<i32> = (0..67).map(|i| if i % 3 == 0 { 0 } else { i * 7 - 20 }).collect();
        for len in [0, 1, 4, 7, 8, 15, 16, 17, 33, 67] {
            let mut dst = vec![1.0f32; len];
            flags_to_float_mask(&src[..len], &mut dst);
            assert_eq!(bits(&dst), reference(&src[..len]), "len {}", len);
        }
    }

    #[test]
    #[should_panic(expected = "mask destination")]
    fn dispatcher_rejects_short_destination() {
        let mut dst = [0.0f32; 3];
        flags_to_float_mask(&[1, 2, 3, 4], &mut dst);
    }
}
