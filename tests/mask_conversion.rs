// tests/mask_conversion.rs

//! Flag → mask conversion through the public surface.

use kernel_prims::{
    flag_to_float, flag_to_float_batch, flags_to_float_mask, mask_bits, splat_flag_to_float,
};

fn bits(v: &[f32]) -> Vec<u32> {
    v.iter().map(|f| f.to_bits()).collect()
}

#[test_log::test]
fn byte_flags_produce_reference_masks() {
    let src = [1u8, 0, 1, 1, 0];
    let mut dst = [0.0f32; 5];
    flag_to_float_batch(&src, &mut dst);
    assert_eq!(bits(&dst), vec![0xFFFF_FFFF, 0, 0xFFFF_FFFF, 0xFFFF_FFFF, 0]);
}

#[test_log::test]
fn bool_flags_match_byte_flags() {
    let bytes = [0u8, 200, 0, 1, 255, 0, 0, 3];
    let bools: Vec<bool> = bytes.iter().map(|b| *b != 0).collect();
    let mut from_bytes = [0.0f32; 8];
    let mut from_bools = [0.0f32; 8];
    flag_to_float_batch(&bytes, &mut from_bytes);
    flag_to_float_batch(&bools, &mut from_bools);
    assert_eq!(bits(&from_bytes), bits(&from_bools));
}

#[test_log::test]
fn masks_blend_by_bits() {
    // The way a kernel consumes a mask: bitwise select between two values.
    let flags = [true, false, true];
    let a = [1.0f32, 2.0, 3.0];
    let b = [-1.0f32, -2.0, -3.0];
    let mut mask = [0.0f32; 3];
    flag_to_float_batch(&flags, &mut mask);
    let blended: Vec<f32> = (0..3)
        .map(|i| {
            let m = mask[i].to_bits();
            f32::from_bits((a[i].to_bits() & m) | (b[i].to_bits() & !m))
        })
        .collect();
    assert_eq!(blended, vec![1.0, -2.0, 3.0]);
}

#[test_log::test]
fn scalar_and_splat_forms_agree() {
    let mut one = 0.0f32;
    flag_to_float(true, &mut one);
    let mut many = [0.0f32; 6];
    splat_flag_to_float(1u8, &mut many);
    assert!(many.iter().all(|m| m.to_bits() == one.to_bits()));
    assert_eq!(mask_bits::<f32>(false).to_bits(), 0);
}

#[test_log::test]
fn dispatched_int_masks_match_batch_form() {
    let src: Vec<i32> = (0..1000).map(|i| (i * 37) % 5 - 2).collect();
    let mut dispatched = vec![0.0f32; src.len()];
    let mut batch = vec![0.0f32; src.len()];
    flags_to_float_mask(&src, &mut dispatched);
    flag_to_float_batch(&src, &mut batch);
    assert_eq!(bits(&dispatched), bits(&batch));
    assert!(bits(&dispatched).iter().all(|b| *b == 0 || *b == u32::MAX));
}
