use super::*;

#[test]
fn radius_zero_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = gaussian_blur_premul(&src, 1, 2, 0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn rejects_mismatched_buffer() {
    assert!(gaussian_blur_premul(&[0u8; 7], 1, 2, 1).is_err());
}

#[test]
fn kernel_sums_to_one() {
    for radius in [1u32, 2, 5, 12] {
        let k = kernel_q16(radius, radius as f64 / 2.0);
        assert_eq!(k.len(), (2 * radius + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
    }
}

#[test]
fn spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((4 * w + 4) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = gaussian_blur_premul(&src, w, h, 2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: i32 = out.chunks_exact(4).map(|px| i32::from(px[3])).sum();
    assert!((sum_a - 255).abs() <= 8, "alpha sum {sum_a}");
}

#[test]
fn edges_fade_against_transparent_outside() {
    let (w, h) = (4u32, 4u32);
    let src = [200u8, 100, 50, 255].repeat((w * h) as usize);
    let out = gaussian_blur_premul(&src, w, h, 2).unwrap();

    let corner_a = out[3];
    let inner_a = out[((w + 1) * 4 + 3) as usize];
    assert!(corner_a < 255);
    assert!(corner_a <= inner_a);
}

fn dot(w: u32, h: u32) -> Vec<u8> {
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = (((h / 2) * w + w / 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
    src
}

#[test]
fn radius_wider_than_image_is_clamped() {
    let (w, h) = (6u32, 3u32);
    let src = dot(w, h);
    let clamped = gaussian_blur_premul(&src, w, h, 6).unwrap();

    assert_eq!(gaussian_blur_premul(&src, w, h, 40).unwrap(), clamped);
    assert_eq!(gaussian_blur_premul(&src, w, h, u32::MAX).unwrap(), clamped);
}

#[test]
fn huge_radius_still_spreads_the_dot() {
    let (w, h) = (5u32, 5u32);
    let out = gaussian_blur_premul(&dot(w, h), w, h, u32::MAX).unwrap();
    assert_eq!(out.len(), (w * h * 4) as usize);
    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
}
