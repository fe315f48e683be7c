use crate::foundation::error::{EaselError, EaselResult};

/// Gaussian blur of a premultiplied RGBA8 buffer. Pixels outside the buffer count as
/// transparent, so content near the edges fades out instead of smearing.
///
/// `radius` is the kernel half-width in pixels; sigma is `radius / 2`. Radii past the
/// larger image dimension are clamped to it.
pub(crate) fn gaussian_blur_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
) -> EaselResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| EaselError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(EaselError::render(
            "blur expects a buffer of width*height*4 bytes",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let radius = radius.min(width.max(height));
    if i32::try_from(radius).is_err() {
        return Err(EaselError::render("blur radius exceeds the kernel range"));
    }

    let kernel = kernel_q16(radius, (radius as f64 / 2.0).max(0.5));
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    blur_pass(src, &mut tmp, width, height, &kernel, Axis::Horizontal);
    blur_pass(&tmp, &mut out, width, height, &kernel, Axis::Vertical);
    Ok(out)
}

fn kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    let r = radius as i32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();

    let mut q: Vec<u32> = weights
        .iter()
        .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Fold rounding drift into the center tap so the kernel sums to exactly 1.0.
    let acc: i64 = q.iter().map(|&w| i64::from(w)).sum();
    let mid = q.len() / 2;
    q[mid] = (i64::from(q[mid]) + (65536 - acc)).clamp(0, 65536) as u32;
    q
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn blur_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i32;
    let (w, h) = (width as i32, height as i32);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => (x + d, y),
                    Axis::Vertical => (x, y + d),
                };
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                let idx = ((sy * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out_idx + c] = q16_to_u8(*a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
