use image::{GrayImage, Luma};

/// Active taps of an elliptical structuring element with the given side
/// length, as offsets from the kernel center. Matches the classic filled
/// ellipse construction: per row the half-width is `c * sqrt(1 - dy²/r²)`,
/// with the middle row always fully set.
pub(crate) fn elliptical_kernel(size: usize) -> Vec<(i32, i32)> {
    let r = (size / 2) as i32;
    let c = r;
    let inv_r2 = if r != 0 { 1. / f64::from(r * r) } else { 0. };

    let mut taps = Vec::new();
    for i in 0..size as i32 {
        let (j1, j2) = if i == r {
            (0, size as i32)
        } else {
            let dy = i - r;
            let dx = (f64::from(c) * (f64::from(r * r - dy * dy) * inv_r2).sqrt()).round() as i32;
            ((c - dx).max(0), (c + dx + 1).min(size as i32))
        };
        for j in j1..j2 {
            taps.push((j - c, i - r));
        }
    }
    taps
}

pub(crate) fn erode(image: &GrayImage, size: usize) -> GrayImage {
    apply(image, size, u8::MAX, |acc, v| acc.min(v))
}

pub(crate) fn dilate(image: &GrayImage, size: usize) -> GrayImage {
    apply(image, size, u8::MIN, |acc, v| acc.max(v))
}

// Out-of-bounds taps never constrain the result, so blobs touching the crop
// edge keep their full extent.
fn apply(image: &GrayImage, size: usize, init: u8, fold: fn(u8, u8) -> u8) -> GrayImage {
    let taps = elliptical_kernel(size);
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let mut out = init;
        for &(dx, dy) in &taps {
            let sx = x as i32 + dx;
            let sy = y as i32 + dy;
            if sx < 0 || sy < 0 || sx >= width as i32 || sy >= height as i32 {
                continue;
            }
            out = fold(out, image.get_pixel(sx as u32, sy as u32)[0]);
        }
        Luma([out])
    })
}
