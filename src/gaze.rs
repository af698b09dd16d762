use image::{GrayImage, Luma};

use crate::{face::EyePolygon, geometry::Geometry};

mod morphology;
mod segmentation;

const SPATIAL_MASK_SIZE: u32 = 3;
const BLUR_MASK_SIZE: u32 = 5;
const BLACK_VALUE: u8 = 0;
const WHITE_VALUE: u8 = 255;
// scan-order thirds are [right, center, left]; the triple below is ranked as
// [right, left, center], so the center is its last element
const CENTER_INDEX: usize = 2;
const WHITE_GAP_LIMIT: u32 = 2;

// 5-tap binomial, the Gaussian kernel derived from a size-5 mask when no
// explicit sigma is given
const GAUSSIAN_KERNEL: [u32; 5] = [1, 4, 6, 4, 1];

/// Decides whether one eye fixates the camera.
///
/// The crop under the eye polygon is smoothed, binarized at the Otsu level and
/// reduced to its dominant dark blob; the eye counts as looking straight ahead
/// when that blob dominates the middle third of the crop's width and at least
/// one middle-third column is nearly free of light pixels. Deterministic in
/// its inputs; degenerate crops yield `false`, never an error.
pub fn is_looking_at_camera(frame: &GrayImage, eye: &EyePolygon) -> bool {
    let Some(mut crop) = crop_eye(frame, eye) else {
        return false;
    };
    let (mut width, mut height) = crop.dimensions();

    // Averaging pass; the outer ring carries the filter's edge artifacts and
    // is trimmed away.
    if height > SPATIAL_MASK_SIZE * 2 && width > SPATIAL_MASK_SIZE * 2 {
        crop = box_average_trimmed(&crop);
        (width, height) = crop.dimensions();
    }

    let smoothed = if height > BLUR_MASK_SIZE && width > BLUR_MASK_SIZE {
        gaussian_smooth(&crop)
    } else {
        crop
    };
    let binary = binarize_inverted(&smoothed);

    let kernel_size = (height / 4 + 1) as usize;
    let denoised = morphology::dilate(&morphology::erode(&binary, kernel_size), kernel_size);

    let Some(blob) = segmentation::largest_component(&denoised) else {
        return false;
    };
    let mut mask = blob;
    image::imageops::invert(&mut mask);

    if width < 3 {
        return false;
    }
    let third = width / 3;
    let right_dark = count_in_columns(&mask, 0..third, BLACK_VALUE);
    let center_dark = count_in_columns(&mask, third..third * 2, BLACK_VALUE);
    let left_dark = count_in_columns(&mask, third * 2..width, BLACK_VALUE);

    let counts = [right_dark, left_dark, center_dark];
    let max = counts.into_iter().max().unwrap_or(0);
    if counts.iter().position(|&c| c == max) != Some(CENTER_INDEX) {
        return false;
    }

    // Centered pupil: accept as soon as one middle-third column has almost no
    // sclera left in it.
    for column in third..third * 2 {
        if count_in_columns(&mask, column..column + 1, WHITE_VALUE) < WHITE_GAP_LIMIT {
            return true;
        }
    }
    false
}

/// Crop under the polygon's bounding rect, clamped to the frame; `None` when
/// the rect collapses to zero width or height.
fn crop_eye(frame: &GrayImage, eye: &EyePolygon) -> Option<GrayImage> {
    let (min_x, min_y, max_x, max_y) = Geometry::bounding_rect(eye);
    let (frame_w, frame_h) = frame.dimensions();
    let x0 = min_x.clamp(0, frame_w as i32) as u32;
    let y0 = min_y.clamp(0, frame_h as i32) as u32;
    let x1 = max_x.clamp(0, frame_w as i32) as u32;
    let y1 = max_y.clamp(0, frame_h as i32) as u32;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(image::imageops::crop_imm(frame, x0, y0, x1 - x0, y1 - y0).to_image())
}

// 3x3 mean filter evaluated only where the mask fits entirely inside the
// image, which is exactly the region left after the one-pixel margin trim.
fn box_average_trimmed(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width - 2, height - 2, |x, y| {
        let mut sum = 0u32;
        for dy in 0..SPATIAL_MASK_SIZE {
            for dx in 0..SPATIAL_MASK_SIZE {
                sum += u32::from(image.get_pixel(x + dx, y + dy)[0]);
            }
        }
        Luma([(sum as f32 / 9.).round() as u8])
    })
}

// Separable 5x5 binomial smoothing with reflected borders; integer
// accumulation, /256 with rounding.
fn gaussian_smooth(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = (BLUR_MASK_SIZE / 2) as i64;

    let mut rows = vec![0u32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0u32;
            for (k, weight) in GAUSSIAN_KERNEL.iter().enumerate() {
                let sx = reflect(x as i64 + k as i64 - radius, width);
                acc += weight * u32::from(image.get_pixel(sx, y)[0]);
            }
            rows[(y * width + x) as usize] = acc;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0u32;
        for (k, weight) in GAUSSIAN_KERNEL.iter().enumerate() {
            let sy = reflect(y as i64 + k as i64 - radius, height);
            acc += weight * rows[(sy * width + x) as usize];
        }
        Luma([((acc + 128) >> 8) as u8])
    })
}

// reflect-101: -1 -> 1, len -> len - 2
fn reflect(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    let mut index = index;
    if index < 0 {
        index = -index;
    }
    if index >= len {
        index = 2 * len - 2 - index;
    }
    index as u32
}

/// Inverse binary threshold at the Otsu level: dark pixels become foreground.
fn binarize_inverted(image: &GrayImage) -> GrayImage {
    let level = imageproc::contrast::otsu_level(image);
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if image.get_pixel(x, y)[0] > level {
            Luma([BLACK_VALUE])
        } else {
            Luma([WHITE_VALUE])
        }
    })
}

fn count_in_columns(image: &GrayImage, columns: std::ops::Range<u32>, value: u8) -> u32 {
    let (_, height) = image.dimensions();
    columns
        .map(|x| {
            (0..height)
                .filter(|&y| image.get_pixel(x, y)[0] == value)
                .count() as u32
        })
        .sum()
}
