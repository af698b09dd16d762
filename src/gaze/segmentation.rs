use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

/// Isolates the largest foreground blob of a binary mask and fills its
/// enclosed holes, producing a single solid region. `None` when the mask has
/// no foreground at all.
pub(crate) fn largest_component(mask: &GrayImage) -> Option<GrayImage> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    // pixel counts per label; labels are assigned in raster order, so the
    // first maximum is deterministic
    let mut areas: Vec<u64> = Vec::new();
    for label in labels.pixels().map(|p| p[0]) {
        if label == 0 {
            continue;
        }
        let index = label as usize;
        if areas.len() <= index {
            areas.resize(index + 1, 0);
        }
        areas[index] += 1;
    }

    let mut largest = 0usize;
    let mut largest_area = 0u64;
    for (index, &area) in areas.iter().enumerate() {
        if area > largest_area {
            largest = index;
            largest_area = area;
        }
    }
    if largest_area == 0 {
        return None;
    }

    let (width, height) = mask.dimensions();
    let blob = GrayImage::from_fn(width, height, |x, y| {
        if labels.get_pixel(x, y)[0] as usize == largest {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    Some(fill_holes(blob))
}

// Background regions that cannot reach the crop border are enclosed by the
// blob; filling them reproduces a filled-outline mask.
fn fill_holes(mut mask: GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let background = GrayImage::from_fn(width, height, |x, y| {
        Luma([if mask.get_pixel(x, y)[0] == 0 { 255 } else { 0 }])
    });
    let labels = connected_components(&background, Connectivity::Four, Luma([0u8]));

    let mut border_labels = HashSet::new();
    for x in 0..width {
        for y in [0, height - 1] {
            border_labels.insert(labels.get_pixel(x, y)[0]);
        }
    }
    for y in 0..height {
        for x in [0, width - 1] {
            border_labels.insert(labels.get_pixel(x, y)[0]);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let label = labels.get_pixel(x, y)[0];
            if label != 0 && !border_labels.contains(&label) {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

#[cfg(test)]
mod test {
    use image::{GrayImage, Luma};

    use super::largest_component;

    fn mask_from(rows: &[&str]) -> GrayImage {
        GrayImage::from_fn(rows[0].len() as u32, rows.len() as u32, |x, y| {
            let row = rows[y as usize].as_bytes();
            Luma([if row[x as usize] == b'#' { 255 } else { 0 }])
        })
    }

    #[test]
    fn empty_mask_has_no_component() {
        let mask = GrayImage::from_pixel(5, 5, Luma([0]));
        assert!(largest_component(&mask).is_none());
    }

    #[test]
    fn keeps_only_the_biggest_blob() {
        let mask = mask_from(&[
            "##....#",
            "##....#",
            "##.....",
            ".....##",
            "###..##",
        ]);
        let blob = largest_component(&mask).expect("Failed to find a component");
        // the 2x3 block wins; the rest is cleared
        assert_eq!(blob.get_pixel(0, 0)[0], 255);
        assert_eq!(blob.get_pixel(1, 2)[0], 255);
        assert_eq!(blob.get_pixel(6, 0)[0], 0);
        assert_eq!(blob.get_pixel(5, 3)[0], 0);
        assert_eq!(blob.get_pixel(0, 4)[0], 0);
    }

    #[test]
    fn diagonal_touch_counts_as_one_blob() {
        let mask = mask_from(&[
            "#..",
            ".#.",
            "..#",
        ]);
        let blob = largest_component(&mask).expect("Failed to find a component");
        assert_eq!(blob.get_pixel(0, 0)[0], 255);
        assert_eq!(blob.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn enclosed_holes_are_filled() {
        let mask = mask_from(&[
            "#####",
            "#...#",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        let blob = largest_component(&mask).expect("Failed to find a component");
        assert!(blob.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn bays_reaching_the_border_stay_open() {
        let mask = mask_from(&[
            "#####",
            "#...#",
            "#.###",
            "#.#..",
            "###..",
        ]);
        let blob = largest_component(&mask).expect("Failed to find a component");
        // the sealed cavity fills, the bay open to the border does not
        assert_eq!(blob.get_pixel(2, 1)[0], 255);
        assert_eq!(blob.get_pixel(1, 3)[0], 255);
        assert_eq!(blob.get_pixel(3, 3)[0], 0);
        assert_eq!(blob.get_pixel(4, 4)[0], 0);
    }
}
