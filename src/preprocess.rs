use image::{DynamicImage, GrayImage, imageops};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::filter::gaussian_blur_f32;

use crate::capture::CapturedBitmap;
use crate::pipeline::PipelineError;
use crate::selection::SelectionBox;

const CONTRAST_BOOST: f32 = 30.0;
const BINARY_THRESHOLD: u8 = 128;
const SMOOTHING_SIGMA: f32 = 0.5;

/// Crops the selected region out of the captured bitmap, clamping the box to
/// the bitmap bounds first. A box that leaves no area after clamping is an
/// `InvalidSelection`.
pub fn crop_selection(
    bitmap: &CapturedBitmap,
    selection: &SelectionBox,
) -> Result<DynamicImage, PipelineError> {
    let width = bitmap.image.width() as i32;
    let height = bitmap.image.height() as i32;
    let local = bitmap.geometry.to_bitmap(selection);

    let left = local.left.clamp(0, width);
    let top = local.top.clamp(0, height);
    let right = local.right.clamp(0, width);
    let bottom = local.bottom.clamp(0, height);
    if right <= left || bottom <= top {
        return Err(PipelineError::InvalidSelection);
    }

    Ok(bitmap.image.crop_imm(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Grayscale, contrast boost, binarize at the intensity midpoint, then a light
/// blur to soften the hard threshold edges for the recognizer.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let boosted = imageops::contrast(&gray, CONTRAST_BOOST);
    let binary = threshold(&boosted, BINARY_THRESHOLD, ThresholdType::Binary);
    gaussian_blur_f32(&binary, SMOOTHING_SIGMA)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::capture::VirtualScreenGeometry;
    use image::Rgba;

    fn bitmap(width: u32, height: u32, origin: (i32, i32)) -> CapturedBitmap {
        let image = image::RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]));
        CapturedBitmap {
            image: DynamicImage::ImageRgba8(image),
            geometry: VirtualScreenGeometry {
                origin,
                size: (width, height),
            },
        }
    }

    #[test]
    fn crop_inside_bounds() {
        let bitmap = bitmap(200, 100, (0, 0));
        let selection = SelectionBox {
            left: 10,
            top: 20,
            right: 60,
            bottom: 70,
        };
        let cropped = crop_selection(&bitmap, &selection).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 50));
    }

    #[test]
    fn crop_clamps_overhanging_box() {
        let bitmap = bitmap(200, 100, (0, 0));
        let selection = SelectionBox {
            left: 150,
            top: 50,
            right: 400,
            bottom: 300,
        };
        let cropped = crop_selection(&bitmap, &selection).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 50));
    }

    #[test]
    fn crop_fully_outside_is_invalid() {
        let bitmap = bitmap(200, 100, (0, 0));
        let selection = SelectionBox {
            left: 500,
            top: 500,
            right: 600,
            bottom: 600,
        };
        assert!(matches!(
            crop_selection(&bitmap, &selection),
            Err(PipelineError::InvalidSelection)
        ));
    }

    #[test]
    fn crop_respects_negative_virtual_origin() {
        let bitmap = bitmap(200, 100, (-100, -50));
        let selection = SelectionBox {
            left: -90,
            top: -40,
            right: -40,
            bottom: -10,
        };
        let cropped = crop_selection(&bitmap, &selection).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 30));
    }

    #[test]
    fn preprocess_keeps_dimensions_and_binarizes() {
        let bitmap = bitmap(64, 32, (0, 0));
        let prepared = preprocess(&bitmap.image);
        assert_eq!((prepared.width(), prepared.height()), (64, 32));
        // Uniform bright input lands entirely above the threshold.
        assert!(prepared.pixels().all(|p| p.0[0] > BINARY_THRESHOLD));
    }
}
