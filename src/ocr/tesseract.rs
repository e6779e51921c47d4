use anyhow::anyhow;
use image::{DynamicImage, GrayImage};
use log::info;
use rusty_tesseract::{Args, Image, TessError};

use crate::ocr::OcrConfig;
use crate::pipeline::PipelineError;

// Treat the region as a single uniform block of text, default engine.
const PAGE_SEGMENTATION_MODE: i32 = 6;
const ENGINE_MODE: i32 = 3;

pub fn recognize(image: &GrayImage, config: &OcrConfig) -> Result<String, PipelineError> {
    info!(
        "running tesseract on {}x{} region, lang {}",
        image.width(),
        image.height(),
        config.lang
    );
    let dynamic = DynamicImage::ImageLuma8(image.clone());
    let input = Image::from_dynamic_image(&dynamic).map_err(tess_error)?;
    let args = Args {
        lang: config.lang.clone(),
        dpi: Some(config.dpi),
        psm: Some(PAGE_SEGMENTATION_MODE),
        oem: Some(ENGINE_MODE),
        ..Args::default()
    };
    rusty_tesseract::image_to_string(&input, &args).map_err(tess_error)
}

pub fn available_languages() -> Vec<String> {
    rusty_tesseract::get_tesseract_langs().unwrap_or_default()
}

fn tess_error(err: TessError) -> PipelineError {
    match err {
        TessError::TesseractNotFoundError => PipelineError::OcrEngineUnavailable,
        other => PipelineError::Ocr(anyhow!("{other}")),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Needs an installed tesseract binary.
    #[test]
    #[ignore]
    fn blank_region_recognizes_to_nothing() {
        let blank = GrayImage::from_pixel(200, 80, image::Luma([255]));
        let text = recognize(&blank, &OcrConfig::default()).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    #[ignore]
    fn installed_languages_include_the_default() {
        let langs = available_languages();
        assert!(langs.contains(&OcrConfig::default().lang));
    }
}
