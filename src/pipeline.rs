use log::info;
use thiserror::Error;

use crate::capture::CapturedBitmap;
use crate::cleanup::clean_lines;
use crate::ocr::{OcrConfig, tesseract};
use crate::preprocess::{crop_selection, preprocess};
use crate::selection::SelectionBox;

/// Everything that can go wrong between releasing the mouse button and text
/// landing in the buffer. None of these are retried automatically.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("screen capture failed")]
    CaptureFailed(#[source] anyhow::Error),
    #[error("selection lies outside the captured area")]
    InvalidSelection,
    #[error("Tesseract not found; install it or put it on PATH")]
    OcrEngineUnavailable,
    #[error("text recognition failed")]
    Ocr(#[source] anyhow::Error),
}

/// Cleaned recognition output. Empty is a valid outcome ("no usable text"),
/// distinct from a pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognizedText {
    pub lines: Vec<String>,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Crop, preprocess, recognize, clean up. Runs synchronously on the caller's
/// thread; the bitmap is not retained afterwards.
pub fn run_selection_ocr(
    bitmap: &CapturedBitmap,
    selection: &SelectionBox,
    config: &OcrConfig,
) -> Result<RecognizedText, PipelineError> {
    let cropped = crop_selection(bitmap, selection)?;
    let prepared = preprocess(&cropped);
    let raw = tesseract::recognize(&prepared, config)?;
    let lines = clean_lines(&raw);
    info!("recognized {} line(s)", lines.len());
    Ok(RecognizedText { lines })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::capture::VirtualScreenGeometry;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn outside_selection_never_reaches_the_engine() {
        let bitmap = CapturedBitmap {
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                100,
                100,
                Rgba([255, 255, 255, 255]),
            )),
            geometry: VirtualScreenGeometry {
                origin: (0, 0),
                size: (100, 100),
            },
        };
        let selection = SelectionBox {
            left: 1000,
            top: 1000,
            right: 1100,
            bottom: 1100,
        };
        // Fails before any engine invocation, so this passes without tesseract.
        assert!(matches!(
            run_selection_ocr(&bitmap, &selection, &OcrConfig::default()),
            Err(PipelineError::InvalidSelection)
        ));
    }

    #[test]
    fn recognized_text_joins_lines() {
        let text = RecognizedText {
            lines: vec!["one".to_string(), "two".to_string()],
        };
        assert!(!text.is_empty());
        assert_eq!(text.to_text(), "one\ntwo");
        assert!(RecognizedText::default().is_empty());
    }
}
