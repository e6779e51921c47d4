use anyhow::Context;
use image::{DynamicImage, RgbaImage, imageops};
use log::info;
use screenshots::Screen;

use crate::pipeline::PipelineError;
use crate::selection::SelectionBox;

/// Bounding box of all attached displays. Origin can be negative when a
/// secondary monitor sits left of or above the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualScreenGeometry {
    pub origin: (i32, i32),
    pub size: (u32, u32),
}

impl VirtualScreenGeometry {
    pub fn from_displays(displays: &[(i32, i32, u32, u32)]) -> Option<Self> {
        let left = displays.iter().map(|d| d.0).min()?;
        let top = displays.iter().map(|d| d.1).min()?;
        let right = displays.iter().map(|d| d.0 + d.2 as i32).max()?;
        let bottom = displays.iter().map(|d| d.1 + d.3 as i32).max()?;
        Some(Self {
            origin: (left, top),
            size: ((right - left) as u32, (bottom - top) as u32),
        })
    }

    /// Translates a virtual-desktop box into bitmap pixel coordinates.
    pub fn to_bitmap(&self, selection: &SelectionBox) -> SelectionBox {
        SelectionBox {
            left: selection.left - self.origin.0,
            top: selection.top - self.origin.1,
            right: selection.right - self.origin.0,
            bottom: selection.bottom - self.origin.1,
        }
    }
}

/// One full-desktop screenshot, valid only against the geometry it was taken
/// with. Owned by a single selection cycle and dropped after the crop.
pub struct CapturedBitmap {
    pub image: DynamicImage,
    pub geometry: VirtualScreenGeometry,
}

pub fn capture_virtual_screen() -> Result<CapturedBitmap, PipelineError> {
    capture_all_displays().map_err(PipelineError::CaptureFailed)
}

fn capture_all_displays() -> anyhow::Result<CapturedBitmap> {
    let screens = Screen::all()?;
    let displays: Vec<_> = screens
        .iter()
        .map(|screen| {
            let info = screen.display_info;
            (info.x, info.y, info.width, info.height)
        })
        .collect();
    let geometry =
        VirtualScreenGeometry::from_displays(&displays).context("no displays attached")?;
    info!(
        "capturing {} display(s), virtual screen {:?} at {:?}",
        screens.len(),
        geometry.size,
        geometry.origin
    );

    let mut canvas = RgbaImage::new(geometry.size.0, geometry.size.1);
    for screen in &screens {
        let shot = screen.capture()?;
        let part = RgbaImage::from_raw(shot.width(), shot.height(), shot.to_vec())
            .context("screen capture returned a malformed buffer")?;
        imageops::replace(
            &mut canvas,
            &part,
            (screen.display_info.x - geometry.origin.0) as i64,
            (screen.display_info.y - geometry.origin.1) as i64,
        );
    }

    Ok(CapturedBitmap {
        image: DynamicImage::ImageRgba8(canvas),
        geometry,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_display() {
        let geometry = VirtualScreenGeometry::from_displays(&[(0, 0, 1920, 1080)]).unwrap();
        assert_eq!(geometry.origin, (0, 0));
        assert_eq!(geometry.size, (1920, 1080));
    }

    #[test]
    fn side_by_side_displays() {
        let geometry =
            VirtualScreenGeometry::from_displays(&[(0, 0, 1920, 1080), (1920, 0, 1280, 1024)])
                .unwrap();
        assert_eq!(geometry.origin, (0, 0));
        assert_eq!(geometry.size, (3200, 1080));
    }

    #[test]
    fn display_left_of_primary_gives_negative_origin() {
        let geometry =
            VirtualScreenGeometry::from_displays(&[(0, 0, 1920, 1080), (-1280, -200, 1280, 1024)])
                .unwrap();
        assert_eq!(geometry.origin, (-1280, -200));
        assert_eq!(geometry.size, (3200, 1280));
    }

    #[test]
    fn no_displays() {
        assert_eq!(VirtualScreenGeometry::from_displays(&[]), None);
    }

    #[test]
    fn to_bitmap_translates_by_origin() {
        let geometry = VirtualScreenGeometry {
            origin: (-100, 50),
            size: (2000, 1000),
        };
        let selection = SelectionBox {
            left: -50,
            top: 60,
            right: 150,
            bottom: 160,
        };
        assert_eq!(
            geometry.to_bitmap(&selection),
            SelectionBox {
                left: 50,
                top: 10,
                right: 250,
                bottom: 110
            }
        );
    }
}
