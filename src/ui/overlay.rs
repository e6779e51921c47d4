use egui::{
    CentralPanel, Color32, Context, CursorIcon, Frame, Key, Pos2, Rect, Sense, StrokeKind,
    ViewportBuilder, ViewportId, pos2, vec2,
};

use crate::capture::CapturedBitmap;
use crate::selection::{SelectionBox, SelectionOutcome, SelectionState};

pub enum OverlayOutcome {
    Committed(SelectionBox),
    TooSmall,
    Cancelled,
}

/// Borderless always-on-top viewport spanning the whole virtual desktop.
/// Tracks the drag in virtual-desktop pixel coordinates and reports exactly
/// one outcome, after which the caller tears it down.
pub struct SelectionOverlay {
    state: SelectionState,
    pub bitmap: CapturedBitmap,
}

impl SelectionOverlay {
    pub fn new(bitmap: CapturedBitmap) -> Self {
        let mut state = SelectionState::default();
        state.arm();
        Self { state, bitmap }
    }

    pub fn show(&mut self, ctx: &Context) -> Option<OverlayOutcome> {
        let geometry = self.bitmap.geometry;
        let ppp = ctx.pixels_per_point();
        let position = pos2(
            geometry.origin.0 as f32 / ppp,
            geometry.origin.1 as f32 / ppp,
        );
        let size = vec2(
            geometry.size.0 as f32 / ppp,
            geometry.size.1 as f32 / ppp,
        );

        ctx.show_viewport_immediate(
            ViewportId::from_hash_of("selection_overlay"),
            ViewportBuilder::default()
                .with_title("Select a region")
                .with_position(position)
                .with_inner_size(size)
                .with_decorations(false)
                .with_transparent(true)
                .with_always_on_top(),
            |ctx, _class| self.overlay_contents(ctx, ppp),
        )
    }

    fn overlay_contents(&mut self, ctx: &Context, ppp: f32) -> Option<OverlayOutcome> {
        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            return self.state.cancel().map(|_| OverlayOutcome::Cancelled);
        }

        let origin = self.bitmap.geometry.origin;
        let to_virtual =
            |pos: Pos2| ((pos.x * ppp) as i32 + origin.0, (pos.y * ppp) as i32 + origin.1);
        let to_overlay = |x: i32, y: i32| {
            pos2((x - origin.0) as f32 / ppp, (y - origin.1) as f32 / ppp)
        };

        let mut finished = None;
        CentralPanel::default()
            .frame(Frame::NONE.fill(Color32::from_black_alpha(96)))
            .show(ctx, |ui| {
                ctx.set_cursor_icon(CursorIcon::Crosshair);
                let response = ui.allocate_rect(ui.max_rect(), Sense::click_and_drag());

                if response.drag_started()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    self.state.pointer_down(to_virtual(pos));
                }
                if response.dragged()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    self.state.pointer_moved(to_virtual(pos));
                }
                if response.drag_stopped() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.state.pointer_moved(to_virtual(pos));
                    }
                    finished = self.state.pointer_up().map(|outcome| match outcome {
                        SelectionOutcome::Committed(selection) => {
                            OverlayOutcome::Committed(selection)
                        }
                        SelectionOutcome::TooSmall => OverlayOutcome::TooSmall,
                        SelectionOutcome::Cancelled => OverlayOutcome::Cancelled,
                    });
                }

                if let Some(drag) = self.state.drag_rect() {
                    let rect = Rect::from_min_max(
                        to_overlay(drag.left, drag.top),
                        to_overlay(drag.right, drag.bottom),
                    );
                    ui.painter().rect(
                        rect,
                        0.0,
                        Color32::from_white_alpha(16),
                        (2.0, Color32::RED),
                        StrokeKind::Middle,
                    );
                }
            });
        finished
    }
}
