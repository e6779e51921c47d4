use serde::{Deserialize, Serialize};

/// Drags smaller than this in either dimension count as an accidental click.
pub const MIN_SELECTION_PX: i32 = 5;

/// Axis-aligned box in virtual-desktop coordinates, normalized so that
/// `right > left` and `bottom > top`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl SelectionBox {
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    fn is_too_small(&self) -> bool {
        self.width() < MIN_SELECTION_PX || self.height() < MIN_SELECTION_PX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Capturing,
    Dragging {
        start: (i32, i32),
        current: (i32, i32),
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Committed(SelectionBox),
    TooSmall,
    Cancelled,
}

/// Drag lifecycle of the selection overlay:
/// `Idle -> Capturing -> Dragging -> (Committed | TooSmall | Cancelled) -> Idle`
#[derive(Debug, Default)]
pub struct SelectionState {
    phase: Phase,
}

impl SelectionState {
    /// Idle -> Capturing. Returns false while a selection is already running.
    pub fn arm(&mut self) -> bool {
        if self.phase == Phase::Idle {
            self.phase = Phase::Capturing;
            true
        } else {
            false
        }
    }

    pub fn pointer_down(&mut self, pos: (i32, i32)) {
        if self.phase == Phase::Capturing {
            self.phase = Phase::Dragging {
                start: pos,
                current: pos,
            };
        }
    }

    pub fn pointer_moved(&mut self, pos: (i32, i32)) {
        if let Phase::Dragging { start, .. } = self.phase {
            self.phase = Phase::Dragging {
                start,
                current: pos,
            };
        }
    }

    /// Ends the drag. Returns `None` unless a drag was in progress.
    pub fn pointer_up(&mut self) -> Option<SelectionOutcome> {
        let Phase::Dragging { start, current } = self.phase else {
            return None;
        };
        self.phase = Phase::Idle;
        let selection = SelectionBox::from_corners(start, current);
        if selection.is_too_small() {
            Some(SelectionOutcome::TooSmall)
        } else {
            Some(SelectionOutcome::Committed(selection))
        }
    }

    /// Esc. Valid from both `Capturing` and mid-drag.
    pub fn cancel(&mut self) -> Option<SelectionOutcome> {
        if self.phase == Phase::Idle {
            return None;
        }
        self.phase = Phase::Idle;
        Some(SelectionOutcome::Cancelled)
    }

    pub fn drag_rect(&self) -> Option<SelectionBox> {
        if let Phase::Dragging { start, current } = self.phase {
            Some(SelectionBox::from_corners(start, current))
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dragged(from: (i32, i32), to: (i32, i32)) -> Option<SelectionOutcome> {
        let mut state = SelectionState::default();
        assert!(state.arm());
        state.pointer_down(from);
        state.pointer_moved(to);
        state.pointer_up()
    }

    #[test]
    fn normalizes_reversed_corners() {
        let selection = SelectionBox::from_corners((200, 150), (100, 50));
        assert_eq!(
            selection,
            SelectionBox {
                left: 100,
                top: 50,
                right: 200,
                bottom: 150
            }
        );
        assert!(selection.width() > 0 && selection.height() > 0);
    }

    #[test]
    fn full_drag_commits() {
        let outcome = dragged((10, 10), (110, 60));
        assert_eq!(
            outcome,
            Some(SelectionOutcome::Committed(SelectionBox {
                left: 10,
                top: 10,
                right: 110,
                bottom: 60
            }))
        );
    }

    #[test]
    fn tiny_drag_is_rejected() {
        assert_eq!(dragged((10, 10), (14, 60)), Some(SelectionOutcome::TooSmall));
        assert_eq!(dragged((10, 10), (60, 14)), Some(SelectionOutcome::TooSmall));
        assert_eq!(dragged((10, 10), (10, 10)), Some(SelectionOutcome::TooSmall));
    }

    #[test]
    fn five_px_is_the_exact_threshold() {
        assert_eq!(dragged((0, 0), (4, 100)), Some(SelectionOutcome::TooSmall));
        assert!(matches!(
            dragged((0, 0), (5, 100)),
            Some(SelectionOutcome::Committed(_))
        ));
    }

    #[test]
    fn escape_mid_drag_returns_to_idle() {
        let mut state = SelectionState::default();
        state.arm();
        state.pointer_down((10, 10));
        state.pointer_moved((200, 200));
        assert_eq!(state.cancel(), Some(SelectionOutcome::Cancelled));
        assert!(!state.is_active());
        // No pending drag survives the cancel.
        assert_eq!(state.pointer_up(), None);
    }

    #[test]
    fn escape_before_drag_cancels_too() {
        let mut state = SelectionState::default();
        state.arm();
        assert_eq!(state.cancel(), Some(SelectionOutcome::Cancelled));
        assert_eq!(state.cancel(), None);
    }

    #[test]
    fn rearming_while_active_is_a_noop() {
        let mut state = SelectionState::default();
        assert!(state.arm());
        assert!(!state.arm());
        state.pointer_down((0, 0));
        assert!(!state.arm());
    }

    #[test]
    fn pointer_events_outside_a_drag_are_ignored() {
        let mut state = SelectionState::default();
        state.pointer_moved((50, 50));
        assert_eq!(state.pointer_up(), None);
        assert!(!state.is_active());
    }
}
