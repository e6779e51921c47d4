use std::sync::LazyLock;

use egui::{Context, Id};
use log::error;

use crate::ui::app::ReadScreenApp;

/// Completions and failures signalled from background tasks to the UI thread.
#[derive(Debug, Clone)]
pub enum Event {
    ReplaceBuffer { text: String, status: String },
    Status(String),
    OperationFailed(String),
}

static EVENT_LIST_ID: LazyLock<Id> = LazyLock::new(|| Id::new("EVENT_LIST"));

pub trait EventHandler {
    fn emit(&self, event: Event);
    fn take_events(&self) -> Vec<Event>;
    fn handle_event(&self, state: &mut ReadScreenApp, event: Event);

    fn update_state(&self, state: &mut ReadScreenApp) {
        for event in self.take_events() {
            self.handle_event(state, event);
        }
    }
}

impl EventHandler for Context {
    fn emit(&self, event: Event) {
        self.data_mut(|data| {
            data.get_temp_mut_or_insert_with(*EVENT_LIST_ID, Vec::new)
                .push(event);
        });
        self.request_repaint();
    }

    fn take_events(&self) -> Vec<Event> {
        self.data_mut(|data| data.remove_temp(*EVENT_LIST_ID).unwrap_or_default())
    }

    fn handle_event(&self, state: &mut ReadScreenApp, event: Event) {
        match event {
            Event::ReplaceBuffer { text, status } => {
                state.buffer = text;
                state.status = status;
                state.busy = false;
            }
            Event::Status(status) => state.status = status,
            Event::OperationFailed(message) => {
                error!("{message}");
                state.status = message;
                state.busy = false;
            }
        }
    }
}
