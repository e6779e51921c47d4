use std::time::{Duration, Instant};

use eframe::CreationContext;
use egui::{
    CentralPanel, Color32, Context, FontId, Frame, Margin, RichText, ScrollArea, TextEdit,
    TopBottomPanel, ViewportCommand,
};
use log::{error, info, warn};
use rfd::FileDialog;
use tokio::task::JoinError;

use crate::capture::{CapturedBitmap, capture_virtual_screen};
use crate::document::{self, DocumentKind};
use crate::pipeline::{PipelineError, run_selection_ocr};
use crate::selection::SelectionBox;
use crate::settings::{AppSettings, WrapMode};
use crate::speech::recorder::Recorder;
use crate::speech::transcribe::{self, TranscribeError};
use crate::speech::SpeechSynth;
use crate::tasks::{TASK_TRACKER, shutdown_tasks};
use crate::ui::event::{Event, EventHandler};
use crate::ui::overlay::{OverlayOutcome, SelectionOverlay};
use crate::ui::shortcut::{HotkeyAction, HotkeyManager};

/// Give the window manager a moment to finish minimizing the main window
/// before the desktop is photographed.
const CAPTURE_SETTLE_DELAY: Duration = Duration::from_millis(150);

pub struct ReadScreenApp {
    pub settings: AppSettings,
    pub buffer: String,
    pub status: String,
    pub busy: bool,
    speech: Option<SpeechSynth>,
    recorder: Option<Recorder>,
    hotkeys: Option<HotkeyManager>,
    overlay: Option<SelectionOverlay>,
    capture_at: Option<Instant>,
    show_settings: bool,
}

impl ReadScreenApp {
    pub fn new(_cc: &CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let speech = match SpeechSynth::new() {
            Ok(speech) => Some(speech),
            Err(err) => {
                warn!("speech synthesis unavailable: {err:#}");
                None
            }
        };
        let hotkeys = match HotkeyManager::new() {
            Ok(hotkeys) => Some(hotkeys),
            Err(err) => {
                warn!("global hotkeys unavailable: {err:#}");
                None
            }
        };
        Self {
            settings,
            buffer: String::new(),
            status: "Ready".to_string(),
            busy: false,
            speech,
            recorder: None,
            hotkeys,
            overlay: None,
            capture_at: None,
            show_settings: false,
        }
    }

    fn handle_hotkey(&mut self, ctx: &Context, action: HotkeyAction) {
        match action {
            HotkeyAction::StartSelection => self.start_selection(ctx),
            HotkeyAction::ReadAloud => self.read_aloud(),
            HotkeyAction::StopSpeech => self.stop_speech(),
        }
    }

    /// Hides the main window and schedules the desktop capture. A no-op while
    /// a selection is already in progress.
    fn start_selection(&mut self, ctx: &Context) {
        if self.overlay.is_some() || self.capture_at.is_some() {
            return;
        }
        info!("starting region selection");
        self.status = "Drag to select a region, Esc cancels.".to_string();
        ctx.send_viewport_cmd(ViewportCommand::Minimized(true));
        self.capture_at = Some(Instant::now() + CAPTURE_SETTLE_DELAY);
        ctx.request_repaint_after(CAPTURE_SETTLE_DELAY);
    }

    fn drive_selection(&mut self, ctx: &Context) {
        if let Some(at) = self.capture_at {
            if Instant::now() < at {
                ctx.request_repaint_after(at - Instant::now());
                return;
            }
            self.capture_at = None;
            match capture_virtual_screen() {
                Ok(bitmap) => self.overlay = Some(SelectionOverlay::new(bitmap)),
                Err(err) => {
                    error!("capture failed: {err}");
                    self.restore_main_window(ctx);
                    self.status = format!("Screen capture failed: {err}");
                    return;
                }
            }
        }

        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        let Some(outcome) = overlay.show(ctx) else {
            return;
        };
        // Every exit path tears the overlay down and restores the window.
        let overlay = self.overlay.take().expect("overlay just produced an outcome");
        self.restore_main_window(ctx);
        match outcome {
            OverlayOutcome::Cancelled => self.status = "Selection cancelled.".to_string(),
            OverlayOutcome::TooSmall => {
                self.status = "Selection too small, drag a larger area.".to_string();
            }
            OverlayOutcome::Committed(selection) => {
                self.finish_selection(&overlay.bitmap, selection);
            }
        }
        // The bitmap is dropped here with the overlay, never kept across cycles.
    }

    fn finish_selection(&mut self, bitmap: &CapturedBitmap, selection: SelectionBox) {
        match run_selection_ocr(bitmap, &selection, &self.settings.ocr) {
            Ok(text) if text.is_empty() => {
                self.status = "No usable text found in the selection.".to_string();
            }
            Ok(text) => {
                self.buffer = text.to_text();
                self.status = "Text captured. Ready to read.".to_string();
            }
            Err(PipelineError::InvalidSelection) => {
                self.status = "Selection lies outside the captured area.".to_string();
            }
            Err(err @ PipelineError::OcrEngineUnavailable) => {
                error!("{err}");
                self.status = format!("{err}.");
            }
            Err(err) => {
                error!("recognition failed: {err}");
                self.status = format!("Text recognition failed: {err}.");
            }
        }
    }

    fn restore_main_window(&self, ctx: &Context) {
        ctx.send_viewport_cmd(ViewportCommand::Minimized(false));
        ctx.send_viewport_cmd(ViewportCommand::Focus);
    }

    fn read_aloud(&mut self) {
        if self.buffer.trim().is_empty() {
            self.status = "No text to read.".to_string();
            return;
        }
        let rate = self.settings.speech_rate;
        match self.speech.as_mut() {
            None => self.status = "Speech synthesis is not available.".to_string(),
            Some(speech) => match speech.speak(&self.buffer, rate) {
                Ok(()) => self.status = "Reading aloud...".to_string(),
                Err(err) => {
                    error!("{err:#}");
                    self.status = format!("Speech failed: {err}");
                }
            },
        }
    }

    fn stop_speech(&mut self) {
        if let Some(speech) = self.speech.as_mut() {
            match speech.stop() {
                Ok(()) => self.status = "Speech stopped.".to_string(),
                Err(err) => {
                    error!("{err:#}");
                    self.status = format!("Could not stop speech: {err}");
                }
            }
        }
    }

    fn save_buffer(&mut self) {
        if self.buffer.trim().is_empty() {
            self.status = "Nothing to save.".to_string();
            return;
        }
        let Some(path) = FileDialog::new()
            .add_filter("Text files", &["txt"])
            .save_file()
        else {
            return;
        };
        match document::save_text(&path, &self.buffer) {
            Ok(()) => self.status = format!("Saved to {}.", path.display()),
            Err(err) => {
                error!("{err:#}");
                self.status = format!("Save failed: {err}");
            }
        }
    }

    fn load_document(&mut self, ctx: &Context, kind: DocumentKind) {
        if self.busy {
            self.status = "Another operation is still running.".to_string();
            return;
        }
        let Some(path) = FileDialog::new()
            .add_filter(kind.label(), kind.extensions())
            .pick_file()
        else {
            return;
        };
        self.busy = true;
        self.status = format!("Loading {}...", path.display());
        let ctx = ctx.clone();
        TASK_TRACKER.spawn(async move {
            let result = tokio::task::spawn_blocking(move || kind.load(&path)).await;
            let event = match result {
                Ok(Ok(text)) => Event::ReplaceBuffer {
                    text,
                    status: "Document loaded.".to_string(),
                },
                Ok(Err(err)) => Event::OperationFailed(format!("Could not load document: {err}")),
                Err(err) => Event::OperationFailed(format!("Load task failed: {err}")),
            };
            ctx.emit(event);
        });
    }

    fn transcribe_audio_file(&mut self, ctx: &Context) {
        if self.busy {
            self.status = "Another operation is still running.".to_string();
            return;
        }
        let Some(path) = FileDialog::new()
            .add_filter("Audio files", &["wav"])
            .pick_file()
        else {
            return;
        };
        self.busy = true;
        self.status = "Transcribing audio file...".to_string();
        let ctx = ctx.clone();
        TASK_TRACKER.spawn(async move {
            let result =
                tokio::task::spawn_blocking(move || transcribe::transcribe_file(&path)).await;
            ctx.emit(transcription_event(result));
        });
    }

    fn toggle_recording(&mut self, ctx: &Context) {
        match self.recorder.take() {
            None => {
                if self.busy {
                    self.status = "Another operation is still running.".to_string();
                    return;
                }
                match Recorder::start() {
                    Ok(recorder) => {
                        self.recorder = Some(recorder);
                        self.status = "Recording... stop to transcribe.".to_string();
                    }
                    Err(err) => {
                        error!("{err:#}");
                        self.status = format!("Recording failed: {err}");
                    }
                }
            }
            Some(recorder) => match recorder.stop() {
                Ok(recording) if recording.samples.is_empty() => {
                    self.status = "No audio was captured.".to_string();
                }
                Ok(recording) => {
                    self.busy = true;
                    self.status = "Transcribing recording...".to_string();
                    let ctx = ctx.clone();
                    TASK_TRACKER.spawn(async move {
                        let result = tokio::task::spawn_blocking(move || {
                            transcribe::transcribe_recording(&recording)
                        })
                        .await;
                        ctx.emit(transcription_event(result));
                    });
                }
                Err(err) => {
                    error!("{err:#}");
                    self.status = format!("Recording failed: {err}");
                }
            },
        }
    }

    fn show_menu(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Save Text...").clicked() {
                        self.save_buffer();
                    }
                    ui.separator();
                    if ui.button("Load from Text...").clicked() {
                        self.load_document(ctx, DocumentKind::Text);
                    }
                    if ui.button("Load from PDF...").clicked() {
                        self.load_document(ctx, DocumentKind::Pdf);
                    }
                    if ui.button("Load from Word...").clicked() {
                        self.load_document(ctx, DocumentKind::Word);
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                });
                ui.menu_button("Speech", |ui| {
                    if ui.button("Read Aloud\tCtrl+Shift+R").clicked() {
                        self.read_aloud();
                    }
                    if ui.button("Stop\tCtrl+Shift+X").clicked() {
                        self.stop_speech();
                    }
                });
                ui.menu_button("Tools", |ui| {
                    if ui.button("Capture Region\tCtrl+Shift+S").clicked() {
                        self.start_selection(ctx);
                    }
                    ui.separator();
                    let record_label = if self.recorder.is_some() {
                        "Stop Recording"
                    } else {
                        "Record Speech"
                    };
                    if ui.button(record_label).clicked() {
                        self.toggle_recording(ctx);
                    }
                    if ui.button("Transcribe Audio File...").clicked() {
                        self.transcribe_audio_file(ctx);
                    }
                    ui.separator();
                    if ui.button("Settings...").clicked() {
                        self.show_settings = true;
                    }
                });
            });
        });
    }

    fn show_status_bar(&self, ctx: &Context) {
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.busy {
                    ui.spinner();
                }
                if self.recorder.is_some() {
                    ui.label(RichText::new("REC").color(Color32::RED).strong());
                }
                ui.label(&self.status);
            });
        });
    }

    fn show_text_area(&mut self, ctx: &Context) {
        let font = FontId::new(self.settings.font_size, self.settings.font_family.family());
        CentralPanel::default()
            .frame(Frame::default().fill(self.settings.bg_color).inner_margin(Margin::same(8)))
            .show(ctx, |ui| {
                let scroll = match self.settings.wrap {
                    WrapMode::Word => ScrollArea::vertical(),
                    WrapMode::None => ScrollArea::both(),
                };
                scroll.show(ui, |ui| {
                    ui.add_sized(
                        ui.available_size(),
                        TextEdit::multiline(&mut self.buffer)
                            .font(font)
                            .text_color(self.settings.text_color)
                            .desired_width(f32::INFINITY),
                    );
                });
            });
    }
}

fn transcription_event(result: Result<Result<String, TranscribeError>, JoinError>) -> Event {
    match result {
        Ok(Ok(text)) if text.trim().is_empty() => {
            Event::OperationFailed("No speech could be recognized.".to_string())
        }
        Ok(Ok(text)) => Event::ReplaceBuffer {
            text,
            status: "Transcription finished.".to_string(),
        },
        Ok(Err(err)) => Event::OperationFailed(format!("Transcription failed: {err}")),
        Err(err) => Event::OperationFailed(format!("Transcription task failed: {err}")),
    }
}

impl eframe::App for ReadScreenApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if ctx.input(|input| input.viewport().close_requested()) {
            if let Err(err) = self.settings.save() {
                error!("failed to save settings on exit: {err:#}");
            }
            shutdown_tasks();
        }

        ctx.update_state(self);

        if let Some(action) = self.hotkeys.as_ref().and_then(HotkeyManager::poll) {
            self.handle_hotkey(ctx, action);
        }

        self.drive_selection(ctx);
        self.show_menu(ctx);
        self.show_status_bar(ctx);
        self.show_text_area(ctx);

        let mut show_settings = self.show_settings;
        self.settings.show(ctx, &mut show_settings);
        self.show_settings = show_settings;

        // Keep polling while hotkeys or a recording are live.
        if self.recorder.is_some() || self.hotkeys.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
