use std::fs;

use anyhow::{Context as _, Result};
use egui::{Color32, ComboBox, Context, FontFamily, Slider, Ui};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::ocr::OcrConfig;
use crate::ocr::tesseract::available_languages;
use crate::speech::{MAX_WPM, MIN_WPM};

pub const SETTINGS_FILE: &str = "text_settings.json";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontChoice {
    #[default]
    Proportional,
    Monospace,
}

impl FontChoice {
    pub fn family(self) -> FontFamily {
        match self {
            FontChoice::Proportional => FontFamily::Proportional,
            FontChoice::Monospace => FontFamily::Monospace,
        }
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumIter,
)]
pub enum WrapMode {
    #[default]
    Word,
    None,
}

/// Flat settings file. Every field has a default, so a partial or missing
/// file never blocks startup.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    pub font_family: FontChoice,
    pub font_size: f32,
    pub wrap: WrapMode,
    pub text_color: Color32,
    pub bg_color: Color32,
    /// Speaking rate in words per minute.
    pub speech_rate: f32,
    pub ocr: OcrConfig,
    #[serde(skip)]
    pub langs: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            font_family: FontChoice::default(),
            font_size: 14.0,
            wrap: WrapMode::default(),
            text_color: Color32::BLACK,
            bg_color: Color32::WHITE,
            speech_rate: 150.0,
            ocr: OcrConfig::default(),
            langs: Vec::new(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        let mut settings = match fs::read_to_string(SETTINGS_FILE) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => {
                    info!("settings loaded from {SETTINGS_FILE}");
                    settings
                }
                Err(err) => {
                    warn!("settings file is malformed, using defaults: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no settings file, using defaults");
                Self::default()
            }
        };
        settings.langs = available_languages();
        settings
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(SETTINGS_FILE, json).with_context(|| format!("failed to write {SETTINGS_FILE}"))
    }

    pub fn show(&mut self, ctx: &Context, open: &mut bool) {
        egui::Window::new("Settings")
            .open(open)
            .resizable(false)
            .show(ctx, |ui| {
                self.show_text_config(ui);
                ui.separator();
                self.show_speech_config(ui);
                ui.separator();
                self.show_ocr_config(ui);
                ui.separator();
                if ui.button("Save").clicked()
                    && let Err(err) = self.save()
                {
                    log::error!("failed to save settings: {err:#}");
                }
            });
    }

    fn show_text_config(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Font:");
            ui.selectable_value(
                &mut self.font_family,
                FontChoice::Proportional,
                "Proportional",
            );
            ui.selectable_value(&mut self.font_family, FontChoice::Monospace, "Monospace");
        });
        ui.add(Slider::new(&mut self.font_size, 8.0..=32.0).text("Font Size"));
        ui.horizontal(|ui| {
            ui.label("Wrap:");
            for mode in WrapMode::iter() {
                ui.selectable_value(&mut self.wrap, mode, mode.to_string());
            }
        });
        ui.horizontal(|ui| {
            ui.label("Text Color:");
            ui.color_edit_button_srgba(&mut self.text_color);
            ui.label("Background:");
            ui.color_edit_button_srgba(&mut self.bg_color);
        });
    }

    fn show_speech_config(&mut self, ui: &mut Ui) {
        ui.add(Slider::new(&mut self.speech_rate, MIN_WPM..=MAX_WPM).text("Words per Minute"));
    }

    fn show_ocr_config(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Language:");
            ComboBox::from_id_salt("ocr_lang")
                .selected_text(self.ocr.lang.clone())
                .show_ui(ui, |ui| {
                    for lang in &self.langs {
                        ui.selectable_value(&mut self.ocr.lang, lang.clone(), lang);
                    }
                });
        });
        ui.add(Slider::new(&mut self.ocr.dpi, 70..=300).text("DPI"));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = AppSettings::default();
        assert_eq!(settings.font_family, FontChoice::Proportional);
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.wrap, WrapMode::Word);
        assert_eq!(settings.text_color, Color32::BLACK);
        assert_eq!(settings.bg_color, Color32::WHITE);
        assert_eq!(settings.speech_rate, 150.0);
    }

    #[test]
    fn partial_file_merges_key_by_key() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"font_size": 20.0, "wrap": "None"}"#).unwrap();
        assert_eq!(settings.font_size, 20.0);
        assert_eq!(settings.wrap, WrapMode::None);
        // Untouched keys keep their defaults.
        assert_eq!(settings.bg_color, Color32::WHITE);
        assert_eq!(settings.ocr, OcrConfig::default());
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = AppSettings::default();
        settings.font_size = 18.0;
        settings.ocr.lang = "jpn".to_string();

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.font_size, 18.0);
        assert_eq!(parsed.ocr.lang, "jpn");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"font_style": "normal", "font_weight": "bold"}"#).unwrap();
        assert_eq!(settings.font_size, AppSettings::default().font_size);
    }
}
