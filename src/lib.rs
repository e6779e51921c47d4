#![warn(clippy::all, rust_2018_idioms)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::module_name_repetitions
)]

pub use ui::app::ReadScreenApp;

pub mod capture;
pub mod cleanup;
pub mod document;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod selection;
pub mod settings;
pub mod speech;
pub mod tasks;
pub mod ui;
