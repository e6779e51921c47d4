use std::io;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use log::info;
use regex::Regex;
use thiserror::Error;

use crate::speech::recorder::{Recording, write_wav};

/// External recognizer binary, expected on PATH (whisper.cpp CLI).
const RECOGNIZER_BIN: &str = "whisper-cli";

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("speech recognizer `{RECOGNIZER_BIN}` not found; install it or put it on PATH")]
    RecognizerUnavailable,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub fn transcribe_file(path: &Path) -> Result<String, TranscribeError> {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if !is_wav {
        return Err(anyhow!("only wav files are supported for transcription").into());
    }
    let raw = run_recognizer(path)?;
    Ok(tidy_transcript(&raw))
}

/// Spools the recording to a temporary wav, transcribes it, cleans up.
pub fn transcribe_recording(recording: &Recording) -> Result<String, TranscribeError> {
    let wav_path = std::env::temp_dir().join(format!("readscreen-{}.wav", std::process::id()));
    write_wav(&wav_path, recording).map_err(TranscribeError::Other)?;
    let result = run_recognizer(&wav_path).map(|raw| tidy_transcript(&raw));
    let _ = std::fs::remove_file(&wav_path);
    result
}

fn run_recognizer(path: &Path) -> Result<String, TranscribeError> {
    info!("transcribing {}", path.display());
    let output = Command::new(RECOGNIZER_BIN)
        .args(["--no-timestamps", "--no-prints", "-f"])
        .arg(path)
        .output()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => TranscribeError::RecognizerUnavailable,
            _ => TranscribeError::Other(err.into()),
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "recognizer exited with {}: {}",
            output.status,
            stderr.trim()
        )
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());
static PUNCT_THEN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,!?;:])([^\s])").unwrap());
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*\.\s*(\d+)").unwrap());
static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*:\s*(\d+)").unwrap());
static NUMBER_RANGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])\s+([A-Z])").unwrap());

/// Normalizes raw recognizer output: punctuation spacing, re-joined decimals,
/// times and number ranges, one sentence per line.
pub fn tidy_transcript(raw: &str) -> String {
    let text = SPACE_BEFORE_PUNCT.replace_all(raw, "${1}");
    let text = PUNCT_THEN_TEXT.replace_all(&text, "${1} ${2}");
    let text = DECIMAL.replace_all(&text, "${1}.${2}");
    let text = CLOCK_TIME.replace_all(&text, "${1}:${2}");
    let text = NUMBER_RANGE.replace_all(&text, "${1}-${2}");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = SENTENCE_BREAK.replace_all(&text, "${1}\n${2}");
    text.trim().to_string()
}
