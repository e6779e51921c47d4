pub mod tesseract;

use serde::{Deserialize, Serialize};

/// Recognition parameters persisted with the rest of the settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OcrConfig {
    pub lang: String,
    pub dpi: i32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi: 150,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: OcrConfig = serde_json::from_str(r#"{"lang": "deu"}"#).unwrap();
        assert_eq!(config.lang, "deu");
        assert_eq!(config.dpi, OcrConfig::default().dpi);
    }
}
