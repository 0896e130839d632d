//! Tool configuration: the directory roots of the pipeline and the target
//! disk image, loaded from a JSON file.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Original compressed scripts.
    #[serde(rename = "jpCC")]
    pub jp_cc: String,
    /// Rebuilt compressed scripts.
    #[serde(rename = "enCC")]
    pub en_cc: String,
    /// Decompressed originals.
    #[serde(rename = "decompressJPCC")]
    pub decompress_jp_cc: String,
    /// Decompressed scripts with translations injected.
    #[serde(rename = "decompressENCC")]
    pub decompress_en_cc: String,
    /// Extracted translator text.
    #[serde(rename = "jpTXT")]
    pub jp_txt: String,
    /// Translated text to inject.
    #[serde(rename = "enTXT")]
    pub en_txt: String,
    /// The disk image receiving the rebuilt scripts.
    #[serde(rename = "hdiFile")]
    pub hdi_file: String,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let data = crate::utils::files::read_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[test]
fn test_parse_config() {
    let json = r#"{
        "jpCC": "work/jpCC",
        "enCC": "work/enCC",
        "decompressJPCC": "work/decompressJPCC",
        "decompressENCC": "work/decompressENCC",
        "jpTXT": "work/jpTXT",
        "enTXT": "work/enTXT",
        "hdiFile": "work/game.hdi"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.jp_cc, "work/jpCC");
    assert_eq!(config.hdi_file, "work/game.hdi");
}
