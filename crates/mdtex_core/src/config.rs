use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::metadata::Metadata;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub document: DocumentConfig,
    pub links: LinksConfig,
    pub figures: FiguresConfig,
    pub listings: ListingsConfig,
    pub math: MathConfig,
    pub pdf: PdfConfig,
    /// Metadata applied when a document does not set the key itself.
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DocumentConfig {
    pub class: String,
    pub font_size: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            class: "article".to_string(),
            font_size: Some("11pt".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LinksConfig {
    pub color: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FiguresConfig {
    pub width: String,
    pub placement: String,
}

impl Default for FiguresConfig {
    fn default() -> Self {
        Self {
            width: "0.8\\textwidth".to_string(),
            placement: "H".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListingsConfig {
    pub frame: String,
    pub basic_style: String,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            frame: "single".to_string(),
            basic_style: "\\ttfamily\\small".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MathConfig {
    pub mode: MathMode,
}

/// How inline and block math content is emitted.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MathMode {
    /// Content is already LaTeX and is wrapped in math delimiters as-is.
    #[default]
    Literal,
    /// Content is ASCII math notation and goes through a translator.
    #[serde(alias = "asciimath", alias = "ascii-notation")]
    Ascii,
}

impl MathMode {
    /// Parse a metadata value. Unknown values yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "literal" => Some(MathMode::Literal),
            "ascii" | "asciimath" | "ascii-notation" => Some(MathMode::Ascii),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PdfConfig {
    pub command: String,
    pub passes: u32,
    /// Remove `.aux`, `.log`, `.out` and `.toc` files after compiling.
    pub clean_aux: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            command: "pdflatex".to_string(),
            passes: 2,
            clean_aux: true,
        }
    }
}

impl Config {
    /// The configuration bundled with the crate.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::compiled_default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                Self::compiled_default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_default_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("bundled config parses");
        assert_eq!(config.document.class, "article");
        assert_eq!(config.document.font_size.as_deref(), Some("11pt"));
        assert_eq!(config.figures.width, "0.8\\textwidth");
        assert_eq!(config.math.mode, MathMode::Literal);
        assert_eq!(config.pdf.command, "pdflatex");
        assert_eq!(config.pdf.passes, 2);
        assert!(config.metadata.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            "[links]\ncolor = \"red\"\n[math]\nmode = \"asciimath\"\n[metadata]\nauthor = \"Docs Team\"\n",
        )
        .expect("valid toml");
        assert_eq!(config.links.color, "red");
        assert_eq!(config.math.mode, MathMode::Ascii);
        assert_eq!(config.metadata.author(), "Docs Team");
        assert_eq!(config.listings.frame, "single");
        assert!(config.pdf.clean_aux);
    }

    #[test]
    fn invalid_math_mode_is_an_error() {
        assert!(Config::from_toml("[math]\nmode = \"tex\"\n").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let config = Config::load(Path::new("/definitely/not/here/mdtex.toml"));
        assert_eq!(config.links.color, "blue");
    }

    #[test]
    fn math_mode_names() {
        assert_eq!(MathMode::from_name("ASCII"), Some(MathMode::Ascii));
        assert_eq!(MathMode::from_name(" ascii-notation "), Some(MathMode::Ascii));
        assert_eq!(MathMode::from_name("literal"), Some(MathMode::Literal));
        assert_eq!(MathMode::from_name("mathml"), None);
    }
}
