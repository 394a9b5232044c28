//! Configuration options for Markdown export

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error raised when export settings cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown export option: {0}")]
    UnknownKey(String),

    #[error("invalid value {value:?} for export option {key}")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Marker used for unordered list items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BulletMarker {
    #[default]
    #[serde(rename = "-")]
    Dash,
    #[serde(rename = "*")]
    Star,
    #[serde(rename = "+")]
    Plus,
}

impl BulletMarker {
    pub fn as_char(self) -> char {
        match self {
            BulletMarker::Dash => '-',
            BulletMarker::Star => '*',
            BulletMarker::Plus => '+',
        }
    }
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inline,
    /// Use reference links [text][text]; no definitions section is written
    Reference,
}

impl FromStr for HeadingStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atx" => Ok(HeadingStyle::Atx),
            "setext" => Ok(HeadingStyle::Setext),
            _ => Err(ConfigError::invalid("headingStyle", s)),
        }
    }
}

impl FromStr for BulletMarker {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "-" => Ok(BulletMarker::Dash),
            "*" => Ok(BulletMarker::Star),
            "+" => Ok(BulletMarker::Plus),
            _ => Err(ConfigError::invalid("bulletListMarker", s)),
        }
    }
}

impl FromStr for CodeBlockStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fenced" => Ok(CodeBlockStyle::Fenced),
            "indented" => Ok(CodeBlockStyle::Indented),
            _ => Err(ConfigError::invalid("codeBlockStyle", s)),
        }
    }
}

impl FromStr for LinkStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "inlined" => Ok(LinkStyle::Inline),
            "reference" | "referenced" => Ok(LinkStyle::Reference),
            _ => Err(ConfigError::invalid("linkStyle", s)),
        }
    }
}

impl fmt::Display for HeadingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeadingStyle::Atx => "atx",
            HeadingStyle::Setext => "setext",
        })
    }
}

impl fmt::Display for BulletMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl fmt::Display for CodeBlockStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodeBlockStyle::Fenced => "fenced",
            CodeBlockStyle::Indented => "indented",
        })
    }
}

impl fmt::Display for LinkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkStyle::Inline => "inline",
            LinkStyle::Reference => "reference",
        })
    }
}

/// Options for Markdown export.
///
/// Deserializes from camelCase keys (`headingStyle`, `bulletListMarker`,
/// `codeBlockStyle`, `linkStyle`); missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Bullet list marker
    pub bullet_list_marker: BulletMarker,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Link style
    pub link_style: LinkStyle,
}

impl ExportConfig {
    /// Apply string settings over the defaults.
    ///
    /// Keys may be camelCase (`headingStyle`) or snake_case (`heading_style`).
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            config.set(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    /// Set a single option from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "headingStyle" | "heading_style" => self.heading_style = value.parse()?,
            "bulletListMarker" | "bullet_list_marker" => {
                self.bullet_list_marker = value.parse()?
            }
            "codeBlockStyle" | "code_block_style" => self.code_block_style = value.parse()?,
            "linkStyle" | "link_style" => self.link_style = value.parse()?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn with_heading_style(mut self, style: HeadingStyle) -> Self {
        self.heading_style = style;
        self
    }

    pub fn with_bullet_list_marker(mut self, marker: BulletMarker) -> Self {
        self.bullet_list_marker = marker;
        self
    }

    pub fn with_code_block_style(mut self, style: CodeBlockStyle) -> Self {
        self.code_block_style = style;
        self
    }

    pub fn with_link_style(mut self, style: LinkStyle) -> Self {
        self.link_style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.heading_style, HeadingStyle::Atx);
        assert_eq!(config.bullet_list_marker, BulletMarker::Dash);
        assert_eq!(config.code_block_style, CodeBlockStyle::Fenced);
        assert_eq!(config.link_style, LinkStyle::Inline);
    }

    #[test]
    fn test_from_pairs() {
        let config = ExportConfig::from_pairs([
            ("headingStyle", "setext"),
            ("bullet_list_marker", "*"),
            ("codeBlockStyle", "Indented"),
        ])
        .unwrap();

        assert_eq!(config.heading_style, HeadingStyle::Setext);
        assert_eq!(config.bullet_list_marker, BulletMarker::Star);
        assert_eq!(config.code_block_style, CodeBlockStyle::Indented);
        assert_eq!(config.link_style, LinkStyle::Inline);
    }

    #[test]
    fn test_from_pairs_rejects_unknown_key() {
        let err = ExportConfig::from_pairs([("fence", "~~~")]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownKey("fence".to_string()));
    }

    #[test]
    fn test_invalid_bullet_marker() {
        let err = "#".parse::<BulletMarker>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "bulletListMarker".to_string(),
                value: "#".to_string(),
            }
        );
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        let style = LinkStyle::Reference;
        assert_eq!(style.to_string().parse::<LinkStyle>().unwrap(), style);
        assert_eq!(BulletMarker::Plus.to_string(), "+");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"headingStyle":"setext","bulletListMarker":"+"}"#).unwrap();
        assert_eq!(config.heading_style, HeadingStyle::Setext);
        assert_eq!(config.bullet_list_marker, BulletMarker::Plus);
        assert_eq!(config.code_block_style, CodeBlockStyle::Fenced);
    }

    #[test]
    fn test_serialize() {
        let config = ExportConfig::default().with_link_style(LinkStyle::Reference);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"headingStyle":"atx","bulletListMarker":"-","codeBlockStyle":"fenced","linkStyle":"reference"}"#
        );
    }
}
