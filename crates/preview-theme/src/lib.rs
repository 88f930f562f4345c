//! Design-token theme documents for the preview page.
//!
//! A theme document has the shape consumed by CSS utility-framework build
//! tools:
//!
//! - `content`: glob patterns of files the build tool scans
//! - `theme.extend`: design-token categories mapped to overridden values
//! - `plugins`: ordered plugin references
//!
//! Two variants ship with the crate and are kept as separate documents:
//! [`ThemeVariant::Crates`] carries the full crates.io token set, while
//! [`ThemeVariant::Readme`] only overrides font families.
//!
//! # Example
//!
//! ```
//! use preview_theme::ThemeVariant;
//!
//! let doc = ThemeVariant::Crates.document().unwrap();
//! assert_eq!(doc.plugins, vec!["@tailwindcss/forms".to_owned()]);
//!
//! let css = doc.to_css();
//! assert!(css.contains(".max-w-960 { max-width: 960px; }"));
//! ```

mod css;
mod document;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use document::{DEFAULT_STACK_MARKER, Theme, ThemeDocument, TokenGroup, TokenValue};

/// Theme error.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("Theme parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// No bundled theme has the requested name.
    #[error("Unknown theme variant: {0} (expected one of: crates, readme)")]
    UnknownVariant(String),
}

/// Bundled theme documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    /// crates.io crate page tokens (fonts, sizing, spacing, grid templates).
    #[default]
    Crates,
    /// Font family override only.
    Readme,
}

impl ThemeVariant {
    /// All bundled variants.
    pub const ALL: [Self; 2] = [Self::Crates, Self::Readme];

    /// Variant name as used in config files and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Crates => "crates",
            Self::Readme => "readme",
        }
    }

    /// Raw JSON source of the bundled document.
    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::Crates => include_str!("../themes/crates.json"),
            Self::Readme => include_str!("../themes/readme.json"),
        }
    }

    /// Parse the bundled document.
    pub fn document(self) -> Result<ThemeDocument, ThemeError> {
        ThemeDocument::from_json(self.source())
    }
}

impl fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThemeVariant {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ThemeError::UnknownVariant(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bundled_variant_parses() {
        for variant in ThemeVariant::ALL {
            let doc = variant.document().unwrap();
            assert_eq!(doc.content, vec!["./src/**/*.{html,js}".to_owned()]);
            assert!(doc.theme.extend.contains_key("fontFamily"));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("crates".parse::<ThemeVariant>().unwrap(), ThemeVariant::Crates);
        assert_eq!(" Readme ".parse::<ThemeVariant>().unwrap(), ThemeVariant::Readme);

        let err = "docs".parse::<ThemeVariant>().unwrap_err();
        assert!(matches!(err, ThemeError::UnknownVariant(ref name) if name == "docs"));
    }

    #[test]
    fn test_variants_are_not_merged() {
        let crates = ThemeVariant::Crates.document().unwrap();
        let readme = ThemeVariant::Readme.document().unwrap();

        assert!(crates.theme.extend.contains_key("gridTemplateColumns"));
        assert!(!readme.theme.extend.contains_key("gridTemplateColumns"));
        assert_eq!(readme.plugins, vec!["@tailwindcss/typography".to_owned()]);
    }

    #[test]
    fn test_deserialize_variant_lowercase() {
        let variant: ThemeVariant = serde_json::from_str("\"readme\"").unwrap();
        assert_eq!(variant, ThemeVariant::Readme);
        assert_eq!(variant.to_string(), "readme");
    }
}
