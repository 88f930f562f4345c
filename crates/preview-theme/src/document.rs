//! Theme document model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ThemeError;

/// Font stack entry standing for the framework's default stack of the same family.
pub const DEFAULT_STACK_MARKER: &str = "@default";

/// A theme configuration document.
///
/// Pure data: nothing here checks token names or values. Missing keys
/// deserialize to empty collections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDocument {
    /// Glob patterns of files to scan for class names.
    pub content: Vec<String>,
    /// Theme customization.
    pub theme: Theme,
    /// Plugin references, in load order.
    pub plugins: Vec<String>,
}

/// The `theme` section of a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Token categories (e.g. `fontFamily`, `maxWidth`) extending the defaults.
    pub extend: BTreeMap<String, TokenGroup>,
}

/// Token names mapped to values within one category.
pub type TokenGroup = BTreeMap<String, TokenValue>;

/// A design-token value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Single CSS value (`"960px"`).
    Single(String),
    /// Ordered list of values, used for font stacks.
    Stack(Vec<String>),
}

impl ThemeDocument {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ThemeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a token by category and name.
    #[must_use]
    pub fn token(&self, category: &str, name: &str) -> Option<&TokenValue> {
        self.theme.extend.get(category)?.get(name)
    }
}
