//! Crate metadata for the mockup page header and sidebar.

use std::path::Path;

use toml::Table;

/// Package fields shown on the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CrateMetadata {
    pub(crate) name: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) license: Option<String>,
    pub(crate) repository: Option<String>,
}

impl CrateMetadata {
    /// Read the `Cargo.toml` next to the README.
    ///
    /// A missing or unreadable manifest yields empty metadata; the page then
    /// falls back to placeholders.
    pub(crate) async fn for_readme(readme: &Path) -> Self {
        let manifest = readme
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("Cargo.toml");

        let Ok(content) = tokio::fs::read_to_string(&manifest).await else {
            return Self::default();
        };

        Self::from_manifest(&content).unwrap_or_else(|| {
            tracing::warn!(path = %manifest.display(), "Ignoring unparsable Cargo.toml");
            Self::default()
        })
    }

    /// Extract package fields from manifest text.
    ///
    /// Fields inherited from the workspace (`version.workspace = true`) are
    /// not strings and stay empty.
    pub(crate) fn from_manifest(content: &str) -> Option<Self> {
        let manifest: Table = content.parse().ok()?;
        let Some(package) = manifest.get("package").and_then(toml::Value::as_table) else {
            return Some(Self::default());
        };

        let field = |key: &str| {
            package
                .get(key)
                .and_then(toml::Value::as_str)
                .map(str::to_owned)
        };

        Some(Self {
            name: field("name"),
            version: field("version"),
            description: field("description"),
            license: field("license"),
            repository: field("repository"),
        })
    }
}
