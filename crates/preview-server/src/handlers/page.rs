//! Mockup page endpoint.

use std::io;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use preview_renderer::{RenderResult, escape_html};

use crate::error::ServerError;
use crate::metadata::CrateMetadata;
use crate::state::AppState;

const SCRIPT_TAG: &str = r#"<script src="/ws.js" defer></script>"#;

/// Handle GET /.
///
/// The README is read and rendered on every request, so a reload always
/// shows the file as it is on disk.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let markdown = tokio::fs::read_to_string(&state.readme_path)
        .await
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ServerError::ReadmeNotFound(state.readme_path.clone()),
            _ => ServerError::Io(err),
        })?;

    let result = state.renderer.render(&markdown);
    let metadata = CrateMetadata::for_readme(&state.readme_path).await;
    tracing::debug!(
        path = %state.readme_path.display(),
        headings = result.headings.len(),
        "Rendered readme"
    );

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Html(render_page(&metadata, &result, state.hot_reload_enabled())),
    ))
}

/// Fill the page template.
pub(crate) fn render_page(
    metadata: &CrateMetadata,
    readme: &RenderResult,
    hot_reload: bool,
) -> String {
    let name = metadata
        .name
        .as_deref()
        .or(readme.title.as_deref())
        .unwrap_or("crate");
    let repository = metadata.repository.as_deref().map_or_else(
        || "None".to_owned(),
        |url| {
            let url = escape_html(url);
            format!(r#"<a href="{url}">{url}</a>"#)
        },
    );

    fill(
        preview_assets::PAGE_TEMPLATE,
        &[
            ("crate_name", escape_html(name)),
            (
                "crate_version",
                escape_html(metadata.version.as_deref().unwrap_or("0.0.0")),
            ),
            (
                "crate_description",
                escape_html(metadata.description.as_deref().unwrap_or_default()),
            ),
            (
                "crate_license",
                escape_html(metadata.license.as_deref().unwrap_or("Unknown")),
            ),
            ("crate_repository", repository),
            ("readme", readme.html.clone()),
            (
                "hot_reload_script",
                if hot_reload { SCRIPT_TAG } else { "" }.to_owned(),
            ),
        ],
    )
}

/// Replace `{name}` placeholders in one pass.
///
/// Substituted values are never rescanned, so README text that happens to
/// contain a placeholder stays as written.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (value, end))
        });

        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
