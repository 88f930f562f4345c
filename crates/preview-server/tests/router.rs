//! Route tests driven through the router without a listener.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use pretty_assertions::assert_eq;
use preview_server::{PreviewServer, ServerConfig};
use preview_theme::ThemeVariant;
use tempfile::TempDir;
use tower::ServiceExt;

const README: &str = "\
# Demo

A *tiny* crate.

## Usage

```rust,no_run
demo::run();
```
";

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("README.md"), README).unwrap();
    std::fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.4.2\"\nlicense = \"MIT\"\n",
    )
    .unwrap();
    dir
}

async fn server(dir: &TempDir, configure: impl FnOnce(&mut ServerConfig)) -> PreviewServer {
    let mut config = ServerConfig {
        readme_path: dir.path().join("README.md"),
        port: 0,
        ..ServerConfig::default()
    };
    configure(&mut config);
    PreviewServer::bind(config).await.unwrap()
}

async fn get(server: &PreviewServer, path: &str) -> Response {
    server
        .router()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_page_contains_rendered_readme() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    let response = get(&server, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );

    let html = body_text(response).await;
    assert!(html.contains("<em>tiny</em>"));
    assert!(html.contains(r#"id="user-content-usage""#));
    assert!(html.contains(r#"class="language-rust""#));
    assert!(html.contains("<title>demo - crates.io (mockup)</title>"));
    assert!(html.contains("0.4.2"));
    assert!(html.contains(r#"<script src="/ws.js" defer></script>"#));
}

#[tokio::test]
async fn test_page_reflects_readme_on_disk() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    std::fs::write(dir.path().join("README.md"), "# Demo\n\nRewritten.").unwrap();

    let html = body_text(get(&server, "/").await).await;
    assert!(html.contains("Rewritten."));
    assert!(!html.contains("<em>tiny</em>"));
}

#[tokio::test]
async fn test_page_after_readme_removed() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    std::fs::remove_file(dir.path().join("README.md")).unwrap();

    let response = get(&server, "/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["error"], "Readme not found");
}

#[tokio::test]
async fn test_script_has_substituted_endpoint() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;
    let port = server.local_addr().port();

    let response = get(&server, "/ws.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/javascript; charset=utf-8"
    );

    let js = body_text(response).await;
    assert!(js.contains(&format!(r#""ws://127.0.0.1:{port}/ws""#)));
    assert!(js.contains(r#""hot_reload""#));
    assert!(js.contains(r#""Hot reloading readme""#));
    assert!(js.contains("retry_delay_ms: 5000"));
}

#[tokio::test]
async fn test_script_uses_tunnel_port_for_public_host() {
    let dir = fixture();
    let server = server(&dir, |config| {
        config.public_host = Some("abc123.ngrok.io".to_owned());
    })
    .await;

    let js = body_text(get(&server, "/ws.js").await).await;
    assert!(js.contains(r#""ws://abc123.ngrok.io:80/ws""#));
}

#[tokio::test]
async fn test_without_hot_reload() {
    let dir = fixture();
    let server = server(&dir, |config| config.hot_reload_enabled = false).await;
    assert!(server.reload_handle().is_none());

    let html = body_text(get(&server, "/").await).await;
    assert!(!html.contains("/ws.js"));

    let response = get(&server, "/ws.js").await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
}

#[tokio::test]
async fn test_unknown_path_redirects_home() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    for path in ["/crates/demo", "/index.html", "/api/v1/crates"] {
        let response = get(&server, path).await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT, "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}

#[tokio::test]
async fn test_static_assets() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    let response = get(&server, "/favicon.svg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");

    let response = get(&server, "/preview.css").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_theme_css_and_json() {
    let dir = fixture();
    let server = server(&dir, |config| config.theme = ThemeVariant::Crates).await;

    let response = get(&server, "/theme.css").await;
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/css; charset=utf-8"
    );
    let css = body_text(response).await;
    assert!(css.contains("--font-sans"));
    assert!(css.contains(".max-w-960"));

    let json: serde_json::Value =
        serde_json::from_str(&body_text(get(&server, "/theme.json").await).await).unwrap();
    assert_eq!(json["plugins"], serde_json::json!(["@tailwindcss/forms"]));
}

#[tokio::test]
async fn test_readme_theme_variant() {
    let dir = fixture();
    let server = server(&dir, |config| config.theme = ThemeVariant::Readme).await;

    let json: serde_json::Value =
        serde_json::from_str(&body_text(get(&server, "/theme.json").await).await).unwrap();
    assert_eq!(json["plugins"], serde_json::json!(["@tailwindcss/typography"]));
}

#[tokio::test]
async fn test_security_headers() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    for path in ["/", "/ws.js", "/missing"] {
        let response = get(&server, path).await;
        let headers = response.headers();
        assert!(headers.contains_key("content-security-policy"), "{path}");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
    }
}

#[tokio::test]
async fn test_cache_control() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    let page = get(&server, "/").await;
    assert_eq!(page.headers()[header::CACHE_CONTROL], "no-store");

    let css = get(&server, "/theme.css").await;
    assert_eq!(css.headers()[header::CACHE_CONTROL], "no-cache");
}

#[tokio::test]
async fn test_code_is_highlighted() {
    let dir = fixture();
    let server = server(&dir, |_| {}).await;

    let html = body_text(get(&server, "/").await).await;
    assert!(html.contains(r#"<link rel="stylesheet" href="/highlight.css">"#));
    assert!(html.contains(r#"<span class="hl-"#));

    let response = get(&server, "/highlight.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/css; charset=utf-8"
    );
    assert!(body_text(response).await.contains(".hl-"));
}

#[tokio::test]
async fn test_readme_html_is_sanitized() {
    let dir = fixture();
    std::fs::write(
        dir.path().join("README.md"),
        "# Demo\n\n<style>body{display:none}</style>\n\n<img src=\"logo.png\" onerror=\"alert(1)\">\n",
    )
    .unwrap();
    let server = server(&dir, |_| {}).await;

    let html = body_text(get(&server, "/").await).await;
    assert!(!html.contains("display:none"));
    assert!(!html.contains("onerror"));
    assert!(html.contains(r#"<img src="logo.png">"#));
}
