//! Hot reload over a real listener.

use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use preview_reload::{ClientOptions, Endpoint};
use preview_server::{PreviewServer, ReloadEvent, ServerConfig};
use tempfile::TempDir;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;

const WAIT: Duration = Duration::from_secs(5);

/// Bind a server for a fresh README and serve it in the background.
async fn spawn_server() -> (TempDir, u16, preview_server::ReloadHandle, oneshot::Sender<()>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("README.md"), "# Demo").unwrap();

    let server = PreviewServer::bind(ServerConfig {
        readme_path: dir.path().join("README.md"),
        port: 0,
        ..ServerConfig::default()
    })
    .await
    .unwrap();

    let port = server.local_addr().port();
    let handle = server.reload_handle().unwrap().clone();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(server.serve(async {
        let _ = stop_rx.await;
    }));

    (dir, port, handle, stop_tx)
}

#[tokio::test]
async fn test_triggered_reload_reaches_client() {
    let (_dir, port, handle, _stop) = spawn_server().await;

    let mut request = format!("ws://127.0.0.1:{port}/ws")
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("hot_reload"));
    let (mut socket, response) = connect_async(request).await.unwrap();
    assert_eq!(response.headers()[SEC_WEBSOCKET_PROTOCOL], "hot_reload");

    let mut clients = handle.clients();
    tokio::time::timeout(WAIT, clients.wait_for(|n| *n == 1))
        .await
        .unwrap()
        .unwrap();

    handle.trigger();

    let message = tokio::time::timeout(WAIT, socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let Message::Text(text) = message else {
        panic!("expected a text message, got {message:?}");
    };
    let event: ReloadEvent = serde_json::from_str(&text).unwrap();
    assert_eq!(event.event_type, "reload");
    assert_eq!(event.path, "README.md");
    assert_eq!(event.count, 1);
}

#[tokio::test]
async fn test_readme_edit_reaches_client() {
    let (dir, port, handle, _stop) = spawn_server().await;

    let mut request = format!("ws://127.0.0.1:{port}/ws")
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("hot_reload"));
    let (mut socket, _) = connect_async(request).await.unwrap();

    std::fs::write(dir.path().join("README.md"), "# Demo\n\nEdited.").unwrap();

    let message = tokio::time::timeout(WAIT, socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(message.is_text());
    assert!(handle.count() >= 1);
}

#[tokio::test]
async fn test_native_client_reloads_on_trigger() {
    let (_dir, port, handle, _stop) = spawn_server().await;
    let (reload_tx, mut reloads) = mpsc::unbounded_channel();
    let (client_stop_tx, client_stop_rx) = oneshot::channel::<()>();

    let client = tokio::spawn(async move {
        let mut target = move || {
            let _ = reload_tx.send(());
        };
        preview_reload::run(
            &Endpoint::new("127.0.0.1", port),
            ClientOptions::default(),
            &mut target,
            async {
                let _ = client_stop_rx.await;
            },
        )
        .await
    });

    let mut clients = handle.clients();
    tokio::time::timeout(WAIT, clients.wait_for(|n| *n == 1))
        .await
        .unwrap()
        .unwrap();
    handle.trigger();

    tokio::time::timeout(WAIT, reloads.recv())
        .await
        .unwrap()
        .unwrap();

    client_stop_tx.send(()).unwrap();
    client.await.unwrap().unwrap();
}
