//! Native hot reload driver.
//!
//! Runs [`HotReloader`] against a live server with tokio-tungstenite sockets
//! and tokio timers. One socket and one timer exist at a time.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::time::Sleep;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::client::{ClientEvent, ClientOptions, Command, HotReloader, TimerId};
use crate::protocol::{Endpoint, SUBPROTOCOL};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receiver of reload requests.
pub trait ReloadTarget {
    /// Reload the watched resource.
    fn reload(&mut self);
}

impl<F: FnMut()> ReloadTarget for F {
    fn reload(&mut self) {
        self();
    }
}

/// Driver error.
///
/// Connection failures are not errors: they feed the retry loop.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The endpoint does not form a valid WebSocket request.
    #[error("Invalid hot reload endpoint {url}: {source}")]
    InvalidEndpoint {
        /// Endpoint URL.
        url: String,
        /// Underlying error.
        #[source]
        source: tungstenite::Error,
    },
}

fn handshake_request(endpoint: &Endpoint) -> Result<Request, ClientError> {
    let url = endpoint.url();
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|source| ClientError::InvalidEndpoint {
            url: url.clone(),
            source,
        })?;
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    Ok(request)
}

/// Run the hot reload client until `shutdown` completes.
///
/// A reload restarts the session the way a page load restarts the browser
/// script: the next connection is a first attempt again.
pub async fn run<T, S>(
    endpoint: &Endpoint,
    options: ClientOptions,
    target: &mut T,
    shutdown: S,
) -> Result<(), ClientError>
where
    T: ReloadTarget + ?Sized,
    S: Future<Output = ()>,
{
    // Surface a malformed endpoint before entering the retry loop.
    handshake_request(endpoint)?;

    let mut machine = HotReloader::new(options.clone());
    let mut commands: VecDeque<Command> = machine.init().into();
    let mut socket: Option<Socket> = None;
    let mut retry: Option<(TimerId, Pin<Box<Sleep>>)> = None;
    tokio::pin!(shutdown);

    loop {
        while let Some(command) = commands.pop_front() {
            match command {
                Command::Connect { expect_reload } => {
                    tracing::debug!(%endpoint, expect_reload, "Connecting");
                    let request = handshake_request(endpoint)?;
                    let attempt = tokio::select! {
                        () = &mut shutdown => return Ok(()),
                        attempt = connect_async(request) => attempt,
                    };
                    let event = match attempt {
                        Ok((ws, _response)) => {
                            socket = Some(ws);
                            ClientEvent::Opened
                        }
                        Err(err) => {
                            tracing::debug!(error = %err, "Connection attempt failed");
                            ClientEvent::Closed
                        }
                    };
                    commands.extend(machine.handle(event));
                }
                Command::ScheduleRetry { timer, delay } => {
                    retry = Some((timer, Box::pin(tokio::time::sleep(delay))));
                }
                Command::CancelRetry { timer } => {
                    if retry.as_ref().is_some_and(|(pending, _)| *pending == timer) {
                        retry = None;
                    }
                }
                Command::Close { code, reason } => {
                    if let Some(mut ws) = socket.take() {
                        let frame = CloseFrame {
                            code: CloseCode::from(code),
                            reason: reason.into(),
                        };
                        if let Err(err) = ws.close(Some(frame)).await {
                            tracing::debug!(error = %err, "Close handshake failed");
                        }
                    }
                }
                Command::Reload => {
                    tracing::info!(%endpoint, "Reloading");
                    target.reload();

                    if let Some(mut ws) = socket.take() {
                        let _ = ws.close(None).await;
                    }
                    retry = None;
                    commands.clear();
                    machine = HotReloader::new(options.clone());
                    commands.extend(machine.init());
                }
            }
        }

        let event = tokio::select! {
            () = &mut shutdown => break,
            event = next_socket_event(&mut socket) => event,
            timer = retry_fired(&mut retry) => ClientEvent::RetryFired(timer),
        };
        if event == ClientEvent::Closed {
            socket = None;
        }
        commands.extend(machine.handle(event));
    }

    if let Some(mut ws) = socket.take() {
        let _ = ws.close(None).await;
    }
    Ok(())
}

/// Wait for the next message or closure on the open socket.
async fn next_socket_event(socket: &mut Option<Socket>) -> ClientEvent {
    let Some(ws) = socket.as_mut() else {
        return std::future::pending().await;
    };

    loop {
        match ws.next().await {
            Some(Ok(Message::Text(_) | Message::Binary(_))) => return ClientEvent::Message,
            Some(Ok(Message::Close(_))) | None => return ClientEvent::Closed,
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                tracing::debug!(error = %err, "Socket error");
                return ClientEvent::Closed;
            }
        }
    }
}

/// Wait for the pending retry timer and clear it.
async fn retry_fired(retry: &mut Option<(TimerId, Pin<Box<Sleep>>)>) -> TimerId {
    let Some((timer, sleep)) = retry.as_mut() else {
        return std::future::pending().await;
    };
    sleep.as_mut().await;
    let timer = *timer;
    *retry = None;
    timer
}
