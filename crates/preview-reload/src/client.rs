//! Hot reload client state machine.
//!
//! The machine performs no I/O. Callers feed it [`ClientEvent`]s and execute
//! the [`Command`]s it returns: the native driver does this with tokio, the
//! browser script implements the same transitions with DOM callbacks.
//!
//! ```text
//! Disconnected ──init──► Connecting ──Opened──► Connected
//!                            │                      │
//!                          Closed            Closed / Message
//!                            ▼                      ▼
//!                      ReconnectPending ◄───────────┘
//!                            │
//!                       RetryFired ──► Connecting (expect_reload)
//! ```

use std::time::Duration;

use crate::protocol::{DEFAULT_RETRY_DELAY, NORMAL_CLOSURE, close_reason};

/// Identifies one scheduled retry timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Connection state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket and no pending retry.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting {
        /// Reload once this attempt opens.
        expect_reload: bool,
    },
    /// The socket is open.
    Connected,
    /// Waiting for the retry timer.
    ReconnectPending,
}

/// Input to the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// The connection attempt succeeded.
    Opened,
    /// The server sent a message. Payloads are not inspected.
    Message,
    /// The socket closed or the attempt failed.
    Closed,
    /// A retry timer fired.
    RetryFired(TimerId),
}

/// Side effect requested by the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Open a new socket, replacing any previous one.
    Connect {
        /// Whether a successful open should reload.
        expect_reload: bool,
    },
    /// Start a timer that reports [`ClientEvent::RetryFired`] after `delay`.
    ScheduleRetry {
        /// Timer identity.
        timer: TimerId,
        /// Delay before firing.
        delay: Duration,
    },
    /// Stop a pending timer.
    CancelRetry {
        /// Timer identity.
        timer: TimerId,
    },
    /// Close the open socket.
    Close {
        /// WebSocket close code.
        code: u16,
        /// Close reason text.
        reason: String,
    },
    /// Reload the page, bypassing caches.
    Reload,
}

/// Client options.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// Delay between a drop and the next connection attempt.
    pub retry_delay: Duration,
    /// Name of the reloaded resource, used in the close reason.
    pub resource: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            resource: "readme".to_owned(),
        }
    }
}

/// Hot reload client.
///
/// Invariant: at most one retry timer is pending. Every transition that
/// schedules a timer cancels the previous one first.
#[derive(Debug)]
pub struct HotReloader {
    options: ClientOptions,
    state: ConnectionState,
    retry: Option<TimerId>,
    next_timer: u64,
}

impl HotReloader {
    /// Create a disconnected client.
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            state: ConnectionState::Disconnected,
            retry: None,
            next_timer: 0,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The pending retry timer, if any.
    #[must_use]
    pub fn pending_retry(&self) -> Option<TimerId> {
        self.retry
    }

    /// Start the first connection attempt. Opening it does not reload.
    pub fn init(&mut self) -> Vec<Command> {
        let mut commands: Vec<Command> = self.cancel().into_iter().collect();
        commands.push(self.connect(false));
        commands
    }

    /// Clear the pending retry timer.
    pub fn cancel(&mut self) -> Option<Command> {
        self.retry.take().map(|timer| Command::CancelRetry { timer })
    }

    /// Apply an event and return the commands to execute, in order.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<Command> {
        let mut commands = Vec::new();

        match event {
            ClientEvent::Opened => {
                if let ConnectionState::Connecting { expect_reload } = self.state {
                    self.state = ConnectionState::Connected;
                    if expect_reload {
                        commands.extend(self.cancel());
                        commands.push(Command::Reload);
                    }
                } else {
                    tracing::trace!(state = ?self.state, "Ignoring open outside of a connection attempt");
                }
            }
            ClientEvent::Message => {
                if self.state == ConnectionState::Connected {
                    commands.extend(self.cancel());
                    commands.push(Command::Close {
                        code: NORMAL_CLOSURE,
                        reason: close_reason(&self.options.resource),
                    });
                    commands.push(Command::Reload);
                    self.state = ConnectionState::Disconnected;
                } else {
                    tracing::trace!(state = ?self.state, "Ignoring message without an open socket");
                }
            }
            ClientEvent::Closed => {
                commands.extend(self.cancel());
                let timer = TimerId(self.next_timer);
                self.next_timer += 1;
                self.retry = Some(timer);
                self.state = ConnectionState::ReconnectPending;
                commands.push(Command::ScheduleRetry {
                    timer,
                    delay: self.options.retry_delay,
                });
            }
            ClientEvent::RetryFired(timer) => {
                if self.retry == Some(timer) {
                    self.retry = None;
                    commands.push(self.connect(true));
                } else {
                    tracing::trace!(?timer, "Ignoring stale retry timer");
                }
            }
        }

        commands
    }

    fn connect(&mut self, expect_reload: bool) -> Command {
        self.state = ConnectionState::Connecting { expect_reload };
        Command::Connect { expect_reload }
    }
}
