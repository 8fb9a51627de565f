//! Multiplexed connection and its event loop.
//!
//! This module owns the single socket to the appliance, including
//! request/response correlation, event routing and automatic reconnection.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that owns the transport and the
//! reconnect timer. It handles:
//!
//! - Incoming messages from the appliance (responses, errors, events)
//! - Outgoing requests from the Rust API
//! - Request/response correlation by integer id
//! - Reconnection with exponential backoff after every close
//!
//! # Lifecycle
//!
//! ```text
//!                connect()                 open
//! Disconnected ───────────► Connecting ───────────► Connected
//!      ▲                        ▲                      │
//!      │ disconnect()           │ delay elapsed        │ close / error
//!      │                        │                      ▼
//!      └─────────────────── Reconnecting { attempt, delay }
//! ```
//!
//! Every close, including a failed connect attempt, publishes
//! `socket/disconnected`, rejects all pending requests with
//! [`Error::ConnectionClosed`] and schedules the next attempt.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{Call, Inbound, Request, Response};
use crate::store::{Action, DIALOG_ERROR, Dispatch, SOCKET_CONNECTED, SOCKET_DISCONNECTED};

use super::backoff::{Backoff, BackoffPolicy};
use super::pending::{PendingTable, Responder};
use super::socket::{Connector, Transport};

// ============================================================================
// ConnectionState
// ============================================================================

/// Observable state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Idle. Nothing happens until [`Connection::connect`].
    #[default]
    Disconnected,

    /// A connect attempt is in progress.
    Connecting,

    /// The socket is open and requests are accepted.
    Connected,

    /// Waiting `delay` before attempt number `attempt`.
    Reconnecting {
        /// Close events since the last successful open.
        attempt: u32,
        /// Delay before the next attempt.
        delay: Duration,
    },
}

impl ConnectionState {
    /// Returns `true` when the socket is open.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` when the loop will attempt to (re)connect on its own.
    #[inline]
    #[must_use]
    pub const fn is_reconnecting(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting { .. })
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Reconnecting { attempt, delay } => {
                write!(f, "reconnecting (attempt {attempt}, in {}ms)", delay.as_millis())
            }
        }
    }
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Open the socket if idle.
    Connect,
    /// Send a request and wait for response.
    Send { call: Call, response_tx: Responder },
    /// Close the socket and stop reconnecting.
    Disconnect,
}

// ============================================================================
// Connection
// ============================================================================

/// Multiplexed request/response link to the appliance.
///
/// Many callers may have requests in flight at once; each gets exactly the
/// reply carrying its id. Server-pushed events and connectivity changes go
/// to the [`Dispatch`] sink passed to [`spawn`](Self::spawn).
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. All clones drive the
/// same event loop, which exits once the last clone is dropped.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Latest state published by the event loop.
    state_rx: watch::Receiver<ConnectionState>,
    /// Pending table (shared with event loop).
    pending: Arc<Mutex<PendingTable>>,
}

impl Connection {
    /// Spawns the event loop in the [`Disconnected`](ConnectionState::Disconnected) state.
    ///
    /// No connection is attempted until [`connect`](Self::connect).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(
        url: Url,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn Dispatch>,
        backoff: BackoffPolicy,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let pending = Arc::new(Mutex::new(PendingTable::new()));

        let event_loop = EventLoop {
            url,
            connector,
            sink,
            backoff: Backoff::new(backoff),
            pending: Arc::clone(&pending),
            state_tx,
            command_rx,
        };
        tokio::spawn(event_loop.run());

        Self {
            command_tx,
            state_rx,
            pending,
        }
    }

    /// Opens the socket.
    ///
    /// Does nothing unless the connection is idle. Returns immediately; use
    /// [`wait_connected`](Self::wait_connected) to wait for the open.
    pub fn connect(&self) {
        if self.command_tx.send(ConnectionCommand::Connect).is_err() {
            warn!("Connect requested after event loop terminated");
        }
    }

    /// Sends a request and waits for its reply.
    ///
    /// The [`Response`] holds the whole reply message; see
    /// [`Response::into_message`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the socket is not open
    /// - [`Error::ConnectionClosed`] if the socket closes before the reply
    /// - [`Error::Remote`] if the appliance answered with an error
    pub async fn send(&self, call: Call) -> Result<Response> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        // Create response channel
        let (response_tx, response_rx) = oneshot::channel();

        // Send command to event loop
        self.command_tx
            .send(ConnectionCommand::Send { call, response_tx })
            .map_err(|_| Error::ConnectionClosed)?;

        match response_rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectionClosed),
        }
    }

    /// Closes the socket and cancels any scheduled reconnect.
    ///
    /// The connection stays idle until the next [`connect`](Self::connect).
    pub fn disconnect(&self) {
        if self.command_tx.send(ConnectionCommand::Disconnect).is_err() {
            debug!("Disconnect requested after event loop terminated");
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Returns `true` when the socket is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state_rx.borrow().is_connected()
    }

    /// Waits until the socket is open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop is gone.
    pub async fn wait_connected(&self) -> Result<()> {
        let mut state_rx = self.state_rx.clone();
        state_rx
            .wait_for(ConnectionState::is_connected)
            .await
            .map(|_| ())
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Returns a receiver observing every state change.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EventLoop
// ============================================================================

/// What the event loop does next.
enum Phase {
    /// Wait for `connect()`.
    Idle,
    /// Attempt to open, then serve the session.
    Connect,
    /// Sleep, then attempt to open.
    Backoff(Duration),
    /// All handles dropped.
    Exit,
}

/// Why a served session ended.
enum SessionEnd {
    /// Closed by the peer or failed; reconnect.
    Lost,
    /// Closed by `disconnect()`; go idle.
    Disconnected,
    /// All handles dropped; exit.
    Dropped,
}

/// Task-owned state of a [`Connection`].
struct EventLoop {
    url: Url,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn Dispatch>,
    backoff: Backoff,
    pending: Arc<Mutex<PendingTable>>,
    state_tx: watch::Sender<ConnectionState>,
    command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
}

impl EventLoop {
    async fn run(mut self) {
        let mut phase = Phase::Idle;

        loop {
            phase = match phase {
                Phase::Idle => self.idle().await,
                Phase::Connect => self.connect_and_serve().await,
                Phase::Backoff(delay) => self.wait_backoff(delay).await,
                Phase::Exit => break,
            };
        }

        let count = self.pending.lock().fail_all(|| Error::ConnectionClosed);
        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
        self.set_state(ConnectionState::Disconnected);

        debug!("Event loop terminated");
    }

    /// Waits for `connect()` while rejecting requests.
    async fn idle(&mut self) -> Phase {
        self.set_state(ConnectionState::Disconnected);

        loop {
            match self.command_rx.recv().await {
                Some(ConnectionCommand::Connect) => return Phase::Connect,
                Some(ConnectionCommand::Send { call, response_tx }) => {
                    Self::reject_send(&call, response_tx);
                }
                Some(ConnectionCommand::Disconnect) => trace!("Already disconnected"),
                None => return Phase::Exit,
            }
        }
    }

    /// Sleeps out a reconnect delay unless `disconnect()` cancels it.
    async fn wait_backoff(&mut self, delay: Duration) -> Phase {
        let timer = sleep(delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                () = &mut timer => return Phase::Connect,

                command = self.command_rx.recv() => match command {
                    Some(ConnectionCommand::Connect) => trace!("Reconnect already scheduled"),
                    Some(ConnectionCommand::Send { call, response_tx }) => {
                        Self::reject_send(&call, response_tx);
                    }
                    Some(ConnectionCommand::Disconnect) => {
                        info!("Scheduled reconnect cancelled");
                        return Phase::Idle;
                    }
                    None => return Phase::Exit,
                },
            }
        }
    }

    /// Opens a transport and serves it until it closes.
    async fn connect_and_serve(&mut self) -> Phase {
        self.set_state(ConnectionState::Connecting);
        debug!(url = %self.url, "Connecting");

        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        let attempt = async move { connector.connect(&url).await };
        tokio::pin!(attempt);

        let opened = loop {
            tokio::select! {
                result = &mut attempt => break result,

                command = self.command_rx.recv() => match command {
                    Some(ConnectionCommand::Connect) => trace!("Connect already in progress"),
                    Some(ConnectionCommand::Send { call, response_tx }) => {
                        Self::reject_send(&call, response_tx);
                    }
                    Some(ConnectionCommand::Disconnect) => {
                        info!("Connect attempt abandoned");
                        return Phase::Idle;
                    }
                    None => return Phase::Exit,
                },
            }
        };

        match opened {
            Ok(transport) => {
                self.on_open();
                match self.serve(transport).await {
                    SessionEnd::Lost => self.on_close(true),
                    SessionEnd::Disconnected => self.on_close(false),
                    SessionEnd::Dropped => {
                        self.on_close(false);
                        Phase::Exit
                    }
                }
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Connect attempt failed");
                self.on_close(true)
            }
        }
    }

    /// Serves one open transport.
    async fn serve(&mut self, mut transport: Box<dyn Transport>) -> SessionEnd {
        loop {
            tokio::select! {
                // Incoming messages from appliance
                frame = transport.recv() => match frame {
                    Some(Ok(text)) => self.handle_incoming(&text),

                    Some(Err(e)) => {
                        warn!(error = %e, "Transport error");
                        return SessionEnd::Lost;
                    }

                    None => {
                        debug!("Socket closed by remote");
                        return SessionEnd::Lost;
                    }
                },

                // Commands from Rust API
                command = self.command_rx.recv() => match command {
                    Some(ConnectionCommand::Send { call, response_tx }) => {
                        if let Err(e) = self.handle_send(&mut transport, call, response_tx).await {
                            warn!(error = %e, "Failed to write request");
                            return SessionEnd::Lost;
                        }
                    }

                    Some(ConnectionCommand::Connect) => trace!("Already connected"),

                    Some(ConnectionCommand::Disconnect) => {
                        debug!("Disconnect command received");
                        if let Err(e) = transport.close().await {
                            debug!(error = %e, "Close handshake failed");
                        }
                        return SessionEnd::Disconnected;
                    }

                    None => {
                        debug!("Command channel closed");
                        if let Err(e) = transport.close().await {
                            debug!(error = %e, "Close handshake failed");
                        }
                        return SessionEnd::Dropped;
                    }
                },
            }
        }
    }

    /// Handles one incoming text frame.
    fn handle_incoming(&self, text: &str) {
        let inbound = match Inbound::parse(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!(error = %e, len = text.len(), "Discarding malformed message");
                return;
            }
        };

        match inbound {
            Inbound::Reply(response) => {
                let id = response.id;
                if self.pending.lock().resolve(id, Ok(response)) {
                    trace!(%id, "Response delivered");
                } else {
                    warn!(%id, "Response for unknown request");
                }
            }

            Inbound::Failure { id, error } => {
                let owner = id.filter(|id| self.pending.lock().contains(*id));
                match owner {
                    Some(id) => {
                        debug!(%id, %error, "Request rejected by appliance");
                        self.pending.lock().resolve(id, Err(Error::remote(error)));
                    }
                    None => {
                        warn!(?id, %error, "Unattributed error from appliance");
                        self.sink.dispatch(Action::new(DIALOG_ERROR, error));
                    }
                }
            }

            Inbound::Event(event) => {
                trace!(name = %event.name, "Event received");
                self.sink.dispatch(Action::from(event));
            }

            Inbound::Unroutable(message) => {
                warn!(%message, "Discarding unroutable message");
            }
        }
    }

    /// Registers and writes one request.
    ///
    /// The entry is stored before writing so the reply always finds it.
    /// A write failure is returned and ends the session; the entry is then
    /// flushed with every other pending request.
    async fn handle_send(
        &mut self,
        transport: &mut Box<dyn Transport>,
        call: Call,
        response_tx: Responder,
    ) -> Result<()> {
        let id = self.pending.lock().register(response_tx);
        let request = Request::new(id, call);

        // Serialize request
        let json = match serde_json::to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                self.pending.lock().resolve(id, Err(Error::Json(e)));
                return Ok(());
            }
        };

        trace!(%id, method = request.method(), "Sending request");
        transport.send(json).await
    }

    fn on_open(&mut self) {
        self.backoff.reset();
        self.sink.dispatch(Action::bare(SOCKET_CONNECTED));
        self.set_state(ConnectionState::Connected);

        info!(url = %self.url, "Connected");
    }

    /// Publishes the close, flushes pending requests and picks the next phase.
    fn on_close(&mut self, reconnect: bool) -> Phase {
        let (state, phase) = if reconnect {
            let delay = self.backoff.next_delay();
            let attempt = self.backoff.attempt();
            (
                ConnectionState::Reconnecting { attempt, delay },
                Phase::Backoff(delay),
            )
        } else {
            (ConnectionState::Disconnected, Phase::Idle)
        };

        self.sink.dispatch(Action::bare(SOCKET_DISCONNECTED));
        self.set_state(state);

        let count = self.pending.lock().fail_all(|| Error::ConnectionClosed);
        if count > 0 {
            debug!(count, "Failed pending requests on close");
        }

        if let ConnectionState::Reconnecting { attempt, delay } = state {
            info!(attempt, ?delay, "Reconnect scheduled");
        }

        phase
    }

    fn reject_send(call: &Call, response_tx: Responder) {
        debug!(method = %call.method, "Request rejected, socket not open");
        let _ = response_tx.send(Err(Error::NotConnected));
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}

// ============================================================================
// Tests
// ============================================================================
