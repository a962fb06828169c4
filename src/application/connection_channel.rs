//! Resilient duplex connection.
//!
//! `ConnectionChannel` owns one socket at a time and keeps it alive:
//!
//! - a close schedules a reconnect after `reconnect_interval`, re-checked
//!   against the keep-connected flag when the timer fires;
//! - every close also schedules a liveness check (unless one is pending) at
//!   `reconnect_interval + grace`; if the socket is still down by then and
//!   the channel was connected, it moves to `Lost` and the disconnected
//!   listeners fire once;
//! - an open moves `NotEstablished` to `Established` and `Lost` to
//!   `Restored`, firing the connected listeners. An open that beats the
//!   liveness check changes nothing and notifies nobody;
//! - while open, a `KeepAlive` text frame goes out every
//!   `keep_alive_interval`; a zero interval sends none.
//!
//! Transport errors never escape: they are logged, handed to the error
//! listeners and recovered from by the close/reconnect cycle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::listeners::Listeners;
use crate::domain::connection::{ConnectionConfig, ConnectionState, DEFAULT_KEEP_ALIVE_INTERVAL};
use crate::domain::foundation::StateMachine;
use crate::ports::{SocketConnector, SocketSession, TransportError};

/// Text frame sent on every keep-alive tick.
pub const KEEP_ALIVE_FRAME: &str = "KeepAlive";

pub type ConnectionListener = dyn Fn() + Send + Sync;
pub type ConnectionErrorListener = dyn Fn(&TransportError) + Send + Sync;
pub type MessageListener = dyn Fn(&str) + Send + Sync;

/// A socket connection that reconnects on its own.
///
/// # Example
///
/// ```ignore
/// let channel = ConnectionChannel::new(config, Arc::new(TungsteniteConnector::new()));
/// channel.on_disconnected(|| tracing::warn!("server unreachable"));
/// channel.on_message(|text| println!("{text}"));
/// channel.connect();
/// ```
pub struct ConnectionChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    config: ConnectionConfig,
    connector: Arc<dyn SocketConnector>,
    state: Mutex<ChannelState>,
    connected: Listeners<ConnectionListener>,
    disconnected: Listeners<ConnectionListener>,
    errors: Listeners<ConnectionErrorListener>,
    messages: Listeners<MessageListener>,
}

#[derive(Default)]
struct ChannelState {
    connection: ConnectionState,
    keep_connected: bool,
    /// Bumped on every open attempt and on disconnect; sessions carrying an
    /// older value are stale.
    generation: u64,
    socket: SocketPhase,
    reconnect_timer: Option<Timer>,
    liveness_timer: Option<Timer>,
    next_timer_id: u64,
    runtime: Option<Handle>,
}

#[derive(Default)]
enum SocketPhase {
    #[default]
    Closed,
    Opening,
    Open(OpenSocket),
}

struct OpenSocket {
    outbound: mpsc::UnboundedSender<String>,
    shutdown: Option<oneshot::Sender<()>>,
}

struct Timer {
    id: u64,
    handle: JoinHandle<()>,
}

impl Timer {
    fn cancel(self) {
        self.handle.abort();
    }
}

impl ConnectionChannel {
    pub fn new(config: ConnectionConfig, connector: Arc<dyn SocketConnector>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                config,
                connector,
                state: Mutex::new(ChannelState::default()),
                connected: Listeners::new(),
                disconnected: Listeners::new(),
                errors: Listeners::new(),
                messages: Listeners::new(),
            }),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().connection
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Asks the channel to stay connected and opens a socket unless one is
    /// open or opening. Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut state = self.inner.lock();

        if state.runtime.is_none() {
            match Handle::try_current() {
                Ok(handle) => state.runtime = Some(handle),
                Err(error) => {
                    tracing::error!(error = %error, "connect() called outside a tokio runtime");
                    return;
                }
            }
        }

        state.keep_connected = true;
        if matches!(state.socket, SocketPhase::Closed) {
            if let Some(timer) = state.reconnect_timer.take() {
                timer.cancel();
            }
            ChannelInner::start_open(&self.inner, &mut state);
        }
    }

    /// Closes the socket and stops reconnecting.
    pub fn disconnect(&self) {
        let mut state = self.inner.lock();
        state.keep_connected = false;

        if let Some(timer) = state.reconnect_timer.take() {
            timer.cancel();
        }

        match std::mem::take(&mut state.socket) {
            SocketPhase::Open(mut socket) => {
                if let Some(shutdown) = socket.shutdown.take() {
                    let _ = shutdown.send(());
                }
                state.generation += 1;
                ChannelInner::schedule_liveness_check(&self.inner, &mut state);
                tracing::info!(url = self.inner.config.url(), "Disconnected");
            }
            SocketPhase::Opening => {
                state.generation += 1;
            }
            SocketPhase::Closed => {}
        }
    }

    /// Queues a text frame on the open socket.
    pub fn send(&self, text: impl Into<String>) -> Result<(), TransportError> {
        match &self.inner.lock().socket {
            SocketPhase::Open(socket) => socket
                .outbound
                .send(text.into())
                .map_err(|_| TransportError::NotConnected),
            _ => Err(TransportError::NotConnected),
        }
    }

    pub fn on_connected(&self, listener: impl Fn() + Send + Sync + 'static) -> Arc<ConnectionListener> {
        let listener: Arc<ConnectionListener> = Arc::new(listener);
        self.inner.connected.add(Arc::clone(&listener));
        listener
    }

    pub fn un_connected(&self, listener: &Arc<ConnectionListener>) -> bool {
        self.inner.connected.remove(listener)
    }

    pub fn on_disconnected(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Arc<ConnectionListener> {
        let listener: Arc<ConnectionListener> = Arc::new(listener);
        self.inner.disconnected.add(Arc::clone(&listener));
        listener
    }

    pub fn un_disconnected(&self, listener: &Arc<ConnectionListener>) -> bool {
        self.inner.disconnected.remove(listener)
    }

    pub fn on_connection_error(
        &self,
        listener: impl Fn(&TransportError) + Send + Sync + 'static,
    ) -> Arc<ConnectionErrorListener> {
        let listener: Arc<ConnectionErrorListener> = Arc::new(listener);
        self.inner.errors.add(Arc::clone(&listener));
        listener
    }

    pub fn un_connection_error(&self, listener: &Arc<ConnectionErrorListener>) -> bool {
        self.inner.errors.remove(listener)
    }

    /// Raw text frames, in arrival order.
    pub fn on_message(&self, listener: impl Fn(&str) + Send + Sync + 'static) -> Arc<MessageListener> {
        let listener: Arc<MessageListener> = Arc::new(listener);
        self.inner.messages.add(Arc::clone(&listener));
        listener
    }

    pub fn un_message(&self, listener: &Arc<MessageListener>) -> bool {
        self.inner.messages.remove(listener)
    }
}

impl Drop for ConnectionChannel {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.keep_connected = false;
        state.generation += 1;
        // Dropping the open socket's shutdown sender ends its session task.
        state.socket = SocketPhase::Closed;
        if let Some(timer) = state.reconnect_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = state.liveness_timer.take() {
            timer.cancel();
        }
    }
}

impl ChannelInner {
    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_open(this: &Arc<Self>, state: &mut ChannelState) {
        let Some(runtime) = state.runtime.clone() else {
            return;
        };

        state.generation += 1;
        state.socket = SocketPhase::Opening;

        let generation = state.generation;
        let connector = Arc::clone(&this.connector);
        let url = this.config.url().to_string();
        let protocols = this.config.protocols().to_vec();
        let keep_alive = this.config.keep_alive_interval();
        let weak = Arc::downgrade(this);

        tracing::debug!(url = %url, generation, "Opening socket");
        runtime.spawn(async move {
            let opened = connector.open(&url, &protocols).await;
            run_session(weak, generation, opened, keep_alive).await;
        });
    }

    fn next_timer_id(state: &mut ChannelState) -> u64 {
        state.next_timer_id += 1;
        state.next_timer_id
    }

    fn schedule_reconnect(this: &Arc<Self>, state: &mut ChannelState) {
        let Some(runtime) = state.runtime.clone() else {
            return;
        };
        if let Some(timer) = state.reconnect_timer.take() {
            timer.cancel();
        }

        let id = Self::next_timer_id(state);
        let delay = this.config.reconnect_interval();
        let weak = Arc::downgrade(this);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                ChannelInner::reconnect_due(&inner, id);
            }
        });

        tracing::debug!(delay = ?delay, "Reconnect scheduled");
        state.reconnect_timer = Some(Timer { id, handle });
    }

    fn schedule_liveness_check(this: &Arc<Self>, state: &mut ChannelState) {
        if state.liveness_timer.is_some() {
            return;
        }
        let Some(runtime) = state.runtime.clone() else {
            return;
        };

        let id = Self::next_timer_id(state);
        let delay = this.config.liveness_check_delay();
        let weak = Arc::downgrade(this);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.liveness_due(id);
            }
        });

        state.liveness_timer = Some(Timer { id, handle });
    }

    fn reconnect_due(this: &Arc<Self>, id: u64) {
        let mut state = this.lock();
        if state.reconnect_timer.as_ref().map(|t| t.id) != Some(id) {
            return;
        }
        state.reconnect_timer = None;

        if !state.keep_connected {
            tracing::debug!("Reconnect skipped, channel was disconnected");
            return;
        }
        if matches!(state.socket, SocketPhase::Closed) {
            Self::start_open(this, &mut state);
        }
    }

    fn liveness_due(&self, id: u64) {
        let lost = {
            let mut state = self.lock();
            if state.liveness_timer.as_ref().map(|t| t.id) != Some(id) {
                return;
            }
            state.liveness_timer = None;

            let socket_open = matches!(state.socket, SocketPhase::Open(_));
            if socket_open || !state.connection.is_connected() {
                false
            } else {
                match state.connection.transition_to(ConnectionState::Lost) {
                    Ok(next) => {
                        state.connection = next;
                        true
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "Invalid connection transition");
                        false
                    }
                }
            }
        };

        if lost {
            tracing::warn!(url = self.config.url(), "Connection lost");
            self.disconnected.notify("disconnected", |listener| listener());
        }
    }

    /// Registers a freshly opened socket. `None` means the attempt went
    /// stale (disconnect or a newer attempt) and the socket must be closed.
    fn on_opened(
        &self,
        generation: u64,
    ) -> Option<(mpsc::UnboundedReceiver<String>, oneshot::Receiver<()>)> {
        let (changed, receivers) = {
            let mut state = self.lock();
            if state.generation != generation || !matches!(state.socket, SocketPhase::Opening) {
                return None;
            }

            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            state.socket = SocketPhase::Open(OpenSocket {
                outbound: outbound_tx,
                shutdown: Some(shutdown_tx),
            });

            if let Some(timer) = state.liveness_timer.take() {
                timer.cancel();
            }

            let changed = state.connection.after_open();
            if let Some(next) = changed {
                state.connection = next;
            }
            (changed, (outbound_rx, shutdown_rx))
        };

        match changed {
            Some(next) => {
                tracing::info!(url = self.config.url(), state = %next, "Connected");
                self.connected.notify("connected", |listener| listener());
            }
            None => tracing::debug!(url = self.config.url(), "Socket re-opened"),
        }
        Some(receivers)
    }

    /// Socket closed by the peer, by an error, or never opened.
    fn on_closed(this: &Arc<Self>, generation: u64) {
        let mut state = this.lock();
        if state.generation != generation {
            return;
        }

        state.socket = SocketPhase::Closed;
        if state.keep_connected {
            Self::schedule_reconnect(this, &mut state);
        }
        Self::schedule_liveness_check(this, &mut state);
        tracing::info!(url = this.config.url(), "Socket closed");
    }

    fn deliver(&self, generation: u64, text: &str) {
        if self.lock().generation != generation {
            return;
        }
        self.messages.notify("message", |listener| listener(text));
    }

    fn report_error(&self, error: &TransportError) {
        tracing::warn!(url = self.config.url(), error = %error, "Socket error");
        self.errors.notify("connection_error", |listener| listener(error));
    }
}

async fn run_session(
    inner: Weak<ChannelInner>,
    generation: u64,
    opened: Result<Box<dyn SocketSession>, TransportError>,
    keep_alive: Duration,
) {
    let Some(channel) = inner.upgrade() else {
        if let Ok(mut session) = opened {
            session.close().await;
        }
        return;
    };

    let mut session = match opened {
        Ok(session) => session,
        Err(error) => {
            channel.report_error(&error);
            ChannelInner::on_closed(&channel, generation);
            return;
        }
    };

    let Some((mut outbound, mut shutdown)) = channel.on_opened(generation) else {
        session.close().await;
        return;
    };
    drop(channel);

    let report = |error: TransportError| {
        if let Some(channel) = inner.upgrade() {
            channel.report_error(&error);
        }
    };

    let keep_alive_enabled = !keep_alive.is_zero();
    let period = if keep_alive_enabled {
        keep_alive
    } else {
        DEFAULT_KEEP_ALIVE_INTERVAL
    };
    let mut keep_alive = interval_at(Instant::now() + period, period);
    keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let closed_by_peer = loop {
        tokio::select! {
            _ = &mut shutdown => break false,
            Some(text) = outbound.recv() => {
                if let Err(error) = session.send_text(text).await {
                    report(error);
                }
            }
            _ = keep_alive.tick(), if keep_alive_enabled => {
                tracing::trace!("Sending keep-alive");
                if let Err(error) = session.send_text(KEEP_ALIVE_FRAME.to_string()).await {
                    report(error);
                }
            }
            frame = session.next_frame() => match frame {
                Some(Ok(text)) => match inner.upgrade() {
                    Some(channel) => channel.deliver(generation, &text),
                    None => break false,
                },
                Some(Err(error)) => {
                    report(error);
                    break true;
                }
                None => break true,
            },
        }
    };

    session.close().await;
    if closed_by_peer {
        if let Some(channel) = inner.upgrade() {
            ChannelInner::on_closed(&channel, generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ScriptedConnector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("ws://localhost:8080/admin/event")
    }

    fn channel_with(connector: &ScriptedConnector) -> ConnectionChannel {
        ConnectionChannel::new(config(), Arc::new(connector.clone()))
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn connect_establishes_once_and_is_idempotent() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (connected, on_connected) = counter();
        channel.on_connected(on_connected);

        assert_eq!(channel.state(), ConnectionState::NotEstablished);
        channel.connect();
        channel.connect();
        connector.wait_for_peer(1).await;
        settle().await;
        channel.connect();
        settle().await;

        assert_eq!(channel.state(), ConnectionState::Established);
        assert!(channel.is_connected());
        assert_eq!(connected.load(Ordering::SeqCst), 1);
        assert_eq!(connector.attempts(), 1);
        assert_eq!(
            connector.requests()[0],
            ("ws://localhost:8080/admin/event".to_string(), vec!["text".to_string()])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_prevents_the_scheduled_reconnect() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;

        peer.close();
        settle().await;
        channel.disconnect();
        advance(20_000).await;

        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_closes_the_socket() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;
        channel.disconnect();
        settle().await;

        assert!(peer.is_closed_by_client());
        assert_eq!(channel.send("late"), Err(TransportError::NotConnected));
        advance(20_000).await;
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_fires_once_across_failed_retries_then_restores() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (connected, on_connected) = counter();
        let (disconnected, on_disconnected) = counter();
        channel.on_connected(on_connected);
        channel.on_disconnected(on_disconnected);

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;

        connector.set_accepting(false);
        peer.close();
        settle().await;

        // Close -> still connected until the liveness check at 6s.
        advance(5_500).await;
        assert_eq!(channel.state(), ConnectionState::Established);
        assert_eq!(disconnected.load(Ordering::SeqCst), 0);

        advance(26_000).await;
        assert_eq!(channel.state(), ConnectionState::Lost);
        assert!(!channel.is_connected());
        assert_eq!(disconnected.load(Ordering::SeqCst), 1);
        assert!(connector.attempts() >= 6);

        connector.set_accepting(true);
        advance(5_100).await;
        assert_eq!(channel.state(), ConnectionState::Restored);
        assert_eq!(connected.load(Ordering::SeqCst), 2);
        assert_eq!(disconnected.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_before_liveness_check_is_silent() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (connected, on_connected) = counter();
        let (disconnected, on_disconnected) = counter();
        channel.on_connected(on_connected);
        channel.on_disconnected(on_disconnected);

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;

        peer.close();
        advance(5_100).await;
        assert_eq!(connector.opened(), 2);

        advance(3_000).await;
        assert_eq!(channel.state(), ConnectionState::Established);
        assert_eq!(connected.load(Ordering::SeqCst), 1);
        assert_eq!(disconnected.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_while_connected_is_reported_as_lost() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (disconnected, on_disconnected) = counter();
        channel.on_disconnected(on_disconnected);

        channel.connect();
        connector.wait_for_peer(1).await;
        settle().await;

        channel.disconnect();
        advance(6_500).await;
        assert_eq!(channel.state(), ConnectionState::Lost);
        assert_eq!(disconnected.load(Ordering::SeqCst), 1);

        channel.connect();
        connector.wait_for_peer(2).await;
        settle().await;
        assert_eq!(channel.state(), ConnectionState::Restored);
    }

    #[tokio::test(start_paused = true)]
    async fn keep_alive_is_sent_every_interval() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;
        assert!(peer.sent_frames().is_empty());

        advance(30_100).await;
        assert_eq!(peer.sent_frames(), vec![KEEP_ALIVE_FRAME.to_string()]);

        advance(30_000).await;
        assert_eq!(peer.sent_frames().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_keep_alive_interval_sends_nothing_and_still_reconnects() {
        let connector = ScriptedConnector::new();
        let config = config().with_keep_alive_interval(Duration::ZERO);
        let channel = ConnectionChannel::new(config, Arc::new(connector.clone()));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        channel.on_message(move |text| sink.lock().unwrap().push(text.to_string()));

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        peer.push("first");
        settle().await;
        assert_eq!(*received.lock().unwrap(), vec!["first"]);

        advance(60_000).await;
        assert!(peer.sent_frames().is_empty());

        peer.close();
        settle().await;
        advance(5_100).await;
        assert_eq!(connector.opened(), 2);
        assert!(channel.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn frames_reach_message_listeners_in_order() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        channel.on_message(move |text| sink.lock().unwrap().push(text.to_string()));

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        peer.push("first");
        peer.push("second");
        settle().await;

        assert_eq!(*received.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn send_goes_out_on_the_open_socket() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        assert_eq!(channel.send("early"), Err(TransportError::NotConnected));

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;

        channel.send("hello").unwrap();
        settle().await;

        assert_eq!(peer.sent_frames(), vec!["hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_open_reports_error_and_retries() {
        let connector = ScriptedConnector::new();
        connector.set_accepting(false);
        let channel = channel_with(&connector);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        channel.on_connection_error(move |error| sink.lock().unwrap().push(error.clone()));

        channel.connect();
        settle().await;
        assert_eq!(connector.attempts(), 1);
        assert_eq!(errors.lock().unwrap().len(), 1);
        assert!(matches!(
            errors.lock().unwrap()[0],
            TransportError::Connect { .. }
        ));
        assert_eq!(channel.state(), ConnectionState::NotEstablished);

        advance(5_100).await;
        assert_eq!(connector.attempts(), 2);
        assert_eq!(errors.lock().unwrap().len(), 2);
        assert_eq!(channel.state(), ConnectionState::NotEstablished);
    }

    #[tokio::test(start_paused = true)]
    async fn receive_error_is_reported_and_followed_by_reconnect() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (errors, on_error) = counter();
        channel.on_connection_error(move |_| on_error());

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;

        peer.fail("connection reset");
        settle().await;
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        advance(5_100).await;
        assert_eq!(connector.opened(), 2);
        assert!(channel.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn removed_listeners_are_not_notified() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (connected, on_connected) = counter();
        let listener = channel.on_connected(on_connected);

        assert!(channel.un_connected(&listener));
        assert!(!channel.un_connected(&listener));

        channel.connect();
        connector.wait_for_peer(1).await;
        settle().await;

        assert_eq!(connected.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_listener_registration_fires_twice() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);
        let (connected, on_connected) = counter();
        let listener = channel.on_connected(on_connected);
        channel.inner.connected.add(Arc::clone(&listener));

        channel.connect();
        connector.wait_for_peer(1).await;
        settle().await;

        assert_eq!(connected.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_channel_closes_the_socket() {
        let connector = ScriptedConnector::new();
        let channel = channel_with(&connector);

        channel.connect();
        let peer = connector.wait_for_peer(1).await;
        settle().await;

        drop(channel);
        settle().await;

        assert!(peer.is_closed_by_client());
        advance(20_000).await;
        assert_eq!(connector.attempts(), 1);
    }
}
