use super::hooks::{CloseHook, ErrorHook, LifecycleHooks, MessageHook, OpenHook};
use super::pending::PendingResponse;
use super::task::{self, LinkCommand};
use crate::codec::{self, OutboundPayload};
use crate::dispatch::Router;
use crate::error::client::ClientError;
use crate::registry::{
    CorrelationRegistry, PendingRequest, ResponseReceiver, SubscriptionId, SubscriptionRegistry,
    lock,
};

use common::ErrorLocation;
use models::{
    CloseEvent, CloseKind, ConnectOptions, ConnectionState, EventName, RequestId,
    ResponseEnvelope,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use url::Url;

/// Attempts at drawing an unused request id before `send` gives up.
const MAX_REQUEST_ID_ATTEMPTS: usize = 8;

/// Client for the line-framed socket protocol.
///
/// Cloning is cheap and every clone drives the same connection. Dropping the
/// last clone closes the connection.
///
/// ```no_run
/// # async fn demo() -> Result<(), socket_core::error::ClientError> {
/// use serde_json::json;
/// use socket_core::SocketClient;
///
/// let client = SocketClient::new();
/// client.add_event_handler("FILESERVER_STATISTICS", |envelope| {
///     println!("stats: {}", envelope.payload);
/// })?;
/// client.connect_to("ws://127.0.0.1:8080/ws")?;
/// client.wait_until_open().await?;
///
/// let logs = client.send("LOG__GET", json!({ "page": 1 }))?.await?;
/// println!("{}", logs.payload);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SocketClient {
    pub(crate) inner: Arc<ClientInner>,
    _lifetime: Arc<CloseOnDrop>,
}

impl SocketClient {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A client whose requests fail with [`ClientError::Timeout`] when no
    /// response arrives within `timeout`.
    pub fn with_request_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(request_timeout: Option<Duration>) -> Self {
        let inner = Arc::new(ClientInner::new(request_timeout));
        Self {
            _lifetime: Arc::new(CloseOnDrop(Arc::clone(&inner))),
            inner,
        }
    }

    /// Open a connection, replacing any existing one.
    ///
    /// Returns once the connection task is started; watch [`Self::state_changes`]
    /// or call [`Self::wait_until_open`] to learn when it opens. Failures to
    /// connect go to the error hook and are retried like unexpected closures.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Runtime`] when called outside a Tokio runtime.
    #[track_caller]
    pub fn connect(&self, options: ConnectOptions) -> Result<(), ClientError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| ClientError::Runtime {
                message: format!("connect requires a Tokio runtime: {e}"),
                location: ErrorLocation::caller(),
            })?;

        let (commands, receiver) = mpsc::unbounded_channel();
        let generation = self.inner.attach(commands);
        runtime.spawn(task::run(
            Arc::clone(&self.inner),
            options,
            generation,
            receiver,
        ));

        Ok(())
    }

    /// [`Self::connect`] with default options for `address`.
    #[track_caller]
    pub fn connect_to(&self, address: &str) -> Result<(), ClientError> {
        self.connect(ConnectOptions::new(address)?)
    }

    /// Send a request and return its eventual response.
    ///
    /// The waiter is registered before the frame is queued, so a response can
    /// never race ahead of it. Registration happens under the link lock, so a
    /// concurrent close either fails this call or rejects the request. String
    /// payloads are sent verbatim; JSON values are serialized.
    ///
    /// # Errors
    ///
    /// Fails immediately with [`ClientError::NotConnected`] unless the
    /// connection is open, and with a model or codec error for an invalid
    /// event name or payload.
    #[track_caller]
    pub fn send(
        &self,
        event: &str,
        payload: impl Into<OutboundPayload>,
    ) -> Result<PendingResponse, ClientError> {
        let event = EventName::parse(event)?;
        let payload = payload.into().to_wire()?;

        let link = lock(&self.inner.link);
        let Some(current) = link.as_ref().filter(|_| self.state().is_open()) else {
            return Err(ClientError::not_connected(format!(
                "Cannot send {event}: websocket is not connected"
            )));
        };
        let generation = current.generation;
        let commands = current.commands.clone();
        let (request_id, receiver) = self.inner.register_request(&event, generation)?;
        drop(link);

        let frame = codec::frame(&event, Some(&request_id), payload.as_deref());

        if commands.send(LinkCommand::Send(frame)).is_err() {
            warn!("Connection task {generation} has stopped, retiring it");
            self.inner.close_generation(
                generation,
                &CloseEvent::unexpected("connection task stopped"),
            );
            self.inner.finish(generation);
            return Err(ClientError::not_connected(format!(
                "Cannot send {event}: connection task has stopped"
            )));
        }

        debug!("Sent {event} as request {request_id}");
        Ok(PendingResponse::new(
            request_id,
            event,
            receiver,
            Arc::clone(&self.inner.pending),
            self.inner.request_timeout,
        ))
    }

    /// Serialize `payload` to JSON and [`Self::send`] it.
    #[track_caller]
    pub fn send_json<T: Serialize>(
        &self,
        event: &str,
        payload: &T,
    ) -> Result<PendingResponse, ClientError> {
        self.send(event, OutboundPayload::json(payload)?)
    }

    /// Invoke `callback` for every broadcast of `event`.
    ///
    /// Handlers survive reconnects and run on the connection task, so they
    /// should return quickly and must not panic. A panic ends the task; the
    /// next `send` then fails with [`ClientError::NotConnected`] and rejects
    /// whatever was still pending.
    pub fn add_event_handler<F>(&self, event: &str, callback: F) -> Result<SubscriptionId, ClientError>
    where
        F: Fn(&ResponseEnvelope) + Send + Sync + 'static,
    {
        let event = EventName::parse(event)?;
        Ok(lock(&self.inner.subscriptions).add(event, callback))
    }

    pub fn remove_event_handler(&self, id: SubscriptionId) -> bool {
        lock(&self.inner.subscriptions).remove(id)
    }

    /// Remove every handler for `event`, or all handlers when `event` is `None`.
    pub fn remove_all_event_handlers(&self, event: Option<&str>) -> usize {
        lock(&self.inner.subscriptions).remove_all(event)
    }

    /// Close the connection and stop reconnecting.
    ///
    /// Cancels a pending reconnect or an attempt still in progress. The close
    /// hook receives a [`CloseKind::Intentional`] event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] when there is no connection to close.
    #[track_caller]
    pub fn close(&self) -> Result<(), ClientError> {
        let link = self
            .inner
            .take_link()
            .ok_or_else(|| ClientError::not_connected("Cannot close: websocket is not connected"))?;

        info!("Closing connection {}", link.generation);
        let _ = link.commands.send(LinkCommand::Close);
        self.inner.state.send_replace(ConnectionState::Closed);

        Ok(())
    }

    pub fn on_open<F>(&self, hook: F)
    where
        F: Fn(&Url) + Send + Sync + 'static,
    {
        lock(&self.inner.hooks).open = Some(Arc::new(hook) as OpenHook);
    }

    /// Observe every raw inbound frame, after its messages were dispatched.
    pub fn on_message<F>(&self, hook: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        lock(&self.inner.hooks).message = Some(Arc::new(hook) as MessageHook);
    }

    pub fn on_close<F>(&self, hook: F)
    where
        F: Fn(&CloseEvent) + Send + Sync + 'static,
    {
        lock(&self.inner.hooks).close = Some(Arc::new(hook) as CloseHook);
    }

    pub fn on_error<F>(&self, hook: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        lock(&self.inner.hooks).error = Some(Arc::new(hook) as ErrorHook);
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Wait until the connection is open, following reconnects.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] once there is no connection left
    /// to wait for: never connected, closed, or given up without reconnecting.
    pub async fn wait_until_open(&self) -> Result<(), ClientError> {
        let mut changes = self.state_changes();

        loop {
            if changes.borrow_and_update().is_open() {
                return Ok(());
            }

            if !self.inner.has_link() {
                return Err(ClientError::not_connected("Connection closed before it opened"));
            }

            if changes.changed().await.is_err() {
                return Err(ClientError::not_connected("Client was dropped"));
            }
        }
    }

    /// Number of requests still waiting for a response.
    pub fn pending_requests(&self) -> usize {
        lock(&self.inner.pending).len()
    }
}

impl Default for SocketClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The connection task's handle, held by the client while it is current.
pub(crate) struct Link {
    generation: u64,
    commands: mpsc::UnboundedSender<LinkCommand>,
}

/// State shared by every client clone and the connection task.
pub(crate) struct ClientInner {
    pending: Arc<Mutex<CorrelationRegistry>>,
    subscriptions: Arc<Mutex<SubscriptionRegistry>>,
    router: Router,
    hooks: Mutex<LifecycleHooks>,
    link: Mutex<Option<Link>>,
    generations: AtomicU64,
    state: watch::Sender<ConnectionState>,
    request_timeout: Option<Duration>,
}

impl ClientInner {
    fn new(request_timeout: Option<Duration>) -> Self {
        let pending = Arc::new(Mutex::new(CorrelationRegistry::new()));
        let subscriptions = Arc::new(Mutex::new(SubscriptionRegistry::new()));
        let (state, _) = watch::channel(ConnectionState::Closed);

        Self {
            router: Router::new(Arc::clone(&pending), Arc::clone(&subscriptions)),
            pending,
            subscriptions,
            hooks: Mutex::new(LifecycleHooks::default()),
            link: Mutex::new(None),
            generations: AtomicU64::new(0),
            state,
            request_timeout,
        }
    }

    #[track_caller]
    fn register_request(
        &self,
        event: &EventName,
        generation: u64,
    ) -> Result<(RequestId, ResponseReceiver), ClientError> {
        let mut pending = lock(&self.pending);
        let mut attempt = 1;

        loop {
            let request_id = codec::generate_request_id()?;
            match pending.register(request_id.clone(), event.clone(), generation) {
                Ok(receiver) => return Ok((request_id, receiver)),
                Err(e) if attempt < MAX_REQUEST_ID_ATTEMPTS => {
                    warn!("{e}, drawing a new id");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Make `commands` the current link and return its generation. The link it
    /// replaces is told to close.
    pub(crate) fn attach(&self, commands: mpsc::UnboundedSender<LinkCommand>) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let mut link = lock(&self.link);

        if let Some(previous) = link.replace(Link {
            generation,
            commands,
        }) {
            info!("Replacing connection {} with a new one", previous.generation);
            let _ = previous.commands.send(LinkCommand::Close);
        }
        self.state.send_replace(ConnectionState::Connecting);

        generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        lock(&self.link)
            .as_ref()
            .is_some_and(|link| link.generation == generation)
    }

    fn has_link(&self) -> bool {
        lock(&self.link).is_some()
    }

    fn take_link(&self) -> Option<Link> {
        lock(&self.link).take()
    }

    /// Publish `state` if `generation` is still the current connection.
    pub(crate) fn set_state(&self, generation: u64, state: ConnectionState) {
        let link = lock(&self.link);
        if link.as_ref().is_some_and(|link| link.generation == generation) {
            self.state.send_replace(state);
        }
    }

    /// Retire connection `generation` for good: it will not reconnect.
    pub(crate) fn finish(&self, generation: u64) {
        let mut link = lock(&self.link);
        if link.as_ref().is_some_and(|link| link.generation == generation) {
            *link = None;
            self.state.send_replace(ConnectionState::Closed);
        }
    }

    pub(crate) fn handle_frame(&self, data: &[u8]) {
        match codec::decode_frame(data) {
            Ok(messages) => {
                self.router.dispatch_all(messages);
            }
            Err(e) => warn!("Dropping inbound frame: {e}"),
        }

        let hook = lock(&self.hooks).message.clone();
        if let Some(hook) = hook {
            hook(data);
        }
    }

    /// Publish `Closed` for connection `generation` and reject every request
    /// written to it.
    ///
    /// Both happen under the link lock, the same lock `send` holds while it
    /// checks the state and registers.
    pub(crate) fn close_generation(&self, generation: u64, close_event: &CloseEvent) {
        let abandoned = {
            let link = lock(&self.link);
            if link.as_ref().is_some_and(|link| link.generation == generation) {
                self.state.send_replace(ConnectionState::Closed);
            }
            lock(&self.pending).drain_generation(generation)
        };

        Self::reject_abandoned(abandoned, close_event);
    }

    fn reject_abandoned(abandoned: Vec<(RequestId, PendingRequest)>, close_event: &CloseEvent) {
        if abandoned.is_empty() {
            return;
        }

        info!(
            "Rejecting {} pending request(s) after connection closed",
            abandoned.len()
        );
        for (request_id, request) in abandoned {
            let reason = match close_event.kind {
                CloseKind::Intentional => "the client closed the connection",
                CloseKind::Clean => "the server closed the connection",
                CloseKind::Unexpected => "the connection was lost",
            };
            let error = ClientError::connection_closed(format!(
                "Request {request_id} for {} abandoned: {reason}",
                request.event()
            ));
            request.reject(error);
        }
    }

    pub(crate) fn emit_open(&self, address: &Url) {
        let hook = lock(&self.hooks).open.clone();
        if let Some(hook) = hook {
            hook(address);
        }
    }

    pub(crate) fn emit_close(&self, event: &CloseEvent) {
        let hook = lock(&self.hooks).close.clone();
        if let Some(hook) = hook {
            hook(event);
        }
    }

    pub(crate) fn emit_error(&self, error: &ClientError) {
        let hook = lock(&self.hooks).error.clone();
        if let Some(hook) = hook {
            hook(error);
        }
    }
}

/// Closes the connection when the last client clone goes away.
struct CloseOnDrop(Arc<ClientInner>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if let Some(link) = self.0.take_link() {
            debug!("Client dropped, closing connection {}", link.generation);
            let _ = link.commands.send(LinkCommand::Close);
        }
    }
}
