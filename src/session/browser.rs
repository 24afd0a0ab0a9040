//! Media browser handle and event loop.
//!
//! # Event Loop
//!
//! Building a browser spawns a tokio task that owns dispatch:
//!
//! - Binder and provider notifications, tagged with a [`ConnectionToken`]
//! - Results of single-item lookups
//! - Deferred failures that must not be reported inside an API call
//!
//! Events are handled one at a time. Application callbacks only ever run
//! on that task and never while the state lock is held, so they may call
//! back into the browser. The task keeps only a weak reference to the
//! browser; events arriving after it is dropped are discarded.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use crate::callback::{ConnectionCallback, ItemCallback, SubscriptionCallback};
use crate::error::{Error, RemoteError, Result};
use crate::identifiers::{ConnectionToken, ServiceComponent, SessionToken};
use crate::options::{BrowseOptions, OptionsKey};
use crate::transport::{
    BindRequest, BinderEvents, ConnectReply, ConnectRequest, RemoteService, ServiceCallbacks,
    TransportBinder,
};

use super::builder::MediaBrowserBuilder;
use super::event::{ChildrenEvent, SessionEvent};
use super::state::{ConnectionState, SessionState};

// ============================================================================
// Notification
// ============================================================================

/// Connection callback to invoke once the state lock is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notification {
    Connected,
    Suspended,
    Failed,
}

// ============================================================================
// BrowserInner
// ============================================================================

/// Shared state behind a [`MediaBrowser`] handle.
pub(crate) struct BrowserInner {
    /// Provider to bind.
    component: ServiceComponent,
    /// Identity sent in the connect call.
    client_name: String,
    /// Hints sent in the connect call.
    root_hints: Option<BrowseOptions>,
    /// Application connection callback.
    callback: Arc<dyn ConnectionCallback>,
    /// Channel establishment.
    binder: Arc<dyn TransportBinder>,
    /// Runtime the event loop and item lookups run on.
    runtime: Handle,
    /// Sender side of the event loop.
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    /// Guarded session state.
    state: Mutex<SessionState>,
}

// ============================================================================
// MediaBrowser
// ============================================================================

/// Client for browsing a media provider's content tree.
///
/// Cheap to clone; clones share one session. Dropping the last clone
/// performs the same teardown as [`disconnect`](Self::disconnect).
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use media_browser::{MediaBrowser, ServiceComponent};
///
/// let browser = MediaBrowser::builder()
///     .component(ServiceComponent::new("com.example.music", "BrowserService")?)
///     .client_name("com.example.player")
///     .callback(Arc::new(MyConnectionCallback))
///     .binder(Arc::new(MyBinder::default()))
///     .build()?;
///
/// browser.subscribe("root", None, Arc::new(MyChildrenCallback))?;
/// browser.connect()?;
/// ```
#[derive(Clone)]
pub struct MediaBrowser {
    /// Shared inner state.
    pub(crate) inner: Arc<BrowserInner>,
}

// ============================================================================
// MediaBrowser - Display
// ============================================================================

impl fmt::Debug for MediaBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBrowser")
            .field("component", &self.inner.component)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MediaBrowser - Constructor
// ============================================================================

impl MediaBrowser {
    /// Creates a builder for configuring a browser.
    #[inline]
    #[must_use]
    pub fn builder() -> MediaBrowserBuilder {
        MediaBrowserBuilder::new()
    }

    /// Creates the browser and spawns its event loop on `runtime`.
    pub(crate) fn spawn(
        component: ServiceComponent,
        client_name: String,
        root_hints: Option<BrowseOptions>,
        callback: Arc<dyn ConnectionCallback>,
        binder: Arc<dyn TransportBinder>,
        runtime: Handle,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(BrowserInner {
            component,
            client_name,
            root_hints,
            callback,
            binder,
            runtime: runtime.clone(),
            events_tx,
            state: Mutex::new(SessionState::default()),
        });

        runtime.spawn(run_event_loop(Arc::downgrade(&inner), events_rx));

        debug!(component = %inner.component, "MediaBrowser created");

        Self { inner }
    }
}

// ============================================================================
// MediaBrowser - Connection
// ============================================================================

impl MediaBrowser {
    /// Starts connecting to the provider.
    ///
    /// Returns immediately. The outcome is reported through the
    /// [`ConnectionCallback`]: `on_connected` or `on_connection_failed`.
    /// Allowed while disconnected or suspended.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if already connecting or connected
    pub fn connect(&self) -> Result<()> {
        let inner = &self.inner;
        let mut state = inner.state.lock();

        match state.connection_state {
            ConnectionState::Disconnected => {}
            ConnectionState::Suspended => {
                debug!(component = %inner.component, "Releasing suspended binding before reconnect");
                inner.reset(&mut state);
            }
            current => return Err(Error::invalid_state("connect", current)),
        }

        let token = ConnectionToken::generate();
        state.begin_attempt(token);

        let request = BindRequest {
            component: inner.component.clone(),
            token,
        };
        let events = BinderEvents::new(token, inner.events_tx.clone());

        if !inner.binder.bind(&request, events) {
            // Reported from the loop so no callback runs inside connect().
            warn!(component = %inner.component, "Failed binding to service");
            inner.post(SessionEvent::BindFailed { token });
        }

        info!(component = %inner.component, %token, "Connecting");
        Ok(())
    }

    /// Disconnects from the provider.
    ///
    /// Safe to call in any state. Subscriptions are kept and replayed on the
    /// next successful connect. No connection callback is invoked.
    pub fn disconnect(&self) {
        let mut state = self.inner.state.lock();
        self.inner.teardown(&mut state);
    }

    /// Returns `true` if connected.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().connection_state
    }

    /// Waits until every event queued so far has been dispatched.
    ///
    /// Events posted after this call are not waited for.
    pub async fn idle(&self) {
        let (tx, rx) = oneshot::channel();
        self.inner.post(SessionEvent::Barrier(tx));
        let _ = rx.await;
    }

    /// Logs the complete session state at debug level.
    pub fn dump(&self) {
        let state = self.inner.state.lock();
        debug!(
            component = %self.inner.component,
            client_name = %self.inner.client_name,
            root_hints = ?self.inner.root_hints,
            state = ?*state,
            "MediaBrowser dump"
        );
    }
}

// ============================================================================
// MediaBrowser - Accessors
// ============================================================================

impl MediaBrowser {
    /// Returns the root node id.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if not connected
    pub fn root(&self) -> Result<String> {
        let state = self.inner.state.lock();
        state.require_connected("root")?;
        Ok(state.root_id.clone().unwrap_or_default())
    }

    /// Returns the provider's media session token.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if not connected
    pub fn session_token(&self) -> Result<SessionToken> {
        let state = self.inner.state.lock();
        state.require_connected("session_token")?;
        state
            .session_token
            .clone()
            .ok_or_else(|| Error::invalid_state("session_token", state.connection_state))
    }

    /// Returns the extras from the connect reply.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if not connected
    pub fn extras(&self) -> Result<Option<BrowseOptions>> {
        let state = self.inner.state.lock();
        state.require_connected("extras")?;
        Ok(state.extras.clone())
    }

    /// Returns the provider component this browser is connected to.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if not connected
    pub fn service_component(&self) -> Result<ServiceComponent> {
        self.inner.state.lock().require_connected("service_component")?;
        Ok(self.inner.component.clone())
    }
}

// ============================================================================
// MediaBrowser - Subscriptions
// ============================================================================

impl MediaBrowser {
    /// Subscribes to the children of `node_id`.
    ///
    /// Re-subscribing with equal options replaces the callback; absent and
    /// empty options are equal. While connected the provider is told right
    /// away; otherwise the subscription is sent on the next connect.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `node_id` is empty
    pub fn subscribe(
        &self,
        node_id: &str,
        options: Option<BrowseOptions>,
        callback: Arc<dyn SubscriptionCallback>,
    ) -> Result<()> {
        if node_id.is_empty() {
            return Err(Error::invalid_argument("node id must not be empty"));
        }

        let mut state = self.inner.state.lock();
        let key = OptionsKey::new(options);
        let replaced = state.subscriptions.insert(node_id, key.clone(), callback);

        debug!(node_id, replaced, options = ?key.options(), "Subscribed");

        if let Some((service, token)) = state.live_service()
            && let Err(e) = service.add_subscription(token, node_id, key.options())
        {
            self.inner.rpc_failed(token, "add_subscription", e);
        }

        Ok(())
    }

    /// Unsubscribes the callback registered for `node_id` and `options`.
    ///
    /// Does nothing if no such subscription exists.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `node_id` is empty
    pub fn unsubscribe(&self, node_id: &str, options: Option<&BrowseOptions>) -> Result<()> {
        if node_id.is_empty() {
            return Err(Error::invalid_argument("node id must not be empty"));
        }

        let mut state = self.inner.state.lock();
        let Some(removed) = state.subscriptions.remove(node_id, options) else {
            trace!(node_id, "Unsubscribe for unknown subscription");
            return Ok(());
        };

        debug!(node_id, options = ?removed.options(), "Unsubscribed");

        if let Some((service, token)) = state.live_service()
            && let Err(e) = service.remove_subscription(token, node_id, removed.options())
        {
            self.inner.rpc_failed(token, "remove_subscription", e);
        }

        Ok(())
    }
}

// ============================================================================
// MediaBrowser - Items
// ============================================================================

impl MediaBrowser {
    /// Looks up a single item.
    ///
    /// The result is always delivered later through `callback`, never from
    /// inside this call. When not connected, `on_error` is delivered without
    /// contacting the provider.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `media_id` is empty
    pub fn get_item(&self, media_id: &str, callback: Arc<dyn ItemCallback>) -> Result<()> {
        if media_id.is_empty() {
            return Err(Error::invalid_argument("media id must not be empty"));
        }

        let media_id = media_id.to_owned();
        let live = self.inner.state.lock().live_service();

        let Some((service, _)) = live else {
            info!(%media_id, "Not connected, unable to retrieve the MediaItem");
            self.inner.post(SessionEvent::ItemLoaded {
                media_id,
                item: None,
                callback,
            });
            return Ok(());
        };

        let events_tx = self.inner.events_tx.clone();
        self.inner.runtime.spawn(async move {
            let item = match service.get_item(&media_id).await {
                Ok(item) => item,
                Err(e) => {
                    warn!(%media_id, error = %e, "Remote error getting media item");
                    None
                }
            };
            let _ = events_tx.send(SessionEvent::ItemLoaded {
                media_id,
                item,
                callback,
            });
        });

        Ok(())
    }
}

// ============================================================================
// BrowserInner - Helpers
// ============================================================================

impl BrowserInner {
    /// Queues an event for the loop.
    fn post(&self, event: SessionEvent) {
        if let Err(e) = self.events_tx.send(event) {
            trace!(event = ?e.0, "Event loop closed, event dropped");
        }
    }

    /// Clears connection-scoped state and releases the binding.
    fn reset(&self, state: &mut SessionState) {
        if let Some(bound) = state.reset() {
            self.binder.unbind(bound);
        }
    }

    /// Deliberate shutdown: best-effort disconnect call, then reset.
    fn teardown(&self, state: &mut SessionState) {
        if let (Some(service), Some(token)) = (state.service.clone(), state.token)
            && let Err(e) = service.disconnect(token)
        {
            warn!(component = %self.component, error = %e, "Error during disconnect, ignoring");
        }

        let previous = state.connection_state;
        self.reset(state);

        if previous != ConnectionState::Disconnected {
            info!(component = %self.component, from = %previous, "Disconnected");
        }
    }

    /// Logs a failed one-way call and treats a lost channel as an unbind.
    fn rpc_failed(&self, token: ConnectionToken, operation: &'static str, error: RemoteError) {
        warn!(operation, error = %error, "Provider call failed");
        if error.is_connection_lost() {
            self.post(SessionEvent::ServiceLost { token, error });
        }
    }

    /// Invokes a connection callback. Must be called without the state lock.
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Connected => self.callback.on_connected(),
            Notification::Suspended => self.callback.on_connection_suspended(),
            Notification::Failed => self.callback.on_connection_failed(),
        }
    }

    /// Drops events from superseded attempts.
    fn check_current(state: &SessionState, token: ConnectionToken, event: &'static str) -> bool {
        if state.is_current(token) {
            return true;
        }
        if state.connection_state != ConnectionState::Disconnected {
            debug!(%token, current = ?state.token, event, "Dropping event from stale connection");
        }
        false
    }

    /// Drops binder events for a binding that has since been released.
    fn check_bound(state: &SessionState, bound: ConnectionToken, event: &'static str) -> bool {
        if state.is_bound(bound) {
            return true;
        }
        debug!(%bound, current = ?state.bound, event, "Dropping event from released binding");
        false
    }
}

// ============================================================================
// BrowserInner - Event Handlers
// ============================================================================

impl BrowserInner {
    /// Handles one event from the loop.
    fn handle_event(&self, event: SessionEvent) {
        trace!(?event, "Dispatching");

        let notification = match event {
            SessionEvent::BindFailed { token } => self.on_attempt_failed(token, "bind"),
            SessionEvent::Bound { token, service } => self.on_bound(token, service),
            SessionEvent::Unbound { token } => self.on_unbound(token),
            SessionEvent::Connected { token, reply } => self.on_connect_reply(token, reply),
            SessionEvent::ConnectFailed { token } => self.on_attempt_failed(token, "connect"),
            SessionEvent::ServiceLost { token, error } => self.on_service_lost(token, &error),
            SessionEvent::ChildrenLoaded { token, event } => {
                self.on_children_loaded(token, event);
                None
            }
            SessionEvent::ItemLoaded {
                media_id,
                item,
                callback,
            } => {
                match item {
                    Some(item) => callback.on_item_loaded(item),
                    None => callback.on_error(&media_id),
                }
                None
            }
            SessionEvent::Barrier(tx) => {
                let _ = tx.send(());
                None
            }
        };

        if let Some(notification) = notification {
            self.notify(notification);
        }
    }

    /// The binder reported the channel; ask the provider to connect.
    ///
    /// While suspended this is the transport restoring the binding on its
    /// own: a new attempt starts over it and subscriptions are replayed once
    /// the provider accepts.
    fn on_bound(
        &self,
        bound: ConnectionToken,
        service: Arc<dyn RemoteService>,
    ) -> Option<Notification> {
        let mut state = self.state.lock();
        if !Self::check_bound(&state, bound, "bound") {
            return None;
        }

        let token = match state.connection_state {
            ConnectionState::Connecting => state.token?,
            ConnectionState::Suspended => {
                let token = ConnectionToken::generate();
                info!(component = %self.component, %token, "Channel restored, reconnecting");
                state.resume_attempt(token);
                token
            }
            other => {
                warn!(state = %other, "Bound while not connecting, ignoring");
                return None;
            }
        };

        state.service = Some(Arc::clone(&service));

        let request = ConnectRequest {
            client_name: self.client_name.clone(),
            root_hints: self.root_hints.clone(),
            token,
        };
        let callbacks = ServiceCallbacks::new(token, self.events_tx.clone());

        debug!(component = %self.component, %token, "Service bound, connecting");

        match service.connect(&request, callbacks) {
            Ok(()) => None,
            Err(e) => {
                warn!(component = %self.component, error = %e, "Error during connect");
                self.reset(&mut state);
                Some(Notification::Failed)
            }
        }
    }

    /// The provider accepted: enter `Connected` and replay subscriptions.
    fn on_connect_reply(&self, token: ConnectionToken, reply: ConnectReply) -> Option<Notification> {
        let mut state = self.state.lock();
        if !Self::check_current(&state, token, "connect") {
            return None;
        }
        if state.connection_state != ConnectionState::Connecting {
            warn!(state = %state.connection_state, "Connect reply while not connecting, ignoring");
            return None;
        }

        let ConnectReply {
            root_id,
            session_token,
            extras,
        } = reply;

        let session_token = match SessionToken::new(session_token) {
            Ok(session_token) if !root_id.is_empty() => session_token,
            _ => {
                warn!(component = %self.component, "Connect reply without root or session token");
                self.reset(&mut state);
                return Some(Notification::Failed);
            }
        };

        state.complete_connect(root_id, session_token, extras);

        info!(component = %self.component, root = ?state.root_id, "Connected");

        if let Some((service, token)) = state.live_service() {
            for (node_id, options) in state.subscriptions.replay_entries() {
                debug!(%node_id, ?options, "Re-subscribing");
                if let Err(e) = service.add_subscription(token, &node_id, options.as_ref()) {
                    self.rpc_failed(token, "add_subscription", e);
                }
            }
        }

        Some(Notification::Connected)
    }

    /// Bind or connect was refused.
    fn on_attempt_failed(&self, token: ConnectionToken, stage: &'static str) -> Option<Notification> {
        let mut state = self.state.lock();
        if !Self::check_current(&state, token, stage) {
            return None;
        }
        if state.connection_state != ConnectionState::Connecting {
            warn!(stage, state = %state.connection_state, "Connect failure while not connecting, ignoring");
            return None;
        }

        warn!(component = %self.component, stage, "Connection failed");
        self.reset(&mut state);
        Some(Notification::Failed)
    }

    /// The binder lost the channel without a `disconnect()`.
    fn on_unbound(&self, bound: ConnectionToken) -> Option<Notification> {
        let mut state = self.state.lock();
        if !Self::check_bound(&state, bound, "unbound") {
            return None;
        }
        self.channel_lost(&mut state)
    }

    /// A call on the live attempt failed at the transport level.
    fn on_service_lost(&self, token: ConnectionToken, error: &RemoteError) -> Option<Notification> {
        let mut state = self.state.lock();
        if !Self::check_current(&state, token, "service_lost") {
            return None;
        }
        debug!(%token, error = %error, "Treating failed call as lost channel");
        self.channel_lost(&mut state)
    }

    fn channel_lost(&self, state: &mut SessionState) -> Option<Notification> {
        match state.connection_state {
            ConnectionState::Connecting => {
                warn!(component = %self.component, "Channel lost while connecting");
                self.reset(state);
                Some(Notification::Failed)
            }
            ConnectionState::Connected => {
                info!(component = %self.component, "Connection suspended");
                state.suspend();
                Some(Notification::Suspended)
            }
            other => {
                debug!(state = %other, "Unbound in inactive state, ignoring");
                None
            }
        }
    }

    /// Routes pushed children to the matching subscription callback.
    fn on_children_loaded(&self, token: ConnectionToken, event: ChildrenEvent) {
        let entry = {
            let state = self.state.lock();
            if !Self::check_current(&state, token, "load_children") {
                return;
            }
            state
                .subscriptions
                .entry(&event.parent_id, event.options.as_ref())
        };

        match entry {
            Some((key, callback)) => event.dispatch(callback.as_ref(), &key),
            None => debug!(
                parent_id = %event.parent_id,
                options = ?event.options,
                "Children for unsubscribed node, dropping"
            ),
        }
    }
}

impl Drop for BrowserInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.connection_state != ConnectionState::Disconnected || state.bound.is_some() {
            let mut state = std::mem::take(state);
            self.teardown(&mut state);
        }
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Handles events until the browser is dropped or every sender is gone.
async fn run_event_loop(
    inner: Weak<BrowserInner>,
    mut events_rx: mpsc::UnboundedReceiver<SessionEvent>,
) {
    debug!("Event loop started");

    while let Some(event) = events_rx.recv().await {
        let Some(inner) = inner.upgrade() else {
            trace!(?event, "Browser dropped, discarding event");
            break;
        };
        inner.handle_event(event);
    }

    debug!("Event loop terminated");
}
