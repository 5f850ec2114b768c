//! # Hub
//!
//! Caches the most recent [`NodeStats`] and fans it out to every connected
//! viewer.
//!
//! Two independently locked pieces of state live here:
//!
//! - the snapshot cache, behind a read/write lock that writers hold only for
//!   the pointer swap
//! - the subscriber set, behind a mutex that is never held across a network
//!   write
//!
//! Each subscriber additionally sits behind its own async mutex. A write to
//! one viewer therefore never blocks registration of another, and a new
//! viewer's initial snapshot is always written before any broadcast reaches
//! it.
//!
//! Dropping a subscriber cancels its read loop at once. Its sink is closed
//! after the broadcast lock is released, bounded by the write timeout, so a
//! dead peer can never hold up later updates.

use crate::metrics::NodeStats;
use eyre::{
    eyre,
    Result,
};
use futures::{
    future::join_all,
    Stream,
    StreamExt,
};
use parking_lot::{
    Mutex,
    RwLock,
};
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{
            AtomicU64,
            Ordering,
        },
        Arc,
    },
    time::Duration,
};
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

/// Upper bound for a single write to a single subscriber.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// A serialized snapshot, encoded once per broadcast and shared by all writes.
pub type Payload = Arc<str>;

pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// The outbound half of a viewer connection.
pub trait SnapshotSink: Send + 'static {
    /// Writes one text message to the viewer.
    fn send(&mut self, payload: Payload) -> SinkFuture<'_>;

    /// Releases the underlying connection. Called at most once.
    fn close(&mut self) -> SinkFuture<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

struct Subscriber {
    sink: Box<dyn SnapshotSink>,
    closed: bool,
}

#[derive(Clone)]
struct Registration {
    subscriber: Arc<AsyncMutex<Subscriber>>,
    /// Cancelled once the hub drops the subscriber; ends its read loop.
    dropped: CancellationToken,
}

pub struct Hub {
    latest: RwLock<Option<Arc<NodeStats>>>,
    subscribers: Mutex<HashMap<SubscriberId, Registration>>,
    /// Serializes update/broadcast so viewers see snapshots in update order.
    broadcast_order: AsyncMutex<()>,
    next_id: AtomicU64,
    write_timeout: Duration,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("has_snapshot", &self.latest.read().is_some())
            .field("subscribers", &self.subscriber_count())
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

impl Hub {
    pub fn new() -> Self {
        Self::with_write_timeout(DEFAULT_WRITE_TIMEOUT)
    }

    pub fn with_write_timeout(write_timeout: Duration) -> Self {
        Self {
            latest: RwLock::new(None),
            subscribers: Mutex::new(HashMap::new()),
            broadcast_order: AsyncMutex::new(()),
            next_id: AtomicU64::new(1),
            write_timeout,
        }
    }

    /// The cached snapshot, or `None` before the first collector cycle
    /// completed.
    pub fn latest(&self) -> Option<Arc<NodeStats>> {
        self.latest.read().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Registers a viewer and keeps it registered until `inbound` fails or
    /// ends.
    ///
    /// The current snapshot, if any, is written first. Inbound items are
    /// discarded; the stream only serves as the liveness signal. This future
    /// runs for the lifetime of the connection, so callers should give each
    /// viewer its own task.
    pub async fn connect<S, R, T, E>(&self, sink: S, mut inbound: R)
    where
        S: SnapshotSink,
        R: Stream<Item = Result<T, E>> + Unpin,
        E: fmt::Display,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let registration = Registration {
            subscriber: Arc::new(AsyncMutex::new(Subscriber {
                sink: Box::new(sink),
                closed: false,
            })),
            dropped: CancellationToken::new(),
        };
        let dropped = registration.dropped.clone();

        let initial_write = {
            // Broadcasts that pick up this subscriber queue on this guard until
            // the initial snapshot is out.
            let mut guard = registration.subscriber.lock().await;
            self.subscribers.lock().insert(id, registration.clone());
            debug!(%id, "Subscriber connected");

            match self.latest_payload() {
                Some(payload) => self.write(&mut guard, payload).await,
                None => Ok(()),
            }
        };

        if let Err(e) = initial_write {
            warn!(%id, "Failed to send current stats to new subscriber: {e}");
            self.remove(id).await;
            return;
        }

        loop {
            tokio::select! {
                _ = dropped.cancelled() => {
                    debug!(%id, "Subscriber dropped by the hub");
                    return;
                }
                item = inbound.next() => match item {
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(%id, "Subscriber read failed: {e}");
                        break;
                    }
                    None => {
                        debug!(%id, "Subscriber closed the connection");
                        break;
                    }
                },
            }
        }

        self.remove(id).await;
    }

    /// Replaces the cached snapshot and broadcasts it.
    pub async fn update(&self, stats: NodeStats) {
        let failed = {
            let _order = self.broadcast_order.lock().await;
            *self.latest.write() = Some(Arc::new(stats));
            self.fan_out().await
        };
        self.close_all(failed).await;
    }

    /// Sends the cached snapshot to every registered subscriber.
    pub async fn broadcast(&self) {
        let failed = {
            let _order = self.broadcast_order.lock().await;
            self.fan_out().await
        };
        self.close_all(failed).await;
    }

    /// Writes the cached snapshot to every subscriber and detaches the ones
    /// that failed. Closing them is left to the caller.
    async fn fan_out(&self) -> Vec<(SubscriberId, Registration)> {
        let Some(payload) = self.latest_payload() else {
            return Vec::new();
        };

        let targets = self
            .subscribers
            .lock()
            .iter()
            .map(|(id, registration)| (*id, registration.subscriber.clone()))
            .collect::<Vec<_>>();

        trace!(subscribers = targets.len(), bytes = payload.len(), "Broadcasting stats");

        let results = join_all(targets.into_iter().map(|(id, subscriber)| {
            let payload = payload.clone();
            async move {
                let mut guard = subscriber.lock().await;
                (id, self.write(&mut guard, payload).await)
            }
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(id, result)| {
                let e = result.err()?;
                warn!(%id, "Error sending to subscriber, dropping it: {e}");
                self.detach(id).map(|registration| (id, registration))
            })
            .collect()
    }

    /// Drops every subscriber, e.g. on shutdown. Their `connect` calls return
    /// right away.
    pub async fn disconnect_all(&self) {
        let detached = {
            let mut subscribers = self.subscribers.lock();
            subscribers.drain().collect::<Vec<_>>()
        };
        debug!(subscribers = detached.len(), "Disconnecting all subscribers");
        for (_, registration) in &detached {
            registration.dropped.cancel();
        }
        self.close_all(detached).await;
    }

    fn latest_payload(&self) -> Option<Payload> {
        let latest = self.latest()?;
        match latest.to_json() {
            Ok(json) => Some(json.into()),
            Err(e) => {
                error!("Error serializing stats: {e}");
                None
            }
        }
    }

    async fn write(&self, subscriber: &mut Subscriber, payload: Payload) -> Result<()> {
        if subscriber.closed {
            return Ok(());
        }
        match tokio::time::timeout(self.write_timeout, subscriber.sink.send(payload)).await {
            Ok(result) => result,
            Err(_) => Err(eyre!("write timed out after {:?}", self.write_timeout)),
        }
    }

    /// Removes and closes a subscriber. Only the first call for a given id has
    /// any effect.
    async fn remove(&self, id: SubscriberId) {
        if let Some(registration) = self.detach(id) {
            self.close(id, registration).await;
        }
    }

    /// Takes a subscriber out of the set and stops its read loop.
    fn detach(&self, id: SubscriberId) -> Option<Registration> {
        let registration = self.subscribers.lock().remove(&id)?;
        registration.dropped.cancel();
        Some(registration)
    }

    async fn close_all(&self, detached: Vec<(SubscriberId, Registration)>) {
        join_all(
            detached
                .into_iter()
                .map(|(id, registration)| self.close(id, registration)),
        )
        .await;
    }

    async fn close(&self, id: SubscriberId, registration: Registration) {
        let mut subscriber = registration.subscriber.lock().await;
        subscriber.closed = true;
        match tokio::time::timeout(self.write_timeout, subscriber.sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(%id, "Error closing subscriber: {e}"),
            Err(_) => debug!(%id, "Closing subscriber timed out after {:?}", self.write_timeout),
        }
        debug!(%id, "Subscriber removed");
    }
}
