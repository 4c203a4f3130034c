//! Resource isolation pool.
//!
//! Hands each generator invocation its own exclusively-owned resource handle
//! (a connection, a session, a client) so that concurrently running generators
//! never interleave operations on one shared handle.
//!
//! A [`PooledHandle`] is a scoped acquisition: it is released exactly once, when
//! it is dropped. That covers normal return, early return on error, panic
//! unwinding and cancellation (the invocation future being dropped) alike.
//!
//! When the pool is bounded, waiting for a free slot suspends only the task
//! that asked for it.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::PoolConfig;
use crate::error::PoolError;

/// Creates the resources a [`HandlePool`] hands out.
#[async_trait]
pub trait ResourceFactory: Send + Sync + 'static {
    /// The resource type.
    type Resource: Send + 'static;

    /// Open a fresh resource.
    async fn create(&self) -> Result<Self::Resource, PoolError>;

    /// Whether an idle resource may be handed out again.
    fn is_reusable(&self, _resource: &Self::Resource) -> bool {
        true
    }
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources created by the factory so far.
    pub created: u64,
    /// Resources waiting in the pool for reuse.
    pub idle: usize,
    /// Handles currently checked out.
    pub in_use: usize,
    /// Handles released so far.
    pub released: u64,
}

struct Slot<R> {
    id: u64,
    resource: R,
}

struct Shared<R> {
    idle: Mutex<Vec<Slot<R>>>,
    closed: AtomicBool,
    in_use: AtomicUsize,
    created: AtomicU64,
    released: AtomicU64,
}

impl<R> Shared<R> {
    fn idle(&self) -> std::sync::MutexGuard<'_, Vec<Slot<R>>> {
        self.idle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A pool of exclusively-owned resource handles.
pub struct HandlePool<F: ResourceFactory> {
    factory: F,
    shared: Arc<Shared<F::Resource>>,
    permits: Option<Arc<Semaphore>>,
    acquire_timeout: Option<Duration>,
    next_id: AtomicU64,
}

impl<F: ResourceFactory> HandlePool<F> {
    /// Create an unbounded pool.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, &PoolConfig::default())
    }

    /// Create a pool with the limits from `config`.
    ///
    /// `max_handles` above [`Semaphore::MAX_PERMITS`] is capped to it.
    pub fn with_config(factory: F, config: &PoolConfig) -> Self {
        Self {
            factory,
            shared: Arc::new(Shared {
                idle: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                in_use: AtomicUsize::new(0),
                created: AtomicU64::new(0),
                released: AtomicU64::new(0),
            }),
            permits: config
                .max_handles
                .map(|n| Arc::new(Semaphore::new(n.min(Semaphore::MAX_PERMITS)))),
            acquire_timeout: config.acquire_timeout_ms.map(Duration::from_millis),
            next_id: AtomicU64::new(1),
        }
    }

    /// Check out a handle for exclusive use.
    ///
    /// Reuses an idle resource when the factory allows it, otherwise creates
    /// a new one. On a bounded pool this waits for a free slot.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Closed`] once [`close`](Self::close) has been called.
    /// - [`PoolError::AcquireTimeout`] if no slot frees up in time.
    /// - [`PoolError::Create`] if the factory fails.
    pub async fn acquire(&self) -> Result<PooledHandle<F::Resource>, PoolError> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        let permit = match &self.permits {
            Some(permits) => Some(self.wait_for_permit(Arc::clone(permits)).await?),
            None => None,
        };

        let slot = match self.take_idle() {
            Some(slot) => slot,
            None => {
                let resource = self.factory.create().await?;
                self.shared.created.fetch_add(1, Ordering::Relaxed);
                Slot {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    resource,
                }
            }
        };

        self.shared.in_use.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(handle_id = slot.id, "resource acquired");

        Ok(PooledHandle {
            slot: Some(slot),
            shared: Arc::clone(&self.shared),
            _permit: permit,
        })
    }

    /// Return a handle to the pool. Equivalent to dropping it.
    pub fn release(&self, handle: PooledHandle<F::Resource>) {
        drop(handle);
    }

    /// Stop handing out handles. Idle resources are dropped; handles still
    /// checked out are discarded when released. Waiters fail with
    /// [`PoolError::Closed`].
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        if let Some(permits) = &self.permits {
            permits.close();
        }
        self.shared.idle().clear();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Current counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.shared.created.load(Ordering::Relaxed),
            idle: self.shared.idle().len(),
            in_use: self.shared.in_use.load(Ordering::Acquire),
            released: self.shared.released.load(Ordering::Relaxed),
        }
    }

    async fn wait_for_permit(&self, permits: Arc<Semaphore>) -> Result<OwnedSemaphorePermit, PoolError> {
        let acquire = permits.acquire_owned();
        let permit = match self.acquire_timeout {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .map_err(|_| PoolError::AcquireTimeout(limit.as_millis() as u64))?,
            None => acquire.await,
        };
        permit.map_err(|_| PoolError::Closed)
    }

    fn take_idle(&self) -> Option<Slot<F::Resource>> {
        let mut idle = self.shared.idle();
        while let Some(slot) = idle.pop() {
            if self.factory.is_reusable(&slot.resource) {
                return Some(slot);
            }
            tracing::trace!(handle_id = slot.id, "discarding stale resource");
        }
        None
    }
}

/// An exclusively-owned resource checked out of a [`HandlePool`].
///
/// Released back to the pool when dropped.
pub struct PooledHandle<R> {
    slot: Option<Slot<R>>,
    shared: Arc<Shared<R>>,
    // Dropped after `slot` is back in the pool, so a waiter woken by the
    // permit finds the resource idle.
    _permit: Option<OwnedSemaphorePermit>,
}

impl<R> PooledHandle<R> {
    /// Identifier of this handle, unique within its pool.
    pub fn id(&self) -> u64 {
        self.slot.as_ref().map_or(0, |slot| slot.id)
    }

    /// Shared access to the resource.
    pub fn resource(&self) -> Option<&R> {
        self.slot.as_ref().map(|slot| &slot.resource)
    }

    /// Exclusive access to the resource.
    pub fn resource_mut(&mut self) -> &mut R {
        // The slot is only taken in `Drop`.
        match self.slot.as_mut() {
            Some(slot) => &mut slot.resource,
            None => unreachable!("pooled handle used after release"),
        }
    }
}

impl<R> Drop for PooledHandle<R> {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        let handle_id = slot.id;
        if !self.shared.closed.load(Ordering::Acquire) {
            self.shared.idle().push(slot);
        }
        self.shared.in_use.fetch_sub(1, Ordering::AcqRel);
        self.shared.released.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(handle_id, "resource released");
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for PooledHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledHandle")
            .field("id", &self.id())
            .field("resource", &self.resource())
            .finish()
    }
}

/// A lightweight in-process session, the default per-invocation resource.
#[derive(Debug, Clone)]
pub struct Session {
    opened_at: DateTime<Utc>,
    requests: u64,
}

impl Session {
    /// When the session was opened.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Count one request issued through this session.
    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    /// Requests issued through this session over its lifetime.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

/// Opens [`Session`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFactory;

#[async_trait]
impl ResourceFactory for SessionFactory {
    type Resource = Session;

    async fn create(&self) -> Result<Session, PoolError> {
        Ok(Session {
            opened_at: Utc::now(),
            requests: 0,
        })
    }
}
