//! Lazy cross-reference resolution.
//!
//! Entities reference other entities only by snowflake. The accessors that
//! surface those relations hand out a [`CacheProxy`] (single reference) or a
//! [`CacheView`] (list of references) instead of the entity itself; both defer
//! the actual lookup to a resolution function supplied by the cache
//! collaborator. A lookup either completes synchronously (the entity was
//! cache-resident) or suspends to fetch, and [`Resolution`] makes that split
//! explicit rather than hiding it behind a polymorphic return type.
//!
//! Neither proxy nor view caches results or mutates the stored IDs; repeated
//! resolution re-invokes the lookup and leans entirely on the collaborator
//! for memoisation.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_lite::future::Boxed;

use crate::error::Error;
use crate::snowflake::Snowflake;

/// Resolution function: maps an ID to a [`Resolution`].
///
/// Supplied per entity kind by the cache collaborator.
pub type LookupFn<T> = Arc<dyn Fn(Snowflake) -> Resolution<T> + Send + Sync>;

// ---------------------------------------------------------------------------
// Resolution: the tagged "maybe cached, maybe awaitable" result
// ---------------------------------------------------------------------------

/// The outcome of a single lookup call.
///
/// Either the entity was already cache-resident ([`Resolution::is_ready`]
/// returns `true` and [`Resolution::into_ready`] yields it without
/// suspending), or resolving it requires awaiting. `Resolution` implements
/// [`Future`] so both cases can be awaited uniformly:
///
/// ```ignore
/// let creator = emoji.creator(&cache).unwrap().resolve().await?;
/// ```
pub struct Resolution<T> {
    state: State<T>,
}

enum State<T> {
    Ready(Option<T>),
    Deferred(Boxed<Result<T, Error>>),
}

impl<T> Resolution<T> {
    /// A lookup that completed synchronously.
    pub fn ready(value: T) -> Self {
        Self {
            state: State::Ready(Some(value)),
        }
    }

    /// A lookup that must suspend to complete.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, Error>> + Send + 'static,
    {
        Self {
            state: State::Deferred(Box::pin(future)),
        }
    }

    /// Whether the value is available without awaiting.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(Some(_)))
    }

    /// Take the value if it resolved synchronously, `None` otherwise.
    pub fn into_ready(self) -> Option<T> {
        match self.state {
            State::Ready(value) => value,
            State::Deferred(_) => None,
        }
    }
}

impl<T: Unpin> Future for Resolution<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Ready(slot) => {
                let value = slot.take().expect("Resolution polled after completion");
                Poll::Ready(Ok(value))
            }
            State::Deferred(future) => future.as_mut().poll(cx),
        }
    }
}

impl<T> fmt::Debug for Resolution<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Ready(_) => "ready",
            State::Deferred(_) => "deferred",
        };
        f.debug_struct("Resolution").field("state", &state).finish()
    }
}

// ---------------------------------------------------------------------------
// CacheProxy: a single deferred reference
// ---------------------------------------------------------------------------

/// A stored entity reference: an ID plus the lookup that resolves it.
///
/// Produced by entity accessors like `CustomEmoji::creator`. Resolving never
/// mutates the stored ID, and the proxy performs exactly one lookup call per
/// [`CacheProxy::resolve`]. A reference to a proxy can be awaited directly
/// (`(&proxy).await`), mirroring the "awaitable property" shape.
pub struct CacheProxy<T> {
    id: Snowflake,
    lookup: LookupFn<T>,
}

impl<T> CacheProxy<T> {
    pub fn new<F>(id: Snowflake, lookup: F) -> Self
    where
        F: Fn(Snowflake) -> Resolution<T> + Send + Sync + 'static,
    {
        Self {
            id,
            lookup: Arc::new(lookup),
        }
    }

    pub(crate) fn from_shared(id: Snowflake, lookup: LookupFn<T>) -> Self {
        Self { id, lookup }
    }

    /// The referenced entity's ID.
    pub fn id(&self) -> Snowflake {
        self.id
    }

    /// Invoke the lookup once.
    ///
    /// Failures (including [`Error::NotFound`]) surface only when the
    /// returned [`Resolution`] is forced, never here.
    pub fn resolve(&self) -> Resolution<T> {
        (self.lookup)(self.id)
    }
}

impl<T> Clone for CacheProxy<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<T> fmt::Debug for CacheProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheProxy").field("id", &self.id).finish()
    }
}

impl<'a, T: Unpin> IntoFuture for &'a CacheProxy<T> {
    type Output = Result<T, Error>;
    type IntoFuture = Resolution<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.resolve()
    }
}

// ---------------------------------------------------------------------------
// CacheView: a lazily-resolved list of references
// ---------------------------------------------------------------------------

/// A view over a list of entity references.
///
/// Each element resolves independently through the same lookup, in the order
/// the IDs were stored. Elements that fail resolution are reported
/// individually; one dangling reference never poisons the rest of the view.
pub struct CacheView<T> {
    ids: Vec<Snowflake>,
    lookup: LookupFn<T>,
}

impl<T> CacheView<T> {
    pub fn new<F>(ids: Vec<Snowflake>, lookup: F) -> Self
    where
        F: Fn(Snowflake) -> Resolution<T> + Send + Sync + 'static,
    {
        Self {
            ids,
            lookup: Arc::new(lookup),
        }
    }

    /// The stored IDs, in input order.
    pub fn ids(&self) -> &[Snowflake] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Lazily yield one proxy per stored ID, preserving input order.
    pub fn iter(&self) -> impl Iterator<Item = CacheProxy<T>> + '_ {
        self.ids
            .iter()
            .map(|&id| CacheProxy::from_shared(id, Arc::clone(&self.lookup)))
    }
}

impl<T: Unpin> CacheView<T> {
    /// Resolve every element, surfacing per-element results in input order.
    ///
    /// Resolution is sequential; callers that want concurrency can spawn the
    /// per-element proxies from [`CacheView::iter`] themselves.
    pub async fn resolve_all(&self) -> Vec<Result<T, Error>> {
        let mut results = Vec::with_capacity(self.ids.len());
        for proxy in self.iter() {
            results.push(proxy.resolve().await);
        }
        results
    }
}

impl<T> fmt::Debug for CacheView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheView").field("ids", &self.ids).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
