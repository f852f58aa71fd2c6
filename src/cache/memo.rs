//! Memoising Cache Module
//!
//! Wraps an async producer so that concurrent calls with the same derived
//! key share one in-flight computation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{ready, Context, Poll};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::cache::key::{derive_key, CacheArgs, KeyPolicy};
use crate::cache::{CacheStats, EntryTable};
use crate::config::{CacheConfig, Strategy};
use crate::error::Result;

type Producer<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, std::result::Result<T, E>> + Send + Sync>;

/// Why a producer task ended without an outcome, rendered once so every
/// waiter reports the same message.
#[derive(Clone, Debug)]
struct Aborted(Arc<str>);

impl Aborted {
    fn from_join_error(err: JoinError) -> Self {
        if !err.is_panic() {
            return Self(Arc::from("memoised producer was cancelled"));
        }

        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self(Arc::from(format!("memoised producer panicked: {message}")))
    }
}

type Outcome<T, E> = std::result::Result<std::result::Result<T, E>, Aborted>;

// == Result Handle ==
/// Shared handle to the eventual outcome of one producer execution.
///
/// Every caller coalesced onto the same key receives a clone of the same
/// handle and observes the same value or the same error. Dropping a handle
/// never cancels the producer.
///
/// # Panics
/// Awaiting a handle panics when its producer panicked, or when the runtime
/// cancelled the producer task during shutdown. Every waiter panics with the
/// same message, `memoised producer panicked: <payload>` for a panic. The
/// entry stays cached like any other failure until it is invalidated.
pub struct ResultHandle<T, E> {
    inner: Shared<BoxFuture<'static, Outcome<T, E>>>,
}

impl<T, E> ResultHandle<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Runs `fut` as its own task and shares its outcome.
    fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        let task = tokio::spawn(fut);
        let inner = async move { task.await.map_err(Aborted::from_join_error) }
            .boxed()
            .shared();

        Self { inner }
    }

    /// The outcome, if the producer has already finished and this handle
    /// has been polled to completion by some caller. `None` as well when the
    /// producer panicked.
    pub fn peek(&self) -> Option<&std::result::Result<T, E>> {
        self.inner.peek().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Whether two handles share one producer execution.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl<T, E> Clone for ResultHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Future for ResultHandle<T, E>
where
    T: Clone,
    E: Clone,
{
    type Output = std::result::Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.inner).poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(Aborted(message)) => panic!("{message}"),
        }
    }
}

impl<T, E> fmt::Debug for ResultHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle").finish_non_exhaustive()
    }
}

// == Memo Cache ==
/// Single-flight memoisation of an async producer.
///
/// Cloning is cheap and every clone shares the same table.
pub struct MemoCache<A, T, E> {
    inner: Arc<Inner<A, T, E>>,
}

struct Inner<A, T, E> {
    name: String,
    producer: Producer<A, T, E>,
    policy: KeyPolicy,
    table: Mutex<EntryTable<ResultHandle<T, E>>>,
}

impl<A, T, E> Clone for MemoCache<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T, E> fmt::Debug for MemoCache<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

impl<A, T, E> MemoCache<A, T, E>
where
    A: CacheArgs + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    // == Builder ==
    /// Starts building a cache around `producer`.
    ///
    /// `name` qualifies every derived key, so caches sharing a registry should
    /// use distinct names (a module path works well).
    pub fn builder<F, Fut>(name: impl Into<String>, producer: F) -> MemoCacheBuilder<A, T, E>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        MemoCacheBuilder {
            name: name.into(),
            producer: Arc::new(move |args: A| producer(args).boxed()),
            strategy: Strategy::default(),
            policy: KeyPolicy::default(),
        }
    }

    // == Invoke ==
    /// Returns the handle for `args`, starting the producer if no live entry
    /// exists for the derived key.
    ///
    /// Lookup and publication happen under one lock acquisition, so callers
    /// racing on a key always coalesce onto a single execution. The producer
    /// closure itself runs inside the spawned task, outside the lock, so it
    /// may call back into this cache.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn invoke(&self, args: A) -> ResultHandle<T, E> {
        let key = self.key_for(&args);
        let mut table = self.lock_table();

        if let Some(handle) = table.get(&key) {
            debug!("cache {}: hit for {}", self.inner.name, key);
            return handle.clone();
        }

        debug!("cache {}: miss for {}, starting producer", self.inner.name, key);
        let producer = Arc::clone(&self.inner.producer);
        let handle = ResultHandle::spawn(async move { producer(args).await });
        table.insert(key, handle.clone());
        handle
    }

    // == Key For ==
    /// Derives the key `invoke` would use for `args`.
    pub fn key_for(&self, args: &A) -> String {
        derive_key(&self.inner.name, &self.inner.policy, args)
    }

    // == Invalidate ==
    /// Drops the entry for `args`, reporting whether one was live.
    ///
    /// A producer already running under that key keeps running for callers
    /// still holding its handle; the next `invoke` starts a fresh one.
    pub fn invalidate(&self, args: &A) -> bool {
        let key = self.key_for(args);
        let removed = self.lock_table().remove(&key);
        if removed {
            info!("cache {}: invalidated {}", self.inner.name, key);
        }
        removed
    }
}

impl<A, T, E> MemoCache<A, T, E> {
    // == Invalidate Containing ==
    /// Drops every entry whose key contains `needle`, returning the count.
    pub fn invalidate_containing(&self, needle: &str) -> usize {
        let removed = self.lock_table().remove_containing(needle);
        info!(
            "cache {}: invalidated {} entries containing {:?}",
            self.inner.name, removed, needle
        );
        removed
    }

    /// Drops every entry, returning the count.
    pub fn clear(&self) -> usize {
        let removed = self.lock_table().clear();
        info!("cache {}: cleared {} entries", self.inner.name, removed);
        removed
    }

    /// Whether a live entry exists for a derived key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock_table().contains(key)
    }

    /// Live keys in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        self.lock_table().keys()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let mut table = self.lock_table();
        table.purge_expired();
        table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.lock_table().stats()
    }

    /// Cumulative `(hits, misses)`.
    pub fn hit_miss(&self) -> (u64, u64) {
        self.stats().hit_miss()
    }

    pub fn strategy(&self) -> Strategy {
        self.lock_table().strategy()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // Table operations never panic midway, so a poisoned lock still holds a
    // consistent table.
    fn lock_table(&self) -> MutexGuard<'_, EntryTable<ResultHandle<T, E>>> {
        self.inner.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Memo Cache Builder ==
/// Configures a [`MemoCache`] before its strategy is validated.
pub struct MemoCacheBuilder<A, T, E> {
    name: String,
    producer: Producer<A, T, E>,
    strategy: Strategy,
    policy: KeyPolicy,
}

impl<A, T, E> MemoCacheBuilder<A, T, E> {
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Leaves every named argument out of derived keys.
    pub fn ignore_named_args(mut self, ignore: bool) -> Self {
        self.policy.set_ignore_named_args(ignore);
        self
    }

    /// Replaces the predicate selecting named arguments to leave out of keys.
    ///
    /// The default predicate ignores `connection` and `pool`.
    pub fn ignore_named<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.policy.set_ignore_named(Arc::new(predicate));
        self
    }

    /// Applies a loaded [`CacheConfig`].
    pub fn config(self, config: &CacheConfig) -> Self {
        self.strategy(config.strategy)
            .ignore_named_args(config.ignore_named_args)
    }

    // == Build ==
    /// Validates the strategy and creates the cache.
    pub fn build(self) -> Result<MemoCache<A, T, E>> {
        self.strategy.validate()?;
        debug!("cache {}: built with strategy {}", self.name, self.strategy);

        Ok(MemoCache {
            inner: Arc::new(Inner {
                name: self.name,
                producer: self.producer,
                policy: self.policy,
                table: Mutex::new(EntryTable::new(self.strategy)),
            }),
        })
    }
}
