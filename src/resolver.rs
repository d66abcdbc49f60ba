//! The caching resolver and its background refresh loop.
//!
//! Entries are keyed by the exact hostname string and always hold the last
//! successful lookup result. Nothing is ever evicted: a failed lookup leaves
//! the previous entry in place, and the refresh loop keeps every cached
//! host fresh until [`Resolver::stop`] is called.

use crate::config::{RefreshHook, ResolverConfig};
use crate::error::{DnsCacheError, Result};
use crate::lookup::{NameResolver, SystemResolver};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

/// Initial capacity of the host map.
const CACHE_CAPACITY: usize = 64;

/// The contract consumers of the cache (proxies, routers) program against.
#[async_trait]
pub trait DnsCache: Send + Sync {
    /// Resolves `host` and stores the result, bypassing the cache.
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>>;

    /// Returns the cached addresses for `host`, resolving on a miss.
    async fn fetch(&self, host: &str) -> Result<Vec<IpAddr>>;

    /// Re-resolves every cached host. Failures are logged, not returned.
    async fn refresh(&self);

    /// Stops background refreshing. Idempotent.
    fn stop(&self);
}

/// In-memory DNS cache with periodic background refresh.
///
/// # Lifecycle
///
/// 1. [`new`](Self::new) spawns the refresh task on the current tokio
///    runtime. The first sweep runs one interval after construction.
/// 2. [`fetch`](Self::fetch) serves hits from memory and resolves misses.
/// 3. [`stop`](Self::stop) ends the task. Dropping the resolver does the
///    same.
///
/// # Example
///
/// ```rust,ignore
/// use dns_refresh_cache::{Resolver, ResolverConfig};
///
/// let resolver = Resolver::system(ResolverConfig::new())?;
/// let ips = resolver.fetch("example.com").await?;
/// // Served from memory, refreshed every 3s in the background.
/// let again = resolver.fetch("example.com").await?;
/// resolver.stop();
/// ```
pub struct Resolver {
    inner: Arc<Inner>,
    refresh_interval: Duration,
    closer: Mutex<Option<watch::Sender<bool>>>,
}

/// State shared with the refresh task.
struct Inner {
    resolver: Arc<dyn NameResolver>,
    lookup_timeout: Duration,
    cache: RwLock<HashMap<String, Vec<IpAddr>>>,
    name: String,
    /// Parent of every sweep's log events.
    span: tracing::Span,
}

impl Resolver {
    /// Creates a cache over `resolver` and starts background refreshing.
    ///
    /// # Errors
    ///
    /// Returns [`DnsCacheError::NoRuntime`] if called outside a tokio
    /// runtime.
    pub fn new(config: ResolverConfig, resolver: impl NameResolver + 'static) -> Result<Self> {
        Self::with_shared(config, Arc::new(resolver))
    }

    /// Creates a cache backed by the system resolver.
    ///
    /// # Errors
    ///
    /// Returns [`DnsCacheError::NoRuntime`] if called outside a tokio
    /// runtime.
    pub fn system(config: ResolverConfig) -> Result<Self> {
        Self::new(config, SystemResolver::new())
    }

    /// Creates a cache over a resolver that is shared with other code.
    ///
    /// # Errors
    ///
    /// Returns [`DnsCacheError::NoRuntime`] if called outside a tokio
    /// runtime.
    pub fn with_shared(config: ResolverConfig, resolver: Arc<dyn NameResolver>) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()?;
        let refresh_interval = config.effective_refresh_interval();
        let name = config.effective_name().to_string();
        let span = tracing::info_span!("dns_cache", resolver = %name);

        let inner = Arc::new(Inner {
            resolver,
            lookup_timeout: config.effective_lookup_timeout(),
            cache: RwLock::new(HashMap::with_capacity(CACHE_CAPACITY)),
            name,
            span: span.clone(),
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let first_tick = Instant::now() + refresh_interval;
        runtime.spawn(
            refresh_loop(
                Arc::clone(&inner),
                first_tick,
                refresh_interval,
                config.on_refreshed,
                stop_rx,
            )
            .instrument(span),
        );

        Ok(Self {
            inner,
            refresh_interval,
            closer: Mutex::new(Some(stop_tx)),
        })
    }

    /// Resolves `host` and overwrites its cache entry, even with an empty
    /// list. The write happens before this returns.
    ///
    /// Dropping the future cancels the lookup without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns [`DnsCacheError::Resolve`] if resolution fails; the existing
    /// entry (if any) is kept.
    pub async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.inner.lookup_ip(host).await
    }

    /// Like [`lookup_ip`](Self::lookup_ip), bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DnsCacheError::Timeout`] if the deadline elapses, or
    /// [`DnsCacheError::Resolve`] if resolution fails.
    pub async fn lookup_ip_timeout(&self, host: &str, timeout: Duration) -> Result<Vec<IpAddr>> {
        self.inner.lookup_ip_timeout(host, timeout).await
    }

    /// Returns the cached addresses for `host`, or resolves and caches them
    /// on a miss. A miss is never reported as an error of its own.
    ///
    /// # Errors
    ///
    /// Returns [`DnsCacheError::Resolve`] if the miss path fails.
    pub async fn fetch(&self, host: &str) -> Result<Vec<IpAddr>> {
        let hit = self.cached(host);
        if let Some(ips) = hit {
            return Ok(ips);
        }
        self.lookup_ip(host).await
    }

    /// Re-resolves every cached host, each bounded by the lookup timeout.
    ///
    /// A failing host is logged and keeps its previous entry; the sweep
    /// carries on with the remaining hosts.
    pub async fn refresh(&self) {
        self.inner
            .refresh()
            .instrument(self.inner.span.clone())
            .await;
    }

    /// Stops background refreshing.
    ///
    /// Only future sweeps are prevented: the cache is kept, in-flight
    /// lookups are not cancelled, and a sweep already running finishes.
    pub fn stop(&self) {
        if let Some(closer) = self.closer.lock().take() {
            // The task may already be gone if the runtime shut down.
            let _ = closer.send(true);
            tracing::info!(parent: &self.inner.span, "Stopped DNS cache refresh");
        }
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.closer.lock().is_none()
    }

    /// Returns the cached addresses for `host` without resolving.
    #[must_use]
    pub fn cached(&self, host: &str) -> Option<Vec<IpAddr>> {
        self.inner.cache.read().get(host).cloned()
    }

    /// Lists the cached hostnames, in no particular order.
    #[must_use]
    pub fn hosts(&self) -> Vec<String> {
        self.inner.hosts()
    }

    /// Number of cached hosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cache.read().len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.cache.read().is_empty()
    }

    /// Name carried by this resolver's `tracing` span.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Interval between background sweeps, after defaults were applied.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Deadline for each lookup made by a sweep, after defaults were applied.
    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        self.inner.lookup_timeout
    }
}

#[async_trait]
impl DnsCache for Resolver {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
        Resolver::lookup_ip(self, host).await
    }

    async fn fetch(&self, host: &str) -> Result<Vec<IpAddr>> {
        Resolver::fetch(self, host).await
    }

    async fn refresh(&self) {
        Resolver::refresh(self).await;
    }

    fn stop(&self) {
        Resolver::stop(self);
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("name", &self.inner.name)
            .field("refresh_interval", &self.refresh_interval)
            .field("lookup_timeout", &self.inner.lookup_timeout)
            .field("hosts", &self.len())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl Inner {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
        let ips = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|source| DnsCacheError::Resolve {
                host: host.to_string(),
                source,
            })?;

        self.cache.write().insert(host.to_string(), ips.clone());
        Ok(ips)
    }

    async fn lookup_ip_timeout(&self, host: &str, timeout: Duration) -> Result<Vec<IpAddr>> {
        tokio::time::timeout(timeout, self.lookup_ip(host))
            .await
            .map_err(|_| DnsCacheError::Timeout {
                host: host.to_string(),
                timeout,
            })?
    }

    fn hosts(&self) -> Vec<String> {
        self.cache.read().keys().cloned().collect()
    }

    async fn refresh(&self) {
        // Snapshot first: the lock must not be held across lookups.
        let hosts = self.hosts();

        let mut failed = 0usize;
        for host in &hosts {
            if let Err(e) = self.lookup_ip_timeout(host, self.lookup_timeout).await {
                failed += 1;
                tracing::error!(host = %host, error = %e, "Failed to refresh DNS cache");
            }
        }

        tracing::debug!(hosts = hosts.len(), failed, "Refreshed DNS cache");
    }
}

/// Runs a sweep every `period` until the stop signal fires or its sender
/// is dropped.
async fn refresh_loop(
    inner: Arc<Inner>,
    first_tick: Instant,
    period: Duration,
    on_refreshed: Option<RefreshHook>,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(interval = ?period, "Started DNS cache refresh loop");

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                inner.refresh().await;
                if let Some(hook) = &on_refreshed {
                    hook();
                }
            }
        }
    }

    tracing::debug!("DNS cache refresh loop stopped");
}
