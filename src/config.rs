//! Cache configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default interval between background refresh sweeps.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Default deadline for a single lookup made by a refresh sweep.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Name used for a resolver when none is configured.
pub const DEFAULT_NAME: &str = "dns-cache";

/// Callback invoked after each timer-driven refresh sweep.
pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

/// Configuration for a [`Resolver`](crate::Resolver).
///
/// A zero duration means "use the default".
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use dns_refresh_cache::ResolverConfig;
///
/// let config = ResolverConfig::new()
///     .with_refresh_interval(Duration::from_secs(30))
///     .with_lookup_timeout(Duration::ZERO);
///
/// assert_eq!(config.effective_refresh_interval(), Duration::from_secs(30));
/// assert_eq!(config.effective_lookup_timeout(), Duration::from_secs(10));
/// ```
#[derive(Clone, Default)]
pub struct ResolverConfig {
    /// Time between background refresh sweeps.
    pub refresh_interval: Duration,

    /// Deadline applied to each lookup made by a refresh sweep.
    pub lookup_timeout: Duration,

    /// Called after every timer-driven sweep. Mostly useful to synchronize
    /// tests with the background task.
    pub on_refreshed: Option<RefreshHook>,

    /// Identifies this resolver in its `tracing` span, so one instance's
    /// refresh failures can be told apart from another's.
    pub name: Option<String>,
}

impl ResolverConfig {
    /// Creates a config with the default interval (3s) and timeout (10s).
    #[must_use]
    pub fn new() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            on_refreshed: None,
            name: None,
        }
    }

    /// Overrides the refresh interval.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Overrides the per-lookup timeout used by refresh sweeps.
    #[must_use]
    pub const fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Sets the callback invoked after each background sweep.
    #[must_use]
    pub fn with_on_refreshed(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_refreshed = Some(Arc::new(hook));
        self
    }

    /// Names this resolver in log output.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The configured name, or [`DEFAULT_NAME`].
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// Refresh interval with the zero-means-default rule applied.
    #[must_use]
    pub const fn effective_refresh_interval(&self) -> Duration {
        if self.refresh_interval.is_zero() {
            DEFAULT_REFRESH_INTERVAL
        } else {
            self.refresh_interval
        }
    }

    /// Lookup timeout with the zero-means-default rule applied.
    #[must_use]
    pub const fn effective_lookup_timeout(&self) -> Duration {
        if self.lookup_timeout.is_zero() {
            DEFAULT_LOOKUP_TIMEOUT
        } else {
            self.lookup_timeout
        }
    }
}

impl fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("refresh_interval", &self.refresh_interval)
            .field("lookup_timeout", &self.lookup_timeout)
            .field("on_refreshed", &self.on_refreshed.is_some())
            .field("name", &self.name)
            .finish()
    }
}
