//! # dns-refresh-cache
//!
//! In-process DNS cache that serves lookups from memory and keeps them fresh
//! in the background.
//!
//! A [`Resolver`] wraps a [`NameResolver`] (the system resolver by default).
//! [`Resolver::fetch`] returns cached addresses when present and resolves on
//! a miss; [`Resolver::lookup_ip`] always resolves and stores the result. A
//! background task re-resolves every cached host on a fixed interval. DNS
//! TTLs are ignored.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use dns_refresh_cache::{Resolver, ResolverConfig};
//!
//! let config = ResolverConfig::new()
//!     .with_refresh_interval(Duration::from_secs(5))
//!     .with_lookup_timeout(Duration::from_secs(2));
//! let resolver = Resolver::system(config)?;
//!
//! // Miss: resolves and caches.
//! let ips = resolver.fetch("example.com").await?;
//! // Hit: no network I/O.
//! let ips = resolver.fetch("example.com").await?;
//!
//! // On shutdown.
//! resolver.stop();
//! ```
//!
//! ## Failure handling
//!
//! Entries are never evicted. A failed lookup, whether requested by a caller
//! or made by a refresh sweep, leaves the previous entry in place. Caller
//! failures are returned as [`DnsCacheError`]; sweep failures are logged
//! through `tracing` and the sweep continues with the next host.
//!
//! ## Cancellation
//!
//! Dropping a `fetch` or `lookup_ip` future cancels the lookup without
//! writing the cache. Wrap calls in `tokio::time::timeout`, or use
//! [`Resolver::lookup_ip_timeout`], to apply a deadline.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod lookup;
pub mod resolver;

pub use config::{RefreshHook, ResolverConfig};
pub use error::{DnsCacheError, Result};
pub use lookup::{NameResolver, SystemResolver};
pub use resolver::{DnsCache, Resolver};
