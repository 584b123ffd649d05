//! # sift-config
//!
//! Configuration surface and entry discovery for the Sift bundler
//! front-end.
//!
//! Sift decides, per import statement, whether a dependency is resolved
//! into the bundle or deferred to a runtime import map. This crate owns the
//! declarative side of that decision: the `SiftConfig` structure (entry
//! set, bundle-dependency allowlist, diagnostic policies) and the async
//! expansion of entry glob patterns into a concrete name-to-path map.

pub mod config;
pub mod entries;
pub mod error;

pub use config::{ConfigDiscovery, ExternalLogPolicy, MainEntry, SiftConfig, TargetToggles};
pub use entries::{discover_entries, EntryMap, EntrySpec};
pub use error::{ConfigError, Result};
