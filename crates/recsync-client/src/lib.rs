#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod backoff;
mod config;
mod connection;
mod store;
mod subscription;

pub use backoff::ReconnectBackoff;
pub use config::{ClientError, SyncConfig};
pub use connection::{ProgressSyncClient, SyncClientDeps};
pub use store::SharedProgressStore;
pub use subscription::SubscriptionController;

// Re-export the domain surface consumers need alongside the client
pub use recsync_core::{ConnectionStatus, ServerNotice};

// Integration tests exercise these; silence unused dev-dependency warnings
#[cfg(test)]
use anyhow as _;
#[cfg(test)]
use prost as _;
#[cfg(test)]
use tracing_subscriber as _;
