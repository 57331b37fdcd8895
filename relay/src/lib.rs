//! cmdrelay - remote command relay for game servers
//!
//! Polls a remote API for queued administrative commands addressed to one
//! game server, runs the ones whose target player is known (and online when
//! required), and acknowledges the executed ids in one call per batch.
//!
//! # Modules
//!
//! - [`api`] - Remote API client trait, HTTP implementation and wire types
//! - [`dispatch`] - Entry eligibility checks, execution and batched acknowledgment
//! - [`scheduler`] - Timer-driven and forced polling behind a single-flight lock
//! - [`credential`] - Bearer token storage
//! - [`handshake`] - Token verification before storing
//! - [`host`] - Player lookup, command sink and address discovery
//! - [`operator`] - Force and set-token triggers with operator replies
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod credential;
pub mod dispatch;
pub mod handshake;
pub mod host;
pub mod operator;
pub mod scheduler;

// Re-export commonly used types
pub use api::{ApiError, CommandEntry, HttpApiClient, RemoteApi};
pub use app::Relay;
pub use config::Config;
pub use credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore, PLACEHOLDER_TOKEN};
pub use dispatch::{DispatchReport, Dispatcher};
pub use handshake::{Handshake, HandshakeError};
pub use host::{AddressLookup, CommandSink, Player, PlayerLookup};
pub use operator::Reply;
pub use scheduler::{Poller, TickOutcome};
