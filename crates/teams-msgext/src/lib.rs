//! Teams search messaging extension.
//!
//! This crate provides:
//! - Bot Framework activity parsing and invoke routing
//! - OAuth sign-in through the Bot Framework token service
//! - Per-user search configuration (profile, sample web services, package registry)
//! - Action commands: profile task module, sign-out, share message to a channel
//! - SSO token-exchange de-duplication (`412` for tokens that cannot be exchanged)
//! - HTTP server for the bot messaging endpoint (standalone service)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Most handlers call out to remote services

pub mod activity;
pub mod cards;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod handler;
pub mod models;
pub mod responses;
pub mod search;
pub mod server;
pub mod store;
pub mod token;

pub use activity::{Activity, InvokeKind};
pub use config::Config;
pub use error::{BotError, Result};
pub use handler::SearchAuthConfigHandler;
pub use responses::InvokeResponse;
pub use store::{MemoryConfigStore, UserConfigStore};
pub use token::{BotTokenClient, UserTokenProvider};
