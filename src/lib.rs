//! Live event console for Pusher-compatible servers.
//!
//! Opens one signed WebSocket to the server's `/console` endpoint and turns
//! the lifecycle events it pushes into rows of an in-memory event table.

pub mod auth;
pub mod client;
pub mod config;
pub mod console;
mod connection;
pub mod error;
pub mod event;
pub mod label;
pub mod message;
pub mod origin;
pub mod state;
pub mod view;

pub use auth::{Credentials, auth_query_string, signed_query_string};
pub use client::{ConsoleClient, SessionId};
pub use config::ConsoleConfig;
pub use console::{Console, ConsoleHandler};
pub use error::ConsoleError;
pub use event::EventHandler;
pub use label::LabelClass;
pub use message::{ConsoleEvent, EventTime};
pub use origin::PageOrigin;
pub use state::{SessionState, Signal};
pub use view::{ConsoleView, CredentialForm, EventRow};
