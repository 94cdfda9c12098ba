//! RCON client: authenticated session management over the
//! length-prefixed wire protocol defined in the `protocol` crate.

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod correlator;
pub mod error;
pub mod session;

pub use client::RconClient;
pub use config::{ClientConfig, Password};
pub use error::{ClientError, Result};
pub use session::{SessionManager, SessionState};
