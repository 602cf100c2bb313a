//! This crate provides a high-level implementation of an RCON client for
//! [The Isle: Evrima] dedicated servers.
//!
//! The client is asynchronous and requires a [Tokio](https://tokio.rs/) runtime. A blocking
//! facade is available behind the `sync` feature (enabled by default).
//!
//! A session is created from a [`ServerConfig`] and [`ClientOptions`]. It connects and
//! authenticates with [`RconClient::connect`], then executes commands one at a time with
//! [`RconClient::send_command`]. Dropped connections are re-established with exponential
//! backoff when auto-reconnect is enabled.
//!
//! # Example
//! ```rust,no_run
//! use evrima_rcon_client::{ClientOptions, RconClient, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ServerConfig::new("127.0.0.1", 8888, "password123").unwrap();
//!     let mut client = RconClient::new(server, ClientOptions::default()).unwrap();
//!
//!     client.connect().await.unwrap();
//!
//!     let result = client.send_command("announce", Some("Restart in 5 minutes")).await.unwrap();
//!     println!("{}", result.raw);
//!
//!     let players = client.players().await.unwrap();
//!     println!("{:?}", players.data);
//! }
//! ```
//!
//! [The Isle: Evrima]: https://survivetheisle.com/

mod client;
mod commands;
mod config;
mod logger;
mod transport;

pub mod command;
pub mod packet;
pub mod parse;

#[cfg(feature = "sync")]
pub mod blocking;

use std::time::Duration;

/// Error type for RCON operations.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(RconError);

#[derive(Debug, thiserror::Error)]
pub(crate) enum RconError {
    #[error("connection failed: {0}")]
    ConnectionFailed(#[source] std::io::Error),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("socket error: {0}")]
    Socket(#[source] std::io::Error),

    #[error("connection closed by remote host")]
    Closed,

    #[error("not connected")]
    NotConnected,

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// Stable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The connection attempt failed before it was established.
    ConnectionFailed,
    /// The server did not accept the password.
    AuthFailed,
    /// A connect, send or receive exceeded the configured timeout.
    Timeout,
    /// A transport operation failed on an established connection.
    SocketError,
    /// An operation required a connection and none was available.
    NotConnected,
    /// An unknown command was encoded, or a command argument was rejected.
    InvalidCommand,
    /// Server configuration or client options were out of bounds.
    InvalidConfig,
    /// Local IO failure unrelated to the connection.
    Io,
}

/// [`Result`] alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use self::client::*;
pub use self::command::{Category, Command, CommandDefinition};
pub use self::commands::validate_steam_id;
pub use self::config::*;
pub use self::parse::{PlayerData, PlayerRecord, ServerDetails};

impl<T> From<T> for Error
where
    T: Into<RconError>,
{
    fn from(inner: T) -> Self {
        Error(inner.into())
    }
}

impl Error {
    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            RconError::ConnectionFailed(_) => ErrorKind::ConnectionFailed,
            RconError::AuthFailed(_) => ErrorKind::AuthFailed,
            RconError::Timeout { .. } => ErrorKind::Timeout,
            RconError::Socket(_) | RconError::Closed => ErrorKind::SocketError,
            RconError::NotConnected => ErrorKind::NotConnected,
            RconError::InvalidCommand(_) => ErrorKind::InvalidCommand,
            RconError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            RconError::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this error means the connection is unusable and may be recovered by
    /// reconnecting.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotConnected | ErrorKind::SocketError | ErrorKind::Timeout
        )
    }

    /// Whether this error was caused by the request itself rather than the transport.
    /// These are never retried.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidCommand | ErrorKind::AuthFailed | ErrorKind::InvalidConfig
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_classified() {
        let timeout = Error::from(RconError::Timeout {
            operation: "receive",
            after: Duration::from_millis(250),
        });
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert!(timeout.is_connection_error());
        assert_eq!(timeout.to_string(), "receive timed out after 250ms");

        let closed = Error::from(RconError::Closed);
        assert_eq!(closed.kind(), ErrorKind::SocketError);
        assert!(closed.is_connection_error());

        let auth = Error::from(RconError::AuthFailed("Password incorrect".to_string()));
        assert!(auth.is_protocol_error());
        assert!(!auth.is_connection_error());
    }

    #[test]
    fn io_errors_convert_through_question_mark() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))?;
            Ok(())
        }

        assert_eq!(fails().unwrap_err().kind(), ErrorKind::Io);
    }
}
