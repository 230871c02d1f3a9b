//! Error types for the client crate.

use tapcast_core::ProtocolError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by session, clipboard, and control operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The agent could not be reached or the connection was lost.
    #[error("connection failed: {0}")]
    Connection(String),

    /// An operation did not complete within its deadline.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// A wire-format violation on either direction of the protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The operation was attempted in a state that does not permit it.
    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    /// The device transport reported a failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An I/O error occurred on an established agent stream.
    #[error("I/O error on {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}
