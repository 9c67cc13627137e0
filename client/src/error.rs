//! The single error type returned by every client operation.
//!
//! | Variant | Raised by | Network touched? |
//! |---------|-----------|------------------|
//! | `Configuration` | configuration parsing, client construction | no |
//! | `Unsupported` | dialect routing | no |
//! | `Build` | request builder | no |
//! | `Transport` | transport invoker | attempted |
//! | `Server` | facade, on a non-2xx status | yes |
//! | `Decode` | facade, via the formatter | yes |
//!
//! Every runtime variant names the HTTP method and path template of the
//! attempted call and keeps the lower-level cause as its `source`.

use reqwest::Method;
use thiserror::Error;

use crate::config::{ConfigError, ServerVersion};
use crate::formatter::FormatError;
use crate::request::BuildError;
use crate::transport::TransportFault;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid client configuration")]
    Configuration(#[from] ConfigError),

    #[error("{operation} is not supported by {version} servers")]
    Unsupported {
        version: ServerVersion,
        operation: &'static str,
    },

    #[error("failed to build {method} {path}")]
    Build {
        method: Method,
        path: String,
        #[source]
        source: BuildError,
    },

    #[error("an error occurred while executing {method} {path}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: TransportFault,
    },

    #[error("server rejected {method} {path} with status {status}: {body}")]
    Server {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response of {method} {path}")]
    Decode {
        method: Method,
        path: String,
        #[source]
        source: FormatError,
    },
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    /// HTTP status of a server rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Method and path template of the failed call, when one was attempted.
    pub fn request(&self) -> Option<(&Method, &str)> {
        match self {
            ClientError::Build { method, path, .. }
            | ClientError::Transport { method, path, .. }
            | ClientError::Server { method, path, .. }
            | ClientError::Decode { method, path, .. } => Some((method, path.as_str())),
            ClientError::Configuration(_) | ClientError::Unsupported { .. } => None,
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn transport_error_chains_cause() {
        let err = ClientError::Transport {
            method: Method::DELETE,
            path: "/db/{name}".into(),
            source: TransportFault::Connection("connection refused".into()),
        };
        assert_eq!(err.to_string(), "an error occurred while executing DELETE /db/{name}");
        assert!(err.source().unwrap().to_string().contains("connection refused"));
        assert!(err.is_transport());
        assert_eq!(err.request(), Some((&Method::DELETE, "/db/{name}")));
    }

    #[test]
    fn server_error_exposes_status() {
        let err = ClientError::Server {
            method: Method::GET,
            path: "/db".into(),
            status: 401,
            body: "Invalid username/password".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_transport());
    }

    #[test]
    fn configuration_errors_have_no_request() {
        let err = ClientError::from(ConfigError::UnknownVersion("0.7".into()));
        assert_eq!(err.request(), None);
        assert!(err.source().is_some());
    }
}
