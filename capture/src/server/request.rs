//! Request routing for the capture server.
//!
//! Every request to the capture listener resolves to exactly one
//! [`Operation`] from its method and path alone. Routing is stateless.

use axum::http::Method;

use crate::error::Result;
use crate::model::Topic;

/// What a request asks the server to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `GET /`: list the log files in the storage directory.
    List,

    /// `POST /` or `POST /<topic>`: append the body to a topic's log.
    Append(Topic),

    /// Anything else.
    NotFound,
}

impl Operation {
    /// Resolves the operation for a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) when a
    /// `POST` path does not name a valid topic.
    pub fn resolve(method: &Method, path: &str) -> Result<Self> {
        let operation = match *method {
            Method::GET if path == "/" => Operation::List,
            Method::POST => Operation::Append(Topic::from_path(path)?),
            _ => Operation::NotFound,
        };
        Ok(operation)
    }
}
