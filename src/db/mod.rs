mod connection;
mod introspection;
mod query;

pub use connection::*;
pub use introspection::*;
pub use query::*;

use thiserror::Error;

/// Failures from the database layer. Connection and execution errors both
/// carry the driver's message text; nothing propagates past this module as a
/// panic.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Query(String),
}
