use std::fmt::{self, Display};

use trestle_core::err::Error;

/// SQL states the harness itself reacts to
pub mod state {
    /// Object already exists
    pub const OBJECT_EXISTS: &str = "X0Y32";
    /// Schema already exists
    pub const SCHEMA_EXISTS: &str = "X0Y68";
    /// Object does not exist
    pub const OBJECT_NOT_FOUND: &str = "42Y55";
    /// Schema does not exist
    pub const SCHEMA_NOT_FOUND: &str = "42Y07";
    /// Invalid authentication
    pub const INVALID_AUTHORIZATION: &str = "08004";
    /// Connection refused, eg no server listening
    pub const CONNECTION_REFUSED: &str = "08001";
    /// Database was shut down
    pub const DATABASE_SHUTDOWN: &str = "08006";
    /// Permission denied by sql authorization
    pub const ACCESS_DENIED: &str = "42502";
    /// Syntax error or unsupported statement
    pub const SYNTAX_ERROR: &str = "42X01";
}

/// An error raised by the engine, identified by its SQL state
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SqlError {
    pub state: String,
    pub message: String,
}

impl SqlError {
    pub fn new(state: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            message: message.into(),
        }
    }

    /// Finds the SQL state anywhere in the error's cause chain
    pub fn state_of(err: &Error) -> Option<&str> {
        err.chain()
            .find_map(|e| e.downcast_ref::<SqlError>())
            .map(|e| e.state.as_str())
    }

    /// Whether the error carries one of the supplied SQL states
    pub fn has_state(err: &Error, states: &[&str]) -> bool {
        Self::state_of(err).map_or(false, |s| states.contains(&s))
    }
}

impl Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (SQLSTATE {})", self.message, self.state)
    }
}

impl std::error::Error for SqlError {}
