use finconsole_form::FormError;
use thiserror::Error;

/// Failures scoped to a single user action. None of them is fatal.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("unknown page '{0}'")]
    UnknownPage(String),

    #[error("no execution record matches '{0}'")]
    UnknownRecord(String),

    #[error("unknown environment '{0}' (expected DEV, TEST or PROD)")]
    UnknownEnvironment(String),

    #[error("{0} already in progress")]
    Busy(&'static str),
}
