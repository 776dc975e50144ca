//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        Self::from(ApplicationError::Domain(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::InvalidInput { .. } => exitcode::DATAERR,
                ApplicationError::OperationFailed { source, .. } => {
                    if source.is::<std::io::Error>() {
                        exitcode::IOERR
                    } else {
                        exitcode::SOFTWARE
                    }
                }
                ApplicationError::Domain(d) => match d {
                    DomainError::Io { .. } => exitcode::IOERR,
                    DomainError::EmptyFileName => exitcode::USAGE,
                    DomainError::CycleDetected(_)
                    | DomainError::InvalidDataUrl { .. }
                    | DomainError::UnknownMimeType
                    | DomainError::Base64Decode(_)
                    | DomainError::Image(_) => exitcode::DATAERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordKey;
    use rstest::rstest;

    #[rstest]
    #[case(CliError::Usage("x".into()), exitcode::USAGE)]
    #[case(CliError::from(DomainError::CycleDetected(RecordKey::Int(1))), exitcode::DATAERR)]
    #[case(CliError::from(DomainError::EmptyFileName), exitcode::USAGE)]
    #[case(CliError::from(ApplicationError::Config { message: "bad".into() }), exitcode::CONFIG)]
    #[case(
        CliError::from(InfraError::io("write", std::io::Error::other("disk full"))),
        exitcode::IOERR
    )]
    fn given_error_when_mapping_exit_code_then_uses_sysexits(
        #[case] error: CliError,
        #[case] expected: i32,
    ) {
        assert_eq!(error.exit_code(), expected);
    }

    #[test]
    fn given_nested_error_when_displaying_then_shows_innermost_message() {
        let error = CliError::from(DomainError::CycleDetected(RecordKey::Str("a".into())));
        assert_eq!(
            error.to_string(),
            "cycle detected in hierarchy at record id: \"a\""
        );
    }
}
