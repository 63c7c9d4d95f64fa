//! Process exit codes
//!
//! Scripts depend on these values; the mapping is part of the CLI contract.

use ul_core::Error;

/// Exit codes returned by the `ul` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,
    /// Unspecified failure
    GeneralError = 1,
    /// Invalid arguments or paths
    UsageError = 2,
    /// Alias, object, or file not found
    NotFound = 3,
    /// Network or endpoint failure
    NetworkError = 4,
    /// Upload interrupted; a state file was written for `ul resume`
    Interrupted = 5,
}

impl ExitCode {
    /// Numeric value passed to `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::Network(_) | Error::Protocol(_) => ExitCode::NetworkError,
            Error::AliasNotFound(_) => ExitCode::NotFound,
            Error::InvalidPath(_) | Error::ChunkSizeLocked => ExitCode::UsageError,
            Error::Auth(_)
            | Error::ClosedChannel
            | Error::InvalidState(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::General(_) => ExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::GeneralError.code(), 1);
        assert_eq!(ExitCode::UsageError.code(), 2);
        assert_eq!(ExitCode::NotFound.code(), 3);
        assert_eq!(ExitCode::NetworkError.code(), 4);
        assert_eq!(ExitCode::Interrupted.code(), 5);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from(&Error::Network("timeout".to_string())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from(&Error::AliasNotFound("play".to_string())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&Error::InvalidPath("bad".to_string())),
            ExitCode::UsageError
        );
    }
}
