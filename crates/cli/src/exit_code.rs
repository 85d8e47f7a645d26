//! Exit code definitions for the clip CLI
//!
//! Scripts depend on these values; changing one is a breaking change.

use clip_core::Error;

/// Exit codes for the clip CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error: local IO, JSON encoding, etc.
    GeneralError = 1,

    /// User input error: unknown command, missing or invalid argument
    UsageError = 2,

    /// Transport failure: connection refused, reset, timed out
    NetworkError = 3,

    /// Missing token, or the server answered 401/403
    AuthError = 4,

    /// Local file missing, or the server answered 404
    NotFound = 5,

    /// Any other error status from the server
    RemoteError = 6,

    /// The server answered with a body of the wrong shape
    MalformedResponse = 7,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::RemoteError),
            7 => Some(Self::MalformedResponse),
            _ => None,
        }
    }

    /// Exit code for a failed invocation
    pub const fn from_error(error: &Error) -> Self {
        match Self::from_i32(error.exit_code()) {
            Some(code) => code,
            None => Self::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid command or arguments",
            Self::NetworkError => "Network error",
            Self::AuthError => "Authentication failure",
            Self::NotFound => "Not found",
            Self::RemoteError => "Server returned an error",
            Self::MalformedResponse => "Malformed server response",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_i32() {
        for code in 0..=7 {
            assert_eq!(ExitCode::from_i32(code).map(ExitCode::as_i32), Some(code));
        }
        assert_eq!(ExitCode::from_i32(130), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::UnknownCommand("bogus".into())),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Transport("refused".into())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from_error(&Error::MissingCredential),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Remote {
                status: 401,
                message: "Invalid token".into()
            }),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Remote {
                status: 404,
                message: "Not Found".into()
            }),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from_error(&Error::Remote {
                status: 500,
                message: "boom".into()
            }),
            ExitCode::RemoteError
        );
        assert_eq!(
            ExitCode::from_error(&Error::MalformedResponse("not an array".into())),
            ExitCode::MalformedResponse
        );
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::NotFound);
        assert!(display.contains('5'));
        assert!(display.contains("Not found"));
    }
}
