use std::path::PathBuf;

pub type ResponseResult<T> = Result<T, ResponseError>;
pub type ParserResult<T> = ResponseResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error(
        "amplitude and frequency arrays differ in length: amplitude={amplitude}, frequency={frequency}"
    )]
    LengthMismatch { amplitude: usize, frequency: usize },
    #[error("cannot parse equipment identifier '{identifier}': {reason}")]
    UnparseableIdentifier { identifier: String, reason: String },
    #[error("invalid reduction config: {0}")]
    InvalidConfig(String),
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode JSON document: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ResponseError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn unparseable_identifier(identifier: &str, reason: impl Into<String>) -> Self {
        Self::UnparseableIdentifier {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidResponse(_)
            | Self::UnparseableIdentifier { .. }
            | Self::InvalidConfig(_)
            | Self::Parse { .. } => ErrorCategory::InputValidationError,
            Self::Read { .. } | Self::Write { .. } => ErrorCategory::IoSystemError,
            Self::LengthMismatch { .. } => ErrorCategory::ComputationError,
            Self::Encode(_) => ErrorCategory::InternalError,
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::InvalidResponse(_) => "INPUT.INVALID_RESPONSE",
            Self::UnparseableIdentifier { .. } => "INPUT.UNPARSEABLE_IDENTIFIER",
            Self::InvalidConfig(_) => "INPUT.INVALID_CONFIG",
            Self::Parse { .. } => "INPUT.JSON_PARSE",
            Self::Read { .. } => "IO.READ",
            Self::Write { .. } => "IO.WRITE",
            Self::LengthMismatch { .. } => "RUN.SPECTRUM_LENGTH",
            Self::Encode(_) => "SYS.JSON_ENCODE",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category().is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category()
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCategory, ResponseError};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (ErrorCategory::Success, 0, "Success"),
            (ErrorCategory::InputValidationError, 2, "InputValidationError"),
            (ErrorCategory::IoSystemError, 3, "IoSystemError"),
            (ErrorCategory::ComputationError, 4, "ComputationError"),
            (ErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, label) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), label);
        }
        assert!(!ErrorCategory::Success.is_fatal());
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = ResponseError::unparseable_identifier("L4C", "missing '-' between family and serial");

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.UNPARSEABLE_IDENTIFIER] cannot parse equipment identifier 'L4C': missing '-' between family and serial"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 2")
        );
    }

    #[test]
    fn length_mismatch_is_a_computation_error() {
        let error = ResponseError::LengthMismatch {
            amplitude: 3,
            frequency: 4,
        };
        assert_eq!(error.category(), ErrorCategory::ComputationError);
        assert_eq!(error.placeholder(), "RUN.SPECTRUM_LENGTH");
    }
}
