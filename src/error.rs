//! Configuration errors raised while parsing qualifier expressions
//!
//! Every error here is fatal for the configuration phase. Nothing in the
//! per-syscall dispatch path returns an error.

use thiserror::Error;

/// Errors produced while turning qualifier text into a filter engine
#[derive(Error, Debug)]
pub enum QualifyError {
    #[error("invalid filter action '{0}'")]
    InvalidAction(String),

    #[error("invalid system call '{0}'")]
    InvalidSyscall(String),

    #[error("invalid {kind} '{token}'")]
    InvalidNumber { kind: &'static str, token: String },

    #[error("{stage}: {pattern}: {source}")]
    Regex {
        stage: &'static str,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("invalid {description} argument '{args}'")]
    InvalidInjectArgs {
        description: &'static str,
        args: String,
    },
}

pub type Result<T> = std::result::Result<T, QualifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_quote_offending_token() {
        let err = QualifyError::InvalidSyscall("opne".to_string());
        assert_eq!(err.to_string(), "invalid system call 'opne'");

        let err = QualifyError::InvalidNumber {
            kind: "descriptor",
            token: "x1".to_string(),
        };
        assert_eq!(err.to_string(), "invalid descriptor 'x1'");

        let err = QualifyError::InvalidInjectArgs {
            description: "inject",
            args: String::new(),
        };
        assert_eq!(err.to_string(), "invalid inject argument ''");
    }

    #[test]
    fn test_regex_error_carries_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = QualifyError::Regex {
            stage: "regcomp",
            pattern: "(".to_string(),
            source: Box::new(source),
        };
        assert!(err.to_string().starts_with("regcomp: (: "));
        assert!(std::error::Error::source(&err).is_some());
    }
}
