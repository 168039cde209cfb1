use thiserror::Error;

use crate::types::{PhoneId, SubStateClass};

#[derive(Debug, Error)]
pub enum GopError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model configuration: {message}")]
    Configuration { message: String },
    #[error(
        "failed to resolve state for context ({left}, {center}, {right}) pdf class {pdf_class}: {message}"
    )]
    StateResolution {
        left: PhoneId,
        center: PhoneId,
        right: PhoneId,
        pdf_class: SubStateClass,
        message: String,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("alignment failed: {message}")]
    Alignment { message: String },
}

impl GopError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn state_resolution(
        window: [PhoneId; 3],
        pdf_class: SubStateClass,
        message: impl Into<String>,
    ) -> Self {
        Self::StateResolution {
            left: window[0],
            center: window[1],
            right: window[2],
            pdf_class,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn alignment(message: impl Into<String>) -> Self {
        Self::Alignment {
            message: message.into(),
        }
    }
}
