use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::http_client::HttpError;

/// Placeholder echoed instead of the credential value.
pub const REDACTION_MARKER: &str = "HIDDEN_FOR_YOUR_SAFETY";

/// Placeholder echoed when a call was made without a symbol.
pub const NO_SYMBOL_PLACEHOLDER: &str = "NULL";

/// Error classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvErrorKind {
    MissingCredential,
    InvalidSymbolFormat,
    Transport,
    Http,
    MalformedResponse,
    Api,
}

/// Redacted description of the call that produced an error.
///
/// Rendering never includes the API key and omits the forced `datatype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub symbol: Option<String>,
    pub function: String,
    pub params: Vec<(String, String)>,
}

impl Display for CallContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "API parameters used: symbol={}, function={}",
            self.symbol.as_deref().unwrap_or(NO_SYMBOL_PLACEHOLDER),
            self.function
        )?;
        for (name, value) in &self.params {
            write!(f, ", {name}={value}")?;
        }
        Ok(())
    }
}

/// Errors surfaced by [`AvClient::get`](crate::AvClient::get).
#[derive(Debug, Error)]
pub enum AvError {
    #[error(
        "no Alpha Vantage API key is configured; set AVTABLE_ALPHAVANTAGE_API_KEY or ALPHAVANTAGE_API_KEY"
    )]
    MissingCredential,

    #[error("symbol '{symbol}' must split on '/' into exactly two non-empty currency codes")]
    InvalidSymbolFormat { symbol: String },

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("upstream returned status {status}: {body}. {context}")]
    Http {
        status: u16,
        body: String,
        context: CallContext,
    },

    #[error("malformed response: {message}. {context}")]
    MalformedResponse {
        message: String,
        context: CallContext,
    },

    #[error("{message}. {context}")]
    Api {
        message: String,
        context: CallContext,
    },
}

impl AvError {
    pub const fn kind(&self) -> AvErrorKind {
        match self {
            Self::MissingCredential => AvErrorKind::MissingCredential,
            Self::InvalidSymbolFormat { .. } => AvErrorKind::InvalidSymbolFormat,
            Self::Transport(_) => AvErrorKind::Transport,
            Self::Http { .. } => AvErrorKind::Http,
            Self::MalformedResponse { .. } => AvErrorKind::MalformedResponse,
            Self::Api { .. } => AvErrorKind::Api,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            AvErrorKind::MissingCredential => "av.missing_credential",
            AvErrorKind::InvalidSymbolFormat => "av.invalid_symbol_format",
            AvErrorKind::Transport => "av.transport",
            AvErrorKind::Http => "av.http",
            AvErrorKind::MalformedResponse => "av.malformed_response",
            AvErrorKind::Api => "av.api",
        }
    }

    /// Message as reported upstream (raw body for HTTP errors), without call context.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            Self::MalformedResponse { message, .. } | Self::Api { message, .. } => Some(message),
            Self::Transport(error) => Some(error.message()),
            Self::MissingCredential | Self::InvalidSymbolFormat { .. } => None,
        }
    }

    pub fn context(&self) -> Option<&CallContext> {
        match self {
            Self::Http { context, .. }
            | Self::MalformedResponse { context, .. }
            | Self::Api { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when an API error is the upstream's call-frequency notice.
    pub fn is_rate_limit_notice(&self) -> bool {
        match self {
            Self::Api { message, .. } => {
                let lower = message.to_ascii_lowercase();
                lower.contains("call frequency")
                    || lower.contains("rate limit")
                    || lower.contains("requests per day")
            }
            _ => false,
        }
    }
}

/// Payload failure detected before the call context is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("upstream returned status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Api(String),
}

impl PayloadError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn with_context(self, context: CallContext) -> AvError {
        match self {
            Self::Http { status, body } => AvError::Http {
                status,
                body,
                context,
            },
            Self::Malformed(message) => AvError::MalformedResponse { message, context },
            Self::Api(message) => AvError::Api { message, context },
        }
    }
}
