//! Error handling for cms-content
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`ContentError`]) for the failures that can
//!    actually escape the library: fetch failures, undecodable payloads, bad
//!    configuration.
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for the command-line tool.
//!
//! # Soft vs. hard errors
//!
//! Missing content (an element, a translation or a language that does not
//! exist) is *not* an error. The resolver and field mapper absorb it by
//! falling back to default content or an empty string, so there is no variant
//! for it here.
//!
//! Hard errors (network and API failures) travel up to the query cache, which
//! retries once and then stores the error in the entry's state. Error values
//! are shared between every observer of the same key, which is why
//! [`ContentError`] is `Clone` and only carries owned strings.
//!
//! Malformed input (a derivation function that fails, a subsection without an
//! element list) is reported through [`ContentError::MalformedInput`] to the
//! aggregator, which logs it and skips the offending item.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cms_content::core::{ContentError, user_friendly_error};
//!
//! let error = ContentError::HttpStatus {
//!     url: "http://localhost:5000/api/websites".to_string(),
//!     status: 503,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for content operations.
///
/// # Error Categories
///
/// ## Fetching
/// - [`Fetch`](ContentError::Fetch) - transport failure (connection refused, timeout)
/// - [`HttpStatus`](ContentError::HttpStatus) - the API answered with a non-success status
/// - [`Decode`](ContentError::Decode) - the API answered with JSON of the wrong shape
///
/// ## Content
/// - [`MalformedInput`](ContentError::MalformedInput) - a subsection the aggregator must skip
/// - [`SectionNotFound`](ContentError::SectionNotFound) - no section matched a name lookup
///
/// ## Configuration and theming
/// - [`Config`](ContentError::Config) - invalid client configuration
/// - [`InvalidColor`](ContentError::InvalidColor) - a theme color that is not a hex color
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// A request to the content API could not be completed.
    #[error("Request failed: {operation}")]
    Fetch {
        /// The API operation that was being performed (e.g. "fetch sections")
        operation: String,
        /// Transport-level reason reported by the HTTP client
        reason: String,
    },

    /// The content API answered with a non-success HTTP status.
    #[error("Content API returned HTTP {status} for {url}")]
    HttpStatus {
        /// The requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Unexpected response from {url}: {reason}")]
    Decode {
        /// The requested URL
        url: String,
        /// Decoder error message
        reason: String,
    },

    /// A subsection could not be mapped and was skipped.
    #[error("Malformed subsection '{subsection}': {reason}")]
    MalformedInput {
        /// Identifier of the offending subsection
        subsection: String,
        /// What was wrong with it
        reason: String,
    },

    /// A section lookup by name or type found nothing.
    #[error("Section '{name}' not found")]
    SectionNotFound {
        /// The name or type that was looked up
        name: String,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// A theme color value could not be parsed.
    #[error("Invalid color value: '{value}'")]
    InvalidColor {
        /// The rejected color value
        value: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl ContentError {
    /// Whether retrying the same request could succeed.
    ///
    /// Transport failures and server-side (5xx) statuses are retryable;
    /// client errors and decode failures are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch {
                ..
            } => true,
            Self::HttpStatus {
                status,
                ..
            } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show:
/// 1. **Error**: the main error message in red
/// 2. **Details**: additional context in yellow (optional)
/// 3. **Suggestion**: actionable steps in green (optional)
///
/// ```rust,no_run
/// use cms_content::core::{ContentError, ErrorContext};
///
/// let context = ErrorContext::new(ContentError::SectionNotFound { name: "Services".into() })
///     .with_suggestion("Run 'cms-content sections --website <id>' to list section names");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ContentError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ContentError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`ContentError`] (including when it sits deeper in an `anyhow`
/// context chain), TOML parse errors from the configuration file, and falls
/// back to a generic message carrying the full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(content_error) = error.chain().find_map(|e| e.downcast_ref::<ContentError>()) {
        return create_error_context(content_error.clone());
    }

    if let Some(toml_error) = error.chain().find_map(|e| e.downcast_ref::<toml::de::Error>()) {
        return ErrorContext::new(ContentError::Config {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your config.toml. Verify quotes, brackets, and section names")
        .with_details("The configuration file is read from ~/.cms-content/config.toml unless --config is given");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ContentError::Other {
        message,
    })
}

fn create_error_context(error: ContentError) -> ErrorContext {
    match &error {
        ContentError::Fetch {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check that the content API is running and that api.base_url in your config points at it")
            .with_details(format!("{reason} (the request was retried before giving up)")),

        ContentError::HttpStatus {
            status,
            ..
        } => {
            let suggestion = match status {
                404 => "Verify the website, section or item identifier",
                401 | 403 => "The content API rejected the request. Check that the endpoint is public",
                s if *s >= 500 => "The content API failed internally. Try again later",
                _ => "Check the request parameters",
            };
            ErrorContext::new(error.clone()).with_suggestion(suggestion)
        }

        ContentError::Decode {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Make sure api.base_url points at the CMS API and not at the website itself")
            .with_details("Collections are expected as a JSON array or as an object with a 'data' array"),

        ContentError::SectionNotFound {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Run 'cms-content sections --website <id> --include-inactive' to list section names"),

        ContentError::Config {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the value in your config.toml or pass a different file with --config"),

        ContentError::InvalidColor {
            ..
        } => ErrorContext::new(error.clone()).with_suggestion("Colors must be hex values such as #1e40af or #fff"),

        ContentError::MalformedInput {
            ..
        }
        | ContentError::Other {
            ..
        } => ErrorContext::new(error.clone()),
    }
}
