//! Global constants used throughout the cms-content codebase.
//!
//! Cache windows, retry parameters, and presentation fallbacks that are shared
//! across modules. Configuration defaults read these values.

use std::time::Duration;

/// How long a cached query result counts as fresh (5 minutes).
///
/// Within this window repeated requests for the same key are answered from
/// the cache without touching the network.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// How long an unobserved entry survives before eviction (10 minutes).
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

/// Number of retries after a failed fetch before the error is surfaced.
pub const DEFAULT_FETCH_RETRIES: usize = 1;

/// Delay before the first retry of a failed fetch (300ms).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 300;

/// Upper bound for any single retry delay.
pub const MAX_RETRY_DELAY_MS: u64 = 2_000;

/// Timeout for a single request to the content API.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Base URL used when no configuration file exists.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Language used when neither the caller nor the website specifies one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Token replaced by the 1-based repetition number in field templates.
pub const INDEX_TOKEN: &str = "{index}";

/// Image shown when an image element has neither a URL nor default content.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Prefix of the marker class that identifies the applied theme.
pub const THEME_CLASS_PREFIX: &str = "theme-";

/// Fallback colors for optional theme colors that do not default to primary.
pub const FALLBACK_BACKGROUND_COLOR: &str = "#ffffff";
/// Fallback text color.
pub const FALLBACK_TEXT_COLOR: &str = "#1f2937";
/// Fallback error color.
pub const FALLBACK_ERROR_COLOR: &str = "#ef4444";
/// Fallback success color.
pub const FALLBACK_SUCCESS_COLOR: &str = "#22c55e";
/// Fallback warning color.
pub const FALLBACK_WARNING_COLOR: &str = "#f59e0b";

/// Primary tints: (variable suffix, interpolation factor toward white).
pub const PRIMARY_TINTS: [(u16, f64); 5] =
    [(50, 0.9), (100, 0.8), (200, 0.6), (300, 0.4), (400, 0.2)];

/// Primary shades: (variable suffix, interpolation factor toward black).
pub const PRIMARY_SHADES: [(u16, f64); 4] = [(600, 0.1), (700, 0.2), (800, 0.3), (900, 0.4)];

/// Base language codes written right-to-left.
pub const RTL_LANGUAGES: [&str; 4] = ["ar", "he", "fa", "ur"];
