//! Playlist Analyzer Dashboard Backend
//!
//! This library provides the backend of a web dashboard that analyzes public
//! Spotify playlists with the Google Gemini generative-language API and
//! produces follow-up song recommendations. It includes modules for the two
//! external API clients, the reply-normalization pipeline, and the HTTP
//! surface that serves results to the presentation layer.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints served by the dashboard server
//! - `config` - Configuration management and environment variables
//! - `gemini` - Gemini client, prompt construction, and reply normalization
//! - `retry` - Shared retry/backoff policy
//! - `server` - The axum HTTP server
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use playlens::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> playlens::Res<()> {
//!     config::load_env().await?;
//!     server::start_dashboard_server().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod gemini;
pub mod retry;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use playlens::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Fetching playlist details...");
/// info!("Collected {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations.
///
/// # Example
///
/// ```
/// success!("Analysis complete");
/// success!("Bound Gemini model: {}", model);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination, such as missing configuration.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program
/// termination, such as a malformed model reply that will be retried.
///
/// # Example
///
/// ```
/// warning!("Model {} failed probe: {}", model, e);
/// warning!("Rate limited, retrying in {} seconds", wait);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
