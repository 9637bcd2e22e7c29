//! Dev-tooling noise suppression
//!
//! Hot-reload and chunk-loading tooling reports errors that are not real
//! failures. This module recognises them by substring so the process-wide
//! handlers can drop them quietly and let everything else through.
//!
//! # Example
//!
//! ```rust
//! use app_core::dev_errors::{handle_error, Disposition};
//!
//! assert_eq!(handle_error("Failed to load chunk 42"), Disposition::Suppressed);
//! assert_eq!(handle_error("connection refused"), Disposition::Propagate);
//! ```

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic;
use std::sync::Once;

/// Substrings that mark an error as dev-tooling noise (matched case-insensitively)
pub const DEV_ERROR_PATTERNS: [&str; 6] = [
    "Failed to load chunk",
    "hmr-client",
    "__nextjs_original-stack-frames",
    "turbopack",
    "[turbopack]",
    "Load failed",
];

/// What a handler did with an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Dev noise, dropped
    Suppressed,
    /// A real error, left for the caller
    Propagate,
}

/// Whether `message` is dev-tooling noise
pub fn is_dev_environment_error(message: &str) -> bool {
    let message = message.to_lowercase();
    DEV_ERROR_PATTERNS
        .iter()
        .any(|pattern| message.contains(&pattern.to_lowercase()))
}

/// Handle a reported error message
pub fn handle_error(message: &str) -> Disposition {
    if is_dev_environment_error(message) {
        tracing::debug!("Suppressed dev environment error: {}", message);
        Disposition::Suppressed
    } else {
        Disposition::Propagate
    }
}

/// Handle the error of a failed future
pub fn handle_rejection<E: Display + ?Sized>(reason: &E) -> Disposition {
    let message = reason.to_string();
    if is_dev_environment_error(&message) {
        tracing::debug!("Suppressed dev environment rejection: {}", message);
        Disposition::Suppressed
    } else {
        Disposition::Propagate
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

static INSTALL: Once = Once::new();

/// Install a panic hook that drops dev-tooling panics
///
/// Every other panic goes to the previously installed hook. Calling this
/// more than once has no further effect.
pub fn install_global_handler() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Some(message) = panic_message(info.payload()) {
                if handle_error(&message) == Disposition::Suppressed {
                    return;
                }
            }
            previous(info);
        }));
    });
}

/// Run `future`, returning `fallback` if it fails
///
/// Failures are logged at `error` unless they are dev-tooling noise.
pub async fn safe_async<F, T, E>(future: F, fallback: T) -> T
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match future.await {
        Ok(value) => value,
        Err(e) => {
            if handle_rejection(&e) == Disposition::Propagate {
                tracing::error!("Async operation failed: {}", e);
            }
            fallback
        }
    }
}
