//! Structured logging.
//!
//! # Responsibilities
//! - Define the narrow logging capability the transport writes through
//! - Provide a default implementation backed by `tracing`
//! - Initialize the subscriber for binaries
//!
//! # Design Decisions
//! - The transport never depends on a concrete logging framework
//! - Closures are loggers, so tests can capture lines directly
//! - `OS_DEBUG` turns logging on without touching configuration

use std::ffi::OsStr;
use std::fmt;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that enables request/response logging when non-empty.
pub const DEBUG_ENV: &str = "OS_DEBUG";

/// Sink for formatted request/response log lines.
pub trait Logger: Send + Sync {
    fn log(&self, args: fmt::Arguments<'_>);
}

impl<F> Logger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn log(&self, args: fmt::Arguments<'_>) {
        self(args)
    }
}

/// Emits every line as a `DEBUG` tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "openstack_transport", "[DEBUG] {}", args);
    }
}

/// Whether logging should be on, given an explicit flag and the environment.
pub fn logging_enabled(enable: bool) -> bool {
    enable || debug_value_enables(std::env::var_os(DEBUG_ENV).as_deref())
}

fn debug_value_enables(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
