//! Version information for the discovery assistant
//!
//! Values are taken from Cargo.toml at build time.

/// The version of the application, set at build time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the application
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Get the full version string
pub fn full_version() -> String {
    format!("{} v{}", APP_NAME, VERSION)
}
