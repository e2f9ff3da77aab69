//! Flutter-Rust bridge wrapper for danger-alert-core.
//!
//! Exposes the core through opaque FFI types in [`api`] and re-exports
//! `danger-alert-core` for integration with the Flutter build system via
//! Cargokit. Positions and notifications cross the bridge through the
//! adapters in `platform`.

pub mod api;
mod platform;

pub use danger_alert_core::*;
