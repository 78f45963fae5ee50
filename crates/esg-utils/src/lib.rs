//! Shared utilities for the ESG greenwashing detector
//!
//! This crate provides the functionality every other crate in the workspace
//! leans on: tracing setup and settings loaded from the environment.

pub mod logging;
pub mod settings;

pub use logging::{LogOptions, init_tracing, init_tracing_with};
pub use settings::{Settings, SettingsBuilder, SettingsError};
