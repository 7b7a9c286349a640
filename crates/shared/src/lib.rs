//! Shared types and configuration for VaultCore.
//!
//! This crate provides common types used across all other crates:
//! - Money type with exact minor-unit arithmetic
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{Money, MoneyError};
