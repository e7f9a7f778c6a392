//! Configuration module for ledger-etl
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Persisted extraction settings (API endpoint, paging, retries)
//! - API credentials that are never written to disk

pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::ApiToken;
pub use paths::EtlPaths;
pub use settings::Settings;
