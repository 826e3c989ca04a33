//! Core types and identifiers for the RFID tag simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: the hexadecimal [`Epc`] of each simulated tag
//! - **Enums**: event types, crossing directions, run states and threshold descriptors
//! - **Configuration**: simulator configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use rfid_tag_simulator::types::*;
//!
//! let epc = Epc::parse("0a1b2c").unwrap();
//! assert_eq!(epc.as_str(), "0A1B2C");
//!
//! let config = SimulatorConfig {
//!     zones: vec!["DOCK".to_string(), "SHELF".to_string()],
//!     reporting_interval: 2000,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
