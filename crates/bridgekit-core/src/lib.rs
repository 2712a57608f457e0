// SPDX-License-Identifier: MIT
//
// BridgeKit — Core types and error definitions shared across all crates.

pub mod channel;
pub mod config;
pub mod error;
pub mod types;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use types::*;
