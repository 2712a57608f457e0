// SPDX-License-Identifier: MIT
//
// Unified error types for BridgeKit.

use thiserror::Error;

/// Top-level error type for all BridgeKit operations.
///
/// Native-layer errors never cross the channel boundary as panics or raw
/// faults: the bridges catch them and convert them into the reply channel's
/// error representation or a default value.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Contact store --
    #[error("contact store error: {0}")]
    Store(String),

    #[error("contact not found: {0}")]
    ContactNotFound(String),

    // -- System settings --
    #[error("failed to open system settings: {0}")]
    Settings(String),

    // -- Serialization --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
