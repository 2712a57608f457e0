// SPDX-License-Identifier: MIT
//
// Host configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the call router: the logical channel names the two
/// bridges are registered under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Channel the ContactsBridge answers on.
    pub contacts_channel: String,
    /// Channel the PermissionsBridge answers on.
    pub permissions_channel: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            contacts_channel: "bridgekit/contacts".into(),
            permissions_channel: "bridgekit/permissions".into(),
        }
    }
}
