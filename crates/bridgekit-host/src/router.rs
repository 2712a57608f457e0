// SPDX-License-Identifier: MIT
//
// Channel-name routing. Each inbound call is tagged with a correlation id
// for log tracing and handed to the bridge owning its channel; an unknown
// channel replies not-implemented, mirroring how the bridges treat unknown
// methods.

use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use bridgekit_contacts::ContactsBridge;
use bridgekit_core::channel::{CallId, MethodCall, MethodReply};
use bridgekit_core::config::BridgeConfig;
use bridgekit_native::traits::NativeLayer;
use bridgekit_permissions::PermissionsBridge;

pub struct Router {
    config: BridgeConfig,
    contacts: ContactsBridge<dyn NativeLayer>,
    permissions: PermissionsBridge<dyn NativeLayer>,
}

impl Router {
    pub fn new(config: BridgeConfig, native: Arc<dyn NativeLayer>) -> Self {
        Self {
            config,
            contacts: ContactsBridge::new(native.clone()),
            permissions: PermissionsBridge::new(native),
        }
    }

    /// Route one call to its channel's bridge. Every call gets exactly one
    /// reply.
    pub async fn dispatch(&self, channel: &str, call: MethodCall) -> MethodReply {
        let id = CallId::new();
        let span = info_span!("call", %id, channel);
        async {
            let reply = if channel == self.config.contacts_channel {
                self.contacts.handle(call).await
            } else if channel == self.config.permissions_channel {
                self.permissions.handle(call).await
            } else {
                debug!("unknown channel");
                MethodReply::NotImplemented
            };
            debug!(reply = ?reply_kind(&reply), "call completed");
            reply
        }
        .instrument(span)
        .await
    }
}

fn reply_kind(reply: &MethodReply) -> &'static str {
    match reply {
        MethodReply::Value(_) => "value",
        MethodReply::Error { .. } => "error",
        MethodReply::NotImplemented => "notImplemented",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use bridgekit_native::platform_layer;

    fn router() -> Router {
        Router::new(BridgeConfig::default(), platform_layer())
    }

    #[tokio::test]
    async fn routes_by_channel_name() {
        let router = router();
        let reply = router
            .dispatch(
                "bridgekit/permissions",
                MethodCall::new("getPlatformVersion", Value::Null),
            )
            .await;
        let MethodReply::Value(Value::String(version)) = reply else {
            panic!("expected platform version string");
        };
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn unknown_channel_replies_not_implemented() {
        let router = router();
        let reply = router
            .dispatch("bridgekit/battery", MethodCall::new("getLevel", Value::Null))
            .await;
        assert_eq!(reply, MethodReply::NotImplemented);
    }

    #[tokio::test]
    async fn contacts_channel_reaches_the_contacts_bridge() {
        let router = router();
        // The stub store cannot enumerate; the bridge degrades to an empty
        // sequence rather than an error.
        let reply = router
            .dispatch(
                "bridgekit/contacts",
                MethodCall::new("getContacts", json!("")),
            )
            .await;
        assert_eq!(reply, MethodReply::Value(json!([])));
    }
}
