// SPDX-License-Identifier: MIT
//
// The PermissionsBridge method-dispatch handler.
//
// Checks and status queries are synchronous reads of native authorization
// state and never prompt. Requests prompt at most once per call, each with
// its own completion; a dropped completion resolves as deny. Location
// requests carry the requested mode explicitly, so an always-request and a
// when-in-use request in flight at the same time cannot confuse each
// other's authorization-changed callback.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use bridgekit_core::channel::{MethodCall, MethodReply};
use bridgekit_core::types::{AuthorizationStatus, PermissionKind};
use bridgekit_native::traits::{LocationRequestMode, PermissionCapabilities};

const BAD_ARGUMENTS: &str = "Expected a 'permission' argument naming the permission";

/// Handler for the permissions channel.
pub struct PermissionsBridge<N: PermissionCapabilities + ?Sized> {
    native: Arc<N>,
}

impl<N: PermissionCapabilities + ?Sized> PermissionsBridge<N> {
    pub fn new(native: Arc<N>) -> Self {
        Self { native }
    }

    /// Dispatch one call and produce its single reply. Unrecognized method
    /// names and unknown permission kinds reply not-implemented, never an
    /// error.
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub async fn handle(&self, call: MethodCall) -> MethodReply {
        match call.method.as_str() {
            "checkPermission" => match Self::kind_argument(&call) {
                Ok(Some(kind)) => MethodReply::bool(self.check(kind)),
                Ok(None) => MethodReply::NotImplemented,
                Err(reply) => reply,
            },
            "getPermissionStatus" => match Self::kind_argument(&call) {
                Ok(Some(kind)) => MethodReply::Value(Value::from(self.status_code(kind))),
                Ok(None) => MethodReply::NotImplemented,
                Err(reply) => reply,
            },
            "requestPermission" => match Self::kind_argument(&call) {
                Ok(Some(kind)) => MethodReply::bool(self.request(kind).await),
                Ok(None) => MethodReply::NotImplemented,
                Err(reply) => reply,
            },
            "openSettings" => self.open_settings(),
            "getPlatformVersion" => MethodReply::Value(Value::String(
                self.native.platform_version(),
            )),
            _ => MethodReply::NotImplemented,
        }
    }

    /// Parse the `permission` argument. A missing or non-string argument is
    /// a caller error; an unknown but well-formed name is merely
    /// unsupported (`Ok(None)`).
    fn kind_argument(call: &MethodCall) -> Result<Option<PermissionKind>, MethodReply> {
        let name = call
            .argument_map()
            .and_then(|map| map.get("permission"))
            .and_then(Value::as_str)
            .ok_or_else(|| MethodReply::error("bad_arguments", BAD_ARGUMENTS, None))?;
        let kind = PermissionKind::from_name(name);
        if kind.is_none() {
            debug!(permission = name, "unsupported permission kind");
        }
        Ok(kind)
    }

    /// Whether the kind is currently authorized. Never prompts.
    fn check(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::RecordAudio => {
                self.native.audio_status() == AuthorizationStatus::Authorized
            }
            PermissionKind::Camera => {
                self.native.video_status() == AuthorizationStatus::Authorized
            }
            PermissionKind::WhenInUseLocation => matches!(
                self.native.location_status(),
                AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
            ),
            PermissionKind::AlwaysLocation => {
                self.native.location_status() == AuthorizationStatus::AuthorizedAlways
            }
            PermissionKind::Contacts => {
                self.native.contacts_status() == AuthorizationStatus::Authorized
            }
        }
    }

    /// Integer status code for the kind. Location kinds fold the status the
    /// caller asked about into "authorized" (3): a when-in-use query treats
    /// either grant as authorized, while an always query reports a
    /// when-in-use grant as restricted (1). Everything else is the raw
    /// native code.
    fn status_code(&self, kind: PermissionKind) -> i64 {
        match kind {
            PermissionKind::RecordAudio => self.native.audio_status().raw_code(),
            PermissionKind::Camera => self.native.video_status().raw_code(),
            PermissionKind::WhenInUseLocation => match self.native.location_status() {
                AuthorizationStatus::AuthorizedAlways
                | AuthorizationStatus::AuthorizedWhenInUse => 3,
                other => other.raw_code(),
            },
            PermissionKind::AlwaysLocation => match self.native.location_status() {
                AuthorizationStatus::AuthorizedAlways => 3,
                AuthorizationStatus::AuthorizedWhenInUse => 1,
                other => other.raw_code(),
            },
            PermissionKind::Contacts => self.native.contacts_status().raw_code(),
        }
    }

    /// Prompt for the kind if the native state allows it, resolving with the
    /// final grant decision. A prompt that never fires (dropped sender)
    /// resolves as deny.
    async fn request(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::RecordAudio => {
                let (tx, rx) = oneshot::channel();
                self.native.request_audio(tx);
                rx.await.unwrap_or(false)
            }
            PermissionKind::Camera => {
                let (tx, rx) = oneshot::channel();
                self.native.request_video(tx);
                rx.await.unwrap_or(false)
            }
            PermissionKind::WhenInUseLocation => {
                self.request_location(LocationRequestMode::WhenInUse).await
            }
            PermissionKind::AlwaysLocation => {
                self.request_location(LocationRequestMode::Always).await
            }
            PermissionKind::Contacts => match self.native.contacts_status() {
                AuthorizationStatus::Authorized => true,
                AuthorizationStatus::Denied => false,
                AuthorizationStatus::Restricted | AuthorizationStatus::NotDetermined => {
                    let (tx, rx) = oneshot::channel();
                    self.native.request_contacts_access(tx);
                    rx.await.unwrap_or(false)
                }
                _ => false,
            },
        }
    }

    /// Location consent is prompt-once: only a `NotDetermined` state defers
    /// on the authorization-changed notification; any settled state replies
    /// immediately from the current status.
    async fn request_location(&self, mode: LocationRequestMode) -> bool {
        let status = self.native.location_status();
        let status = if status == AuthorizationStatus::NotDetermined {
            let (tx, rx) = oneshot::channel();
            self.native.request_location(mode, tx);
            match rx.await {
                Ok(status) => status,
                Err(_) => {
                    debug!("location prompt abandoned, resolving as deny");
                    return false;
                }
            }
        } else {
            status
        };
        match mode {
            LocationRequestMode::WhenInUse => matches!(
                status,
                AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
            ),
            LocationRequestMode::Always => status == AuthorizationStatus::AuthorizedAlways,
        }
    }

    /// Best-effort settings open: `true` means the settings screen opened,
    /// not that the user changed anything. Platforms without the capability
    /// signal unsupported.
    fn open_settings(&self) -> MethodReply {
        match self.native.open_app_settings() {
            Ok(true) => MethodReply::bool(true),
            Ok(false) => MethodReply::NotImplemented,
            Err(e) => {
                warn!(error = %e, "open settings unavailable");
                MethodReply::NotImplemented
            }
        }
    }
}
