// SPDX-License-Identifier: MIT
//
// Stub capability layer for desktop/CI builds where the native mobile APIs
// are unavailable.
//
// Store operations return `PlatformUnavailable`; authorization reads report
// denied/not-determined; UI and prompt flows drop their completion sender,
// which the bridges resolve as cancel (picker, editor) or deny (prompts).

use bridgekit_core::error::{BridgeError, Result};
use bridgekit_core::types::AuthorizationStatus;
use tokio::sync::oneshot;

use crate::traits::*;

/// No-op capability layer returned on non-mobile platforms.
pub struct StubLayer;

impl NativeLayer for StubLayer {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl ContactStore for StubLayer {
    fn contacts(&self, _query: Option<&str>) -> Result<Vec<NativeContact>> {
        tracing::warn!("ContactStore::contacts called on stub layer");
        Err(BridgeError::PlatformUnavailable)
    }

    fn add(&self, _contact: &NativeContact) -> Result<()> {
        tracing::warn!("ContactStore::add called on stub layer");
        Err(BridgeError::PlatformUnavailable)
    }

    fn delete(&self, _identifier: &str) -> Result<()> {
        tracing::warn!("ContactStore::delete called on stub layer");
        Err(BridgeError::PlatformUnavailable)
    }
}

impl ContactUi for StubLayer {
    fn present_picker(&self, _outcome: oneshot::Sender<Option<NativeContact>>) {
        // Dropping the sender is the abandoned state; the bridge replies
        // as if the user cancelled.
        tracing::warn!("ContactUi::present_picker called on stub layer");
    }

    fn present_editor(&self, _contact: NativeContact, _dismissed: oneshot::Sender<()>) {
        tracing::warn!("ContactUi::present_editor called on stub layer");
    }
}

impl LocationAuthority for StubLayer {
    fn location_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::NotDetermined
    }

    fn request_location(
        &self,
        _mode: LocationRequestMode,
        _changed: oneshot::Sender<AuthorizationStatus>,
    ) {
        tracing::warn!("LocationAuthority::request_location called on stub layer");
    }
}

impl MediaAuthority for StubLayer {
    fn audio_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Denied
    }

    fn video_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Denied
    }

    fn request_audio(&self, _decided: oneshot::Sender<bool>) {
        tracing::warn!("MediaAuthority::request_audio called on stub layer");
    }

    fn request_video(&self, _decided: oneshot::Sender<bool>) {
        tracing::warn!("MediaAuthority::request_video called on stub layer");
    }
}

impl ContactsAuthority for StubLayer {
    fn contacts_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Denied
    }

    fn request_contacts_access(&self, _granted: oneshot::Sender<bool>) {
        tracing::warn!("ContactsAuthority::request_contacts_access called on stub layer");
    }
}

impl SystemSettings for StubLayer {
    fn open_app_settings(&self) -> Result<bool> {
        tracing::warn!("SystemSettings::open_app_settings called on stub layer");
        Err(BridgeError::PlatformUnavailable)
    }

    fn platform_version(&self) -> String {
        "Desktop (stub) 0.0".into()
    }
}
