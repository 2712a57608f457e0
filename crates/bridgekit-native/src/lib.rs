// SPDX-License-Identifier: MIT
//
// BridgeKit — Native platform capability layer.
//
// This crate defines the trait seams between the bridges and the OS:
// contact store, contact UI flows, location/media/contacts authorization,
// and the system settings screen. The bridges only ever see these traits;
// platform backends live behind cfg gates.

pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(not(target_os = "ios"))]
pub mod stub;

use std::sync::Arc;

use traits::NativeLayer;

/// The capability layer for the target operating system.
///
/// On iOS this wraps CNContactStore / CLLocationManager / AVCaptureDevice
/// through objc2; everywhere else a stub that reports every capability as
/// unavailable, so desktop/CI builds link and run.
pub fn platform_layer() -> Arc<dyn NativeLayer> {
    #[cfg(target_os = "ios")]
    {
        Arc::new(ios::IosLayer::new())
    }
    #[cfg(not(target_os = "ios"))]
    {
        Arc::new(stub::StubLayer)
    }
}
