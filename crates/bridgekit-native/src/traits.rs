// SPDX-License-Identifier: MIT
//
// Platform-agnostic trait definitions for the native capability layer.
//
// Every asynchronous native boundary (UI presentation, permission prompt)
// takes a oneshot sender that the backend fires exactly once. A sender that
// is dropped without firing is the explicit "abandoned" state; callers must
// treat it as cancel (UI flows) or deny (permission prompts). Each call
// owns its own sender, so overlapping calls can never clobber one
// another's reply.

use bridgekit_core::error::Result;
use bridgekit_core::types::AuthorizationStatus;
use tokio::sync::oneshot;

/// Unified capability layer that groups everything the two bridges need.
pub trait NativeLayer:
    ContactStore + ContactUi + LocationAuthority + MediaAuthority + ContactsAuthority + SystemSettings
{
    /// Human-readable platform name (e.g. "iOS", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// The capabilities the ContactsBridge depends on.
pub trait ContactCapabilities: ContactStore + ContactUi {}
impl<T: ContactStore + ContactUi + ?Sized> ContactCapabilities for T {}

/// The capabilities the PermissionsBridge depends on.
pub trait PermissionCapabilities:
    LocationAuthority + MediaAuthority + ContactsAuthority + SystemSettings
{
}
impl<T: LocationAuthority + MediaAuthority + ContactsAuthority + SystemSettings + ?Sized>
    PermissionCapabilities for T
{
}

/// Read/write access to the native contact store.
///
/// Backends acquire the underlying store handle per call; nothing is
/// cached between calls and the native store stays the system of record.
pub trait ContactStore {
    /// Enumerate contacts, optionally filtered by a name-matching predicate.
    /// Returns contacts in the store's enumeration order.
    fn contacts(&self, query: Option<&str>) -> Result<Vec<NativeContact>>;

    /// Persist a new contact directly, without any UI.
    fn add(&self, contact: &NativeContact) -> Result<()>;

    /// Look up a contact by identifier and delete it. Missing contact,
    /// stale identifier, and store failure are all reported as errors.
    fn delete(&self, identifier: &str) -> Result<()>;
}

/// Native contact UI flows (picker and new-contact editor).
pub trait ContactUi {
    /// Present the native contact picker. The sender fires with
    /// `Some(contact)` on selection or `None` on cancel.
    fn present_picker(&self, outcome: oneshot::Sender<Option<NativeContact>>);

    /// Present the native "new contact" editor pre-filled with `contact`.
    /// The sender fires once the UI is dismissed, whether or not the user
    /// saved.
    fn present_editor(&self, contact: NativeContact, dismissed: oneshot::Sender<()>);
}

/// Which location authorization a consent prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationRequestMode {
    WhenInUse,
    Always,
}

/// Location authorization state and consent prompting.
pub trait LocationAuthority {
    /// Current authorization status; never prompts.
    fn location_status(&self) -> AuthorizationStatus;

    /// Trigger the native consent prompt for `mode`. The sender fires with
    /// the new status once the authorization-changed notification arrives.
    /// Callers must only invoke this when the status is `NotDetermined`.
    fn request_location(
        &self,
        mode: LocationRequestMode,
        changed: oneshot::Sender<AuthorizationStatus>,
    );
}

/// Microphone and camera authorization.
pub trait MediaAuthority {
    /// Current microphone authorization; never prompts.
    fn audio_status(&self) -> AuthorizationStatus;

    /// Current camera authorization; never prompts.
    fn video_status(&self) -> AuthorizationStatus;

    /// Request microphone access. The OS callback delivers the final
    /// decision directly, no notification-based deferral involved.
    fn request_audio(&self, decided: oneshot::Sender<bool>);

    /// Request camera access; same contract as `request_audio`.
    fn request_video(&self, decided: oneshot::Sender<bool>);
}

/// Contact-store authorization.
pub trait ContactsAuthority {
    /// Current contacts authorization; never prompts.
    fn contacts_status(&self) -> AuthorizationStatus;

    /// Request contacts access; the sender fires with whether access was
    /// granted.
    fn request_contacts_access(&self, granted: oneshot::Sender<bool>);
}

/// System settings screen and platform identity.
pub trait SystemSettings {
    /// Open the app's page in the system settings. Best-effort: `Ok(true)`
    /// means the screen opened, nothing more. Platforms without the
    /// capability return `BridgeError::PlatformUnavailable`.
    fn open_app_settings(&self) -> Result<bool>;

    /// Literal platform name plus OS version, e.g. "iOS 17.2".
    fn platform_version(&self) -> String;
}

// ---------------------------------------------------------------------------
// Native-side record types
// ---------------------------------------------------------------------------

/// A native label constant, or a pass-through custom label.
///
/// The well-known variants mirror the native label constants; anything else
/// travels as `Custom` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeLabel {
    Main,
    Mobile,
    Iphone,
    Home,
    Work,
    Custom(String),
}

impl NativeLabel {
    /// The localized display string for this label. Outside iOS this is a
    /// fixed-locale stand-in for the platform's label localization.
    pub fn localized(&self) -> &str {
        match self {
            Self::Main => "main",
            Self::Mobile => "mobile",
            Self::Iphone => "iPhone",
            Self::Home => "home",
            Self::Work => "work",
            Self::Custom(text) => text,
        }
    }
}

/// A labeled native value (phone number, email address, postal address).
///
/// `label` is `None` for store entries that carry no label at all; wire
/// writes always produce `Some`, possibly `Custom("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLabeled<T> {
    pub label: Option<NativeLabel>,
    pub value: T,
}

impl<T> NativeLabeled<T> {
    pub fn new(label: Option<NativeLabel>, value: T) -> Self {
        Self { label, value }
    }
}

/// A native postal address value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativePostalAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub country: String,
}

/// A native contact record, constructed fresh per call and discarded after
/// marshaling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeContact {
    /// Store identifier; `None` for contacts not yet persisted.
    pub identifier: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub middle_name: String,
    pub name_prefix: String,
    pub name_suffix: String,
    pub organization: String,
    pub job_title: String,
    /// Thumbnail image bytes, when the store has one.
    pub image_data: Option<Vec<u8>>,
    pub phones: Vec<NativeLabeled<String>>,
    pub emails: Vec<NativeLabeled<String>>,
    pub postal_addresses: Vec<NativeLabeled<NativePostalAddress>>,
}

impl NativeContact {
    /// Full display name in the platform formatting convention: name
    /// components joined in prefix/given/middle/family/suffix order,
    /// skipping empty parts. `None` when every name field is empty
    /// (matching the platform formatter, which yields no string at all).
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.name_prefix.as_str(),
            self.given_name.as_str(),
            self.middle_name.as_str(),
            self.family_name.as_str(),
            self.name_suffix.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Case-insensitive name match used by backends without a native
    /// predicate (stub/test stores). The iOS backend uses the store's own
    /// name predicate instead.
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [
            &self.given_name,
            &self.family_name,
            &self.middle_name,
            &self.organization,
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&query))
            || self
                .display_name()
                .is_some_and(|name| name.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_skips_empty_components() {
        let contact = NativeContact {
            name_prefix: "Dr.".into(),
            given_name: "Grace".into(),
            family_name: "Hopper".into(),
            ..Default::default()
        };
        assert_eq!(contact.display_name().as_deref(), Some("Dr. Grace Hopper"));
    }

    #[test]
    fn display_name_is_none_for_empty_names() {
        let contact = NativeContact {
            organization: "Acme".into(),
            ..Default::default()
        };
        assert_eq!(contact.display_name(), None);
    }

    #[test]
    fn labels_localize_to_display_strings() {
        assert_eq!(NativeLabel::Main.localized(), "main");
        assert_eq!(NativeLabel::Iphone.localized(), "iPhone");
        assert_eq!(NativeLabel::Custom("pager".into()).localized(), "pager");
    }

    #[test]
    fn name_match_covers_name_fields_and_organization() {
        let contact = NativeContact {
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            organization: "Analytical Engines".into(),
            ..Default::default()
        };
        assert!(contact.matches_name("love"));
        assert!(contact.matches_name("analytical"));
        assert!(contact.matches_name("ada lovelace"));
        assert!(!contact.matches_name("babbage"));
    }
}
