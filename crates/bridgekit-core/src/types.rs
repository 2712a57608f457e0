// SPDX-License-Identifier: MIT
//
// Core domain types for the BridgeKit plugin bridges.

use serde::{Deserialize, Serialize};

/// A single labeled list entry of a contact (phone number or email address).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A labeled postal address of a contact.
///
/// Unlike phones and emails, postal addresses have no single `value` field
/// and are never dropped during marshaling, even when every sub-field is
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalAddress {
    pub label: String,
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub region: String,
    pub country: String,
}

/// Wire-facing contact record.
///
/// This is the flat field dictionary exchanged over the channel. Field names
/// on the wire are camelCase (`givenName`, `postalAddresses`, ...). Scalar
/// fields default to the empty string; `identifier` is present only for
/// contacts that already exist in the native store, and `display_name` is
/// derived from the name fields on read, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub middle_name: String,
    pub prefix: String,
    pub suffix: String,
    pub company: String,
    pub job_title: String,
    /// Raw thumbnail bytes; on the JSON wire this is an array of byte values.
    /// Only set when the data is non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Vec<u8>>,
    pub phones: Vec<LabeledValue>,
    pub emails: Vec<LabeledValue>,
    pub postal_addresses: Vec<PostalAddress>,
}

/// The fixed set of permissions the bridge understands.
///
/// Several caller-facing names alias to one kind: the coarse/fine/when-in-use
/// location names are a single kind, as are read/write contacts. Unknown
/// names are an unsupported-operation condition, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionKind {
    RecordAudio,
    Camera,
    WhenInUseLocation,
    AlwaysLocation,
    Contacts,
}

impl PermissionKind {
    /// Parse a caller-facing permission name. Returns `None` for names the
    /// bridge does not support.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RECORD_AUDIO" => Some(Self::RecordAudio),
            "CAMERA" => Some(Self::Camera),
            "ACCESS_COARSE_LOCATION" | "ACCESS_FINE_LOCATION" | "WHEN_IN_USE_LOCATION" => {
                Some(Self::WhenInUseLocation)
            }
            "ALWAYS_LOCATION" => Some(Self::AlwaysLocation),
            "READ_CONTACTS" | "WRITE_CONTACTS" => Some(Self::Contacts),
            _ => None,
        }
    }

    /// Canonical caller-facing name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::RecordAudio => "RECORD_AUDIO",
            Self::Camera => "CAMERA",
            Self::WhenInUseLocation => "WHEN_IN_USE_LOCATION",
            Self::AlwaysLocation => "ALWAYS_LOCATION",
            Self::Contacts => "READ_CONTACTS",
        }
    }
}

/// Native authorization state for a capability.
///
/// `Authorized` is the single authorized state of the contacts and media
/// subsystems; the location subsystem distinguishes `AuthorizedAlways` from
/// `AuthorizedWhenInUse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    /// Raw integer status code as surfaced by the native subsystems.
    ///
    /// Contacts/media: notDetermined 0, restricted 1, denied 2, authorized 3.
    /// Location: always 3, whenInUse 4.
    pub fn raw_code(self) -> i64 {
        match self {
            Self::NotDetermined => 0,
            Self::Restricted => 1,
            Self::Denied => 2,
            Self::Authorized | Self::AuthorizedAlways => 3,
            Self::AuthorizedWhenInUse => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_record_wire_field_names_are_camel_case() {
        let record = ContactRecord {
            given_name: "Ada".into(),
            job_title: "Analyst".into(),
            postal_addresses: vec![PostalAddress::default()],
            ..Default::default()
        };
        let value = serde_json::to_value(&record).expect("serialize");
        let map = value.as_object().expect("object");
        assert!(map.contains_key("givenName"));
        assert!(map.contains_key("jobTitle"));
        assert!(map.contains_key("postalAddresses"));
        // Absent optionals are omitted entirely, not null.
        assert!(!map.contains_key("identifier"));
        assert!(!map.contains_key("displayName"));
        assert!(!map.contains_key("avatar"));
    }

    #[test]
    fn permission_names_alias_to_one_kind() {
        for name in [
            "ACCESS_COARSE_LOCATION",
            "ACCESS_FINE_LOCATION",
            "WHEN_IN_USE_LOCATION",
        ] {
            assert_eq!(
                PermissionKind::from_name(name),
                Some(PermissionKind::WhenInUseLocation)
            );
        }
        assert_eq!(
            PermissionKind::from_name("READ_CONTACTS"),
            PermissionKind::from_name("WRITE_CONTACTS")
        );
        assert_eq!(PermissionKind::from_name("BLUETOOTH"), None);
    }

    #[test]
    fn raw_status_codes_match_native_values() {
        assert_eq!(AuthorizationStatus::NotDetermined.raw_code(), 0);
        assert_eq!(AuthorizationStatus::Restricted.raw_code(), 1);
        assert_eq!(AuthorizationStatus::Denied.raw_code(), 2);
        assert_eq!(AuthorizationStatus::Authorized.raw_code(), 3);
        assert_eq!(AuthorizationStatus::AuthorizedAlways.raw_code(), 3);
        assert_eq!(AuthorizationStatus::AuthorizedWhenInUse.raw_code(), 4);
    }
}
