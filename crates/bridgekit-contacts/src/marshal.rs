// SPDX-License-Identifier: MIT
//
// Dictionary ↔ record ↔ native-contact marshaling.
//
// The wire dictionary is deliberately lenient on read: an absent or
// wrong-typed scalar becomes the empty string, phone/email entries without
// a `value` are dropped, and postal addresses are kept even when every
// sub-field is empty. Writes are exact. Round-trips preserve every scalar
// and list `value` field; label text may change through localization.

use serde_json::{Map, Value};

use bridgekit_core::error::Result;
use bridgekit_core::types::{ContactRecord, LabeledValue, PostalAddress};
use bridgekit_native::traits::{NativeContact, NativeLabel, NativeLabeled, NativePostalAddress};

/// Parse a wire dictionary into a typed record. Never fails: anything
/// missing or malformed collapses to the field's default.
pub fn record_from_value(value: &Value) -> ContactRecord {
    let Some(map) = value.as_object() else {
        return ContactRecord::default();
    };

    ContactRecord {
        identifier: map
            .get("identifier")
            .and_then(Value::as_str)
            .map(str::to_owned),
        // Derived on read, never accepted from the caller.
        display_name: None,
        given_name: scalar(map, "givenName"),
        family_name: scalar(map, "familyName"),
        middle_name: scalar(map, "middleName"),
        prefix: scalar(map, "prefix"),
        suffix: scalar(map, "suffix"),
        company: scalar(map, "company"),
        job_title: scalar(map, "jobTitle"),
        avatar: avatar_bytes(map),
        phones: value_entries(map, "phones"),
        emails: value_entries(map, "emails"),
        postal_addresses: address_entries(map),
    }
}

/// Serialize a record to its wire dictionary.
pub fn record_to_value(record: &ContactRecord) -> Result<Value> {
    Ok(serde_json::to_value(record)?)
}

/// Build a transient native contact from a record, normalizing phone
/// labels to the native constants.
pub fn record_to_native(record: &ContactRecord) -> NativeContact {
    NativeContact {
        // The store assigns identifiers; one supplied by the caller is not
        // carried onto a new native contact.
        identifier: None,
        given_name: record.given_name.clone(),
        family_name: record.family_name.clone(),
        middle_name: record.middle_name.clone(),
        name_prefix: record.prefix.clone(),
        name_suffix: record.suffix.clone(),
        organization: record.company.clone(),
        job_title: record.job_title.clone(),
        image_data: record.avatar.clone().filter(|bytes| !bytes.is_empty()),
        phones: record
            .phones
            .iter()
            .map(|entry| {
                NativeLabeled::new(Some(phone_label(&entry.label)), entry.value.clone())
            })
            .collect(),
        emails: record
            .emails
            .iter()
            .map(|entry| {
                NativeLabeled::new(
                    Some(NativeLabel::Custom(entry.label.clone())),
                    entry.value.clone(),
                )
            })
            .collect(),
        postal_addresses: record
            .postal_addresses
            .iter()
            .map(|addr| {
                NativeLabeled::new(
                    Some(NativeLabel::Custom(addr.label.clone())),
                    NativePostalAddress {
                        street: addr.street.clone(),
                        city: addr.city.clone(),
                        postal_code: addr.postcode.clone(),
                        state: addr.region.clone(),
                        country: addr.country.clone(),
                    },
                )
            })
            .collect(),
    }
}

/// Read a native contact into a record, localizing labels and computing
/// the display name.
pub fn native_to_record(contact: &NativeContact) -> ContactRecord {
    ContactRecord {
        identifier: contact.identifier.clone(),
        display_name: contact.display_name(),
        given_name: contact.given_name.clone(),
        family_name: contact.family_name.clone(),
        middle_name: contact.middle_name.clone(),
        prefix: contact.name_prefix.clone(),
        suffix: contact.name_suffix.clone(),
        company: contact.organization.clone(),
        job_title: contact.job_title.clone(),
        avatar: contact.image_data.clone().filter(|bytes| !bytes.is_empty()),
        phones: contact
            .phones
            .iter()
            .map(|entry| LabeledValue::new(read_label(&entry.label, "other"), &entry.value))
            .collect(),
        emails: contact
            .emails
            .iter()
            .map(|entry| LabeledValue::new(read_label(&entry.label, "other"), &entry.value))
            .collect(),
        postal_addresses: contact
            .postal_addresses
            .iter()
            .map(|entry| PostalAddress {
                label: read_label(&entry.label, ""),
                street: entry.value.street.clone(),
                city: entry.value.city.clone(),
                postcode: entry.value.postal_code.clone(),
                region: entry.value.state.clone(),
                country: entry.value.country.clone(),
            })
            .collect(),
    }
}

/// Normalize caller-supplied phone label text to a native label constant.
/// Anything unrecognized passes through unchanged as a custom label.
pub fn phone_label(text: &str) -> NativeLabel {
    match text {
        "main" => NativeLabel::Main,
        "mobile" => NativeLabel::Mobile,
        "iPhone" => NativeLabel::Iphone,
        other => NativeLabel::Custom(other.to_owned()),
    }
}

fn read_label(label: &Option<NativeLabel>, missing: &str) -> String {
    label
        .as_ref()
        .map(|l| l.localized().to_owned())
        .unwrap_or_else(|| missing.to_owned())
}

fn scalar(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Avatar bytes from the wire (array of byte values); only a non-empty
/// array sets the field.
fn avatar_bytes(map: &Map<String, Value>) -> Option<Vec<u8>> {
    let bytes: Vec<u8> = map
        .get("avatar")?
        .as_array()?
        .iter()
        .filter_map(Value::as_u64)
        .filter_map(|n| u8::try_from(n).ok())
        .collect();
    if bytes.is_empty() { None } else { Some(bytes) }
}

/// Phone/email entries: dictionaries with a `value` key; entries without
/// one are dropped.
fn value_entries(map: &Map<String, Value>, key: &str) -> Vec<LabeledValue> {
    let Some(entries) = map.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let value = entry.get("value")?.as_str()?;
            Some(LabeledValue::new(scalar(entry, "label"), value))
        })
        .collect()
}

/// Postal address entries are never dropped; every sub-field defaults to
/// the empty string.
fn address_entries(map: &Map<String, Value>) -> Vec<PostalAddress> {
    let Some(entries) = map.get("postalAddresses").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| PostalAddress {
            label: scalar(entry, "label"),
            street: scalar(entry, "street"),
            city: scalar(entry, "city"),
            postcode: scalar(entry, "postcode"),
            region: scalar(entry, "region"),
            country: scalar(entry, "country"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> ContactRecord {
        ContactRecord {
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            middle_name: "King".into(),
            prefix: "Countess".into(),
            suffix: "of Lovelace".into(),
            company: "Analytical Engines".into(),
            job_title: "Programmer".into(),
            avatar: Some(vec![1, 2, 3]),
            phones: vec![
                LabeledValue::new("mobile", "+44 20 1234"),
                LabeledValue::new("pager", "+44 20 5678"),
            ],
            emails: vec![LabeledValue::new("work", "ada@engines.example")],
            postal_addresses: vec![PostalAddress {
                label: "home".into(),
                street: "12 St James's Square".into(),
                city: "London".into(),
                postcode: "SW1Y 4JH".into(),
                region: "".into(),
                country: "UK".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn round_trip_preserves_scalars_and_values() {
        let record = sample_record();
        let wire = record_to_value(&record).expect("serialize");
        let back = record_from_value(&wire);

        assert_eq!(back.given_name, record.given_name);
        assert_eq!(back.family_name, record.family_name);
        assert_eq!(back.middle_name, record.middle_name);
        assert_eq!(back.prefix, record.prefix);
        assert_eq!(back.suffix, record.suffix);
        assert_eq!(back.company, record.company);
        assert_eq!(back.job_title, record.job_title);
        assert_eq!(back.avatar, record.avatar);

        let values = |entries: &[LabeledValue]| {
            entries.iter().map(|e| e.value.clone()).collect::<Vec<_>>()
        };
        assert_eq!(values(&back.phones), values(&record.phones));
        assert_eq!(values(&back.emails), values(&record.emails));
        assert_eq!(back.postal_addresses, record.postal_addresses);
    }

    #[test]
    fn absent_or_wrong_typed_scalars_default_to_empty() {
        let wire = json!({
            "givenName": "Linus",
            "familyName": 42,
            "company": null,
        });
        let record = record_from_value(&wire);
        assert_eq!(record.given_name, "Linus");
        assert_eq!(record.family_name, "");
        assert_eq!(record.company, "");
        assert_eq!(record.job_title, "");
    }

    #[test]
    fn non_dictionary_arguments_produce_an_empty_record() {
        assert_eq!(record_from_value(&json!("bogus")), ContactRecord::default());
        assert_eq!(record_from_value(&Value::Null), ContactRecord::default());
    }

    #[test]
    fn phone_entries_without_value_are_dropped() {
        let wire = json!({
            "phones": [
                { "label": "mobile", "value": "111" },
                { "label": "home" },
                { "label": "work", "value": 5 },
            ],
        });
        let record = record_from_value(&wire);
        assert_eq!(record.phones, vec![LabeledValue::new("mobile", "111")]);
    }

    #[test]
    fn postal_addresses_are_never_dropped() {
        let wire = json!({ "postalAddresses": [ {} ] });
        let record = record_from_value(&wire);
        assert_eq!(record.postal_addresses, vec![PostalAddress::default()]);
    }

    #[test]
    fn empty_avatar_is_not_set() {
        let record = record_from_value(&json!({ "avatar": [] }));
        assert_eq!(record.avatar, None);
        let native = record_to_native(&ContactRecord {
            avatar: Some(Vec::new()),
            ..Default::default()
        });
        assert_eq!(native.image_data, None);
    }

    #[test]
    fn well_known_phone_labels_normalize_to_native_constants() {
        assert_eq!(phone_label("main"), NativeLabel::Main);
        assert_eq!(phone_label("mobile"), NativeLabel::Mobile);
        assert_eq!(phone_label("iPhone"), NativeLabel::Iphone);
        assert_eq!(phone_label("carphone"), NativeLabel::Custom("carphone".into()));
    }

    #[test]
    fn unlabeled_native_entries_read_back_with_defaults() {
        let native = NativeContact {
            given_name: "Grace".into(),
            phones: vec![NativeLabeled::new(None, "555".to_string())],
            emails: vec![NativeLabeled::new(None, "g@navy.example".to_string())],
            postal_addresses: vec![NativeLabeled::new(None, NativePostalAddress::default())],
            ..Default::default()
        };
        let record = native_to_record(&native);
        assert_eq!(record.phones[0].label, "other");
        assert_eq!(record.emails[0].label, "other");
        assert_eq!(record.postal_addresses[0].label, "");
    }

    #[test]
    fn display_name_is_computed_not_stored() {
        let wire = json!({ "displayName": "Someone Else", "givenName": "Ada" });
        let record = record_from_value(&wire);
        assert_eq!(record.display_name, None);

        let native = NativeContact {
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            ..Default::default()
        };
        let record = native_to_record(&native);
        assert_eq!(record.display_name.as_deref(), Some("Ada Lovelace"));
    }
}
