// SPDX-License-Identifier: MIT
//
// The ContactsBridge method-dispatch handler.
//
// One asynchronous reply per call. UI-driven flows (picker, export editor)
// never surface failure to the caller beyond a null reply; enumeration
// failure degrades to an empty sequence. Add/delete report the generic
// failure signal with native detail attached.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use bridgekit_core::channel::{MethodCall, MethodReply};
use bridgekit_native::traits::ContactCapabilities;

use crate::marshal;

const ADD_FAILED: &str = "Failed to add contact";
const DELETE_FAILED: &str = "Failed to delete contact, make sure it has a valid identifier";

/// Handler for the contacts channel.
pub struct ContactsBridge<N: ContactCapabilities + ?Sized> {
    native: Arc<N>,
}

impl<N: ContactCapabilities + ?Sized> ContactsBridge<N> {
    pub fn new(native: Arc<N>) -> Self {
        Self { native }
    }

    /// Dispatch one call and produce its single reply. Unrecognized method
    /// names reply not-implemented, never an error.
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub async fn handle(&self, call: MethodCall) -> MethodReply {
        match call.method.as_str() {
            "pickContact" => self.pick_contact().await,
            "getContacts" => self.get_contacts(call.arguments.as_str()),
            "exportContact" => self.export_contact(&call.arguments).await,
            "addContact" => self.add_contact(&call.arguments),
            "deleteContact" => self.delete_contact(&call.arguments),
            _ => MethodReply::NotImplemented,
        }
    }

    /// Present the native picker and resolve with the selected contact, or
    /// null on cancel. Each call owns its completion; an abandoned flow
    /// (dropped sender) resolves as cancel.
    async fn pick_contact(&self) -> MethodReply {
        let (tx, rx) = oneshot::channel();
        self.native.present_picker(tx);
        match rx.await {
            Ok(Some(contact)) => {
                let record = marshal::native_to_record(&contact);
                match marshal::record_to_value(&record) {
                    Ok(value) => MethodReply::Value(value),
                    Err(e) => {
                        warn!(error = %e, "picked contact failed to serialize");
                        MethodReply::null()
                    }
                }
            }
            Ok(None) => MethodReply::null(),
            Err(_) => {
                debug!("contact picker abandoned, resolving as cancel");
                MethodReply::null()
            }
        }
    }

    /// Enumerate contacts, optionally filtered by name. Failure degrades to
    /// an empty sequence rather than an error reply.
    fn get_contacts(&self, query: Option<&str>) -> MethodReply {
        let contacts = match self.native.contacts(query) {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(error = %e, "contact enumeration failed, returning empty result");
                Vec::new()
            }
        };

        let mut out = Vec::with_capacity(contacts.len());
        for contact in &contacts {
            match marshal::record_to_value(&marshal::native_to_record(contact)) {
                Ok(value) => out.push(value),
                Err(e) => warn!(error = %e, "skipping unserializable contact"),
            }
        }
        debug!(count = out.len(), "contacts enumerated");
        MethodReply::Value(Value::Array(out))
    }

    /// Open the new-contact editor pre-filled with the given fields and
    /// resolve null once it is dismissed, saved or not.
    async fn export_contact(&self, arguments: &Value) -> MethodReply {
        let record = marshal::record_from_value(arguments);
        let contact = marshal::record_to_native(&record);

        let (tx, rx) = oneshot::channel();
        self.native.present_editor(contact, tx);
        if rx.await.is_err() {
            debug!("contact editor abandoned, resolving as dismissed");
        }
        MethodReply::null()
    }

    /// Persist a new contact directly, no UI.
    fn add_contact(&self, arguments: &Value) -> MethodReply {
        let record = marshal::record_from_value(arguments);
        let contact = marshal::record_to_native(&record);
        match self.native.add(&contact) {
            Ok(()) => MethodReply::null(),
            Err(e) => {
                warn!(error = %e, "add contact failed");
                MethodReply::error("add_failed", ADD_FAILED, Some(Value::String(e.to_string())))
            }
        }
    }

    /// Delete by identifier. A missing identifier fails fast without
    /// touching the store; lookup and deletion failures collapse into the
    /// same signal.
    fn delete_contact(&self, arguments: &Value) -> MethodReply {
        let identifier = arguments
            .as_object()
            .and_then(|map| map.get("identifier"))
            .and_then(Value::as_str);
        let Some(identifier) = identifier else {
            return MethodReply::error("delete_failed", DELETE_FAILED, None);
        };

        match self.native.delete(identifier) {
            Ok(()) => MethodReply::null(),
            Err(e) => {
                warn!(error = %e, identifier, "delete contact failed");
                MethodReply::error(
                    "delete_failed",
                    DELETE_FAILED,
                    Some(Value::String(e.to_string())),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::json;

    use bridgekit_core::error::{BridgeError, Result};
    use bridgekit_native::traits::{ContactStore, ContactUi, NativeContact};

    /// What the fake picker does with the next presentation.
    enum PickScript {
        Select(NativeContact),
        Cancel,
        Abandon,
        /// Hold the sender so the test can resolve it later.
        Defer,
    }

    #[derive(Default)]
    struct FakeContacts {
        contacts: RefCell<Vec<NativeContact>>,
        fail_enumeration: bool,
        added: RefCell<Vec<NativeContact>>,
        deleted: RefCell<Vec<String>>,
        pick_scripts: RefCell<VecDeque<PickScript>>,
        deferred_picks: RefCell<Vec<oneshot::Sender<Option<NativeContact>>>>,
        editor_presented: RefCell<Vec<NativeContact>>,
    }

    impl FakeContacts {
        fn with_contacts(contacts: Vec<NativeContact>) -> Self {
            Self {
                contacts: RefCell::new(contacts),
                ..Default::default()
            }
        }

        fn script(self, scripts: Vec<PickScript>) -> Self {
            *self.pick_scripts.borrow_mut() = scripts.into();
            self
        }
    }

    impl ContactStore for FakeContacts {
        fn contacts(&self, query: Option<&str>) -> Result<Vec<NativeContact>> {
            if self.fail_enumeration {
                return Err(BridgeError::Store("store unavailable".into()));
            }
            let all = self.contacts.borrow();
            Ok(match query {
                Some(q) if !q.is_empty() => all
                    .iter()
                    .filter(|c| c.matches_name(q))
                    .cloned()
                    .collect(),
                _ => all.clone(),
            })
        }

        fn add(&self, contact: &NativeContact) -> Result<()> {
            self.added.borrow_mut().push(contact.clone());
            Ok(())
        }

        fn delete(&self, identifier: &str) -> Result<()> {
            let mut all = self.contacts.borrow_mut();
            let before = all.len();
            all.retain(|c| c.identifier.as_deref() != Some(identifier));
            if all.len() == before {
                return Err(BridgeError::ContactNotFound(identifier.into()));
            }
            self.deleted.borrow_mut().push(identifier.into());
            Ok(())
        }
    }

    impl ContactUi for FakeContacts {
        fn present_picker(&self, outcome: oneshot::Sender<Option<NativeContact>>) {
            match self.pick_scripts.borrow_mut().pop_front() {
                Some(PickScript::Select(contact)) => {
                    let _ = outcome.send(Some(contact));
                }
                Some(PickScript::Cancel) => {
                    let _ = outcome.send(None);
                }
                Some(PickScript::Defer) => {
                    self.deferred_picks.borrow_mut().push(outcome);
                }
                Some(PickScript::Abandon) | None => drop(outcome),
            }
        }

        fn present_editor(&self, contact: NativeContact, dismissed: oneshot::Sender<()>) {
            self.editor_presented.borrow_mut().push(contact);
            let _ = dismissed.send(());
        }
    }

    fn bridge(fake: FakeContacts) -> (ContactsBridge<FakeContacts>, Arc<FakeContacts>) {
        let fake = Arc::new(fake);
        (ContactsBridge::new(fake.clone()), fake)
    }

    fn ada() -> NativeContact {
        NativeContact {
            identifier: Some("id-ada".into()),
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            ..Default::default()
        }
    }

    fn call(method: &str, arguments: Value) -> MethodCall {
        MethodCall::new(method, arguments)
    }

    #[tokio::test]
    async fn get_contacts_with_empty_store_returns_empty_array() {
        let (bridge, _) = bridge(FakeContacts::default());
        let reply = bridge.handle(call("getContacts", Value::Null)).await;
        assert_eq!(reply, MethodReply::Value(json!([])));
    }

    #[tokio::test]
    async fn get_contacts_failure_degrades_to_empty_array() {
        let (bridge, _) = bridge(FakeContacts {
            fail_enumeration: true,
            ..Default::default()
        });
        let reply = bridge.handle(call("getContacts", json!(""))).await;
        assert_eq!(reply, MethodReply::Value(json!([])));
    }

    #[tokio::test]
    async fn get_contacts_filters_by_query() {
        let grace = NativeContact {
            identifier: Some("id-grace".into()),
            given_name: "Grace".into(),
            family_name: "Hopper".into(),
            ..Default::default()
        };
        let (bridge, _) = bridge(FakeContacts::with_contacts(vec![ada(), grace]));

        let reply = bridge.handle(call("getContacts", json!("hopper"))).await;
        let MethodReply::Value(Value::Array(contacts)) = reply else {
            panic!("expected array reply");
        };
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0]["givenName"], "Grace");
        assert_eq!(contacts[0]["displayName"], "Grace Hopper");
    }

    #[tokio::test]
    async fn pick_contact_resolves_with_marshaled_contact() {
        let (bridge, _) =
            bridge(FakeContacts::default().script(vec![PickScript::Select(ada())]));
        let reply = bridge.handle(call("pickContact", Value::Null)).await;
        let MethodReply::Value(contact) = reply else {
            panic!("expected value reply");
        };
        assert_eq!(contact["identifier"], "id-ada");
        assert_eq!(contact["displayName"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn pick_contact_cancel_and_abandon_reply_null() {
        let (bridge, _) = bridge(
            FakeContacts::default().script(vec![PickScript::Cancel, PickScript::Abandon]),
        );
        assert_eq!(
            bridge.handle(call("pickContact", Value::Null)).await,
            MethodReply::null()
        );
        assert_eq!(
            bridge.handle(call("pickContact", Value::Null)).await,
            MethodReply::null()
        );
    }

    #[tokio::test]
    async fn overlapping_picks_each_receive_their_own_reply() {
        let (bridge, fake) = bridge(
            FakeContacts::default().script(vec![PickScript::Defer, PickScript::Defer]),
        );

        let first = bridge.handle(call("pickContact", Value::Null));
        let second = bridge.handle(call("pickContact", Value::Null));
        let resolve = async {
            // Let both calls register their completions first.
            tokio::task::yield_now().await;
            let mut pending = fake.deferred_picks.borrow_mut();
            assert_eq!(pending.len(), 2);
            // Resolve in reverse order: selection for the second caller,
            // cancel for the first.
            let _ = pending.pop().expect("second pick").send(Some(ada()));
            let _ = pending.pop().expect("first pick").send(None);
        };

        let (first, second, ()) = tokio::join!(first, second, resolve);
        assert_eq!(first, MethodReply::null());
        let MethodReply::Value(contact) = second else {
            panic!("expected value reply for second pick");
        };
        assert_eq!(contact["identifier"], "id-ada");
    }

    #[tokio::test]
    async fn export_contact_replies_null_after_dismissal() {
        let (bridge, fake) = bridge(FakeContacts::default());
        let args = json!({ "givenName": "Ada", "phones": [{ "label": "main", "value": "1" }] });
        let reply = bridge.handle(call("exportContact", args)).await;
        assert_eq!(reply, MethodReply::null());

        let presented = fake.editor_presented.borrow();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].given_name, "Ada");
        assert_eq!(presented[0].phones[0].value, "1");
    }

    #[tokio::test]
    async fn add_contact_skips_valueless_phones_but_keeps_empty_postal_address() {
        let (bridge, fake) = bridge(FakeContacts::default());
        let args = json!({
            "givenName": "Ada",
            "phones": [{ "label": "mobile" }],
            "postalAddresses": [{}],
        });
        let reply = bridge.handle(call("addContact", args)).await;
        assert_eq!(reply, MethodReply::null());

        let added = fake.added.borrow();
        assert_eq!(added.len(), 1);
        assert!(added[0].phones.is_empty());
        assert_eq!(added[0].postal_addresses.len(), 1);
    }

    #[tokio::test]
    async fn delete_without_identifier_fails_without_touching_store() {
        let (bridge, fake) = bridge(FakeContacts::with_contacts(vec![ada()]));
        let reply = bridge.handle(call("deleteContact", json!({}))).await;
        let MethodReply::Error { code, message, .. } = reply else {
            panic!("expected error reply");
        };
        assert_eq!(code, "delete_failed");
        assert_eq!(message, DELETE_FAILED);
        assert_eq!(fake.contacts.borrow().len(), 1);
        assert!(fake.deleted.borrow().is_empty());
    }

    #[tokio::test]
    async fn delete_failures_collapse_into_one_signal() {
        let (bridge, _) = bridge(FakeContacts::default());
        let reply = bridge
            .handle(call("deleteContact", json!({ "identifier": "missing" })))
            .await;
        let MethodReply::Error { code, details, .. } = reply else {
            panic!("expected error reply");
        };
        assert_eq!(code, "delete_failed");
        assert!(details.is_some());
    }

    #[tokio::test]
    async fn delete_removes_the_contact() {
        let (bridge, fake) = bridge(FakeContacts::with_contacts(vec![ada()]));
        let reply = bridge
            .handle(call("deleteContact", json!({ "identifier": "id-ada" })))
            .await;
        assert_eq!(reply, MethodReply::null());
        assert!(fake.contacts.borrow().is_empty());
    }

    #[tokio::test]
    async fn unknown_method_replies_not_implemented() {
        let (bridge, _) = bridge(FakeContacts::default());
        let reply = bridge.handle(call("mergeContacts", Value::Null)).await;
        assert_eq!(reply, MethodReply::NotImplemented);
    }
}
