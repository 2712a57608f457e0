// SPDX-License-Identifier: MIT
//
// iOS capability layer via objc2.
//
// Requires compilation with the iOS SDK (Xcode). Each trait method wraps the
// corresponding Contacts / ContactsUI / CoreLocation / AVFoundation / UIKit
// API through Objective-C message sends.
//
// This module is cfg-gated to `target_os = "ios"` and will not compile on
// other platforms. All UIKit interactions require the main thread; methods
// that present view controllers expect to be called there and log an error
// otherwise (the completion sender is then dropped, which the bridges
// resolve as cancel).

#![cfg(target_os = "ios")]

use std::cell::RefCell;
use std::rc::Rc;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, Bool, NSObject};
use objc2::{MainThreadMarker, MainThreadOnly, class, define_class, msg_send};
use objc2_contacts::{CNContact, CNMutableContact};
use objc2_foundation::{NSArray, NSData, NSError, NSString, NSURL};
use objc2_ui_kit::{UIApplication, UINavigationController, UIViewController};
use tokio::sync::oneshot;

use bridgekit_core::error::{BridgeError, Result};
use bridgekit_core::types::AuthorizationStatus;

use crate::traits::*;

// ---------------------------------------------------------------------------
// Framework constants
// ---------------------------------------------------------------------------
// CFStringRef globals, toll-free bridged with `NSString *`. Linked
// automatically when building against the iOS SDK.

unsafe extern "C" {
    static CNLabelPhoneNumberMain: &'static NSString;
    static CNLabelPhoneNumberMobile: &'static NSString;
    static CNLabelPhoneNumberiPhone: &'static NSString;
    static CNLabelHome: &'static NSString;
    static CNLabelWork: &'static NSString;

    static CNContactIdentifierKey: &'static NSString;
    static CNContactGivenNameKey: &'static NSString;
    static CNContactFamilyNameKey: &'static NSString;
    static CNContactMiddleNameKey: &'static NSString;
    static CNContactNamePrefixKey: &'static NSString;
    static CNContactNameSuffixKey: &'static NSString;
    static CNContactOrganizationNameKey: &'static NSString;
    static CNContactJobTitleKey: &'static NSString;
    static CNContactThumbnailImageDataKey: &'static NSString;
    static CNContactPhoneNumbersKey: &'static NSString;
    static CNContactEmailAddressesKey: &'static NSString;
    static CNContactPostalAddressesKey: &'static NSString;

    static AVMediaTypeAudio: &'static NSString;
    static AVMediaTypeVideo: &'static NSString;

    static UIApplicationOpenSettingsURLString: &'static NSString;
}

/// CNEntityTypeContacts raw value.
const CN_ENTITY_TYPE_CONTACTS: i64 = 0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Assert that we are on the main thread and return the marker.
fn require_main_thread() -> Result<MainThreadMarker> {
    MainThreadMarker::new()
        .ok_or_else(|| BridgeError::Store("must be called from the main thread".into()))
}

/// Obtain the root `UIViewController` from the key window.
///
/// Uses the deprecated `keyWindow` property for broad iOS-version compat.
fn root_view_controller(mtm: MainThreadMarker) -> Result<Retained<UIViewController>> {
    let app = UIApplication::sharedApplication(mtm);

    // SAFETY: msg_send! to well-known UIApplication selectors (keyWindow,
    // rootViewController), on the main thread per the marker.
    let root: Option<Retained<UIViewController>> = unsafe {
        let window: Option<Retained<AnyObject>> = msg_send![&app, keyWindow];
        window.and_then(|w| msg_send![&w, rootViewController])
    };

    root.ok_or_else(|| BridgeError::Store("no root view controller available".into()))
}

fn nsstring(s: &str) -> Retained<NSString> {
    NSString::from_str(s)
}

fn to_string(s: Option<Retained<NSString>>) -> String {
    s.map(|s| s.to_string()).unwrap_or_default()
}

/// Map a CLAuthorizationStatus raw value.
fn cl_status(raw: i32) -> AuthorizationStatus {
    match raw {
        1 => AuthorizationStatus::Restricted,
        2 => AuthorizationStatus::Denied,
        3 => AuthorizationStatus::AuthorizedAlways,
        4 => AuthorizationStatus::AuthorizedWhenInUse,
        _ => AuthorizationStatus::NotDetermined,
    }
}

/// Map a CN/AV authorization status raw value (no always/when-in-use split).
fn entity_status(raw: i64) -> AuthorizationStatus {
    match raw {
        1 => AuthorizationStatus::Restricted,
        2 => AuthorizationStatus::Denied,
        3 => AuthorizationStatus::Authorized,
        _ => AuthorizationStatus::NotDetermined,
    }
}

// ---------------------------------------------------------------------------
// Label conversion
// ---------------------------------------------------------------------------

/// Convert a CNLabeledValue label string to our label type. Known phone
/// constants map to their variants; anything else carries the localized
/// display string, matching what the wire contract exposes for foreign
/// labels.
fn label_from_cn(label: Option<Retained<NSString>>) -> Option<NativeLabel> {
    let label = label?;
    // SAFETY: isEqualToString: on NSString with framework-constant statics.
    unsafe {
        if label.isEqualToString(CNLabelPhoneNumberMain) {
            return Some(NativeLabel::Main);
        }
        if label.isEqualToString(CNLabelPhoneNumberMobile) {
            return Some(NativeLabel::Mobile);
        }
        if label.isEqualToString(CNLabelPhoneNumberiPhone) {
            return Some(NativeLabel::Iphone);
        }
        if label.isEqualToString(CNLabelHome) {
            return Some(NativeLabel::Home);
        }
        if label.isEqualToString(CNLabelWork) {
            return Some(NativeLabel::Work);
        }
    }
    // SAFETY: +[CNLabeledValue localizedStringForLabel:] class method.
    let localized: Retained<NSString> =
        unsafe { msg_send![class!(CNLabeledValue), localizedStringForLabel: &*label] };
    Some(NativeLabel::Custom(localized.to_string()))
}

/// Convert our label type to the CNLabeledValue label string.
fn label_to_cn(label: &NativeLabel) -> Retained<NSString> {
    // SAFETY: copying framework-constant NSString statics.
    unsafe {
        match label {
            NativeLabel::Main => CNLabelPhoneNumberMain.copy(),
            NativeLabel::Mobile => CNLabelPhoneNumberMobile.copy(),
            NativeLabel::Iphone => CNLabelPhoneNumberiPhone.copy(),
            NativeLabel::Home => CNLabelHome.copy(),
            NativeLabel::Work => CNLabelWork.copy(),
            NativeLabel::Custom(text) => nsstring(text),
        }
    }
}

// ---------------------------------------------------------------------------
// Contact conversion
// ---------------------------------------------------------------------------

/// Read a CNContact into a transient native record.
fn contact_from_cn(contact: &CNContact) -> NativeContact {
    // SAFETY: property getters on CNContact, all fetched via the key list
    // below. Selectors are standard Contacts-framework properties.
    unsafe {
        let identifier: Retained<NSString> = msg_send![contact, identifier];
        let image: Option<Retained<NSData>> = msg_send![contact, thumbnailImageData];

        let mut native = NativeContact {
            identifier: Some(identifier.to_string()),
            given_name: to_string(msg_send![contact, givenName]),
            family_name: to_string(msg_send![contact, familyName]),
            middle_name: to_string(msg_send![contact, middleName]),
            name_prefix: to_string(msg_send![contact, namePrefix]),
            name_suffix: to_string(msg_send![contact, nameSuffix]),
            organization: to_string(msg_send![contact, organizationName]),
            job_title: to_string(msg_send![contact, jobTitle]),
            image_data: image.map(|data| data.to_vec()),
            ..Default::default()
        };

        let phones: Retained<NSArray<AnyObject>> = msg_send![contact, phoneNumbers];
        for labeled in phones.iter() {
            let label: Option<Retained<NSString>> = msg_send![&labeled, label];
            let number: Retained<AnyObject> = msg_send![&labeled, value];
            let value: Retained<NSString> = msg_send![&number, stringValue];
            native
                .phones
                .push(NativeLabeled::new(label_from_cn(label), value.to_string()));
        }

        let emails: Retained<NSArray<AnyObject>> = msg_send![contact, emailAddresses];
        for labeled in emails.iter() {
            let label: Option<Retained<NSString>> = msg_send![&labeled, label];
            let value: Retained<NSString> = msg_send![&labeled, value];
            native
                .emails
                .push(NativeLabeled::new(label_from_cn(label), value.to_string()));
        }

        let addresses: Retained<NSArray<AnyObject>> = msg_send![contact, postalAddresses];
        for labeled in addresses.iter() {
            let label: Option<Retained<NSString>> = msg_send![&labeled, label];
            let addr: Retained<AnyObject> = msg_send![&labeled, value];
            native.postal_addresses.push(NativeLabeled::new(
                label_from_cn(label),
                NativePostalAddress {
                    street: to_string(msg_send![&addr, street]),
                    city: to_string(msg_send![&addr, city]),
                    postal_code: to_string(msg_send![&addr, postalCode]),
                    state: to_string(msg_send![&addr, state]),
                    country: to_string(msg_send![&addr, country]),
                },
            ));
        }

        native
    }
}

/// Build a mutable CNContact from a transient native record.
fn contact_to_cn(native: &NativeContact) -> Retained<CNMutableContact> {
    // SAFETY: CNMutableContact is instantiable from any thread; the setters
    // are standard Contacts-framework properties.
    unsafe {
        let contact: Retained<CNMutableContact> = msg_send![class!(CNMutableContact), new];

        let _: () = msg_send![&contact, setGivenName: &*nsstring(&native.given_name)];
        let _: () = msg_send![&contact, setFamilyName: &*nsstring(&native.family_name)];
        let _: () = msg_send![&contact, setMiddleName: &*nsstring(&native.middle_name)];
        let _: () = msg_send![&contact, setNamePrefix: &*nsstring(&native.name_prefix)];
        let _: () = msg_send![&contact, setNameSuffix: &*nsstring(&native.name_suffix)];
        let _: () = msg_send![&contact, setOrganizationName: &*nsstring(&native.organization)];
        let _: () = msg_send![&contact, setJobTitle: &*nsstring(&native.job_title)];

        if let Some(bytes) = native.image_data.as_deref() {
            let data = NSData::with_bytes(bytes);
            let _: () = msg_send![&contact, setImageData: &*data];
        }

        let mut phones: Vec<Retained<AnyObject>> = Vec::with_capacity(native.phones.len());
        for entry in &native.phones {
            let label = entry
                .label
                .as_ref()
                .map(label_to_cn)
                .unwrap_or_else(|| nsstring(""));
            let number: Retained<AnyObject> = msg_send![
                class!(CNPhoneNumber),
                phoneNumberWithStringValue: &*nsstring(&entry.value)
            ];
            let labeled: Retained<AnyObject> = msg_send![
                class!(CNLabeledValue),
                labeledValueWithLabel: &*label,
                value: &*number
            ];
            phones.push(labeled);
        }
        let _: () = msg_send![&contact, setPhoneNumbers: &*NSArray::from_retained_slice(&phones)];

        let mut emails: Vec<Retained<AnyObject>> = Vec::with_capacity(native.emails.len());
        for entry in &native.emails {
            let label = entry
                .label
                .as_ref()
                .map(label_to_cn)
                .unwrap_or_else(|| nsstring(""));
            let labeled: Retained<AnyObject> = msg_send![
                class!(CNLabeledValue),
                labeledValueWithLabel: &*label,
                value: &*nsstring(&entry.value)
            ];
            emails.push(labeled);
        }
        let _: () = msg_send![&contact, setEmailAddresses: &*NSArray::from_retained_slice(&emails)];

        let mut addresses: Vec<Retained<AnyObject>> =
            Vec::with_capacity(native.postal_addresses.len());
        for entry in &native.postal_addresses {
            let addr: Retained<AnyObject> = msg_send![class!(CNMutablePostalAddress), new];
            let _: () = msg_send![&addr, setStreet: &*nsstring(&entry.value.street)];
            let _: () = msg_send![&addr, setCity: &*nsstring(&entry.value.city)];
            let _: () = msg_send![&addr, setPostalCode: &*nsstring(&entry.value.postal_code)];
            let _: () = msg_send![&addr, setState: &*nsstring(&entry.value.state)];
            let _: () = msg_send![&addr, setCountry: &*nsstring(&entry.value.country)];
            let label = entry
                .label
                .as_ref()
                .map(label_to_cn)
                .unwrap_or_else(|| nsstring(""));
            let labeled: Retained<AnyObject> = msg_send![
                class!(CNLabeledValue),
                labeledValueWithLabel: &*label,
                value: &*addr
            ];
            addresses.push(labeled);
        }
        let _: () = msg_send![
            &contact,
            setPostalAddresses: &*NSArray::from_retained_slice(&addresses)
        ];

        contact
    }
}

/// The key descriptors fetched for every contact read.
fn fetch_keys() -> Retained<NSArray<NSString>> {
    // SAFETY: copying framework-constant NSString statics into an array.
    unsafe {
        NSArray::from_retained_slice(&[
            CNContactIdentifierKey.copy(),
            CNContactGivenNameKey.copy(),
            CNContactFamilyNameKey.copy(),
            CNContactMiddleNameKey.copy(),
            CNContactNamePrefixKey.copy(),
            CNContactNameSuffixKey.copy(),
            CNContactOrganizationNameKey.copy(),
            CNContactJobTitleKey.copy(),
            CNContactThumbnailImageDataKey.copy(),
            CNContactPhoneNumbersKey.copy(),
            CNContactEmailAddressesKey.copy(),
            CNContactPostalAddressesKey.copy(),
        ])
    }
}

// ---------------------------------------------------------------------------
// Picker delegate (CNContactPickerDelegate)
// ---------------------------------------------------------------------------

struct PickerDelegateIvars {
    /// Completion sender; taken on the first callback so the reply fires
    /// exactly once.
    sender: RefCell<Option<oneshot::Sender<Option<NativeContact>>>>,
}

// SAFETY: define_class! declares an ObjC class inheriting from NSObject, as
// required by the objc2 runtime. MainThreadOnly: picker callbacks fire on
// the main thread.
define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "BridgeKitPickerDelegate"]
    #[ivars = PickerDelegateIvars]
    struct PickerDelegate;

    impl PickerDelegate {
        /// Called when the user selects a contact.
        #[unsafe(method(contactPicker:didSelectContact:))]
        fn did_select(&self, _picker: &AnyObject, contact: &CNContact) {
            let native = contact_from_cn(contact);
            if let Some(tx) = self.ivars().sender.borrow_mut().take() {
                let _ = tx.send(Some(native));
            }
        }

        /// Called when the user cancels the picker.
        #[unsafe(method(contactPickerDidCancel:))]
        fn did_cancel(&self, _picker: &AnyObject) {
            if let Some(tx) = self.ivars().sender.borrow_mut().take() {
                let _ = tx.send(None);
            }
        }
    }
}

impl PickerDelegate {
    fn new(
        mtm: MainThreadMarker,
        tx: oneshot::Sender<Option<NativeContact>>,
    ) -> Retained<Self> {
        let this = mtm.alloc::<Self>();
        let this = this.set_ivars(PickerDelegateIvars {
            sender: RefCell::new(Some(tx)),
        });
        // SAFETY: standard NSObject init via super.
        unsafe { msg_send![super(this), init] }
    }
}

// ---------------------------------------------------------------------------
// Editor delegate (CNContactViewControllerDelegate)
// ---------------------------------------------------------------------------

struct EditorDelegateIvars {
    dismissed: RefCell<Option<oneshot::Sender<()>>>,
}

// SAFETY: as above — NSObject subclass, main-thread callbacks.
define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "BridgeKitEditorDelegate"]
    #[ivars = EditorDelegateIvars]
    struct EditorDelegate;

    impl EditorDelegate {
        /// Called when the editor completes, whether the user saved or not.
        #[unsafe(method(contactViewController:didCompleteWithContact:))]
        fn did_complete(&self, controller: &UIViewController, _contact: *const CNContact) {
            // SAFETY: dismissViewControllerAnimated:completion: is a
            // standard UIViewController selector; we are on the main thread.
            unsafe {
                let _: () = msg_send![
                    controller,
                    dismissViewControllerAnimated: true,
                    completion: std::ptr::null::<std::ffi::c_void>()
                ];
            }
            if let Some(tx) = self.ivars().dismissed.borrow_mut().take() {
                let _ = tx.send(());
            }
        }
    }
}

impl EditorDelegate {
    fn new(mtm: MainThreadMarker, tx: oneshot::Sender<()>) -> Retained<Self> {
        let this = mtm.alloc::<Self>();
        let this = this.set_ivars(EditorDelegateIvars {
            dismissed: RefCell::new(Some(tx)),
        });
        // SAFETY: standard NSObject init via super.
        unsafe { msg_send![super(this), init] }
    }
}

// ---------------------------------------------------------------------------
// Location delegate (CLLocationManagerDelegate)
// ---------------------------------------------------------------------------

/// Waiters registered before the consent prompt; all are resolved by the
/// next authorization-changed callback.
type LocationWaiters = Rc<RefCell<Vec<oneshot::Sender<AuthorizationStatus>>>>;

struct LocationDelegateIvars {
    waiters: LocationWaiters,
}

// SAFETY: NSObject subclass; CLLocationManager is created on the main
// thread, so its delegate callbacks fire there too.
define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "BridgeKitLocationDelegate"]
    #[ivars = LocationDelegateIvars]
    struct LocationDelegate;

    impl LocationDelegate {
        /// Fires after the user answers the consent prompt (and on other
        /// authorization transitions).
        #[unsafe(method(locationManager:didChangeAuthorizationStatus:))]
        fn did_change(&self, _manager: &AnyObject, status: i32) {
            let status = cl_status(status);
            for tx in self.ivars().waiters.borrow_mut().drain(..) {
                let _ = tx.send(status);
            }
        }
    }
}

impl LocationDelegate {
    fn new(mtm: MainThreadMarker, waiters: LocationWaiters) -> Retained<Self> {
        let this = mtm.alloc::<Self>();
        let this = this.set_ivars(LocationDelegateIvars { waiters });
        // SAFETY: standard NSObject init via super.
        unsafe { msg_send![super(this), init] }
    }
}

// ---------------------------------------------------------------------------
// The layer
// ---------------------------------------------------------------------------

/// iOS capability layer. Must be created on the main thread; UI flows and
/// location prompts run there as well.
pub struct IosLayer {
    location: Retained<AnyObject>,
    // Kept alive for the manager's lifetime; CLLocationManager holds its
    // delegate weakly.
    _location_delegate: Retained<LocationDelegate>,
    location_waiters: LocationWaiters,
    // Live UI delegates, replaced on each presentation. Presenting again
    // while a flow is open drops the previous delegate, whose sender then
    // resolves that call as cancelled.
    picker_delegate: RefCell<Option<Retained<PickerDelegate>>>,
    editor_delegate: RefCell<Option<Retained<EditorDelegate>>>,
}

impl IosLayer {
    pub fn new() -> Self {
        let mtm = MainThreadMarker::new().expect("IosLayer must be created on the main thread");
        let waiters: LocationWaiters = Rc::new(RefCell::new(Vec::new()));
        let delegate = LocationDelegate::new(mtm, waiters.clone());
        // SAFETY: CLLocationManager init and setDelegate: are standard
        // CoreLocation selectors, called on the main thread.
        let location: Retained<AnyObject> = unsafe {
            let manager: Retained<AnyObject> = msg_send![class!(CLLocationManager), new];
            let _: () = msg_send![&manager, setDelegate: &*delegate];
            manager
        };
        Self {
            location,
            _location_delegate: delegate,
            location_waiters: waiters,
            picker_delegate: RefCell::new(None),
            editor_delegate: RefCell::new(None),
        }
    }

    /// A fresh contact store handle; cheap to acquire, scoped per call.
    fn store(&self) -> Retained<AnyObject> {
        // SAFETY: +[CNContactStore new].
        unsafe { msg_send![class!(CNContactStore), new] }
    }
}

impl Default for IosLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeLayer for IosLayer {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

impl ContactStore for IosLayer {
    fn contacts(&self, query: Option<&str>) -> Result<Vec<NativeContact>> {
        let store = self.store();
        let keys = fetch_keys();

        // SAFETY: CNContactFetchRequest init + optional name predicate +
        // enumeration, all standard Contacts-framework selectors. The
        // enumeration block collects into a Rust Vec captured by the block.
        unsafe {
            let request: Retained<AnyObject> = {
                let alloc: Retained<AnyObject> = msg_send![class!(CNContactFetchRequest), alloc];
                msg_send![&alloc, initWithKeysToFetch: &*keys]
            };
            if let Some(query) = query {
                let predicate: Retained<AnyObject> = msg_send![
                    class!(CNContact),
                    predicateForContactsMatchingName: &*nsstring(query)
                ];
                let _: () = msg_send![&request, setPredicate: &*predicate];
            }

            let collected: Rc<RefCell<Vec<NativeContact>>> = Rc::new(RefCell::new(Vec::new()));
            let sink = collected.clone();
            let block = RcBlock::new(move |contact: *mut CNContact, _stop: *mut Bool| {
                if let Some(contact) = contact.as_ref() {
                    sink.borrow_mut().push(contact_from_cn(contact));
                }
            });

            let ok: std::result::Result<(), Retained<NSError>> = msg_send![
                &store,
                enumerateContactsWithFetchRequest: &*request,
                error: _,
                usingBlock: &*block
            ];
            ok.map_err(|e| BridgeError::Store(e.localizedDescription().to_string()))?;

            drop(block);
            Ok(Rc::try_unwrap(collected)
                .map(RefCell::into_inner)
                .unwrap_or_default())
        }
    }

    fn add(&self, contact: &NativeContact) -> Result<()> {
        let store = self.store();
        let cn = contact_to_cn(contact);
        // SAFETY: CNSaveRequest add + execute, standard selectors; the
        // trailing error parameter surfaces the native failure.
        unsafe {
            let request: Retained<AnyObject> = msg_send![class!(CNSaveRequest), new];
            let _: () = msg_send![
                &request,
                addContact: &*cn,
                toContainerWithIdentifier: std::ptr::null::<NSString>()
            ];
            let ok: std::result::Result<(), Retained<NSError>> =
                msg_send![&store, executeSaveRequest: &*request, error: _];
            ok.map_err(|e| BridgeError::Store(e.localizedDescription().to_string()))
        }
    }

    fn delete(&self, identifier: &str) -> Result<()> {
        let store = self.store();
        // SAFETY: unified-contact lookup by identifier, mutable copy, and a
        // delete save request — the same sequence the Contacts framework
        // documents for removal.
        unsafe {
            let keys = NSArray::from_retained_slice(&[CNContactIdentifierKey.copy()]);
            let found: std::result::Result<Retained<CNContact>, Retained<NSError>> = msg_send![
                &store,
                unifiedContactWithIdentifier: &*nsstring(identifier),
                keysToFetch: &*keys,
                error: _
            ];
            let contact =
                found.map_err(|e| BridgeError::Store(e.localizedDescription().to_string()))?;
            let mutable: Retained<CNMutableContact> = msg_send![&contact, mutableCopy];

            let request: Retained<AnyObject> = msg_send![class!(CNSaveRequest), new];
            let _: () = msg_send![&request, deleteContact: &*mutable];
            let ok: std::result::Result<(), Retained<NSError>> =
                msg_send![&store, executeSaveRequest: &*request, error: _];
            ok.map_err(|e| BridgeError::Store(e.localizedDescription().to_string()))
        }
    }
}

impl ContactUi for IosLayer {
    fn present_picker(&self, outcome: oneshot::Sender<Option<NativeContact>>) {
        let (mtm, root) = match require_main_thread()
            .and_then(|mtm| root_view_controller(mtm).map(|root| (mtm, root)))
        {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "cannot present contact picker");
                return;
            }
        };

        let delegate = PickerDelegate::new(mtm, outcome);
        // SAFETY: CNContactPickerViewController init, setDelegate:, and
        // modal presentation — standard ContactsUI selectors on the main
        // thread.
        unsafe {
            let picker: Retained<UIViewController> =
                msg_send![class!(CNContactPickerViewController), new];
            let _: () = msg_send![&picker, setDelegate: &*delegate];
            let _: () = msg_send![
                &root,
                presentViewController: &*picker,
                animated: true,
                completion: std::ptr::null::<std::ffi::c_void>()
            ];
        }
        *self.picker_delegate.borrow_mut() = Some(delegate);
    }

    fn present_editor(&self, contact: NativeContact, dismissed: oneshot::Sender<()>) {
        let (mtm, root) = match require_main_thread()
            .and_then(|mtm| root_view_controller(mtm).map(|root| (mtm, root)))
        {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "cannot present contact editor");
                return;
            }
        };

        let cn = contact_to_cn(&contact);
        let delegate = EditorDelegate::new(mtm, dismissed);
        // SAFETY: CNContactViewController for a new contact, wrapped in a
        // navigation controller and presented modally — the documented
        // ContactsUI flow, on the main thread.
        unsafe {
            let editor: Retained<UIViewController> = msg_send![
                class!(CNContactViewController),
                viewControllerForNewContact: &*cn
            ];
            let store = self.store();
            let _: () = msg_send![&editor, setContactStore: &*store];
            let _: () = msg_send![&editor, setDelegate: &*delegate];
            let _: () = msg_send![&editor, setAllowsEditing: true];
            let _: () = msg_send![&editor, setAllowsActions: true];

            let nav: Retained<UINavigationController> = {
                let alloc = mtm.alloc::<UINavigationController>();
                msg_send![alloc, initWithRootViewController: &*editor]
            };
            let _: () = msg_send![
                &root,
                presentViewController: &*nav,
                animated: true,
                completion: std::ptr::null::<std::ffi::c_void>()
            ];
        }
        *self.editor_delegate.borrow_mut() = Some(delegate);
    }
}

impl LocationAuthority for IosLayer {
    fn location_status(&self) -> AuthorizationStatus {
        // SAFETY: +[CLLocationManager authorizationStatus].
        let raw: i32 = unsafe { msg_send![class!(CLLocationManager), authorizationStatus] };
        cl_status(raw)
    }

    fn request_location(
        &self,
        mode: LocationRequestMode,
        changed: oneshot::Sender<AuthorizationStatus>,
    ) {
        self.location_waiters.borrow_mut().push(changed);
        // SAFETY: the request selectors prompt asynchronously; the delegate
        // resolves the registered waiters on the authorization-changed
        // callback.
        unsafe {
            match mode {
                LocationRequestMode::WhenInUse => {
                    let _: () = msg_send![&self.location, requestWhenInUseAuthorization];
                }
                LocationRequestMode::Always => {
                    let _: () = msg_send![&self.location, requestAlwaysAuthorization];
                }
            }
        }
    }
}

impl MediaAuthority for IosLayer {
    fn audio_status(&self) -> AuthorizationStatus {
        // SAFETY: +[AVCaptureDevice authorizationStatusForMediaType:].
        let raw: i64 = unsafe {
            msg_send![
                class!(AVCaptureDevice),
                authorizationStatusForMediaType: AVMediaTypeAudio
            ]
        };
        entity_status(raw)
    }

    fn video_status(&self) -> AuthorizationStatus {
        // SAFETY: as above, for video.
        let raw: i64 = unsafe {
            msg_send![
                class!(AVCaptureDevice),
                authorizationStatusForMediaType: AVMediaTypeVideo
            ]
        };
        entity_status(raw)
    }

    fn request_audio(&self, decided: oneshot::Sender<bool>) {
        request_capture_access(unsafe { AVMediaTypeAudio }, decided);
    }

    fn request_video(&self, decided: oneshot::Sender<bool>) {
        request_capture_access(unsafe { AVMediaTypeVideo }, decided);
    }
}

/// Shared AVCaptureDevice request path; the OS callback delivers the final
/// decision directly.
fn request_capture_access(media_type: &'static NSString, decided: oneshot::Sender<bool>) {
    let slot = RefCell::new(Some(decided));
    let block = RcBlock::new(move |granted: Bool| {
        if let Some(tx) = slot.borrow_mut().take() {
            let _ = tx.send(granted.as_bool());
        }
    });
    // SAFETY: +[AVCaptureDevice requestAccessForMediaType:completionHandler:].
    unsafe {
        let _: () = msg_send![
            class!(AVCaptureDevice),
            requestAccessForMediaType: media_type,
            completionHandler: &*block
        ];
    }
}

impl ContactsAuthority for IosLayer {
    fn contacts_status(&self) -> AuthorizationStatus {
        // SAFETY: +[CNContactStore authorizationStatusForEntityType:].
        let raw: i64 = unsafe {
            msg_send![
                class!(CNContactStore),
                authorizationStatusForEntityType: CN_ENTITY_TYPE_CONTACTS
            ]
        };
        entity_status(raw)
    }

    fn request_contacts_access(&self, granted: oneshot::Sender<bool>) {
        let store = self.store();
        let slot = RefCell::new(Some(granted));
        let block = RcBlock::new(move |ok: Bool, _error: *mut NSError| {
            if let Some(tx) = slot.borrow_mut().take() {
                let _ = tx.send(ok.as_bool());
            }
        });
        // SAFETY: -[CNContactStore requestAccessForEntityType:completionHandler:].
        unsafe {
            let _: () = msg_send![
                &store,
                requestAccessForEntityType: CN_ENTITY_TYPE_CONTACTS,
                completionHandler: &*block
            ];
        }
    }
}

impl SystemSettings for IosLayer {
    fn open_app_settings(&self) -> Result<bool> {
        let mtm = require_main_thread()
            .map_err(|_| BridgeError::Settings("must be called from the main thread".into()))?;
        let app = UIApplication::sharedApplication(mtm);
        // SAFETY: NSURL from the settings URL constant, canOpenURL:, and
        // openURL:options:completionHandler: — standard UIKit selectors.
        unsafe {
            let url: Option<Retained<NSURL>> =
                msg_send![class!(NSURL), URLWithString: UIApplicationOpenSettingsURLString];
            let url =
                url.ok_or_else(|| BridgeError::Settings("settings URL unavailable".into()))?;
            let can_open: Bool = msg_send![&app, canOpenURL: &*url];
            if !can_open.as_bool() {
                return Err(BridgeError::PlatformUnavailable);
            }
            let _: () = msg_send![
                &app,
                openURL: &*url,
                options: std::ptr::null::<AnyObject>(),
                completionHandler: std::ptr::null::<std::ffi::c_void>()
            ];
        }
        Ok(true)
    }

    fn platform_version(&self) -> String {
        // SAFETY: +[UIDevice currentDevice] / -[UIDevice systemVersion].
        let version: Retained<NSString> = unsafe {
            let device: Retained<AnyObject> = msg_send![class!(UIDevice), currentDevice];
            msg_send![&device, systemVersion]
        };
        format!("iOS {version}")
    }
}
