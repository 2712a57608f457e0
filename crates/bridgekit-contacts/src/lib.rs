// SPDX-License-Identifier: MIT
//
// BridgeKit — Contacts plugin bridge.
//
// Dispatches the contact-book call surface (pick, enumerate, export, add,
// delete) onto the native capability layer and owns the bidirectional
// mapping between native contact records and the flat field dictionaries
// exchanged over the channel.

pub mod bridge;
pub mod marshal;

pub use bridge::ContactsBridge;
