// SPDX-License-Identifier: MIT
//
// BridgeKit — Runtime-permission plugin bridge.
//
// Dispatches the permission call surface (check, status, request, open
// settings, platform version) onto the native authorization subsystems and
// owns the permission-kind and status-code mappings.

pub mod bridge;

pub use bridge::PermissionsBridge;
