//! Typed ID definitions for the plugin protocol.

use crate::define_key;

// =============================================================================
// Routing
// =============================================================================

define_key!(InstanceKey, "instance key");

// =============================================================================
// Protocol Correlation
// =============================================================================

define_key!(ActionId, "action id");
define_key!(DeviceId, "device id");
define_key!(PluginUuid, "plugin uuid");

// =============================================================================
// Tests
// =============================================================================
