//! Inbound event definitions.
//!
//! Every event kind is listed once in [`EventKind`], which carries both the
//! wire discriminator and the routing class. [`Event`] holds the decoded data.

use deck_id::{ActionId, DeviceId, InstanceKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Coordinates, DeviceInfo, TitleParameters};

// =============================================================================
// Event Kinds
// =============================================================================

/// Discriminator of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DidReceiveSettings,
    DidReceiveGlobalSettings,
    KeyDown,
    KeyUp,
    WillAppear,
    WillDisappear,
    TitleParametersDidChange,
    DeviceDidConnect,
    DeviceDidDisconnect,
    ApplicationDidLaunch,
    ApplicationDidTerminate,
    SystemDidWakeUp,
    PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear,
    SendToPlugin,
}

impl EventKind {
    /// All event kinds in protocol order.
    pub const ALL: [EventKind; 15] = [
        EventKind::DidReceiveSettings,
        EventKind::DidReceiveGlobalSettings,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::WillAppear,
        EventKind::WillDisappear,
        EventKind::TitleParametersDidChange,
        EventKind::DeviceDidConnect,
        EventKind::DeviceDidDisconnect,
        EventKind::ApplicationDidLaunch,
        EventKind::ApplicationDidTerminate,
        EventKind::SystemDidWakeUp,
        EventKind::PropertyInspectorDidAppear,
        EventKind::PropertyInspectorDidDisappear,
        EventKind::SendToPlugin,
    ];

    /// Returns the wire discriminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::DidReceiveSettings => "didReceiveSettings",
            EventKind::DidReceiveGlobalSettings => "didReceiveGlobalSettings",
            EventKind::KeyDown => "keyDown",
            EventKind::KeyUp => "keyUp",
            EventKind::WillAppear => "willAppear",
            EventKind::WillDisappear => "willDisappear",
            EventKind::TitleParametersDidChange => "titleParametersDidChange",
            EventKind::DeviceDidConnect => "deviceDidConnect",
            EventKind::DeviceDidDisconnect => "deviceDidDisconnect",
            EventKind::ApplicationDidLaunch => "applicationDidLaunch",
            EventKind::ApplicationDidTerminate => "applicationDidTerminate",
            EventKind::SystemDidWakeUp => "systemDidWakeUp",
            EventKind::PropertyInspectorDidAppear => "propertyInspectorDidAppear",
            EventKind::PropertyInspectorDidDisappear => "propertyInspectorDidDisappear",
            EventKind::SendToPlugin => "sendToPlugin",
        }
    }

    /// Looks up a kind by its wire discriminator.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Returns true if events of this kind are addressed to one instance.
    pub const fn is_targeted(self) -> bool {
        matches!(
            self,
            EventKind::DidReceiveSettings
                | EventKind::KeyDown
                | EventKind::KeyUp
                | EventKind::WillAppear
                | EventKind::WillDisappear
                | EventKind::TitleParametersDidChange
                | EventKind::PropertyInspectorDidAppear
                | EventKind::PropertyInspectorDidDisappear
                | EventKind::SendToPlugin
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Event Payloads
// =============================================================================

/// Settings of one instance, delivered on request or after a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DidReceiveSettings {
    pub action: ActionId,
    pub context: InstanceKey,
    pub device: DeviceId,
    pub settings: Value,
    pub coordinates: Coordinates,
    pub state: u32,
    pub is_in_multi_action: bool,
}

/// Plugin-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DidReceiveGlobalSettings {
    /// The raw payload object, which holds a `settings` field.
    pub payload: Value,
}

impl DidReceiveGlobalSettings {
    /// Returns the settings object, if present.
    pub fn settings(&self) -> Option<&Value> {
        self.payload.get("settings")
    }
}

/// A key press or release (`keyDown` / `keyUp`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyEvent {
    pub action: ActionId,
    pub context: InstanceKey,
    pub device: DeviceId,
    pub settings: Value,
    pub coordinates: Coordinates,
    pub state: u32,
    pub user_desired_state: u32,
    pub is_in_multi_action: bool,
}

/// An instance becoming visible or hidden (`willAppear` / `willDisappear`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearanceEvent {
    pub action: ActionId,
    pub context: InstanceKey,
    pub device: DeviceId,
    pub settings: Value,
    pub coordinates: Coordinates,
    pub state: u32,
    pub is_in_multi_action: bool,
}

/// The user changed the title or its rendering parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParametersDidChange {
    pub action: ActionId,
    pub context: InstanceKey,
    pub device: DeviceId,
    pub settings: Value,
    pub coordinates: Coordinates,
    pub state: u32,
    pub title: String,
    pub title_parameters: TitleParameters,
}

/// A device was plugged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceDidConnect {
    pub device: DeviceId,
    pub device_info: Option<DeviceInfo>,
}

/// A device was unplugged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDidDisconnect {
    pub device: DeviceId,
}

/// A monitored application launched or terminated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationEvent {
    pub application: String,
}

/// The property inspector of an instance was shown or hidden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyInspectorEvent {
    pub action: ActionId,
    pub context: InstanceKey,
    pub device: DeviceId,
}

/// Arbitrary data sent from the property inspector to the plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendToPlugin {
    pub action: ActionId,
    pub context: InstanceKey,
    pub payload: Value,
}

// =============================================================================
// Event
// =============================================================================

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DidReceiveSettings(DidReceiveSettings),
    DidReceiveGlobalSettings(DidReceiveGlobalSettings),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    WillAppear(AppearanceEvent),
    WillDisappear(AppearanceEvent),
    TitleParametersDidChange(TitleParametersDidChange),
    DeviceDidConnect(DeviceDidConnect),
    DeviceDidDisconnect(DeviceDidDisconnect),
    ApplicationDidLaunch(ApplicationEvent),
    ApplicationDidTerminate(ApplicationEvent),
    SystemDidWakeUp,
    PropertyInspectorDidAppear(PropertyInspectorEvent),
    PropertyInspectorDidDisappear(PropertyInspectorEvent),
    SendToPlugin(SendToPlugin),
}

/// How an event is delivered to actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing<'a> {
    /// Delivered to the one actor owning this key.
    Targeted(&'a InstanceKey),
    /// Delivered to every live actor.
    Broadcast,
}

impl Event {
    /// Returns the discriminator of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::DidReceiveSettings(_) => EventKind::DidReceiveSettings,
            Event::DidReceiveGlobalSettings(_) => EventKind::DidReceiveGlobalSettings,
            Event::KeyDown(_) => EventKind::KeyDown,
            Event::KeyUp(_) => EventKind::KeyUp,
            Event::WillAppear(_) => EventKind::WillAppear,
            Event::WillDisappear(_) => EventKind::WillDisappear,
            Event::TitleParametersDidChange(_) => EventKind::TitleParametersDidChange,
            Event::DeviceDidConnect(_) => EventKind::DeviceDidConnect,
            Event::DeviceDidDisconnect(_) => EventKind::DeviceDidDisconnect,
            Event::ApplicationDidLaunch(_) => EventKind::ApplicationDidLaunch,
            Event::ApplicationDidTerminate(_) => EventKind::ApplicationDidTerminate,
            Event::SystemDidWakeUp => EventKind::SystemDidWakeUp,
            Event::PropertyInspectorDidAppear(_) => EventKind::PropertyInspectorDidAppear,
            Event::PropertyInspectorDidDisappear(_) => EventKind::PropertyInspectorDidDisappear,
            Event::SendToPlugin(_) => EventKind::SendToPlugin,
        }
    }

    /// Returns the instance key of a targeted event.
    pub fn instance_key(&self) -> Option<&InstanceKey> {
        match self {
            Event::DidReceiveSettings(ev) => Some(&ev.context),
            Event::KeyDown(ev) | Event::KeyUp(ev) => Some(&ev.context),
            Event::WillAppear(ev) | Event::WillDisappear(ev) => Some(&ev.context),
            Event::TitleParametersDidChange(ev) => Some(&ev.context),
            Event::PropertyInspectorDidAppear(ev) | Event::PropertyInspectorDidDisappear(ev) => {
                Some(&ev.context)
            }
            Event::SendToPlugin(ev) => Some(&ev.context),
            Event::DidReceiveGlobalSettings(_)
            | Event::DeviceDidConnect(_)
            | Event::DeviceDidDisconnect(_)
            | Event::ApplicationDidLaunch(_)
            | Event::ApplicationDidTerminate(_)
            | Event::SystemDidWakeUp => None,
        }
    }

    /// Returns how this event is routed.
    pub fn routing(&self) -> Routing<'_> {
        match self.instance_key() {
            Some(key) => Routing::Targeted(key),
            None => Routing::Broadcast,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
