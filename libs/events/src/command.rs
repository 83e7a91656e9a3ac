//! Outbound command definitions.
//!
//! The envelope shape of every command kind is declared once in
//! [`CommandKind::shape`]; the encoder consults that table instead of
//! inspecting values at runtime.

use deck_id::{ActionId, DeviceId, InstanceKey};
use serde::Serialize;
use serde_json::Value;

use crate::types::{Image, Target};

// =============================================================================
// Command Shapes
// =============================================================================

/// Where the envelope `context` field comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
    /// The plugin UUID (the sender context of the connection).
    Plugin,
    /// The instance key carried by the command.
    Instance,
}

/// Static envelope layout of a command kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandShape {
    /// The envelope carries a `payload` object.
    pub has_payload: bool,
    /// Source of the `context` field.
    pub context: ContextSource,
    /// The envelope carries an `action` field.
    pub action: bool,
    /// The envelope carries a `device` field.
    pub device: bool,
}

impl CommandShape {
    const fn new(has_payload: bool, context: ContextSource) -> Self {
        Self {
            has_payload,
            context,
            action: false,
            device: false,
        }
    }

    const fn with_action(mut self) -> Self {
        self.action = true;
        self
    }

    const fn with_device(mut self) -> Self {
        self.device = true;
        self
    }
}

/// Discriminator of an outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    OpenUrl,
    LogMessage,
    SetTitle,
    SetImage,
    ShowAlert,
    ShowOk,
    SetSettings,
    GetSettings,
    SetGlobalSettings,
    GetGlobalSettings,
    SetState,
    SwitchToProfile,
    SendToPropertyInspector,
}

impl CommandKind {
    /// Returns the wire discriminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandKind::OpenUrl => "openUrl",
            CommandKind::LogMessage => "logMessage",
            CommandKind::SetTitle => "setTitle",
            CommandKind::SetImage => "setImage",
            CommandKind::ShowAlert => "showAlert",
            CommandKind::ShowOk => "showOk",
            CommandKind::SetSettings => "setSettings",
            CommandKind::GetSettings => "getSettings",
            CommandKind::SetGlobalSettings => "setGlobalSettings",
            CommandKind::GetGlobalSettings => "getGlobalSettings",
            CommandKind::SetState => "setState",
            CommandKind::SwitchToProfile => "switchToProfile",
            CommandKind::SendToPropertyInspector => "sendToPropertyInspector",
        }
    }

    /// Returns the envelope layout of this kind.
    pub const fn shape(self) -> CommandShape {
        use ContextSource::{Instance, Plugin};

        match self {
            CommandKind::OpenUrl => CommandShape::new(true, Plugin),
            CommandKind::LogMessage => CommandShape::new(true, Plugin),
            CommandKind::SetTitle => CommandShape::new(true, Instance),
            CommandKind::SetImage => CommandShape::new(true, Instance),
            CommandKind::ShowAlert => CommandShape::new(false, Instance),
            CommandKind::ShowOk => CommandShape::new(false, Instance),
            CommandKind::SetSettings => CommandShape::new(true, Instance),
            CommandKind::GetSettings => CommandShape::new(false, Instance),
            CommandKind::SetGlobalSettings => CommandShape::new(true, Plugin),
            CommandKind::GetGlobalSettings => CommandShape::new(false, Plugin),
            CommandKind::SetState => CommandShape::new(true, Instance),
            CommandKind::SwitchToProfile => CommandShape::new(true, Plugin).with_device(),
            CommandKind::SendToPropertyInspector => {
                CommandShape::new(true, Instance).with_action()
            }
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Command Payloads
// =============================================================================

/// Open a URL in the default browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenUrl {
    pub url: String,
}

/// Write a line to the host's plugin log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogMessage {
    pub message: String,
}

/// Change the title of an instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetTitle {
    #[serde(skip)]
    pub context: InstanceKey,
    /// An empty title restores the user's title.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub target: Target,
    pub state: u32,
}

/// Change the image of an instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetImage {
    #[serde(skip)]
    pub context: InstanceKey,
    /// `None` restores the image from the manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    pub target: Target,
    pub state: u32,
}

/// Switch an instance to one of its manifest states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetState {
    #[serde(skip)]
    pub context: InstanceKey,
    pub state: u32,
}

/// Switch a device to a profile bundled with the plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchToProfile {
    #[serde(skip)]
    pub device: DeviceId,
    pub profile: String,
}

/// Send data to the property inspector of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SendToPropertyInspector {
    pub context: InstanceKey,
    pub action: ActionId,
    pub payload: Value,
}

// =============================================================================
// Command
// =============================================================================

/// An outbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenUrl(OpenUrl),
    LogMessage(LogMessage),
    SetTitle(SetTitle),
    SetImage(SetImage),
    ShowAlert { context: InstanceKey },
    ShowOk { context: InstanceKey },
    SetSettings { context: InstanceKey, settings: Value },
    GetSettings { context: InstanceKey },
    SetGlobalSettings { settings: Value },
    GetGlobalSettings,
    SetState(SetState),
    SwitchToProfile(SwitchToProfile),
    SendToPropertyInspector(SendToPropertyInspector),
}

impl Command {
    /// Builds a `logMessage` command.
    pub fn log(message: impl Into<String>) -> Self {
        Command::LogMessage(LogMessage {
            message: message.into(),
        })
    }

    /// Builds a `showAlert` command for one instance.
    pub fn show_alert(context: InstanceKey) -> Self {
        Command::ShowAlert { context }
    }

    /// Builds a `showOk` command for one instance.
    pub fn show_ok(context: InstanceKey) -> Self {
        Command::ShowOk { context }
    }

    /// Returns the discriminator of this command.
    pub const fn kind(&self) -> CommandKind {
        match self {
            Command::OpenUrl(_) => CommandKind::OpenUrl,
            Command::LogMessage(_) => CommandKind::LogMessage,
            Command::SetTitle(_) => CommandKind::SetTitle,
            Command::SetImage(_) => CommandKind::SetImage,
            Command::ShowAlert { .. } => CommandKind::ShowAlert,
            Command::ShowOk { .. } => CommandKind::ShowOk,
            Command::SetSettings { .. } => CommandKind::SetSettings,
            Command::GetSettings { .. } => CommandKind::GetSettings,
            Command::SetGlobalSettings { .. } => CommandKind::SetGlobalSettings,
            Command::GetGlobalSettings => CommandKind::GetGlobalSettings,
            Command::SetState(_) => CommandKind::SetState,
            Command::SwitchToProfile(_) => CommandKind::SwitchToProfile,
            Command::SendToPropertyInspector(_) => CommandKind::SendToPropertyInspector,
        }
    }

    /// Returns the instance key for commands whose context is an instance.
    pub fn instance_key(&self) -> Option<&InstanceKey> {
        match self {
            Command::SetTitle(cmd) => Some(&cmd.context),
            Command::SetImage(cmd) => Some(&cmd.context),
            Command::ShowAlert { context }
            | Command::ShowOk { context }
            | Command::SetSettings { context, .. }
            | Command::GetSettings { context } => Some(context),
            Command::SetState(cmd) => Some(&cmd.context),
            Command::SendToPropertyInspector(cmd) => Some(&cmd.context),
            Command::OpenUrl(_)
            | Command::LogMessage(_)
            | Command::SetGlobalSettings { .. }
            | Command::GetGlobalSettings
            | Command::SwitchToProfile(_) => None,
        }
    }

    /// Returns the action id for commands that hoist one.
    pub fn action(&self) -> Option<&ActionId> {
        match self {
            Command::SendToPropertyInspector(cmd) => Some(&cmd.action),
            _ => None,
        }
    }

    /// Returns the device id for commands that hoist one.
    pub fn device(&self) -> Option<&DeviceId> {
        match self {
            Command::SwitchToProfile(cmd) => Some(&cmd.device),
            _ => None,
        }
    }

    /// Serializes the payload object.
    ///
    /// Returns `None` exactly for kinds whose shape has no payload.
    pub fn payload(&self) -> Result<Option<Value>, serde_json::Error> {
        let value = match self {
            Command::OpenUrl(cmd) => serde_json::to_value(cmd)?,
            Command::LogMessage(cmd) => serde_json::to_value(cmd)?,
            Command::SetTitle(cmd) => serde_json::to_value(cmd)?,
            Command::SetImage(cmd) => serde_json::to_value(cmd)?,
            Command::SetSettings { settings, .. } => settings.clone(),
            Command::SetGlobalSettings { settings } => settings.clone(),
            Command::SetState(cmd) => serde_json::to_value(cmd)?,
            Command::SwitchToProfile(cmd) => serde_json::to_value(cmd)?,
            Command::SendToPropertyInspector(cmd) => cmd.payload.clone(),
            Command::ShowAlert { .. }
            | Command::ShowOk { .. }
            | Command::GetSettings { .. }
            | Command::GetGlobalSettings => return Ok(None),
        };
        Ok(Some(value))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn all_commands() -> Vec<Command> {
        let key = InstanceKey::new("ctx");
        vec![
            Command::OpenUrl(OpenUrl { url: "u".into() }),
            Command::log("m"),
            Command::SetTitle(SetTitle {
                context: key.clone(),
                title: String::new(),
                target: Target::Both,
                state: 0,
            }),
            Command::SetImage(SetImage {
                context: key.clone(),
                image: None,
                target: Target::Both,
                state: 0,
            }),
            Command::show_alert(key.clone()),
            Command::show_ok(key.clone()),
            Command::SetSettings {
                context: key.clone(),
                settings: serde_json::json!({}),
            },
            Command::GetSettings {
                context: key.clone(),
            },
            Command::SetGlobalSettings {
                settings: serde_json::json!({}),
            },
            Command::GetGlobalSettings,
            Command::SetState(SetState {
                context: key.clone(),
                state: 1,
            }),
            Command::SwitchToProfile(SwitchToProfile {
                device: DeviceId::new("dev"),
                profile: "p".into(),
            }),
            Command::SendToPropertyInspector(SendToPropertyInspector {
                context: key,
                action: ActionId::new("com.example.action"),
                payload: serde_json::json!({"a": 1}),
            }),
        ]
    }

    #[test]
    fn test_values_agree_with_shape_table() {
        for cmd in all_commands() {
            let shape = cmd.kind().shape();
            assert_eq!(
                cmd.payload().unwrap().is_some(),
                shape.has_payload,
                "{}",
                cmd.kind()
            );
            assert_eq!(
                cmd.instance_key().is_some(),
                shape.context == ContextSource::Instance,
                "{}",
                cmd.kind()
            );
            assert_eq!(cmd.action().is_some(), shape.action, "{}", cmd.kind());
            assert_eq!(cmd.device().is_some(), shape.device, "{}", cmd.kind());
        }
    }

    #[test]
    fn test_set_title_payload_skips_empty_title() {
        let cmd = Command::SetTitle(SetTitle {
            context: InstanceKey::new("ctx"),
            title: String::new(),
            target: Target::Hardware,
            state: 2,
        });
        assert_eq!(
            cmd.payload().unwrap(),
            Some(serde_json::json!({"target": 1, "state": 2}))
        );
    }
}
