//! JSON envelope codec.
//!
//! Inbound messages are decoded in two passes over one field map: fields of
//! the nested `payload` object go in first, then the top-level envelope fields
//! overwrite them. Identity fields (`action`, `context`, `device`) therefore
//! always come from the envelope.
//!
//! A `payload` that is present must be an object, except on `sendToPlugin`
//! where it is opaque and on `systemDidWakeUp` which has no body. A `null`
//! payload counts as absent.

use deck_id::PluginUuid;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::command::{Command, ContextSource};
use crate::error::{DecodeError, EncodeError};
use crate::event::{Event, EventKind};

// =============================================================================
// Outbound Envelope
// =============================================================================

/// Wire form of an outbound command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Command discriminator.
    pub event: String,

    /// Instance key or plugin UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Action UUID, for commands that address an action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Device id, for commands that address a device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Command-specific payload. A present `null` is kept as `Some(Null)`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub payload: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

impl CommandEnvelope {
    /// Builds the envelope for a command.
    ///
    /// `sender` is the plugin UUID used as context by plugin-wide commands.
    pub fn from_command(cmd: &Command, sender: &PluginUuid) -> Result<Self, EncodeError> {
        let kind = cmd.kind();
        let shape = kind.shape();

        let context = match shape.context {
            ContextSource::Plugin => non_empty(sender.as_str()),
            ContextSource::Instance => cmd.instance_key().and_then(|k| non_empty(k.as_str())),
        };

        let payload = if shape.has_payload {
            Some(cmd.payload()?.unwrap_or(Value::Null))
        } else {
            None
        };

        Ok(Self {
            event: kind.as_str().to_owned(),
            context,
            action: cmd.action().and_then(|a| non_empty(a.as_str())),
            device: cmd.device().and_then(|d| non_empty(d.as_str())),
            payload,
        })
    }
}

/// Encodes a command as a JSON text message.
pub fn encode(cmd: &Command, sender: &PluginUuid) -> Result<String, EncodeError> {
    let envelope = CommandEnvelope::from_command(cmd, sender)?;
    Ok(serde_json::to_string(&envelope)?)
}

// =============================================================================
// Inbound Decoding
// =============================================================================

/// Decodes a JSON text message into a typed event.
pub fn decode(raw: &str) -> Result<Event, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let Value::Object(top) = value else {
        return Err(DecodeError::Malformed("expected a JSON object".to_string()));
    };

    let kind = match top.get("event") {
        Some(Value::String(name)) => EventKind::from_wire(name)
            .ok_or_else(|| DecodeError::UnknownEventKind(name.clone()))?,
        Some(_) => {
            return Err(DecodeError::Malformed(
                "event discriminator must be a string".to_string(),
            ))
        }
        None => return Err(DecodeError::MissingKind),
    };

    let mut fields = Map::new();
    match top.get("payload") {
        Some(Value::Object(payload)) => fields.extend(payload.clone()),
        None | Some(Value::Null) => {}
        Some(_) if matches!(kind, EventKind::SendToPlugin | EventKind::SystemDidWakeUp) => {}
        Some(_) => {
            return Err(DecodeError::InvalidPayload {
                kind: kind.as_str(),
                reason: "payload must be a JSON object".to_string(),
            })
        }
    }
    fields.extend(top);

    let event = match kind {
        EventKind::DidReceiveSettings => Event::DidReceiveSettings(bind(kind, fields)?),
        EventKind::DidReceiveGlobalSettings => {
            Event::DidReceiveGlobalSettings(bind(kind, fields)?)
        }
        EventKind::KeyDown => Event::KeyDown(bind(kind, fields)?),
        EventKind::KeyUp => Event::KeyUp(bind(kind, fields)?),
        EventKind::WillAppear => Event::WillAppear(bind(kind, fields)?),
        EventKind::WillDisappear => Event::WillDisappear(bind(kind, fields)?),
        EventKind::TitleParametersDidChange => {
            Event::TitleParametersDidChange(bind(kind, fields)?)
        }
        EventKind::DeviceDidConnect => Event::DeviceDidConnect(bind(kind, fields)?),
        EventKind::DeviceDidDisconnect => Event::DeviceDidDisconnect(bind(kind, fields)?),
        EventKind::ApplicationDidLaunch => Event::ApplicationDidLaunch(bind(kind, fields)?),
        EventKind::ApplicationDidTerminate => {
            Event::ApplicationDidTerminate(bind(kind, fields)?)
        }
        EventKind::SystemDidWakeUp => Event::SystemDidWakeUp,
        EventKind::PropertyInspectorDidAppear => {
            Event::PropertyInspectorDidAppear(bind(kind, fields)?)
        }
        EventKind::PropertyInspectorDidDisappear => {
            Event::PropertyInspectorDidDisappear(bind(kind, fields)?)
        }
        EventKind::SendToPlugin => Event::SendToPlugin(bind(kind, fields)?),
    };

    Ok(event)
}

fn bind<T: DeserializeOwned>(kind: EventKind, fields: Map<String, Value>) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| DecodeError::InvalidPayload {
        kind: kind.as_str(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
