//! Value types shared by events and commands.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Layout
// =============================================================================

/// Position of a key on a device grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub row: i64,
    pub column: i64,
}

/// Key grid size of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub rows: i64,
    pub columns: i64,
}

// =============================================================================
// Devices
// =============================================================================

/// Hardware family of a connected device.
///
/// Encoded as an integer on the wire. Values this crate does not know are
/// kept as `Other` so newer hosts do not break decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeviceType {
    #[default]
    StreamDeck,
    StreamDeckMini,
    StreamDeckXl,
    StreamDeckMobile,
    CorsairGKeys,
    StreamDeckPanel,
    Other(i64),
}

impl DeviceType {
    /// Returns the wire value.
    pub const fn code(self) -> i64 {
        match self {
            DeviceType::StreamDeck => 0,
            DeviceType::StreamDeckMini => 1,
            DeviceType::StreamDeckXl => 2,
            DeviceType::StreamDeckMobile => 3,
            DeviceType::CorsairGKeys => 4,
            DeviceType::StreamDeckPanel => 5,
            DeviceType::Other(code) => code,
        }
    }
}

impl From<i64> for DeviceType {
    fn from(code: i64) -> Self {
        match code {
            0 => DeviceType::StreamDeck,
            1 => DeviceType::StreamDeckMini,
            2 => DeviceType::StreamDeckXl,
            3 => DeviceType::StreamDeckMobile,
            4 => DeviceType::CorsairGKeys,
            5 => DeviceType::StreamDeckPanel,
            other => DeviceType::Other(other),
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(DeviceType::from)
    }
}

/// Description of a device, sent when it connects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub size: Size,
}

// =============================================================================
// Titles
// =============================================================================

/// Vertical alignment of a key title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Top,
    Bottom,
    #[default]
    Middle,
}

/// Title rendering parameters chosen by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: Alignment,
    pub title_color: String,
}

// =============================================================================
// Command Values
// =============================================================================

/// Which surface a title or image update applies to.
///
/// Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    /// Hardware and software.
    #[default]
    Both,
    Hardware,
    Software,
}

impl Target {
    /// Returns the wire value.
    pub const fn code(self) -> u8 {
        match self {
            Target::Both => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        }
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u8::deserialize(deserializer)? {
            0 => Ok(Target::Both),
            1 => Ok(Target::Hardware),
            2 => Ok(Target::Software),
            other => Err(serde::de::Error::custom(format!(
                "invalid target: {other}"
            ))),
        }
    }
}

/// Image data encoded as a data URI (`data:image/<type>;base64,<payload>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Image(String);

impl Image {
    /// Encodes raw image bytes of the given file type (`png`, `jpeg`, `svg+xml`).
    pub fn new(file_type: &str, data: &[u8]) -> Self {
        Self(format!(
            "data:image/{};base64,{}",
            file_type,
            STANDARD.encode(data)
        ))
    }

    /// Returns the data URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file type portion of the data URI, if well formed.
    pub fn file_type(&self) -> Option<&str> {
        self.0
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(file_type, _)| file_type)
    }
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
