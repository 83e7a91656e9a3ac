//! Manifest type definitions.

use serde::{Deserialize, Serialize};

// =============================================================================
// Plugin
// =============================================================================

/// Top-level plugin manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub actions: Vec<Action>,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_icon: Option<String>,
    pub code_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_path_mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_path_win: Option<String>,
    pub description: String,
    pub icon: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_inspector_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_window_size: Vec<u32>,
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub version: String,
    #[serde(rename = "SDKVersion")]
    pub sdk_version: u32,
    #[serde(rename = "OS")]
    pub os: Vec<Os>,
    pub software: Software,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications_to_monitor: Option<ApplicationsToMonitor>,
}

// =============================================================================
// Actions
// =============================================================================

/// One action offered by the plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Action {
    pub icon: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_inspector_path: Option<String>,
    pub states: Vec<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_in_multi_actions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(rename = "UUID")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_in_actions_list: Option<bool>,
}

/// One visual state of an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct State {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_action_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_title: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_underline: Option<bool>,
}

// =============================================================================
// Profiles
// =============================================================================

/// Device type a bundled profile targets. Encoded as an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceType(pub u8);

impl DeviceType {
    pub const STREAM_DECK: Self = Self(0);
    pub const STREAM_DECK_MINI: Self = Self(1);
    pub const STREAM_DECK_XL: Self = Self(2);
    pub const STREAM_DECK_MOBILE: Self = Self(3);
    pub const CORSAIR_G_KEYS: Self = Self(4);
    pub const STREAM_DECK_PANEL: Self = Self(5);
}

/// A profile bundled with the plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    pub name: String,
    pub device_type: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dont_auto_switch_when_installed: Option<bool>,
}

// =============================================================================
// Platform Requirements
// =============================================================================

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    Windows,
}

/// Minimum supported operating system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Os {
    pub platform: Platform,
    pub minimum_version: String,
}

/// Minimum supported host application version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Software {
    pub minimum_version: String,
}

/// Applications whose launch and termination the plugin wants to observe.
///
/// Unlike the rest of the manifest, these keys are lowercase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct ApplicationsToMonitor {
    #[serde(default)]
    pub mac: Vec<String>,
    #[serde(default)]
    pub windows: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hello_world() -> Manifest {
        Manifest {
            actions: vec![Action {
                icon: "icon".to_string(),
                name: "Hello World".to_string(),
                states: vec![State {
                    image: "icon".to_string(),
                    ..Default::default()
                }],
                uuid: "com.github.deck.helloworld".to_string(),
                ..Default::default()
            }],
            author: "deck".to_string(),
            code_path: "helloworld".to_string(),
            description: "hello world app".to_string(),
            icon: "icon".to_string(),
            name: "Hello World".to_string(),
            version: "0.0.0".to_string(),
            sdk_version: 2,
            os: vec![Os {
                platform: Platform::Mac,
                minimum_version: "10".to_string(),
            }],
            software: Software {
                minimum_version: "5.0".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_manifest_key_names() {
        let value = serde_json::to_value(hello_world()).unwrap();
        assert_eq!(value["SDKVersion"], json!(2));
        assert_eq!(value["OS"][0]["Platform"], json!("mac"));
        assert_eq!(value["Actions"][0]["UUID"], json!("com.github.deck.helloworld"));
        assert!(value.get("URL").is_none());
        assert!(value.get("Category").is_none());
        assert!(value["Actions"][0]["States"][0].get("Title").is_none());
    }

    #[test]
    fn test_applications_to_monitor_lowercase() {
        let apps = ApplicationsToMonitor {
            mac: vec!["com.apple.mail".to_string()],
            windows: vec![],
        };
        assert_eq!(
            serde_json::to_value(apps).unwrap(),
            json!({"mac": ["com.apple.mail"], "windows": []})
        );
    }

    #[test]
    fn test_manifest_roundtrip() {
        let manifest = hello_world();
        let json = serde_json::to_string(&manifest).unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manifest);
    }
}
