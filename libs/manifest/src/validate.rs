//! Structural validation of a parsed manifest.

use crate::error::ManifestError;
use crate::types::Manifest;

/// A single validation problem, located by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIssue {
    pub path: String,
    pub message: &'static str,
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn require(issues: &mut Vec<ManifestIssue>, path: String, value: &str) {
    if value.trim().is_empty() {
        issues.push(ManifestIssue {
            path,
            message: "must not be empty",
        });
    }
}

impl Manifest {
    /// Returns every validation issue found in the manifest.
    pub fn issues(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();

        require(&mut issues, "/Name".into(), &self.name);
        require(&mut issues, "/Author".into(), &self.author);
        require(&mut issues, "/CodePath".into(), &self.code_path);
        require(&mut issues, "/Description".into(), &self.description);
        require(&mut issues, "/Icon".into(), &self.icon);
        require(&mut issues, "/Version".into(), &self.version);

        if self.actions.is_empty() {
            issues.push(ManifestIssue {
                path: "/Actions".into(),
                message: "at least one action is required",
            });
        }
        for (i, action) in self.actions.iter().enumerate() {
            require(&mut issues, format!("/Actions/{i}/UUID"), &action.uuid);
            require(&mut issues, format!("/Actions/{i}/Name"), &action.name);
            require(&mut issues, format!("/Actions/{i}/Icon"), &action.icon);
            if action.states.is_empty() {
                issues.push(ManifestIssue {
                    path: format!("/Actions/{i}/States"),
                    message: "at least one state is required",
                });
            }
            for (j, state) in action.states.iter().enumerate() {
                require(
                    &mut issues,
                    format!("/Actions/{i}/States/{j}/Image"),
                    &state.image,
                );
            }
        }

        if self.os.is_empty() {
            issues.push(ManifestIssue {
                path: "/OS".into(),
                message: "at least one platform is required",
            });
        }
        require(
            &mut issues,
            "/Software/MinimumVersion".into(),
            &self.software.minimum_version,
        );

        issues
    }

    /// Validates the manifest, failing with the number of issues found.
    pub fn validate(&self) -> Result<(), ManifestError> {
        match self.issues().len() {
            0 => Ok(()),
            count => Err(ManifestError::Invalid { count }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Os, Platform, Software, State};
    use rstest::rstest;

    fn valid() -> Manifest {
        Manifest {
            actions: vec![Action {
                icon: "icon".into(),
                name: "Counter".into(),
                states: vec![State {
                    image: "state".into(),
                    ..Default::default()
                }],
                uuid: "com.example.counter".into(),
                ..Default::default()
            }],
            author: "someone".into(),
            code_path: "counter".into(),
            description: "counts presses".into(),
            icon: "icon".into(),
            name: "Counter".into(),
            version: "1.0.0".into(),
            sdk_version: 2,
            os: vec![Os {
                platform: Platform::Windows,
                minimum_version: "10".into(),
            }],
            software: Software {
                minimum_version: "5.0".into(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_manifest_has_no_issues() {
        assert!(valid().issues().is_empty());
        assert!(valid().validate().is_ok());
    }

    #[rstest]
    #[case::name(|m: &mut Manifest| m.name.clear(), "/Name")]
    #[case::no_actions(|m: &mut Manifest| m.actions.clear(), "/Actions")]
    #[case::action_uuid(|m: &mut Manifest| m.actions[0].uuid = " ".into(), "/Actions/0/UUID")]
    #[case::no_states(|m: &mut Manifest| m.actions[0].states.clear(), "/Actions/0/States")]
    #[case::no_os(|m: &mut Manifest| m.os.clear(), "/OS")]
    fn test_issue_paths(#[case] mutate: fn(&mut Manifest), #[case] path: &str) {
        let mut manifest = valid();
        mutate(&mut manifest);

        let issues = manifest.issues();
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert_eq!(issues[0].path, path);
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::Invalid { count: 1 })
        ));
    }

    #[test]
    fn test_pretty_json_uses_tabs() {
        let json = crate::to_pretty_json(&valid()).unwrap();
        assert!(json.contains("\n\t\"Actions\""));
        let parsed = crate::from_json_str(&json).unwrap();
        assert_eq!(parsed, valid());
    }
}
