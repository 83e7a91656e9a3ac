//! Manifest commands.
//!
//! These commands operate purely on local files (offline).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use deck_manifest::{Action, Manifest, ManifestIssue, Os, Platform, Software, State};
use serde_json::json;

use crate::error::CliError;
use crate::output::{print_json, print_success, print_warning, OutputFormat};

use super::CommandContext;

/// Manifest commands.
#[derive(Debug, Args)]
pub struct ManifestCommand {
    #[command(subcommand)]
    command: ManifestSubcommand,
}

#[derive(Debug, Subcommand)]
enum ManifestSubcommand {
    /// Generate a manifest for a single-action plugin.
    Init(InitArgs),

    /// Validate a manifest file.
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Mac,
    Windows,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Mac => Platform::Mac,
            PlatformArg::Windows => Platform::Windows,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct InitArgs {
    /// Plugin display name.
    #[arg(long)]
    name: String,

    /// UUID of the plugin's action, e.g. com.example.counter.
    #[arg(long)]
    uuid: String,

    #[arg(long)]
    author: String,

    /// Executable path relative to the plugin bundle.
    #[arg(long)]
    code_path: String,

    #[arg(long)]
    description: Option<String>,

    /// Category shown in the actions list.
    #[arg(long)]
    category: Option<String>,

    /// Icon path without extension.
    #[arg(long, default_value = "icon")]
    icon: String,

    #[arg(long = "plugin-version", default_value = "0.0.0")]
    version: String,

    /// Supported platform; repeat for several.
    #[arg(long = "platform", value_enum, default_values_t = [PlatformArg::Mac])]
    platforms: Vec<PlatformArg>,

    /// Minimum operating system version.
    #[arg(long, default_value = "10")]
    os_min_version: String,

    /// Minimum host application version.
    #[arg(long, default_value = "5.0")]
    software_min_version: String,

    /// Write to this file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Manifest file path. Defaults to ./manifest.json.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

impl ManifestCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ManifestSubcommand::Init(args) => init_manifest(ctx, args),
            ManifestSubcommand::Validate(args) => validate_manifest(ctx, args),
        }
    }
}

fn build_manifest(args: &InitArgs) -> Manifest {
    let description = args
        .description
        .clone()
        .unwrap_or_else(|| format!("{} plugin", args.name));

    Manifest {
        actions: vec![Action {
            icon: args.icon.clone(),
            name: args.name.clone(),
            states: vec![State {
                image: args.icon.clone(),
                ..Default::default()
            }],
            uuid: args.uuid.clone(),
            ..Default::default()
        }],
        author: args.author.clone(),
        category: args.category.clone(),
        code_path: args.code_path.clone(),
        description,
        icon: args.icon.clone(),
        name: args.name.clone(),
        version: args.version.clone(),
        sdk_version: 2,
        os: args
            .platforms
            .iter()
            .map(|p| Os {
                platform: (*p).into(),
                minimum_version: args.os_min_version.clone(),
            })
            .collect(),
        software: Software {
            minimum_version: args.software_min_version.clone(),
        },
        ..Default::default()
    }
}

fn init_manifest(ctx: CommandContext, args: InitArgs) -> Result<()> {
    let manifest = build_manifest(&args);
    manifest.validate().map_err(CliError::from)?;
    let mut contents = deck_manifest::to_pretty_json(&manifest).map_err(CliError::from)?;
    contents.push('\n');

    match &args.output {
        Some(path) => {
            std::fs::write(path, &contents).map_err(|source| CliError::Write {
                path: path.display().to_string(),
                source,
            })?;
            match ctx.format {
                OutputFormat::Json => print_json(&json!({"written": path.display().to_string()})),
                OutputFormat::Text => print_success(&format!("Wrote {}", path.display())),
            }
        }
        None => print!("{contents}"),
    }
    Ok(())
}

/// Parses and checks manifest text, returning every issue found.
fn check_contents(contents: &str) -> Result<Vec<ManifestIssue>, CliError> {
    let manifest = deck_manifest::from_json_str(contents)?;
    Ok(manifest.issues())
}

fn validate_manifest(ctx: CommandContext, args: ValidateArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("manifest.json"));
    let contents = std::fs::read_to_string(&path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let issues = check_contents(&contents)?;

    match ctx.format {
        OutputFormat::Json => {
            let listed: Vec<_> = issues
                .iter()
                .map(|i| json!({"path": i.path, "message": i.message}))
                .collect();
            print_json(&json!({"valid": issues.is_empty(), "issues": listed}));
        }
        OutputFormat::Text => {
            for issue in &issues {
                print_warning(&issue.to_string());
            }
        }
    }

    if !issues.is_empty() {
        return Err(CliError::Manifest(deck_manifest::ManifestError::Invalid {
            count: issues.len(),
        })
        .into());
    }
    if ctx.format == OutputFormat::Text {
        print_success(&format!("Manifest is valid: {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        init: InitArgs,
    }

    fn parse(args: &[&str]) -> InitArgs {
        let mut argv = vec!["deckctl"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().init
    }

    #[test]
    fn test_init_builds_valid_manifest() {
        let args = parse(&[
            "--name",
            "Hello World",
            "--uuid",
            "com.example.helloworld",
            "--author",
            "someone",
            "--code-path",
            "helloworld",
        ]);
        let manifest = build_manifest(&args);

        assert!(manifest.issues().is_empty());
        assert_eq!(manifest.actions[0].uuid, "com.example.helloworld");
        assert_eq!(manifest.description, "Hello World plugin");
        assert_eq!(manifest.os.len(), 1);
        assert_eq!(manifest.os[0].platform, Platform::Mac);
        assert_eq!(manifest.software.minimum_version, "5.0");
        assert!(manifest.category.is_none());
    }

    #[test]
    fn test_init_repeated_platforms() {
        let args = parse(&[
            "--name",
            "Counter",
            "--uuid",
            "com.example.counter",
            "--author",
            "someone",
            "--code-path",
            "counter",
            "--category",
            "Tools",
            "--platform",
            "mac",
            "--platform",
            "windows",
        ]);
        let manifest = build_manifest(&args);

        let platforms: Vec<_> = manifest.os.iter().map(|o| o.platform).collect();
        assert_eq!(platforms, vec![Platform::Mac, Platform::Windows]);
        assert_eq!(manifest.category.as_deref(), Some("Tools"));
    }

    #[test]
    fn test_check_contents_reports_issues() {
        let args = parse(&[
            "--name", "X", "--uuid", "com.x", "--author", "a", "--code-path", "x",
        ]);
        let mut manifest = build_manifest(&args);
        manifest.actions.clear();
        let contents = deck_manifest::to_pretty_json(&manifest).unwrap();

        let issues = check_contents(&contents).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/Actions");
    }

    #[test]
    fn test_check_contents_rejects_bad_json() {
        let err = check_contents("{\"Name\": 1}").unwrap_err();
        assert!(matches!(
            err,
            CliError::Manifest(deck_manifest::ManifestError::Parse(_))
        ));
    }
}
