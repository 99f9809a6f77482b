use std::path::PathBuf;

use crate::errors::{Result, UploadActionError};

pub const INPUT_CREDENTIALS: &str = "credentials";
pub const INPUT_PARENT_FOLDER_ID: &str = "parent_folder_id";
pub const INPUT_TARGETS: &str = "targets";
pub const INPUT_OVERWRITE: &str = "overwrite";

/// The four inputs the action is invoked with, validated once per run.
#[derive(Clone, PartialEq, Eq)]
pub struct ActionInputs {
    /// Base64-encoded service-account key JSON.
    pub credentials: String,
    pub parent_folder_id: String,
    /// Local paths in the order they were listed.
    pub targets: Vec<PathBuf>,
    pub overwrite: bool,
}

impl ActionInputs {
    /// Resolve inputs through `lookup`, which maps an input name to its raw
    /// value (`None` when the input was not provided).
    ///
    /// Path existence is not checked here.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = required(&lookup, INPUT_CREDENTIALS)?;
        let parent_folder_id = required(&lookup, INPUT_PARENT_FOLDER_ID)?;

        let targets = parse_targets(&required(&lookup, INPUT_TARGETS)?);
        if targets.is_empty() {
            return Err(UploadActionError::Configuration(format!(
                "Input '{INPUT_TARGETS}' must list at least one path"
            )));
        }

        let overwrite = parse_overwrite(lookup(INPUT_OVERWRITE).as_deref());

        Ok(Self {
            credentials,
            parent_folder_id,
            targets,
            overwrite,
        })
    }

    /// Resolve inputs from the `INPUT_<NAME>` variables the runner exports.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|name| std::env::var(env_var_name(name)).ok())
    }
}

// Keep the credential out of debug output.
impl std::fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionInputs")
            .field("credentials", &"<redacted>")
            .field("parent_folder_id", &self.parent_folder_id)
            .field("targets", &self.targets)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

/// Name of the environment variable the runner uses for an input.
pub fn env_var_name(input: &str) -> String {
    format!("INPUT_{}", input.replace(' ', "_").to_uppercase())
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(UploadActionError::Configuration(format!(
            "Input required and not supplied: {name}"
        ))),
    }
}

/// Split a multi-line input into paths, one per non-blank line.
pub fn parse_targets(raw: &str) -> Vec<PathBuf> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Only the literal `true` enables overwrite.
pub fn parse_overwrite(raw: Option<&str>) -> bool {
    raw.map(str::trim) == Some("true")
}
