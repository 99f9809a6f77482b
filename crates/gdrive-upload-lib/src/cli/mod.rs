//! Command-line surface of the action binary.
//!
//! Every input can be passed as a flag; when a flag is absent clap falls back
//! to the `INPUT_*` variable the runner exports for that action input.

use clap::{Arg, ArgAction, Command};

pub use clap::ArgMatches;

use crate::config::inputs::{
    env_var_name, ActionInputs, INPUT_CREDENTIALS, INPUT_OVERWRITE, INPUT_PARENT_FOLDER_ID,
    INPUT_TARGETS,
};
use crate::errors::Result;

/// Creates the root clap Command.
pub fn create_root_command() -> Command {
    Command::new("gdrive-upload")
        .about("Upload files to a Google Drive folder with a service account")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new(INPUT_CREDENTIALS)
                .long("credentials")
                .env(env_var_name(INPUT_CREDENTIALS))
                .hide_env_values(true)
                .help("Base64-encoded service account key JSON"),
        )
        .arg(
            Arg::new(INPUT_PARENT_FOLDER_ID)
                .long("parent-folder-id")
                .env(env_var_name(INPUT_PARENT_FOLDER_ID))
                .help("ID of the destination Drive folder"),
        )
        .arg(
            Arg::new(INPUT_TARGETS)
                .long("targets")
                .env(env_var_name(INPUT_TARGETS))
                .help("Local paths to upload, one per line"),
        )
        .arg(
            Arg::new(INPUT_OVERWRITE)
                .long("overwrite")
                .env(env_var_name(INPUT_OVERWRITE))
                .help("Set to 'true' to update same-named files in place"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

/// Returns whether `--verbose` was passed.
pub fn is_verbose(matches: &ArgMatches) -> bool {
    matches.get_flag("verbose")
}

/// Validate the parsed arguments into `ActionInputs`.
pub fn inputs_from_matches(matches: &ArgMatches) -> Result<ActionInputs> {
    ActionInputs::resolve(|name| matches.get_one::<String>(name).cloned())
}
