use gdrive_upload_lib::action;
use gdrive_upload_lib::cli::{create_root_command, inputs_from_matches, is_verbose, ArgMatches};
use gdrive_upload_lib::config::HttpSettings;
use gdrive_upload_lib::errors::{handle_fatal, Result};
use gdrive_upload_lib::output;

#[tokio::main]
async fn main() {
    // Step 1: Parse flags (falling back to the runner's INPUT_* variables)
    let matches = create_root_command().get_matches();

    // Step 2: Initialize Logger
    let debug = is_verbose(&matches) || gdrive_upload_lib::logger::runner_debug_enabled();
    gdrive_upload_lib::logger::init(debug);

    // Step 3: Run; the first error of any kind fails the step
    if let Err(e) = run(&matches).await {
        handle_fatal(e);
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let inputs = inputs_from_matches(matches)?;
    let settings = HttpSettings::from_env()?;

    let outcomes = action::run(&inputs, &settings).await?;

    output::set_output("file_ids", &action::file_ids_output(&outcomes))?;
    tracing::info!(count = outcomes.len(), "All targets uploaded");
    Ok(())
}
