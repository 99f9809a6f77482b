//! The upload run: inputs, authentication, then each target in order.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::ServiceAccountAuthenticator;
use crate::cloud::{GDriveClient, RemoteStore};
use crate::config::{ActionInputs, HttpSettings};
use crate::errors::Result;
use crate::http_client::HttpClient;
use crate::uploader::{UploadOutcome, Uploader};

/// Upload `targets` one after another, each finished before the next starts.
///
/// The first failure ends the run; files uploaded before it stay in place.
pub async fn upload_all<S>(
    store: &S,
    folder_id: &str,
    targets: &[PathBuf],
    overwrite: bool,
) -> Result<Vec<UploadOutcome>>
where
    S: RemoteStore + ?Sized,
{
    let uploader = Uploader::new(store, folder_id);
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in targets {
        let outcome = uploader.upload(target, overwrite).await?;
        tracing::debug!(
            target = %target.display(),
            id = %outcome.id(),
            "Target uploaded"
        );
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Authenticate with the credential input and upload every target to Drive.
///
/// Credential problems are reported before any network call.
pub async fn run(inputs: &ActionInputs, settings: &HttpSettings) -> Result<Vec<UploadOutcome>> {
    let http = HttpClient::new(settings)?;
    let auth = ServiceAccountAuthenticator::from_base64(http.clone(), &inputs.credentials)?;
    tracing::info!(
        service_account = auth.client_email(),
        folder_id = %inputs.parent_folder_id,
        targets = inputs.targets.len(),
        overwrite = inputs.overwrite,
        "Starting upload"
    );

    let drive = GDriveClient::new(http, Arc::new(auth));
    upload_all(
        &drive,
        &inputs.parent_folder_id,
        &inputs.targets,
        inputs.overwrite,
    )
    .await
}

/// Newline-separated remote ids, in target order.
pub fn file_ids_output(outcomes: &[UploadOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| o.id().as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
