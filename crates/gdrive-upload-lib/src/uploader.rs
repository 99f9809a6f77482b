//! Uploads one local file into the destination folder.

use std::path::Path;

use crate::cloud::{NewFile, RemoteFileId, RemoteStore, UploadBody};
use crate::errors::{Result, UploadActionError};
use crate::locator;

/// What happened to a single target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Created { name: String, id: RemoteFileId },
    Updated { name: String, id: RemoteFileId },
}

impl UploadOutcome {
    pub fn id(&self) -> &RemoteFileId {
        match self {
            UploadOutcome::Created { id, .. } | UploadOutcome::Updated { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            UploadOutcome::Created { name, .. } | UploadOutcome::Updated { name, .. } => name,
        }
    }
}

/// Create-or-update decision for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPlan {
    Create,
    Update(RemoteFileId),
}

/// Decide between create and update.
///
/// An existing file is only ever replaced with `overwrite` set. `upload`
/// skips the lookup when `overwrite` is off, so that branch is unreachable
/// from it today; the check stays regardless.
pub fn plan(name: &str, existing: Option<RemoteFileId>, overwrite: bool) -> Result<UploadPlan> {
    match existing {
        None => Ok(UploadPlan::Create),
        Some(_) if !overwrite => Err(UploadActionError::FileExists {
            name: name.to_string(),
        }),
        Some(id) => Ok(UploadPlan::Update(id)),
    }
}

/// Remote name for a local path: its final component, unchanged.
pub fn remote_name(target: &Path) -> Result<String> {
    target
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            UploadActionError::local_read(
                target,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no UTF-8 file name",
                ),
            )
        })
}

/// Uploads targets into one folder through a shared store handle.
pub struct Uploader<'a, S: RemoteStore + ?Sized> {
    store: &'a S,
    folder_id: &'a str,
}

impl<'a, S: RemoteStore + ?Sized> Uploader<'a, S> {
    pub fn new(store: &'a S, folder_id: &'a str) -> Self {
        Self { store, folder_id }
    }

    pub fn folder_id(&self) -> &str {
        self.folder_id
    }

    /// Upload `target`, replacing a same-named file only when `overwrite`
    /// is set.
    ///
    /// Without `overwrite` no lookup happens, so repeated runs add new files
    /// next to earlier ones.
    pub async fn upload(&self, target: &Path, overwrite: bool) -> Result<UploadOutcome> {
        let name = remote_name(target)?;
        let body = UploadBody::open(target).await?;

        let existing = if overwrite {
            locator::locate(self.store, &name, self.folder_id).await?
        } else {
            None
        };

        self.transfer(name, body, existing, overwrite).await
    }

    /// Carry out the plan for an opened body and a known lookup result.
    pub async fn transfer(
        &self,
        name: String,
        body: UploadBody,
        existing: Option<RemoteFileId>,
        overwrite: bool,
    ) -> Result<UploadOutcome> {
        match plan(&name, existing, overwrite)? {
            UploadPlan::Create => {
                tracing::info!("Creating file {}", name);
                let file = NewFile {
                    name: name.clone(),
                    parent_id: self.folder_id.to_string(),
                };
                let id = self.store.create(&file, body).await?;
                Ok(UploadOutcome::Created { name, id })
            }
            UploadPlan::Update(existing_id) => {
                tracing::info!("Updating file {}", name);
                let id = self.store.update(&existing_id, body).await?;
                Ok(UploadOutcome::Updated { name, id })
            }
        }
    }
}
