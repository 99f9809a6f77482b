//! Finds the existing remote file an upload would replace.

use crate::cloud::{FileQuery, RemoteFileId, RemoteStore};
use crate::errors::{Result, UploadActionError};

/// Look up the single non-trashed file named `filename` directly under
/// `folder_id`.
///
/// Returns `None` when there is no match. Two or more matches, on one page
/// or spread across pages, fail with `AmbiguousName`: duplicates are never
/// resolved by picking one.
pub async fn locate<S>(store: &S, filename: &str, folder_id: &str) -> Result<Option<RemoteFileId>>
where
    S: RemoteStore + ?Sized,
{
    let query = FileQuery::new(filename, folder_id);
    let mut found: Option<RemoteFileId> = None;
    let mut count = 0usize;
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list(&query, page_token.as_deref()).await?;
        pages += 1;

        for id in page.ids {
            count += 1;
            if found.is_none() {
                found = Some(id);
            }
        }

        // A second match already settles it; no need to walk further.
        if count > 1 {
            break;
        }
        match page.next_page_token {
            Some(pt) => page_token = Some(pt),
            None => break,
        }
    }

    tracing::debug!(filename, folder_id, count, pages, "Located remote matches");

    if count > 1 {
        return Err(UploadActionError::AmbiguousName {
            name: filename.to_string(),
            folder_id: folder_id.to_string(),
            count,
        });
    }
    Ok(found)
}
