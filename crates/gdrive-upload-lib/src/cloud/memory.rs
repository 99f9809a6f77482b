//! In-memory `RemoteStore` for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cloud::{FilePage, FileQuery, NewFile, RemoteFileId, RemoteStore, UploadBody};
use crate::errors::{Result, UploadActionError};

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: RemoteFileId,
    pub name: String,
    pub parent_id: String,
    pub content: Vec<u8>,
    pub trashed: bool,
}

/// Calls made against the store, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List { name: String, page_token: Option<String> },
    Create { name: String },
    Update { id: RemoteFileId },
}

#[derive(Default)]
struct State {
    files: Vec<StoredFile>,
    calls: Vec<StoreCall>,
    next_id: usize,
}

pub struct MemoryStore {
    state: Mutex<State>,
    page_size: usize,
    failing_names: Mutex<HashSet<String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_page_size(100)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: page_size.max(1),
            failing_names: Mutex::new(HashSet::new()),
        }
    }

    /// Seed a file directly, bypassing the call log.
    pub fn insert(&self, name: &str, parent_id: &str, content: &[u8]) -> RemoteFileId {
        let mut state = self.state.lock().unwrap();
        let id = next_id(&mut state);
        state.files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            parent_id: parent_id.to_string(),
            content: content.to_vec(),
            trashed: false,
        });
        id
    }

    pub fn trash(&self, id: &RemoteFileId) {
        let mut state = self.state.lock().unwrap();
        if let Some(file) = state.files.iter_mut().find(|f| &f.id == id) {
            file.trashed = true;
        }
    }

    /// Make every create or update of a file with this name fail.
    pub fn fail_uploads_of(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    pub fn files_named(&self, name: &str, parent_id: &str) -> Vec<StoredFile> {
        self.state
            .lock()
            .unwrap()
            .files
            .iter()
            .filter(|f| f.name == name && f.parent_id == parent_id && !f.trashed)
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn check_failure(&self, operation: &str, name: &str) -> Result<()> {
        if self.failing_names.lock().unwrap().contains(name) {
            return Err(UploadActionError::upload(operation, 500, "backendError"));
        }
        Ok(())
    }
}

fn next_id(state: &mut State) -> RemoteFileId {
    state.next_id += 1;
    RemoteFileId(format!("mem-{}", state.next_id))
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> Result<FilePage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::List {
            name: query.name.clone(),
            page_token: page_token.map(str::to_string),
        });

        let matches: Vec<RemoteFileId> = state
            .files
            .iter()
            .filter(|f| f.name == query.name && f.parent_id == query.folder_id && !f.trashed)
            .map(|f| f.id.clone())
            .collect();

        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(matches.len());
        let ids = matches.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < matches.len()).then(|| end.to_string());

        Ok(FilePage {
            ids,
            next_page_token,
        })
    }

    async fn create(&self, file: &NewFile, body: UploadBody) -> Result<RemoteFileId> {
        self.state.lock().unwrap().calls.push(StoreCall::Create {
            name: file.name.clone(),
        });
        self.check_failure("create", &file.name)?;

        let content = body.read_to_end().await?;
        let mut state = self.state.lock().unwrap();
        let id = next_id(&mut state);
        state.files.push(StoredFile {
            id: id.clone(),
            name: file.name.clone(),
            parent_id: file.parent_id.clone(),
            content,
            trashed: false,
        });
        Ok(id)
    }

    async fn update(&self, id: &RemoteFileId, body: UploadBody) -> Result<RemoteFileId> {
        let name = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StoreCall::Update { id: id.clone() });
            state
                .files
                .iter()
                .find(|f| &f.id == id)
                .map(|f| f.name.clone())
                .ok_or_else(|| UploadActionError::upload("update", 404, "File not found"))?
        };
        self.check_failure("update", &name)?;

        let content = body.read_to_end().await?;
        let mut state = self.state.lock().unwrap();
        if let Some(file) = state.files.iter_mut().find(|f| &f.id == id) {
            file.content = content;
        }
        Ok(id.clone())
    }
}
