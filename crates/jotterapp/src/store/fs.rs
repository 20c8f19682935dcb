use super::fs_backend::FsBackend;
use super::note_store::NoteStore;
use std::path::{Path, PathBuf};

pub type FileStore = NoteStore<FsBackend>;

impl FileStore {
    /// A store rooted at `root`. The directory is created on first write.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        NoteStore::with_backend(FsBackend::new(root.into()))
    }

    pub fn root(&self) -> &Path {
        self.backend.root()
    }
}
