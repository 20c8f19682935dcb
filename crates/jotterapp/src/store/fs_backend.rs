use super::backend::StorageBackend;
use crate::error::{JotterError, Result};
use crate::model::{BlockRef, Metadata};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const INDEX_FILE: &str = "data.json";
const BLOCKS_FILE: &str = "blocks.json";

pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn note_filename(id: &Uuid) -> String {
        format!("note-{}.txt", id)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(JotterError::Io)?;
        }
        Ok(())
    }

    /// Writes through a temp file and a rename so readers never see half a file.
    fn write_atomic(&self, target: &Path, stem: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let tmp_file = self.root.join(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(JotterError::Io)?;
        fs::rename(&tmp_file, target).map_err(JotterError::Io)?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(path).map_err(JotterError::Io)?;
        serde_json::from_str(&content).map_err(JotterError::Serialization)
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(JotterError::Serialization)?;
        let stem = name.trim_end_matches(".json");
        self.write_atomic(&self.root.join(name), stem, &content)
    }
}

impl StorageBackend for FsBackend {
    fn load_index(&self) -> Result<HashMap<Uuid, Metadata>> {
        self.read_json(INDEX_FILE)
    }

    fn save_index(&self, index: &HashMap<Uuid, Metadata>) -> Result<()> {
        self.write_json(INDEX_FILE, index)
    }

    fn read_content(&self, id: &Uuid) -> Result<Option<String>> {
        let path = self.content_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(JotterError::Io)?;
        Ok(Some(content))
    }

    fn write_content(&self, id: &Uuid, content: &str) -> Result<()> {
        self.write_atomic(&self.content_path(id), "note", content)
    }

    fn delete_content(&self, id: &Uuid) -> Result<()> {
        let path = self.content_path(id);
        if path.exists() {
            fs::remove_file(path).map_err(JotterError::Io)?;
        }
        Ok(())
    }

    fn load_blocks(&self) -> Result<Vec<BlockRef>> {
        self.read_json(BLOCKS_FILE)
    }

    fn save_blocks(&self, blocks: &[BlockRef]) -> Result<()> {
        self.write_json(BLOCKS_FILE, blocks)
    }

    fn content_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(Self::note_filename(id))
    }
}
