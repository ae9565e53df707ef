//! File references inside rich text and the per-export embedding registry

use crate::error::ModelError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Moodle's placeholder for files stored alongside a question.
pub const PLUGINFILE_PREFIX: &str = "@@PLUGINFILE@@/";

/// A file or media object referenced from rich text.
///
/// `path` is the reference exactly as it appeared in the source text; `data` holds
/// base64 content when the source format embeds files inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl FileRef {
    /// Reference to a file stored next to the question (`@@PLUGINFILE@@/name`).
    pub fn pluginfile(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: format!("{PLUGINFILE_PREFIX}{name}"),
            name,
            data: None,
        }
    }

    pub fn with_data(mut self, bytes: &[u8]) -> Self {
        self.data = Some(STANDARD.encode(bytes));
        self
    }
}

/// A file admitted to a [`FileRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredFile {
    pub id: usize,
    pub path: String,
    pub content: Vec<u8>,
}

/// De-duplicating store of the files embedded during one export pass.
///
/// Ids are allocated sequentially in first-seen order, so a registry must not be
/// shared between concurrent exports.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    base_dir: Option<PathBuf>,
    prefix: String,
    files: Vec<RegisteredFile>,
    by_source: HashMap<String, usize>,
}

impl FileRegistry {
    /// `prefix` is prepended to each file name to build the exported path.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            base_dir: None,
            prefix: prefix.into(),
            files: Vec::new(),
            by_source: HashMap::new(),
        }
    }

    /// Directory used to resolve references that carry no inline data.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Admit `file`, returning its id and exported path. A file already admitted
    /// under the same source path is returned as is.
    pub fn embed(&mut self, file: &FileRef) -> Result<(usize, String), ModelError> {
        if let Some(&idx) = self.by_source.get(&file.path) {
            let entry = &self.files[idx];
            return Ok((entry.id, entry.path.clone()));
        }
        let content = self.resolve(file)?;
        let id = self.files.len();
        let path = format!("{}{}", self.prefix, file.name);
        tracing::debug!(id, source = %file.path, "embedding file");
        self.files.push(RegisteredFile {
            id,
            path: path.clone(),
            content,
        });
        self.by_source.insert(file.path.clone(), id);
        Ok((id, path))
    }

    pub fn files(&self) -> &[RegisteredFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn resolve(&self, file: &FileRef) -> Result<Vec<u8>, ModelError> {
        if let Some(data) = &file.data {
            return STANDARD
                .decode(data.trim())
                .map_err(|_| ModelError::MissingFile(file.path.clone()));
        }
        let relative = file.path.strip_prefix(PLUGINFILE_PREFIX).unwrap_or(&file.path);
        let candidate = match &self.base_dir {
            Some(dir) => dir.join(relative),
            None => PathBuf::from(relative),
        };
        fs::read(&candidate).map_err(|_| ModelError::MissingFile(file.path.clone()))
    }
}
