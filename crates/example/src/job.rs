//! Job files: node parameters, failure policy, and input items.
//!
//! ```json
//! {
//!   "parameters": {
//!     "modelId": "anthropic.claude-3-haiku-20240307-v1:0",
//!     "prompt": "={{ $json.question }}"
//!   },
//!   "continueOnFail": true,
//!   "items": [
//!     {"json": {"question": "What is in this picture?"}, "files": {"data": "cat.jpg"}}
//!   ]
//! }
//! ```
//!
//! Relative file paths are resolved against the job file's directory.

use lumen_nodes::{BinaryData, ExecutionContext, Item, NodeParameters};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors loading a job or its attachments.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The job file could not be read.
    #[error("failed to read job file {}: {source}", .path.display())]
    Read {
        /// Job file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The job file is not a valid job.
    #[error("failed to parse job file {}: {source}", .path.display())]
    Parse {
        /// Job file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An attachment could not be read.
    #[error("item {item_index}: failed to read attachment \"{name}\" from {}: {source}", .path.display())]
    Attachment {
        /// Index of the item declaring the attachment.
        item_index: usize,
        /// Attachment name.
        name: String,
        /// Resolved file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A parsed job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Node parameters; unset ones fall back to the node defaults.
    #[serde(default)]
    pub parameters: NodeParameters,
    /// Emit error items instead of aborting on the first failure.
    #[serde(default)]
    pub continue_on_fail: bool,
    /// Input items, in order.
    #[serde(default)]
    pub items: Vec<JobItem>,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// One input item of a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobItem {
    /// Item payload.
    #[serde(default)]
    pub json: Map<String, Value>,
    /// Attachments by name, as file paths.
    #[serde(default)]
    pub files: BTreeMap<String, PathBuf>,
}

impl Job {
    /// Reads and parses a job file.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Read`] or [`JobError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, JobError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| JobError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir).map_err(|source| JobError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses job JSON, resolving relative attachment paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a valid job.
    pub fn parse(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, serde_json::Error> {
        let mut job: Self = serde_json::from_str(text)?;
        job.base_dir = base_dir.into();
        Ok(job)
    }

    /// Reads all attachments and builds the execution context.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Attachment`] for the first unreadable file.
    pub fn into_context(self) -> Result<ExecutionContext, JobError> {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(item_index, job_item)| job_item.load(item_index, &self.base_dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExecutionContext::new(items)
            .with_parameters(self.parameters)
            .with_continue_on_fail(self.continue_on_fail))
    }
}

impl JobItem {
    fn load(self, item_index: usize, base_dir: &Path) -> Result<Item, JobError> {
        let mut item = Item::new(Value::Object(self.json));

        for (name, file) in self.files {
            let path = base_dir.join(&file);
            let data = std::fs::read(&path).map_err(|source| JobError::Attachment {
                item_index,
                name: name.clone(),
                path: path.clone(),
                source,
            })?;
            tracing::debug!(item_index, %name, path = %path.display(), bytes = data.len(), "loaded attachment");

            let mut binary = BinaryData::new(data, mime_type_for(&path));
            if let Some(file_name) = path.file_name() {
                binary = binary.with_file_name(file_name.to_string_lossy());
            }
            item = item.with_binary(name, binary);
        }

        Ok(item)
    }
}

/// Guesses a MIME type from a file extension.
#[must_use]
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
