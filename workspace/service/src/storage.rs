//! Storage of uploaded images on the local file system.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{Result, ServiceError};

/// Used when the client sends no usable file name.
const FALLBACK_FILE_NAME: &str = "upload";

/// Writes uploads into a single directory under generated, collision-free names.
#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
}

/// Reduces a client supplied name to a single safe path component.
fn sanitize_file_name(original: &str) -> String {
    let last_component = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = last_component
        .chars()
        .filter(|c| !c.is_control() && *c != ':')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<uuid>_<original name>`, so two uploads of the same file never clash.
    pub fn generate_file_name(original: Option<&str>) -> String {
        let original = original.map(sanitize_file_name);
        format!(
            "{}_{}",
            Uuid::new_v4(),
            original.as_deref().unwrap_or(FALLBACK_FILE_NAME)
        )
    }

    /// Writes `bytes` under a generated name and returns that name.
    ///
    /// Empty uploads are rejected before anything touches the disk.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("Please select a file".to_string()));
        }

        let file_name = Self::generate_file_name(original_name);
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(&file_name);
        debug!("Writing upload to {}", path.display());
        tokio::fs::write(&path, bytes).await?;

        info!("Stored upload {} ({} bytes)", file_name, bytes.len());
        Ok(file_name)
    }
}
