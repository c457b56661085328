use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::models::account::{Caller, Role};

const RESUME_DIR: &str = "resumes";

/// Local-disk blob store for candidate resumes, served back under `/uploads`.
#[derive(Clone, Debug)]
pub struct ResumeStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ResumeStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores the upload under a fresh name and returns its public path.
    pub async fn save(&self, caller: &Caller, filename: &str, data: &Bytes) -> Result<String> {
        caller.require(Role::Candidate)?;
        if data.is_empty() {
            return Err(Error::BadRequest("Resume file is empty".into()));
        }
        if data.len() > self.max_bytes {
            return Err(Error::PayloadTooLarge(format!(
                "Resume exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "bin".to_string());

        let dir = self.root.join(RESUME_DIR);
        fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        fs::write(dir.join(&stored_name), data).await.map_err(|e| {
            error!("Failed to write resume file: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        info!(applicant_id = %caller.id, file = %stored_name, "resume stored");
        Ok(format!("{}{}", public_prefix(), stored_name))
    }

    /// Deletes a file previously returned by [`ResumeStore::save`]. Paths outside the
    /// resume directory are refused; a file that is already gone is not an error.
    pub async fn remove(&self, public_path: &str) -> Result<()> {
        let file_name = public_path
            .strip_prefix(&public_prefix())
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
            .ok_or_else(|| Error::BadRequest(format!("Not a stored resume: {}", public_path)))?;

        match fs::remove_file(self.root.join(RESUME_DIR).join(file_name)).await {
            Ok(()) => {
                info!(file = %file_name, "resume removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(file = %file_name, "resume already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn public_prefix() -> String {
    format!("/uploads/{}/", RESUME_DIR)
}
