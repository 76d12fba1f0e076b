use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub kind: PageKind,
    pub markup: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Detail,
    Menu,
    Document,
}

impl ReportArtifact {
    pub fn new(file_name: impl Into<String>, kind: PageKind, markup: String) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            markup,
        }
    }

    pub fn write_into(self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(&self.file_name);
        fs::write(&path, self.markup.as_bytes()).map_err(|err| ReportError::write(&path, err))?;
        Ok(path)
    }

    /// Like [`write_into`](Self::write_into), but readers never observe a
    /// partially written file: the page goes to a temporary sibling first and
    /// is renamed over the target.
    pub fn write_atomically_into(self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(&self.file_name);
        let staging = dir.join(format!(".{}.tmp", self.file_name));
        fs::write(&staging, self.markup.as_bytes())
            .map_err(|err| ReportError::write(&staging, err))?;
        if let Err(err) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(ReportError::write(&path, err));
        }
        Ok(path)
    }
}
