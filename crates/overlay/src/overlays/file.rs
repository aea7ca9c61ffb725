//! FileOverlay - single-state JSON file backend
//!
//! 文件要么持有当前线段的 JSON,要么为空,从不累积历史:
//! replace 整体重写,clear 截断。

use contracts::{ContractError, DirectionOverlay, OverlayLine};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Overlay backend that mirrors the current segment into a JSON file
pub struct FileOverlay {
    name: String,
    path: PathBuf,
}

impl FileOverlay {
    /// Create a new FileOverlay writing to `path`
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // 启动即建空文件:读者可以立刻区分"无线段"和"没跑起来"
        File::create(&path)?;

        Ok(Self {
            name: name.into(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_state(&self, line: &OverlayLine) -> std::io::Result<()> {
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, line)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl DirectionOverlay for FileOverlay {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_overlay_replace",
        skip(self, line),
        fields(overlay = %self.name)
    )]
    async fn replace(&mut self, line: &OverlayLine) -> Result<(), ContractError> {
        self.write_state(line)
            .map_err(|e| ContractError::overlay_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_overlay_clear", skip(self))]
    async fn clear(&mut self) -> Result<(), ContractError> {
        File::create(&self.path)
            .map(|_| ())
            .map_err(|e| ContractError::overlay_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_overlay_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(overlay = %self.name, "FileOverlay closed");
        Ok(())
    }
}
