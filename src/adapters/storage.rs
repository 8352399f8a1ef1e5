use crate::core::Storage;
use crate::utils::error::{ExportError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 寫入本機檔案；先寫到同目錄的暫存檔再 rename，避免留下寫一半的輸出
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| ExportError::IoError(e.error))?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested/out/data-source.js");

        LocalStorage::new().write_file(&target, b"const a = [];\n").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "const a = [];\n");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("data-source.js");
        fs::write(&target, "old").unwrap();

        LocalStorage::new().write_file(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        // 暫存檔不應殘留
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
