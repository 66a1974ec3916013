//! Backup and output file writes

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{CustomizeError, CustomizeResult};

/// Copy `source` byte for byte to `backup`
pub async fn write_backup(source: &Path, backup: &Path) -> CustomizeResult<()> {
    debug!("Writing backup file to {:?}", backup);
    fs::copy(source, backup)
        .await
        .map_err(|e| CustomizeError::WriteFile {
            path: backup.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

/// Replace `path` with `content` via a sibling temp file and rename
pub async fn write_output(path: &Path, content: &str) -> CustomizeResult<()> {
    let temp = temp_path(path);
    let write_err = |e| CustomizeError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    };

    fs::write(&temp, content).await.map_err(write_err)?;
    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(write_err(e));
    }

    debug!("{:?} has been updated", path);
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_backup_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("customize.yaml");
        let backup = dir.path().join("customize.yaml.backup");
        let content = "# hand edited\nlight.x:   {friendly_name: X}\n";
        std_fs::write(&source, content).unwrap();

        write_backup(&source, &backup).await.unwrap();
        assert_eq!(std_fs::read_to_string(&backup).unwrap(), content);
    }

    #[tokio::test]
    async fn test_backup_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = write_backup(&dir.path().join("missing.yaml"), &dir.path().join("b")).await;
        assert!(matches!(result, Err(CustomizeError::WriteFile { .. })));
    }

    #[tokio::test]
    async fn test_write_output_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("customize.yaml");
        std_fs::write(&path, "old\n").unwrap();

        write_output(&path, "new\n").await.unwrap();

        assert_eq!(std_fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!dir.path().join("customize.yaml.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_output_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = write_output(&dir.path().join("nope").join("customize.yaml"), "x").await;
        assert!(matches!(result, Err(CustomizeError::WriteFile { .. })));
    }
}
