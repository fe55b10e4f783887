//! Filesystem helpers.
use anyhow::Result;
use log::debug;
use std::{fs, path::Path};

/// Creates a directory and its parents. An existing directory is not an error.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        debug!("Create directory {:?}", path);
    }
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn ensure_dir_is_idempotent() -> Result<()> {
        let tmp = TempDir::new("ensure_dir")?;
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir)?;
        ensure_dir(&dir)?;
        assert!(dir.is_dir());
        Ok(())
    }

    #[test]
    fn ensure_dir_fails_on_a_file() -> Result<()> {
        let tmp = TempDir::new("ensure_dir")?;
        let file = tmp.path().join("file");
        fs::write(&file, b"")?;
        assert!(ensure_dir(&file).is_err());
        Ok(())
    }
}
