//! Standard data-directory layout.

use std::path::PathBuf;

/// Paths used by the file-backed stores.
#[derive(Debug, Clone)]
pub struct LifelinePaths {
    /// Root data directory.
    pub root: PathBuf,
}

impl LifelinePaths {
    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one JSON file per entity.
    #[must_use]
    pub fn entities(&self) -> PathBuf {
        self.root.join("entities")
    }

    /// File for a specific entity.
    #[must_use]
    pub fn entity(&self, id: &str) -> PathBuf {
        self.entities().join(format!("{id}.json"))
    }

    /// Directory holding one JSON file per notification channel.
    #[must_use]
    pub fn channels(&self) -> PathBuf {
        self.root.join("channels")
    }

    /// File for a specific channel.
    #[must_use]
    pub fn channel(&self, id: &str) -> PathBuf {
        self.channels().join(format!("{id}.json"))
    }

    /// SQLite database holding the audit log.
    #[must_use]
    pub fn audit_db(&self) -> PathBuf {
        self.root.join("events.db")
    }

    /// Create all necessary directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.entities())?;
        std::fs::create_dir_all(self.channels())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_root() {
        let paths = LifelinePaths::with_root("/tmp/lifeline-test");
        assert_eq!(
            paths.entity("web-1"),
            PathBuf::from("/tmp/lifeline-test/entities/web-1.json")
        );
        assert_eq!(
            paths.channel("abc"),
            PathBuf::from("/tmp/lifeline-test/channels/abc.json")
        );
        assert_eq!(
            paths.audit_db(),
            PathBuf::from("/tmp/lifeline-test/events.db")
        );
    }

    #[test]
    fn create_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let paths = LifelinePaths::with_root(temp.path().join("data"));
        paths.create_dirs().unwrap();
        assert!(paths.entities().is_dir());
        assert!(paths.channels().is_dir());
    }
}
