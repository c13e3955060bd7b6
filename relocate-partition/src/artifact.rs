// Copyright ⓒ 2025 Peter Morgan <peter.james.morgan@gmail.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::debug;

use crate::Result;

/// Durable storage for the per batch audit and rollback trail.
#[async_trait]
pub trait ArtifactWriter: fmt::Debug + Send + Sync {
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FileSystem;

#[async_trait]
impl ArtifactWriter for FileSystem {
    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .inspect(|_| debug!(path = %path.display(), bytes = content.len()))
            .map_err(Into::into)
    }
}

/// Artifact paths for a run, one set of files per batch index.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Artifacts {
    directory: PathBuf,
}

impl Artifacts {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn topics_to_move(&self, batch: usize) -> PathBuf {
        self.path("topics-to-move", batch)
    }

    pub fn reassignment(&self, batch: usize) -> PathBuf {
        self.path("reassignment", batch)
    }

    pub fn rollback(&self, batch: usize) -> PathBuf {
        self.path("rollback", batch)
    }

    fn path(&self, kind: &str, batch: usize) -> PathBuf {
        self.directory.join(format!("{kind}-{batch}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn paths_carry_batch_index() {
        let artifacts = Artifacts::new("/var/tmp");

        assert_eq!(
            PathBuf::from("/var/tmp/topics-to-move-0.json"),
            artifacts.topics_to_move(0)
        );
        assert_eq!(
            PathBuf::from("/var/tmp/reassignment-12.json"),
            artifacts.reassignment(12)
        );
        assert_eq!(
            PathBuf::from("/var/tmp/rollback-3.json"),
            artifacts.rollback(3)
        );
    }

    #[tokio::test]
    async fn file_system_writes_content() -> Result<(), Error> {
        let directory = tempfile::tempdir()?;
        let artifacts = Artifacts::new(directory.path());

        let path = artifacts.rollback(0);
        FileSystem.write_file(&path, "{\"version\":1}").await?;

        assert_eq!("{\"version\":1}", tokio::fs::read_to_string(&path).await?);

        Ok(())
    }

    #[tokio::test]
    async fn file_system_write_failure() {
        let result = FileSystem
            .write_file(Path::new("/no/such/directory/rollback-0.json"), "{}")
            .await;

        assert!(matches!(result, Err(Error::Io(_))));
    }
}
