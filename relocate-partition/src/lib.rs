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

//! Moves partitions between brokers and changes their replication factor
//! while the cluster stays online.
//!
//! Work is split into batches. Each batch writes a rollback document before
//! anything is mutated, hands a reassignment plan to the cluster's
//! reassignment tool and then polls the tool until every partition in the
//! batch has settled.

use std::{fmt, io, marker::PhantomData, path::PathBuf, result, sync::Arc};

use artifact::{ArtifactWriter, FileSystem};
use executor::{Executor, Process};
use reassign::Reassign;
use replication::Replication;

pub mod artifact;
pub mod codec;
pub mod executor;
pub mod metadata;
pub mod orchestrator;
pub mod placement;
pub mod reassign;
pub mod replication;
pub mod verify;

pub use orchestrator::{Batching, Orchestrator};

pub type Result<T, E = Error> = result::Result<T, E>;

pub type BrokerId = i32;

#[derive(thiserror::Error, Clone, Debug)]
pub enum Error {
    InvalidBatchSize,
    InvalidBrokerList {
        broker_ids: String,
    },
    InvalidPollInterval,
    InvalidReplicationFactor {
        replication_factor: i32,
        broker_count: i32,
    },
    Invocation {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    Io(Arc<io::Error>),
    Json(Arc<serde_json::Error>),
    Parse {
        reason: String,
    },
    PartitionFailed {
        partition: String,
    },
    Regex(#[from] regex::Error),
    Timeout {
        partition: String,
    },
    UnknownBroker {
        topic: String,
        partition: i32,
        broker: BrokerId,
    },
}

impl Error {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(Arc::new(value))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Names of the external tools and where batch artifacts are written.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tooling {
    pub reassign_command: String,
    pub topics_command: String,
    pub artifact_dir: PathBuf,
}

impl Default for Tooling {
    fn default() -> Self {
        Self {
            reassign_command: "kafka-reassign-partitions".into(),
            topics_command: "kafka-topics".into(),
            artifact_dir: PathBuf::from("/tmp"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Relocate {
    Reassign(reassign::Configuration),
    IncreaseReplication(replication::Configuration),
}

impl Relocate {
    pub fn reassign()
    -> reassign::Builder<PhantomData<String>, PhantomData<String>, PhantomData<String>> {
        reassign::Builder::default()
    }

    pub fn increase_replication() -> replication::Builder<
        PhantomData<String>,
        PhantomData<String>,
        PhantomData<i32>,
        PhantomData<i32>,
    > {
        replication::Builder::default()
    }

    pub async fn main(self) -> Result<()> {
        self.run(Process, FileSystem).await
    }

    /// Run against the supplied process and file system capabilities.
    pub async fn run<E, W>(self, executor: E, writer: W) -> Result<()>
    where
        E: Executor + Clone,
        W: ArtifactWriter,
    {
        match self {
            Self::Reassign(configuration) => {
                Reassign::try_from(configuration)?
                    .main(executor, writer)
                    .await
            }

            Self::IncreaseReplication(configuration) => {
                Replication::try_from(configuration)?
                    .main(executor, writer)
                    .await
            }
        }
    }
}
