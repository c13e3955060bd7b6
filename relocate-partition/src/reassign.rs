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

use tracing::info;

use crate::{
    Batching, Error, Orchestrator, Relocate, Result, Tooling,
    artifact::{ArtifactWriter, Artifacts},
    executor::{Executor, ReassignTool},
    metadata::TopicAdmin,
};

#[derive(Clone, Debug, Default)]
pub struct Builder<Z, T, B> {
    zookeeper: Z,
    topics: T,
    broker_ids: B,
    exclude: Option<String>,
    batching: Batching,
    tooling: Tooling,
}

impl<Z, T, B> Builder<Z, T, B> {
    pub fn zookeeper(self, zookeeper: impl Into<String>) -> Builder<String, T, B> {
        Builder {
            zookeeper: zookeeper.into(),
            topics: self.topics,
            broker_ids: self.broker_ids,
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        }
    }

    /// Pattern selecting the topics to move.
    pub fn topics(self, topics: impl Into<String>) -> Builder<Z, String, B> {
        Builder {
            zookeeper: self.zookeeper,
            topics: topics.into(),
            broker_ids: self.broker_ids,
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        }
    }

    /// Comma separated list of destination brokers.
    pub fn broker_ids(self, broker_ids: impl Into<String>) -> Builder<Z, T, String> {
        Builder {
            zookeeper: self.zookeeper,
            topics: self.topics,
            broker_ids: broker_ids.into(),
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        }
    }

    /// Pattern removing topics from the selection.
    pub fn exclude(self, exclude: Option<String>) -> Self {
        Self { exclude, ..self }
    }

    pub fn batching(self, batching: Batching) -> Self {
        Self { batching, ..self }
    }

    pub fn tooling(self, tooling: Tooling) -> Self {
        Self { tooling, ..self }
    }
}

impl Builder<String, String, String> {
    pub fn build(self) -> Relocate {
        Relocate::Reassign(Configuration {
            zookeeper: self.zookeeper,
            topics: self.topics,
            broker_ids: self.broker_ids,
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Configuration {
    zookeeper: String,
    topics: String,
    broker_ids: String,
    exclude: Option<String>,
    batching: Batching,
    tooling: Tooling,
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Reassign {
    configuration: Configuration,
}

impl TryFrom<Configuration> for Reassign {
    type Error = Error;

    fn try_from(configuration: Configuration) -> Result<Self, Self::Error> {
        let valid = !configuration.broker_ids.trim().is_empty()
            && configuration
                .broker_ids
                .split(',')
                .all(|id| id.trim().parse::<i32>().is_ok());

        if valid {
            Ok(Self { configuration })
        } else {
            Err(Error::InvalidBrokerList {
                broker_ids: configuration.broker_ids,
            })
        }
    }
}

impl Reassign {
    pub(crate) async fn main<E, W>(self, executor: E, writer: W) -> Result<()>
    where
        E: Executor + Clone,
        W: ArtifactWriter,
    {
        let Configuration {
            zookeeper,
            topics,
            exclude,
            broker_ids,
            batching,
            tooling,
        } = self.configuration;

        let admin = TopicAdmin::new(executor.clone(), &tooling.topics_command, &zookeeper);
        let selected = admin.select(&topics, exclude.as_deref()).await?;

        if selected.is_empty() {
            info!(%topics, "did not find any topic matching");
            return Ok(());
        }

        Orchestrator::new(
            ReassignTool::new(executor, &tooling.reassign_command, &zookeeper),
            writer,
            Artifacts::new(&tooling.artifact_dir),
        )
        .reassign_partitions(&selected, &broker_ids, &batching)
        .await
        .inspect(|_| info!("successfully reassigned partitions"))
    }
}
