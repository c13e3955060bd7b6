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

use tracing::{info, warn};

use crate::{
    Batching, Error, Orchestrator, Relocate, Result, Tooling,
    artifact::{ArtifactWriter, Artifacts},
    executor::{Executor, ReassignTool},
    metadata::TopicAdmin,
    placement,
};

#[derive(Clone, Debug, Default)]
pub struct Builder<Z, T, R, N> {
    zookeeper: Z,
    topics: T,
    replication_factor: R,
    broker_count: N,
    exclude: Option<String>,
    batching: Batching,
    tooling: Tooling,
}

impl<Z, T, R, N> Builder<Z, T, R, N> {
    pub fn zookeeper(self, zookeeper: impl Into<String>) -> Builder<String, T, R, N> {
        Builder {
            zookeeper: zookeeper.into(),
            topics: self.topics,
            replication_factor: self.replication_factor,
            broker_count: self.broker_count,
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        }
    }

    /// Pattern selecting the topics to change.
    pub fn topics(self, topics: impl Into<String>) -> Builder<Z, String, R, N> {
        Builder {
            zookeeper: self.zookeeper,
            topics: topics.into(),
            replication_factor: self.replication_factor,
            broker_count: self.broker_count,
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        }
    }

    pub fn replication_factor(self, replication_factor: i32) -> Builder<Z, T, i32, N> {
        Builder {
            zookeeper: self.zookeeper,
            topics: self.topics,
            replication_factor,
            broker_count: self.broker_count,
            exclude: self.exclude,
            batching: self.batching,
            tooling: self.tooling,
        }
    }

    /// Brokers are assumed to be numbered `1..=broker_count`.
    pub fn broker_count(self, broker_count: i32) -> Builder<Z, T, R, i32> {
        Builder {
            zookeeper: self.zookeeper,
            topics: self.topics,
            replication_factor: self.replication_factor,
            broker_count,
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

impl Builder<String, String, i32, i32> {
    pub fn build(self) -> Relocate {
        Relocate::IncreaseReplication(Configuration {
            zookeeper: self.zookeeper,
            topics: self.topics,
            replication_factor: self.replication_factor,
            broker_count: self.broker_count,
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
    replication_factor: i32,
    broker_count: i32,
    exclude: Option<String>,
    batching: Batching,
    tooling: Tooling,
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Replication {
    configuration: Configuration,
}

impl TryFrom<Configuration> for Replication {
    type Error = Error;

    fn try_from(configuration: Configuration) -> Result<Self, Self::Error> {
        placement::validate(configuration.replication_factor, configuration.broker_count)
            .map(|()| Self { configuration })
    }
}

impl Replication {
    pub(crate) async fn main<E, W>(self, executor: E, writer: W) -> Result<()>
    where
        E: Executor + Clone,
        W: ArtifactWriter,
    {
        let Configuration {
            zookeeper,
            topics,
            exclude,
            replication_factor,
            broker_count,
            batching,
            tooling,
        } = self.configuration;

        let admin = TopicAdmin::new(executor.clone(), &tooling.topics_command, &zookeeper);
        let selected = admin.select(&topics, exclude.as_deref()).await?;

        let metadata = admin
            .describe(&selected)
            .await?
            .into_iter()
            .filter(|topic| {
                topic
                    .error
                    .as_deref()
                    .inspect(|error| warn!(topic = %topic.name, error, "skipping"))
                    .is_none()
            })
            .collect::<Vec<_>>();

        if metadata.is_empty() {
            info!(%topics, "did not find any topic matching");
            return Ok(());
        }

        Orchestrator::new(
            ReassignTool::new(executor, &tooling.reassign_command, &zookeeper),
            writer,
            Artifacts::new(&tooling.artifact_dir),
        )
        .increase_replication(&metadata, replication_factor, broker_count, &batching)
        .await
        .inspect(|_| info!(replication_factor, "successfully changed replication"))
    }
}
