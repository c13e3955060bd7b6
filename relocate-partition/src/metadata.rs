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

//! Topic selection and the cluster metadata snapshot, both sourced from the
//! cluster's topics tool.

use regex::Regex;
use tracing::debug;

use crate::{BrokerId, Result, executor::Executor};

const MARKED_FOR_DELETION: &str = " - marked for deletion";

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartitionMetadata {
    pub id: i32,
    pub leader: BrokerId,
    pub replicas: Vec<BrokerId>,
    pub isr: Vec<BrokerId>,
    pub error: Option<String>,
}

impl PartitionMetadata {
    /// The first replica, or the current leader when no replicas are known.
    pub fn preferred_leader(&self) -> BrokerId {
        self.replicas.first().copied().unwrap_or(self.leader)
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TopicMetadata {
    pub name: String,
    pub partitions: Vec<PartitionMetadata>,
    pub error: Option<String>,
}

/// Keeps topic names that match (or with `exclude`, do not match) a pattern.
#[derive(Clone, Debug)]
pub struct TopicSelector {
    pattern: Regex,
    include: bool,
}

impl TopicSelector {
    pub fn include(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|pattern| Self {
                pattern,
                include: true,
            })
            .map_err(Into::into)
    }

    pub fn exclude(pattern: &str) -> Result<Self> {
        Self::include(pattern).map(|selector| Self {
            include: false,
            ..selector
        })
    }

    pub fn filter<I, S>(&self, topics: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        topics
            .into_iter()
            .map(Into::into)
            .filter(|topic| self.pattern.is_match(topic) == self.include)
            .collect()
    }
}

/// Listing and describing topics through the topics tool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicAdmin<E> {
    executor: E,
    command: String,
    zookeeper: String,
}

impl<E> TopicAdmin<E>
where
    E: Executor,
{
    pub fn new(executor: E, command: impl Into<String>, zookeeper: impl Into<String>) -> Self {
        Self {
            executor,
            command: command.into(),
            zookeeper: zookeeper.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.executor
            .execute(
                &self.command,
                &["--zookeeper".into(), self.zookeeper.clone(), "--list".into()],
            )
            .await
            .map(|listing| parse_list(&listing))
            .inspect(|topics| debug!(?topics))
    }

    /// Listed topics matching `include`, less those matching `exclude`.
    pub async fn select(&self, include: &str, exclude: Option<&str>) -> Result<Vec<String>> {
        let included = TopicSelector::include(include)?.filter(self.list().await?);

        let selected = match exclude {
            Some(pattern) => TopicSelector::exclude(pattern)?.filter(included),
            None => included,
        };

        debug!(include, ?exclude, ?selected);
        Ok(selected)
    }

    /// Metadata for each topic, in the order given.
    pub async fn describe(&self, topics: &[String]) -> Result<Vec<TopicMetadata>> {
        let mut described = Vec::with_capacity(topics.len());

        for topic in topics {
            let report = self
                .executor
                .execute(
                    &self.command,
                    &[
                        "--zookeeper".into(),
                        self.zookeeper.clone(),
                        "--describe".into(),
                        "--topic".into(),
                        topic.clone(),
                    ],
                )
                .await?;

            // --topic is itself a pattern, so similarly named topics may be reported
            let metadata = parse_describe(&report)
                .into_iter()
                .find(|metadata| &metadata.name == topic)
                .unwrap_or_else(|| TopicMetadata {
                    name: topic.clone(),
                    partitions: Vec::new(),
                    error: Some("unknown topic".into()),
                });

            debug!(?metadata);
            described.push(metadata);
        }

        Ok(described)
    }
}

fn parse_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(|line| line.trim_end_matches(MARKED_FOR_DELETION).trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn broker_ids(value: &str) -> Vec<BrokerId> {
    value
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

/// Partition lines are tab separated `Key: value` fields; topic summary
/// lines lack a `Partition` field and are skipped.
fn parse_describe(report: &str) -> Vec<TopicMetadata> {
    let mut topics: Vec<TopicMetadata> = Vec::new();

    for line in report.lines() {
        let mut topic = None;
        let mut partition = PartitionMetadata {
            leader: -1,
            ..Default::default()
        };
        let mut is_partition = false;

        for (key, value) in line
            .split('\t')
            .filter_map(|field| field.split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim()))
        {
            match key {
                "Topic" => topic = Some(value),
                "Partition" => {
                    is_partition = value.parse().map(|id| partition.id = id).is_ok();
                }
                "Leader" => partition.leader = value.parse().unwrap_or(-1),
                "Replicas" => partition.replicas = broker_ids(value),
                "Isr" => partition.isr = broker_ids(value),
                _ => (),
            }
        }

        let Some(name) = topic.filter(|_| is_partition) else {
            continue;
        };

        match topics.iter_mut().find(|topic| topic.name == name) {
            Some(topic) => topic.partitions.push(partition),
            None => topics.push(TopicMetadata {
                name: name.into(),
                partitions: vec![partition],
                error: None,
            }),
        }
    }

    topics
}
