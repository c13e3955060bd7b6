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

//! Batch by batch reassignment. Batches run strictly one after another and
//! the first failing batch ends the run; artifacts of earlier batches are
//! left in place as the rollback trail.

use std::{path::Path, time::Duration};

use tracing::{debug, info};

use crate::{
    Error, Result,
    artifact::{ArtifactWriter, Artifacts},
    codec::{GenerateReport, ReassignmentPlan, TopicsToMove},
    executor::{Executor, ReassignTool},
    metadata::TopicMetadata,
    placement,
    verify::Poller,
};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Batching {
    pub size: usize,
    pub timeout_per_batch: Duration,
    pub poll_interval: Duration,
    /// bytes per second
    pub throttle: u64,
}

impl Default for Batching {
    fn default() -> Self {
        Self {
            size: 1,
            timeout_per_batch: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
            throttle: 10_000_000,
        }
    }
}

impl Batching {
    fn validate(&self) -> Result<()> {
        if self.size == 0 {
            Err(Error::InvalidBatchSize)
        } else if self.poll_interval.is_zero() {
            Err(Error::InvalidPollInterval)
        } else {
            Ok(())
        }
    }

    fn poller(&self) -> Poller {
        Poller::new(self.timeout_per_batch, self.poll_interval)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Orchestrator<E, W> {
    tool: ReassignTool<E>,
    writer: W,
    artifacts: Artifacts,
}

impl<E, W> Orchestrator<E, W>
where
    E: Executor,
    W: ArtifactWriter,
{
    pub fn new(tool: ReassignTool<E>, writer: W, artifacts: Artifacts) -> Self {
        Self {
            tool,
            writer,
            artifacts,
        }
    }

    /// Move `topics` onto the brokers in `broker_list`, using placements
    /// proposed by the reassignment tool.
    pub async fn reassign_partitions(
        &self,
        topics: &[String],
        broker_list: &str,
        batching: &Batching,
    ) -> Result<()> {
        batching.validate()?;

        for (batch, topics) in topics.chunks(batching.size).enumerate() {
            info!(batch, ?topics);

            let topics_to_move = self.artifacts.topics_to_move(batch);
            self.write(&topics_to_move, &TopicsToMove::from_iter(topics).encode()?)
                .await?;

            let report = self.tool.generate(broker_list, &topics_to_move).await?;
            let GenerateReport { current, proposed } = GenerateReport::try_from(report.as_str())?;

            self.write(&self.artifacts.rollback(batch), current).await?;

            let reassignment = self.artifacts.reassignment(batch);
            self.write(&reassignment, proposed).await?;

            self.execute(batch, &reassignment, batching).await?;
        }

        Ok(())
    }

    /// Change every partition of `topics` to `replication_factor` replicas
    /// drawn from brokers `1..=broker_count`.
    pub async fn increase_replication(
        &self,
        topics: &[TopicMetadata],
        replication_factor: i32,
        broker_count: i32,
        batching: &Batching,
    ) -> Result<()> {
        batching.validate()?;
        placement::validate(replication_factor, broker_count)?;

        for (batch, topics) in topics.chunks(batching.size).enumerate() {
            info!(
                batch,
                topics = ?topics.iter().map(|topic| topic.name.as_str()).collect::<Vec<_>>(),
                replication_factor
            );

            let reassignment = self.artifacts.reassignment(batch);
            let plan = placement::build_reassignment_plan(topics, replication_factor, broker_count)?;
            self.write(&reassignment, &plan.encode()?).await?;

            self.write(
                &self.artifacts.rollback(batch),
                &ReassignmentPlan::current(topics).encode()?,
            )
            .await?;

            self.execute(batch, &reassignment, batching).await?;
        }

        Ok(())
    }

    async fn execute(&self, batch: usize, reassignment: &Path, batching: &Batching) -> Result<()> {
        _ = self
            .tool
            .execute(reassignment, batching.throttle)
            .await
            .inspect(|output| debug!(batch, %output))?;

        batching
            .poller()
            .poll(&self.tool, reassignment)
            .await
            .inspect(|_| info!(batch, "batch reassigned"))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.writer
            .write_file(path, content)
            .await
            .inspect(|_| debug!(path = %path.display()))
            .inspect_err(|err| debug!(path = %path.display(), ?err))
    }
}
