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

//! Polling the verify step until a batch settles.

use std::{path::Path, time::Duration};

use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::{Error, Result, executor::Executor, executor::ReassignTool};

const STATUS_LINE: &str = "Reassignment of partition ";

const COMPLETED: [&str; 2] = ["completed successfully", "is complete"];
const FAILED: &str = "failed";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Status {
    Completed,
    Failed,
    InProgress,
}

impl From<&str> for Status {
    fn from(phrase: &str) -> Self {
        if COMPLETED.iter().any(|completed| phrase.contains(completed)) {
            Self::Completed
        } else if phrase.contains(FAILED) {
            Self::Failed
        } else {
            Self::InProgress
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartitionStatus {
    /// `<topic>-<partition>` as printed by the tool
    pub partition: String,
    pub status: Status,
}

/// A parsed verify report, in report order.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Verification(Vec<PartitionStatus>);

impl TryFrom<&str> for Verification {
    type Error = Error;

    fn try_from(report: &str) -> Result<Self, Self::Error> {
        let statuses = report
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix(STATUS_LINE))
            .map(|line| {
                let (partition, phrase) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

                PartitionStatus {
                    partition: partition.into(),
                    status: Status::from(phrase),
                }
            })
            .collect::<Vec<_>>();

        if statuses.is_empty() {
            Err(Error::parse(format!("no partition status in: {report:?}")))
        } else {
            Ok(Self(statuses))
        }
    }
}

/// Where a batch stands after one verify report.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Outcome<'a> {
    Succeeded,
    Failed(&'a str),
    InProgress(&'a str),
}

impl Verification {
    pub fn statuses(&self) -> &[PartitionStatus] {
        &self.0
    }

    /// Any failure wins, then any partition still moving.
    pub fn outcome(&self) -> Outcome<'_> {
        let first = |status| {
            self.0
                .iter()
                .find(|partition| partition.status == status)
                .map(|partition| partition.partition.as_str())
        };

        first(Status::Failed)
            .map(Outcome::Failed)
            .or_else(|| first(Status::InProgress).map(Outcome::InProgress))
            .unwrap_or(Outcome::Succeeded)
    }
}

/// Repeats the verify step until every partition completes, one fails, or
/// the timeout elapses. The first verify happens immediately.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub async fn poll<E>(&self, tool: &ReassignTool<E>, reassignment: &Path) -> Result<()>
    where
        E: Executor,
    {
        // a timeout beyond the clock's range never expires
        let deadline = Instant::now().checked_add(self.timeout);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let report = tool.verify(reassignment).await?;
            let verification = Verification::try_from(report.as_str())?;
            debug!(attempt, ?verification);

            match verification.outcome() {
                Outcome::Succeeded => return Ok(()),

                Outcome::Failed(partition) => {
                    warn!(partition, attempt, "reassignment failed");
                    return Err(Error::PartitionFailed {
                        partition: partition.into(),
                    });
                }

                Outcome::InProgress(partition) => {
                    let remaining = deadline.map_or(self.interval, |deadline| {
                        deadline.saturating_duration_since(Instant::now())
                    });
                    sleep(remaining.min(self.interval)).await;

                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        warn!(partition, attempt, timeout = ?self.timeout, "reassignment timed out");
                        return Err(Error::Timeout {
                            partition: partition.into(),
                        });
                    }
                }
            }
        }
    }
}
