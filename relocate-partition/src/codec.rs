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

//! Documents exchanged with the reassignment tool, and the parsing of its
//! generate report.

use serde::{Deserialize, Serialize};
use serde_json::{Serializer, ser::PrettyFormatter};

use crate::{BrokerId, Error, Result, metadata::TopicMetadata};

pub const PLAN_VERSION: i32 = 1;

pub const CURRENT_ASSIGNMENT: &str = "Current partition replica assignment";
pub const PROPOSED_ASSIGNMENT: &str = "Proposed partition reassignment configuration";

const LABELS: [&str; 2] = [CURRENT_ASSIGNMENT, PROPOSED_ASSIGNMENT];

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TopicToMove {
    pub topic: String,
}

/// Input to the generate step, in the order the topics were given.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TopicsToMove {
    pub topics: Vec<TopicToMove>,
}

impl TopicsToMove {
    /// Pretty printed with an empty indent: every token on its own line.
    pub fn encode(&self) -> Result<String> {
        let mut encoded = Vec::new();
        self.serialize(&mut Serializer::with_formatter(
            &mut encoded,
            PrettyFormatter::with_indent(b""),
        ))?;

        String::from_utf8(encoded).map_err(|err| Error::parse(err.to_string()))
    }
}

impl<S> FromIterator<S> for TopicsToMove
where
    S: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            topics: iter
                .into_iter()
                .map(|topic| TopicToMove {
                    topic: topic.as_ref().into(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PartitionReplicas {
    pub topic: String,
    pub partition: i32,
    pub replicas: Vec<BrokerId>,
}

/// The document consumed by the execute and verify steps. A rollback
/// document has the same shape, holding the assignment prior to a change.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ReassignmentPlan {
    pub version: i32,
    pub partitions: Vec<PartitionReplicas>,
}

impl Default for ReassignmentPlan {
    fn default() -> Self {
        Self {
            version: PLAN_VERSION,
            partitions: Vec::new(),
        }
    }
}

impl FromIterator<PartitionReplicas> for ReassignmentPlan {
    fn from_iter<T: IntoIterator<Item = PartitionReplicas>>(iter: T) -> Self {
        Self {
            partitions: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl ReassignmentPlan {
    /// The assignment as it stands in the metadata snapshot.
    pub fn current(topics: &[TopicMetadata]) -> Self {
        topics
            .iter()
            .flat_map(|topic| {
                topic.partitions.iter().map(|partition| PartitionReplicas {
                    topic: topic.name.clone(),
                    partition: partition.id,
                    replicas: partition.replicas.clone(),
                })
            })
            .collect()
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

/// The two documents embedded in the text output of the generate step,
/// exactly as the tool printed them.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GenerateReport<'a> {
    pub current: &'a str,
    pub proposed: &'a str,
}

impl<'a> TryFrom<&'a str> for GenerateReport<'a> {
    type Error = Error;

    fn try_from(report: &'a str) -> Result<Self, Self::Error> {
        Ok(Self {
            current: blob(report, CURRENT_ASSIGNMENT)?,
            proposed: blob(report, PROPOSED_ASSIGNMENT)?,
        })
    }
}

/// The non-blank lines following `label`, up to the next blank line or
/// label, as a slice of `report`.
fn blob<'a>(report: &'a str, label: &str) -> Result<&'a str> {
    let start = report
        .find(label)
        .map(|position| position + label.len())
        .ok_or_else(|| Error::parse(format!("missing: {label}")))?;

    let mut span: Option<(usize, usize)> = None;
    let mut offset = start;

    for line in report[start..].split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.trim_end_matches(['\r', '\n']);
        let blank = content.trim().is_empty();
        let labelled = LABELS.iter().any(|label| content.contains(label));

        match span {
            None if labelled => break,
            None if blank => continue,
            Some(_) if blank || labelled => break,
            None => span = Some((line_start, line_start + content.len())),
            Some((begin, _)) => span = Some((begin, line_start + content.len())),
        }
    }

    let (begin, end) = span.ok_or_else(|| Error::parse(format!("no document after: {label}")))?;
    let blob = &report[begin..end];

    _ = serde_json::from_str::<ReassignmentPlan>(blob)
        .map_err(|err| Error::parse(format!("{label}: {err}")))?;

    Ok(blob)
}
