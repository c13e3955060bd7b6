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

//! Replica placement for replication factor changes, which the reassignment
//! tool cannot propose itself.
//!
//! The first replica of every partition stays on its preferred leader. The
//! remaining replicas follow the rack unaware placement used by the cluster:
//! follower `j` sits `1 + (shift + j) % (n - 1)` brokers after the leader,
//! where `shift` advances by `replication_factor - 1` each time the same
//! leader recurs within a topic. This keeps the followers of a partition
//! distinct and spreads follower slots evenly over the brokers.

use std::collections::BTreeMap;

use crate::{
    BrokerId, Error, Result,
    codec::{PartitionReplicas, ReassignmentPlan},
    metadata::TopicMetadata,
};

/// Check that `replication_factor` replicas can be placed on distinct brokers.
pub fn validate(replication_factor: i32, broker_count: i32) -> Result<()> {
    if replication_factor < 1 || replication_factor > broker_count {
        Err(Error::InvalidReplicationFactor {
            replication_factor,
            broker_count,
        })
    } else {
        Ok(())
    }
}

/// A plan placing `replication_factor` replicas of every partition on brokers
/// `1..=broker_count`, with partitions in input order.
pub fn build_reassignment_plan(
    topics: &[TopicMetadata],
    replication_factor: i32,
    broker_count: i32,
) -> Result<ReassignmentPlan> {
    validate(replication_factor, broker_count)?;

    let mut partitions = Vec::new();

    for topic in topics {
        let mut shifts: BTreeMap<BrokerId, i32> = BTreeMap::new();

        for partition in &topic.partitions {
            let leader = partition.preferred_leader();

            if leader < 1 || leader > broker_count {
                return Err(Error::UnknownBroker {
                    topic: topic.name.clone(),
                    partition: partition.id,
                    broker: leader,
                });
            }

            let shift = shifts.entry(leader).or_default();

            partitions.push(PartitionReplicas {
                topic: topic.name.clone(),
                partition: partition.id,
                replicas: replicas(leader, *shift, replication_factor, broker_count),
            });

            *shift += replication_factor - 1;
        }
    }

    Ok(ReassignmentPlan::from_iter(partitions))
}

fn replicas(
    leader: BrokerId,
    shift: i32,
    replication_factor: i32,
    broker_count: i32,
) -> Vec<BrokerId> {
    let first = leader - 1;

    [leader]
        .into_iter()
        .chain((0..replication_factor - 1).map(|follower| {
            let offset = 1 + (shift + follower) % (broker_count - 1);
            (first + offset) % broker_count + 1
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::metadata::PartitionMetadata;

    fn topic(name: &str, leaders: &[(i32, BrokerId)]) -> TopicMetadata {
        TopicMetadata {
            name: name.into(),
            partitions: leaders
                .iter()
                .map(|&(id, leader)| PartitionMetadata {
                    id,
                    leader,
                    replicas: vec![leader],
                    isr: vec![leader],
                    error: None,
                })
                .collect(),
            error: None,
        }
    }

    fn golden() -> TopicMetadata {
        topic(
            "topic",
            &[
                (8, 6),
                (11, 3),
                (2, 6),
                (5, 3),
                (4, 2),
                (7, 5),
                (10, 2),
                (1, 5),
                (9, 1),
                (3, 1),
                (6, 4),
                (0, 4),
            ],
        )
    }

    fn expected(assignments: &[(i32, &[BrokerId])]) -> ReassignmentPlan {
        assignments
            .iter()
            .map(|&(partition, replicas)| PartitionReplicas {
                topic: "topic".into(),
                partition,
                replicas: replicas.to_vec(),
            })
            .collect()
    }

    #[test]
    fn replication_factor_three() -> Result<(), Error> {
        assert_eq!(
            expected(&[
                (8, &[6, 1, 2]),
                (11, &[3, 4, 5]),
                (2, &[6, 3, 4]),
                (5, &[3, 6, 1]),
                (4, &[2, 3, 4]),
                (7, &[5, 6, 1]),
                (10, &[2, 5, 6]),
                (1, &[5, 2, 3]),
                (9, &[1, 2, 3]),
                (3, &[1, 4, 5]),
                (6, &[4, 5, 6]),
                (0, &[4, 1, 2]),
            ]),
            build_reassignment_plan(&[golden()], 3, 6)?
        );

        Ok(())
    }

    #[test]
    fn replication_factor_four() -> Result<(), Error> {
        assert_eq!(
            expected(&[
                (8, &[6, 1, 2, 3]),
                (11, &[3, 4, 5, 6]),
                (2, &[6, 4, 5, 1]),
                (5, &[3, 1, 2, 4]),
                (4, &[2, 3, 4, 5]),
                (7, &[5, 6, 1, 2]),
                (10, &[2, 6, 1, 3]),
                (1, &[5, 3, 4, 6]),
                (9, &[1, 2, 3, 4]),
                (3, &[1, 5, 6, 2]),
                (6, &[4, 5, 6, 1]),
                (0, &[4, 2, 3, 5]),
            ]),
            build_reassignment_plan(&[golden()], 4, 6)?
        );

        Ok(())
    }

    #[test]
    fn repeatable() -> Result<(), Error> {
        let topics = [golden()];

        assert_eq!(
            build_reassignment_plan(&topics, 3, 6)?,
            build_reassignment_plan(&topics, 3, 6)?
        );

        Ok(())
    }

    #[test]
    fn shift_restarts_per_topic() -> Result<(), Error> {
        let plan = build_reassignment_plan(
            &[topic("a", &[(0, 1), (1, 1)]), topic("b", &[(0, 1)])],
            2,
            3,
        )?;

        assert_eq!(
            vec![vec![1, 2], vec![1, 3], vec![1, 2]],
            plan.partitions
                .into_iter()
                .map(|partition| partition.replicas)
                .collect::<Vec<_>>()
        );

        Ok(())
    }

    #[test]
    fn single_replica_on_single_broker() -> Result<(), Error> {
        let plan = build_reassignment_plan(&[topic("test-1", &[(1, 1)])], 1, 1)?;
        assert_eq!(vec![1], plan.partitions[0].replicas);
        Ok(())
    }

    #[test]
    fn replication_factor_exceeds_brokers() {
        assert!(matches!(
            build_reassignment_plan(&[golden()], 7, 6),
            Err(Error::InvalidReplicationFactor {
                replication_factor: 7,
                broker_count: 6
            })
        ));
    }

    #[test]
    fn zero_replication_factor() {
        assert!(matches!(
            build_reassignment_plan(&[golden()], 0, 6),
            Err(Error::InvalidReplicationFactor { .. })
        ));
    }

    #[test]
    fn leader_outside_broker_range() {
        assert!(matches!(
            build_reassignment_plan(&[topic("test-1", &[(0, 7)])], 2, 6),
            Err(Error::UnknownBroker {
                partition: 0,
                broker: 7,
                ..
            })
        ));
    }
}
