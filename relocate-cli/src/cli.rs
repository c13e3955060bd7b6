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

use std::{path::PathBuf, process, time::Duration};

use crate::{EnvVarExp, Result};
use clap::{Args, Parser, Subcommand};
use relocate_partition::{Batching, Tooling};
use tracing::debug;

mod reassign;
mod replication;

#[derive(Clone, Debug, Parser)]
#[command(name = "relocate", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Move the partitions of matching topics onto a set of brokers
    ReassignPartitions(Box<reassign::Arg>),

    /// Change the replication factor of matching topics
    IncreaseReplication(Box<replication::Arg>),
}

/// Arguments shared by every command.
#[derive(Args, Clone, Debug)]
pub(super) struct Common {
    /// ZooKeeper connection string passed to the Kafka tools
    #[arg(short, long, env = "ZOOKEEPER")]
    zookeeper: EnvVarExp<String>,

    /// Regular expression selecting the topics
    #[arg(short, long)]
    topics: String,

    /// Regular expression removing topics from the selection
    #[arg(short = 'x', long)]
    exclude: Option<String>,

    /// Number of topics per batch
    #[arg(long, default_value = "1")]
    batch: usize,

    /// Seconds to wait for each batch to complete
    #[arg(long, default_value = "300")]
    timeout_per_batch: u64,

    /// Seconds between verify polls
    #[arg(long, default_value = "5")]
    status_poll_interval: u64,

    /// Replication throttle in bytes per second
    #[arg(long, default_value = "10000000")]
    throttle: u64,

    /// Directory receiving the topics to move, reassignment and rollback documents
    #[arg(long, default_value = "/tmp", env = "RELOCATE_ARTIFACT_DIR")]
    artifact_dir: EnvVarExp<PathBuf>,

    #[arg(
        long,
        default_value = "kafka-reassign-partitions",
        env = "KAFKA_REASSIGN_PARTITIONS"
    )]
    reassign_command: EnvVarExp<String>,

    #[arg(long, default_value = "kafka-topics", env = "KAFKA_TOPICS")]
    topics_command: EnvVarExp<String>,
}

impl Common {
    fn batching(&self) -> Batching {
        Batching {
            size: self.batch,
            timeout_per_batch: Duration::from_secs(self.timeout_per_batch),
            poll_interval: Duration::from_secs(self.status_poll_interval),
            throttle: self.throttle,
        }
    }

    fn tooling(&self) -> Tooling {
        Tooling {
            reassign_command: self.reassign_command.clone().into_inner(),
            topics_command: self.topics_command.clone().into_inner(),
            artifact_dir: self.artifact_dir.clone().into_inner(),
        }
    }
}

impl Cli {
    pub async fn main() -> Result<()> {
        debug!(pid = process::id());

        let result = match Cli::parse().command {
            Command::ReassignPartitions(arg) => arg.main().await,
            Command::IncreaseReplication(arg) => arg.main().await,
        };

        result.inspect_err(|err| debug!(?err))
    }
}
