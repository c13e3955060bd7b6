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

use crate::Result;
use clap::Args;
use relocate_partition::Relocate;

use super::Common;

#[derive(Args, Clone, Debug)]
pub(super) struct Arg {
    #[clap(flatten)]
    common: Common,

    /// Replicas per partition after the change
    #[arg(short, long)]
    replication_factor: i32,

    /// Number of brokers in the cluster, numbered from 1
    #[arg(short = 'b', long)]
    num_of_brokers: i32,
}

impl From<Arg> for Relocate {
    fn from(arg: Arg) -> Self {
        Relocate::increase_replication()
            .zookeeper(arg.common.zookeeper.clone().into_inner())
            .topics(arg.common.topics.as_str())
            .exclude(arg.common.exclude.clone())
            .replication_factor(arg.replication_factor)
            .broker_count(arg.num_of_brokers)
            .batching(arg.common.batching())
            .tooling(arg.common.tooling())
            .build()
    }
}

impl Arg {
    pub(super) async fn main(self) -> Result<()> {
        Relocate::from(self).main().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use relocate_partition::Batching;

    use super::*;
    use crate::{Error, cli::Cli, cli::Command};

    #[test]
    fn parse() -> Result<(), Error> {
        let cli = Cli::try_parse_from([
            "relocate",
            "increase-replication",
            "-z",
            "zoo",
            "-t",
            "^orders$",
            "-x",
            "^orders-dlq$",
            "-r",
            "3",
            "-b",
            "6",
        ])
        .map_err(|err| relocate_partition::Error::Parse {
            reason: err.to_string(),
        })?;

        let Command::IncreaseReplication(arg) = cli.command else {
            panic!("expected increase-replication");
        };

        let relocate = Relocate::from(*arg);

        assert_eq!(
            Relocate::increase_replication()
                .zookeeper("zoo")
                .topics("^orders$")
                .exclude(Some("^orders-dlq$".into()))
                .replication_factor(3)
                .broker_count(6)
                .batching(Batching::default())
                .tooling(relocate_partition::Tooling::default())
                .build(),
            relocate
        );

        Ok(())
    }

    #[test]
    fn replication_factor_required() {
        assert!(
            Cli::try_parse_from([
                "relocate",
                "increase-replication",
                "-z",
                "zoo",
                "-t",
                "orders",
                "-b",
                "6"
            ])
            .is_err()
        );
    }
}
