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

    /// Comma separated ids of the destination brokers
    #[arg(short = 'i', long)]
    broker_ids: String,
}

impl From<Arg> for Relocate {
    fn from(arg: Arg) -> Self {
        Relocate::reassign()
            .zookeeper(arg.common.zookeeper.clone().into_inner())
            .topics(arg.common.topics.as_str())
            .exclude(arg.common.exclude.clone())
            .broker_ids(arg.broker_ids)
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
