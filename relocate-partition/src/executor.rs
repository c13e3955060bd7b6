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

//! Invocation of the cluster's command line tools.

use std::{fmt, path::Path};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// Runs an external command to completion, returning its standard output.
#[async_trait]
pub trait Executor: fmt::Debug + Send + Sync {
    async fn execute(&self, command: &str, args: &[String]) -> Result<String>;
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Process;

#[async_trait]
impl Executor for Process {
    async fn execute(&self, command: &str, args: &[String]) -> Result<String> {
        debug!(command, ?args);

        let output = Command::new(command)
            .args(args)
            .output()
            .await
            .map_err(|err| Error::Invocation {
                command: command.into(),
                status: None,
                stderr: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Invocation {
                command: command.into(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|err| Error::parse(format!("{command}: {err}")))
            .inspect(|stdout| debug!(command, %stdout))
    }
}

/// The three invocation shapes of the partition reassignment tool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReassignTool<E> {
    executor: E,
    command: String,
    zookeeper: String,
}

impl<E> ReassignTool<E>
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

    /// Ask the tool to propose a placement of the topics onto the broker list.
    pub async fn generate(&self, broker_list: &str, topics_to_move: &Path) -> Result<String> {
        self.invoke([
            "--broker-list".into(),
            broker_list.into(),
            "--topics-to-move-json-file".into(),
            topics_to_move.display().to_string(),
            "--generate".into(),
        ])
        .await
    }

    pub async fn execute(&self, reassignment: &Path, throttle: u64) -> Result<String> {
        self.invoke([
            "--reassignment-json-file".into(),
            reassignment.display().to_string(),
            "--throttle".into(),
            throttle.to_string(),
            "--execute".into(),
        ])
        .await
    }

    pub async fn verify(&self, reassignment: &Path) -> Result<String> {
        self.invoke([
            "--reassignment-json-file".into(),
            reassignment.display().to_string(),
            "--verify".into(),
        ])
        .await
    }

    async fn invoke<const N: usize>(&self, args: [String; N]) -> Result<String> {
        let args = ["--zookeeper".into(), self.zookeeper.clone()]
            .into_iter()
            .chain(args)
            .collect::<Vec<String>>();

        self.executor
            .execute(&self.command, &args)
            .await
            .inspect_err(|err| debug!(command = %self.command, ?args, ?err))
    }
}
