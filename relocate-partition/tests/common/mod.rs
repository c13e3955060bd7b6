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

use std::{
    collections::{BTreeMap, VecDeque},
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use relocate_partition::{Error, Result, artifact::ArtifactWriter, executor::Executor};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
pub(crate) const ZOOKEEPER: &str = "zoo";
#[allow(dead_code)]
pub(crate) const REASSIGN: &str = "kafka-reassign-partitions";
#[allow(dead_code)]
pub(crate) const TOPICS: &str = "kafka-topics";

#[allow(dead_code)]
pub(crate) fn init_tracing() -> Result<DefaultGuard> {
    Ok(tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_level(true)
            .with_line_number(true)
            .with_thread_names(false)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(
                    "relocate_partition=debug"
                        .parse()
                        .map_err(|err: tracing_subscriber::filter::ParseError| Error::Parse {
                            reason: err.to_string(),
                        })?,
                ),
            )
            .with_test_writer()
            .finish(),
    ))
}

#[allow(dead_code)]
pub(crate) fn invocation_error() -> Error {
    Error::Invocation {
        command: REASSIGN.into(),
        status: Some(1),
        stderr: "error".into(),
    }
}

#[allow(dead_code)]
pub(crate) fn generate(broker_list: &str, batch: usize) -> Vec<String> {
    args(&[
        "--zookeeper",
        ZOOKEEPER,
        "--broker-list",
        broker_list,
        "--topics-to-move-json-file",
        &format!("/tmp/topics-to-move-{batch}.json"),
        "--generate",
    ])
}

#[allow(dead_code)]
pub(crate) fn execute(batch: usize, throttle: u64) -> Vec<String> {
    args(&[
        "--zookeeper",
        ZOOKEEPER,
        "--reassignment-json-file",
        &format!("/tmp/reassignment-{batch}.json"),
        "--throttle",
        &throttle.to_string(),
        "--execute",
    ])
}

#[allow(dead_code)]
pub(crate) fn verify(batch: usize) -> Vec<String> {
    args(&[
        "--zookeeper",
        ZOOKEEPER,
        "--reassignment-json-file",
        &format!("/tmp/reassignment-{batch}.json"),
        "--verify",
    ])
}

#[allow(dead_code)]
pub(crate) fn args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| String::from(*arg)).collect()
}

/// Canned responses keyed by command line; every invocation is recorded.
/// Responses to the same command line are replayed in order, the last one
/// repeating once the others are used up.
#[derive(Clone, Debug, Default)]
pub(crate) struct Script {
    inner: Arc<Mutex<ScriptInner>>,
}

#[derive(Debug, Default)]
struct ScriptInner {
    responses: BTreeMap<(String, Vec<String>), VecDeque<Result<String>>>,
    calls: Vec<(String, Vec<String>)>,
}

#[allow(dead_code)]
impl Script {
    pub(crate) fn on(self, command: &str, args: Vec<String>, response: Result<String>) -> Self {
        self.inner
            .lock()
            .expect("script")
            .responses
            .entry((command.into(), args))
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.inner.lock().expect("script").calls.clone()
    }

    pub(crate) fn count(&self, command: &str, args: &[String]) -> usize {
        self.calls()
            .iter()
            .filter(|(called, called_args)| called == command && called_args == args)
            .count()
    }
}

#[async_trait]
impl Executor for Script {
    async fn execute(&self, command: &str, args: &[String]) -> Result<String> {
        let mut inner = self.inner.lock().expect("script");
        inner.calls.push((command.into(), args.to_vec()));

        inner
            .responses
            .get_mut(&(String::from(command), args.to_vec()))
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
            .unwrap_or_else(|| {
                Err(Error::Invocation {
                    command: command.into(),
                    status: None,
                    stderr: format!("unscripted: {args:?}"),
                })
            })
    }
}

/// Records successful writes; writes to a path registered with `fail` error.
#[derive(Clone, Debug, Default)]
pub(crate) struct Files {
    inner: Arc<Mutex<FilesInner>>,
}

#[derive(Debug, Default)]
struct FilesInner {
    failures: BTreeMap<String, Error>,
    written: Vec<(String, String)>,
}

#[allow(dead_code)]
impl Files {
    pub(crate) fn fail(self, path: &str, error: Error) -> Self {
        _ = self
            .inner
            .lock()
            .expect("files")
            .failures
            .insert(path.into(), error);
        self
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("files")
            .written
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub(crate) fn content(&self, path: &str) -> Option<String> {
        self.inner
            .lock()
            .expect("files")
            .written
            .iter()
            .find(|(written, _)| written == path)
            .map(|(_, content)| content.clone())
    }
}

#[async_trait]
impl ArtifactWriter for Files {
    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let path = path.display().to_string();
        let mut inner = self.inner.lock().expect("files");

        if let Some(error) = inner.failures.get(&path) {
            return Err(error.clone());
        }

        inner.written.push((path, content.into()));
        Ok(())
    }
}
