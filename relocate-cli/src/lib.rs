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

//! Command line surface for relocating partitions: argument parsing,
//! environment expansion and error reporting.

use std::{collections::HashMap, convert::Infallible, env::vars, fmt, result, str::FromStr};

mod cli;

pub use cli::Cli;
use regex::{Captures, Regex};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    DotEnv(#[from] dotenv::Error),
    Regex(#[from] regex::Error),
    Relocate(#[from] relocate_partition::Error),
}

impl From<Infallible> for Error {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

pub type Result<T, E = Error> = result::Result<T, E>;

/// Replaces each `${NAME}` in `value` with the variable `NAME`, removing
/// references to unset variables.
fn expand(value: &str, variables: &HashMap<String, String>) -> Result<String> {
    let reference = Regex::new(r"\$\{(?<name>[^}]+)\}")?;

    Ok(reference
        .replace_all(value, |caps: &Captures<'_>| {
            caps.name("name")
                .and_then(|name| variables.get(name.as_str()))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned())
}

/// An argument parsed after expanding references to environment variables.
#[derive(Clone, Debug)]
pub struct EnvVarExp<T>(T);

impl<T> EnvVarExp<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromStr for EnvVarExp<T>
where
    T: FromStr,
    Error: From<<T as FromStr>::Err>,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expanded = expand(s, &vars().collect::<HashMap<_, _>>())?;
        T::from_str(&expanded).map(Self).map_err(Into::into)
    }
}
