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

use std::process::ExitCode;

use dotenv::dotenv;
use relocate_cli::Cli;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    let env_file = dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_level(true)
                .with_line_number(true)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();

    match env_file {
        Ok(path) => debug!(env_file = %path.display()),
        Err(err) => debug!(?err, "no env file loaded"),
    }

    match Cli::main().await {
        Ok(()) => ExitCode::SUCCESS,

        Err(err) => {
            error!(%err);
            ExitCode::FAILURE
        }
    }
}
