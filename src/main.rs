/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use plybot::{Cli, Engine};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut engine = match Engine::new(&cli) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{} failed to start: {e:#}", env!("CARGO_PKG_NAME"));
            std::process::exit(1);
        }
    };

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}
