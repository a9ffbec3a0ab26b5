/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use chessie::Color;
use clap::{Parser, ValueEnum};

use crate::{bots, SessionConfig, DEFAULT_DEPTH, DEFAULT_MAX_PLIES};

/// Play chess against fixed-depth minimax bots, or watch them play each other.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Who plays White: `human`, or the name of a registered bot.
    #[arg(short, long, default_value = "human")]
    pub white: PlayerArg,

    /// Who plays Black: `human`, or the name of a registered bot.
    #[arg(short, long, default_value = "default")]
    pub black: PlayerArg,

    /// Number of plies each bot searches below every candidate move.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Start from this FEN instead of the standard starting position.
    #[arg(short, long)]
    pub fen: Option<String>,

    /// Seed for breaking ties between equally scored moves.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Let bots move as soon as it is their turn, instead of waiting for `go`.
    #[arg(short, long, default_value = "false")]
    pub auto: bool,

    /// Stop automatic bot play after this many consecutive bot moves.
    #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
    pub max_plies: usize,
}

impl Cli {
    /// The [`SessionConfig`] described by these arguments.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            depth: self.depth,
            auto_play: self.auto,
            max_plies: self.max_plies,
            seed: self.seed,
        }
    }
}

/// Either a human or a registered bot, as named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerArg {
    Human,
    Bot(&'static str),
}

impl FromStr for PlayerArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("human") {
            return Ok(Self::Human);
        }

        match bots::lookup(s) {
            Ok(entry) => Ok(Self::Bot(entry.name)),
            Err(_) => {
                let names = bots::REGISTRY
                    .iter()
                    .map(|entry| entry.name)
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(format!("expected `human` or one of [{names}], got {s:?}"))
            }
        }
    }
}

impl fmt::Display for PlayerArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Bot(name) => write!(f, "{name}"),
        }
    }
}

/// A side of the board, as typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    #[value(alias = "w")]
    White,
    #[value(alias = "b")]
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<COMMAND>")
)]
pub enum EngineCommand {
    /// Run a fixed-depth search on a series of positions and report node counts.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// List every registered bot.
    Bots,

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print the material evaluation of the current position, for the side to move.
    Eval {
        /// If set, a per-piece breakdown is printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Show the last analysis made by a bot: every candidate's score relative to its previous move.
    #[command(alias = "a")]
    Analysis {
        /// Whose analysis to show. Defaults to every bot.
        side: Option<Side>,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Let a bot play a move. Defaults to the side to move.
    #[command(aliases = ["bot", "trigger"])]
    Go { side: Option<Side> },

    /// Play a move in UCI notation, such as `e2e4` or `e7e8q`.
    #[command(alias = "m")]
    Move { mv: String },

    /// Shows all legal moves in the current position.
    Moves,

    /// Return to the starting position.
    Reset,

    /// Show whose turn it is and who is playing.
    State,

    /// Take back one ply.
    #[command(alias = "u")]
    Undo,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_player_arg() {
        assert_eq!("human".parse::<PlayerArg>(), Ok(PlayerArg::Human));
        assert_eq!("Default".parse::<PlayerArg>(), Ok(PlayerArg::Bot("default")));
        assert!("deep-blue".parse::<PlayerArg>().is_err());
    }

    #[test]
    fn test_parse_cli() {
        let cli = Cli::try_parse_from([
            "plybot", "--white", "random", "--black", "default", "--depth", "1", "--seed", "3",
            "--auto",
        ])
        .unwrap();

        assert_eq!(cli.white, PlayerArg::Bot("random"));
        assert_eq!(cli.black, PlayerArg::Bot("default"));

        let config = cli.session_config();
        assert_eq!(config.depth, 1);
        assert_eq!(config.seed, Some(3));
        assert!(config.auto_play);
        assert_eq!(config.max_plies, DEFAULT_MAX_PLIES);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["plybot"]).unwrap();
        assert_eq!(cli.white, PlayerArg::Human);
        assert_eq!(cli.black, PlayerArg::Bot("default"));
        assert_eq!(cli.depth, DEFAULT_DEPTH);
        assert!(!cli.auto);
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            "move e2e4".parse::<EngineCommand>(),
            Ok(EngineCommand::Move { mv }) if mv == "e2e4"
        ));
        assert!(matches!(
            "go black".parse::<EngineCommand>(),
            Ok(EngineCommand::Go {
                side: Some(Side::Black)
            })
        ));
        assert!(matches!(
            "go".parse::<EngineCommand>(),
            Ok(EngineCommand::Go { side: None })
        ));
        assert!(matches!("u".parse::<EngineCommand>(), Ok(EngineCommand::Undo)));
        assert!(matches!(
            "bench -d 1".parse::<EngineCommand>(),
            Ok(EngineCommand::Bench {
                depth: Some(1),
                pretty: false
            })
        ));
        assert!("castle".parse::<EngineCommand>().is_err());
    }
}
