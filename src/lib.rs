/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Relative move scores shown after each bot turn.
mod analysis;

/// A chess position with push/pop, backed by `chessie`.
mod board;

/// The registry of named bots, and bots bound to a color.
pub mod bots;

/// Command-line arguments and interactive commands.
mod cli;

/// The interactive front end.
mod engine;

/// Error types.
mod error;

/// Evaluation of chess positions.
mod eval;

/// Turn order and session state.
mod game;

/// Evaluation scores.
mod score;

/// Fixed-depth minimax search.
mod search;

/// Choosing among equally scored moves.
mod select;

pub use analysis::*;
pub use board::*;
pub use bots::{Bot, BotEntry, BotTurn, EvaluatorFactory, REGISTRY};
pub use cli::*;
pub use engine::*;
pub use error::*;
pub use eval::*;
pub use game::*;
pub use score::*;
pub use search::*;
pub use select::*;
