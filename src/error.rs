/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::Color;

/// Errors produced while searching or while driving a game session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A submitted move is not legal in the current position.
    ///
    /// Recovered locally: the input is discarded and the session is unchanged.
    #[error("illegal move {mv:?}")]
    IllegalMove { mv: String },

    /// A move was submitted for a side that is not controlled by a human, or not to move.
    #[error("it is not {}'s turn to move by hand", .0.name())]
    NotHumanTurn(Color),

    /// The live position is terminal; no further moves can be played.
    #[error("the game is over")]
    GameOver,

    /// A search was started on a position with no legal moves.
    ///
    /// Turn-gating prevents this, so reaching it means an invariant was broken.
    #[error("search invoked on a position with no legal moves")]
    EmptyLegalMoveSet,

    /// The rules engine rejected a request, e.g. a malformed FEN.
    #[error("rules engine failure: {message}")]
    Collaborator { message: String },

    /// A bot was seated at a color other than the one it searches for.
    #[error("a bot bound to {} cannot play {}", .bound.name(), .seat.name())]
    WrongSeat { seat: Color, bound: Color },

    /// No bot with this name exists in the registry.
    #[error("no bot named {name:?}")]
    UnknownBot { name: String },
}

impl Error {
    /// Wraps any rules-engine error as [`Error::Collaborator`].
    pub fn collaborator(err: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            message: err.to_string(),
        }
    }
}

/// Result type alias for search and session operations.
pub type Result<T> = std::result::Result<T, Error>;
