/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use chessie::{Color, Game, Move, Piece};

use crate::{Error, Result};

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The side to move has no legal moves and is in check.
    Checkmate { winner: Color },

    /// The side to move has no legal moves and is not in check.
    Stalemate,

    /// A hundred plies have passed without a capture or pawn move.
    FiftyMoves,

    /// Neither side has enough material left to deliver checkmate.
    InsufficientMaterial,
}

impl Outcome {
    /// The winning side, or `None` for a draw.
    #[inline(always)]
    pub const fn winner(&self) -> Option<Color> {
        match self {
            Self::Checkmate { winner } => Some(*winner),
            Self::Stalemate | Self::FiftyMoves | Self::InsufficientMaterial => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "checkmate, {} wins", winner.name()),
            Self::Stalemate => write!(f, "stalemate, draw"),
            Self::FiftyMoves => write!(f, "fifty-move rule, draw"),
            Self::InsufficientMaterial => write!(f, "insufficient material, draw"),
        }
    }
}

/// A chess position that can be advanced and rewound one ply at a time.
///
/// All chess rules come from [`chessie`]; this type only adds an undo stack on top of its
/// copy-make [`Game`], so that a single instance can be threaded through an entire search tree.
#[derive(Debug, Clone)]
pub struct Board {
    /// The current position.
    game: Game,

    /// Every position before the current one, paired with the move that left it.
    history: Vec<(Game, Move)>,
}

impl Board {
    /// Constructs a [`Board`] at the standard starting position.
    pub fn new() -> Self {
        Self {
            game: Game::default(),
            history: Vec::new(),
        }
    }

    /// Constructs a [`Board`] from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let game = Game::from_fen(fen).map_err(Error::collaborator)?;

        Ok(Self {
            game,
            history: Vec::new(),
        })
    }

    /// Builds an independent copy of the current position, without any move history.
    ///
    /// The copy is rebuilt from FEN, so nothing done to it can ever reach `self`.
    pub fn scratch(&self) -> Result<Self> {
        Self::from_fen(&self.to_fen())
    }

    /// Generates a FEN string of the current position.
    #[inline(always)]
    pub fn to_fen(&self) -> String {
        self.game.to_fen()
    }

    /// All legal moves in the current position, in the order the rules engine yields them.
    #[inline(always)]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.game.get_legal_moves().into_iter().collect()
    }

    /// Returns `true` if `mv` is legal in the current position.
    pub fn is_legal(&self, mv: Move) -> bool {
        self.game.get_legal_moves().into_iter().any(|legal| legal == mv)
    }

    /// Finds the legal move written as `uci` (e.g. `e2e4`, `e7e8q`), if there is one.
    ///
    /// Matching is exact, so `E2E4` is rejected like any other malformed move.
    pub fn parse_move(&self, uci: &str) -> Result<Move> {
        let uci = uci.trim();

        self.game
            .get_legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == uci)
            .ok_or_else(|| Error::IllegalMove {
                mv: uci.to_string(),
            })
    }

    /// The side whose turn it is.
    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.game.side_to_move()
    }

    /// How the game ended, or `None` if it is still in progress.
    ///
    /// Checkmate takes precedence over the draw rules.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.game.get_legal_moves().is_empty() {
            return if self.game.can_draw_by_fifty() {
                Some(Outcome::FiftyMoves)
            } else if self.game.can_draw_by_insufficient_material() {
                Some(Outcome::InsufficientMaterial)
            } else {
                None
            };
        }

        let outcome = if self.game.is_in_check() {
            Outcome::Checkmate {
                winner: self.side_to_move().opponent(),
            }
        } else {
            Outcome::Stalemate
        };

        Some(outcome)
    }

    /// Returns `true` if the game has ended, by checkmate or by any draw rule.
    #[inline(always)]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Iterates over every piece on the board.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.game.board().into_iter().map(|(_, piece)| piece)
    }

    /// Number of plies applied since this board was constructed.
    #[inline(always)]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// The moves applied since this board was constructed, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().map(|(_, mv)| *mv)
    }

    /// Applies `mv` to the position.
    ///
    /// `mv` is expected to be legal; no check is made here.
    #[inline(always)]
    pub fn push(&mut self, mv: Move) {
        self.history.push((self.game, mv));
        self.game.make_move(mv);
    }

    /// Reverts the most recent [`Board::push`], returning the move that was undone.
    ///
    /// Returns `None`, leaving the board untouched, if no moves have been applied.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<Move> {
        let (previous, mv) = self.history.pop()?;
        self.game = previous;
        Some(mv)
    }

    /// Applies `mv` and returns a guard that reverts it when dropped.
    ///
    /// The guard dereferences to the board, so the caller keeps full access to the new position.
    /// The move is undone on every exit path, including early returns and unwinding.
    #[inline(always)]
    pub fn play(&mut self, mv: Move) -> PlyGuard<'_> {
        self.push(mv);
        PlyGuard { board: self }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.game)
    }
}

/// A move applied to a [`Board`] for the lifetime of this guard.
///
/// Created by [`Board::play`].
#[derive(Debug)]
pub struct PlyGuard<'a> {
    board: &'a mut Board,
}

impl Deref for PlyGuard<'_> {
    type Target = Board;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl DerefMut for PlyGuard<'_> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.board
    }
}

impl Drop for PlyGuard<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.board.pop();
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn test_push_pop_restores_every_move() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            KIWIPETE,
            "8/2P5/8/8/8/8/5p2/K6k w - - 0 1",
        ] {
            let mut board = Board::from_fen(fen).unwrap();
            let before = board.to_fen();

            for mv in board.legal_moves() {
                board.push(mv);
                assert_ne!(board.to_fen(), before, "{mv} did not change {fen}");
                assert_eq!(board.pop(), Some(mv));
                assert_eq!(board.to_fen(), before, "push/pop of {mv} altered {fen}");
            }
        }
    }

    #[test]
    fn test_pop_on_fresh_board_is_noop() {
        let mut board = Board::new();
        let before = board.to_fen();
        assert_eq!(board.pop(), None);
        assert_eq!(board.to_fen(), before);
        assert_eq!(board.ply(), 0);
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let mut board = Board::new();
        let before = board.to_fen();
        let mv = board.parse_move("e2e4").unwrap();

        {
            let guard = board.play(mv);
            assert_eq!(guard.ply(), 1);
            assert_eq!(guard.side_to_move(), Color::Black);
        }

        assert_eq!(board.ply(), 0);
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn test_guard_pops_while_unwinding() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        let before = board.to_fen();
        let mv = board.legal_moves()[0];

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = board.play(mv);
            panic!("search blew up");
        }));

        assert!(result.is_err());
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn test_parse_move_rejects_illegal_input() {
        let board = Board::new();
        assert!(board.parse_move("e2e4").is_ok());
        assert!(matches!(
            board.parse_move("e2e5"),
            Err(Error::IllegalMove { .. })
        ));
        assert!(board.parse_move("nonsense").is_err());
        assert!(board.parse_move("E2E4").is_err());
        assert!(board.parse_move(" e2e4 ").is_ok());

        let promotion = Board::from_fen("8/2P5/8/8/8/8/5p2/K6k w - - 0 1").unwrap();
        assert!(promotion.parse_move("c7c8q").is_ok());
        assert!(promotion.parse_move("c7c8Q").is_err());
    }

    #[test]
    fn test_scratch_is_independent() {
        let mut live = Board::new();
        live.push(live.parse_move("d2d4").unwrap());

        let mut scratch = live.scratch().unwrap();
        assert_eq!(scratch.to_fen(), live.to_fen());
        assert_eq!(scratch.ply(), 0);

        scratch.push(scratch.legal_moves()[0]);
        assert_ne!(scratch.to_fen(), live.to_fen());
        assert_eq!(live.ply(), 1);
    }

    #[test]
    fn test_outcomes() {
        let mated = Board::from_fen("k7/1Q6/K7/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(
            mated.outcome(),
            Some(Outcome::Checkmate {
                winner: Color::White
            })
        );

        let stalemated = Board::from_fen("k7/2Q5/K7/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemated.outcome(), Some(Outcome::Stalemate));
        assert!(mated.is_game_over() && stalemated.is_game_over());

        assert_eq!(Board::new().outcome(), None);
        assert!(!Board::new().is_game_over());
    }

    #[test]
    fn test_draw_rules_end_the_game() {
        let bare_kings = Board::from_fen("8/4k3/8/8/3K4/8/8/8 w - - 0 1").unwrap();
        assert_eq!(bare_kings.outcome(), Some(Outcome::InsufficientMaterial));

        let lone_knight = Board::from_fen("8/4k3/8/8/3K4/8/8/6N1 w - - 0 1").unwrap();
        assert_eq!(lone_knight.outcome(), Some(Outcome::InsufficientMaterial));

        let stale_rook = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        assert_eq!(stale_rook.outcome(), Some(Outcome::FiftyMoves));
        assert_eq!(stale_rook.outcome().unwrap().winner(), None);

        let fresh_rook = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        assert_eq!(fresh_rook.outcome(), None);
    }

    #[test]
    fn test_checkmate_beats_fifty_move_rule() {
        let mated = Board::from_fen("k7/1Q6/K7/8/8/8/8/8 b - - 100 90").unwrap();
        assert_eq!(
            mated.outcome(),
            Some(Outcome::Checkmate {
                winner: Color::White
            })
        );
    }

    #[test]
    fn test_malformed_fen_is_collaborator_failure() {
        assert!(matches!(
            Board::from_fen("this is not a fen"),
            Err(Error::Collaborator { .. })
        ));
    }
}
