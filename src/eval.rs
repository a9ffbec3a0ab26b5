/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, PieceKind};

use crate::{Board, Result, Score};

/// Scores a position from one side's perspective.
///
/// This is the only part of a bot that differs between bots: the search, tie-breaking,
/// and analysis are shared, and a new bot is defined by supplying a new [`Evaluator`].
///
/// A positive score is good for `color`, a negative score is good for its opponent.
/// Implementations must not depend on anything but the position and `color`.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, color: Color) -> Score;

    /// Scores a position, for evaluators that can fail.
    ///
    /// The search calls this at every horizon node, and a failure aborts the whole search.
    #[inline(always)]
    fn try_evaluate(&self, board: &Board, color: Color) -> Result<Score> {
        Ok(self.evaluate(board, color))
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    #[inline(always)]
    fn evaluate(&self, board: &Board, color: Color) -> Score {
        (**self).evaluate(board, color)
    }

    #[inline(always)]
    fn try_evaluate(&self, board: &Board, color: Color) -> Result<Score> {
        (**self).try_evaluate(board, color)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    #[inline(always)]
    fn evaluate(&self, board: &Board, color: Color) -> Score {
        (**self).evaluate(board, color)
    }

    #[inline(always)]
    fn try_evaluate(&self, board: &Board, color: Color) -> Result<Score> {
        (**self).try_evaluate(board, color)
    }
}

/// Material balance: the value of `color`'s pieces minus the value of its opponent's.
///
/// The King carries no material value. Checkmate is recognized by the search instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Material;

impl Evaluator for Material {
    #[inline(always)]
    fn evaluate(&self, board: &Board, color: Color) -> Score {
        material_of(board, color) - material_of(board, color.opponent())
    }
}

/// Considers every position equal.
///
/// Paired with the search this plays a uniformly random move, except that it still
/// delivers mates it can see and avoids being mated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indifferent;

impl Evaluator for Indifferent {
    #[inline(always)]
    fn evaluate(&self, _board: &Board, _color: Color) -> Score {
        Score::DRAW
    }
}

/// Returns the material value of a piece kind, in tenths of a pawn.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> Score {
    match kind {
        PieceKind::Pawn => Score::new(10),
        PieceKind::Knight => Score::new(25),
        PieceKind::Bishop => Score::new(30),
        PieceKind::Rook => Score::new(50),
        PieceKind::Queen => Score::new(100),
        PieceKind::King => Score::DRAW,
    }
}

/// Sums the material value of all of `color`'s pieces.
#[inline(always)]
pub fn material_of(board: &Board, color: Color) -> Score {
    board
        .pieces()
        .filter(|piece| piece.color() == color)
        .map(|piece| value_of(piece.kind()))
        .sum()
}

/// Per-side material breakdown of a position, printed by the `eval` command.
#[derive(Debug, Clone, Copy)]
pub struct MaterialReport {
    white: [u32; 5],
    black: [u32; 5],
    white_total: Score,
    black_total: Score,
    side_to_move: Color,
}

/// Piece kinds that carry material, in table order.
const MATERIAL_KINDS: [(PieceKind, &str); 5] = [
    (PieceKind::Pawn, "pawn"),
    (PieceKind::Knight, "knight"),
    (PieceKind::Bishop, "bishop"),
    (PieceKind::Rook, "rook"),
    (PieceKind::Queen, "queen"),
];

impl MaterialReport {
    pub fn new(board: &Board) -> Self {
        let mut white = [0; 5];
        let mut black = [0; 5];

        for piece in board.pieces() {
            let Some(i) = MATERIAL_KINDS.iter().position(|(kind, _)| *kind == piece.kind()) else {
                continue;
            };

            if piece.color() == Color::White {
                white[i] += 1;
            } else {
                black[i] += 1;
            }
        }

        Self {
            white,
            black,
            white_total: material_of(board, Color::White),
            black_total: material_of(board, Color::Black),
            side_to_move: board.side_to_move(),
        }
    }
}

impl fmt::Display for MaterialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+--------+-------+-------+-------+")?;
        writeln!(f, "| piece  | value | white | black |")?;
        writeln!(f, "+--------+-------+-------+-------+")?;
        for (i, (kind, name)) in MATERIAL_KINDS.into_iter().enumerate() {
            writeln!(
                f,
                "| {name:<6} | {:>5} | {:>5} | {:>5} |",
                value_of(kind).to_string(),
                self.white[i],
                self.black[i]
            )?;
        }
        writeln!(f, "+--------+-------+-------+-------+")?;
        writeln!(
            f,
            "| total  |       | {:>5} | {:>5} |",
            self.white_total.to_string(),
            self.black_total.to_string()
        )?;
        writeln!(f, "+--------+-------+-------+-------+")?;

        let balance = match self.side_to_move {
            Color::White => self.white_total - self.black_total,
            Color::Black => self.black_total - self.white_total,
        };
        write!(f, "Balance for {}: {balance:+}", self.side_to_move.name())
    }
}
