/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// Internal representation of a [`Score`].
pub type ScoreInternal = i32;

/// A numerical evaluation of a position or move, in tenths of a pawn.
///
/// Every entry of the material table (1, 2.5, 3, 5, 10 pawns) is a whole number of tenths,
/// so two material sums that are equal in pawns are also equal here, bit for bit.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(ScoreInternal);

impl Score {
    /// Number of internal units in one pawn.
    pub const SCALE: ScoreInternal = 10;

    /// Score of a position in which the scoring side has delivered checkmate.
    pub const WIN: Self = Self(1000 * Self::SCALE);

    /// Score of a position in which the scoring side has been checkmated.
    pub const LOSS: Self = Self(-Self::WIN.0);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Constructs a new [`Score`] from a number of tenths of a pawn.
    #[inline(always)]
    pub const fn new(tenths: ScoreInternal) -> Self {
        Self(tenths)
    }

    /// This score as a (possibly fractional) number of pawns.
    #[inline(always)]
    pub fn pawns(&self) -> f32 {
        self.0 as f32 / Self::SCALE as f32
    }

    /// Returns `true` if this score came from a checkmate rather than from material.
    #[inline(always)]
    pub const fn is_terminal_win_or_loss(&self) -> bool {
        self.0 == Self::WIN.0 || self.0 == Self::LOSS.0
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<ScoreInternal> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: ScoreInternal) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<ScoreInternal> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: ScoreInternal) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl std::iter::Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::DRAW, |acc, s| acc + s)
    }
}

impl fmt::Display for Score {
    /// Formats as pawns, such as `2.5` or `-1000`.
    ///
    /// The `+` flag is honored, so `{:+}` prints `+2.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.sign_plus() {
            write!(f, "{:+}", self.pawns())
        } else {
            write!(f, "{}", self.pawns())
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_in_pawns() {
        assert_eq!(Score::new(25).to_string(), "2.5");
        assert_eq!(Score::new(-30).to_string(), "-3");
        assert_eq!(Score::DRAW.to_string(), "0");
        assert_eq!(Score::WIN.to_string(), "1000");
        assert_eq!(format!("{:+}", Score::new(5)), "+0.5");
        assert_eq!(format!("{:+}", Score::new(-5)), "-0.5");
    }

    #[test]
    fn test_terminal_scores_are_symmetric() {
        assert_eq!(-Score::WIN, Score::LOSS);
        assert!(Score::WIN.is_terminal_win_or_loss());
        assert!(Score::LOSS.is_terminal_win_or_loss());
        assert!(!Score::DRAW.is_terminal_win_or_loss());
    }

    #[test]
    fn test_sum_of_table_values_is_exact() {
        // knight + bishop + pawn vs. rook + 1.5 pawns worth of tenths
        let lhs: Score = [25, 30, 10].into_iter().map(Score::new).sum();
        let rhs = Score::new(50) + 15;
        assert_eq!(lhs, rhs);
    }
}
