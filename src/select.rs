/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::Move;
use rand::{seq::SliceRandom, Rng};

use crate::{Error, Result, Score, ScoreMap};

/// The move chosen from a [`ScoreMap`], along with every move it was tied with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The move to play.
    pub mv: Move,

    /// Score of `mv`, which is the highest score in the map.
    pub score: Score,

    /// Every move sharing the highest score, including `mv`, sorted by UCI notation.
    pub tied: Vec<Move>,
}

/// Picks a move with the highest score, choosing uniformly at random among ties.
///
/// Scores are compared exactly. Randomizing ties keeps the bot from favoring whichever
/// move the rules engine happens to generate first.
pub fn pick<R: Rng + ?Sized>(scores: &ScoreMap, rng: &mut R) -> Result<Selection> {
    let score = scores
        .values()
        .copied()
        .max()
        .ok_or(Error::EmptyLegalMoveSet)?;

    let mut tied = scores
        .iter()
        .filter(|(_, s)| **s == score)
        .map(|(mv, _)| *mv)
        .collect::<Vec<_>>();

    // `HashMap` iteration order is arbitrary; sort so a seeded rng is reproducible
    tied.sort_by_cached_key(|mv| mv.to_string());

    // Safe unwrap: `score` came from this map, so at least one move has it
    let mv = *tied.choose(rng).unwrap();

    Ok(Selection { mv, score, tied })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::Board;

    fn scores_from(board: &Board, values: &[i32]) -> ScoreMap {
        board
            .legal_moves()
            .into_iter()
            .zip(values.iter().copied().map(Score::new))
            .collect()
    }

    #[test]
    fn test_unique_max_is_always_picked() {
        let board = Board::new();
        let scores = scores_from(&board, &[0, 5, 25, -10, 5]);
        let best = board.legal_moves()[2];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let selection = pick(&scores, &mut rng).unwrap();
            assert_eq!(selection.mv, best);
            assert_eq!(selection.score, Score::new(25));
            assert_eq!(selection.tied, vec![best]);
        }
    }

    #[test]
    fn test_ties_cover_the_whole_tied_set() {
        let board = Board::new();
        let scores = scores_from(&board, &[30, 0, 30, 30, -5, 10]);
        let tied = [0, 2, 3]
            .map(|i| board.legal_moves()[i])
            .into_iter()
            .collect::<HashSet<_>>();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);

        let mut seen = HashSet::new();
        for _ in 0..300 {
            let selection = pick(&scores, &mut rng).unwrap();
            assert!(tied.contains(&selection.mv));
            assert!(scores.contains_key(&selection.mv));
            assert_eq!(selection.tied.len(), 3);
            seen.insert(selection.mv);
        }

        assert_eq!(seen, tied);
    }

    #[test]
    fn test_empty_map_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            pick(&ScoreMap::new(), &mut rng),
            Err(Error::EmptyLegalMoveSet)
        ));
    }

    #[test]
    fn test_near_equal_scores_are_not_pooled() {
        let board = Board::new();
        let scores = scores_from(&board, &[10, 9]);
        let mut rng = StdRng::seed_from_u64(3);

        let selection = pick(&scores, &mut rng).unwrap();
        assert_eq!(selection.tied.len(), 1);
        assert_eq!(selection.mv, board.legal_moves()[0]);
    }
}
