/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, Move};

use crate::{Score, ScoreMap};

/// Shifts every score in `scores` by `baseline`.
///
/// With `baseline` set to the score of the bot's previous move, each entry shows how much
/// that candidate would change the bot's opinion of the game, rather than the running
/// material count.
pub fn relative_scores(scores: &ScoreMap, baseline: Score) -> ScoreMap {
    scores
        .iter()
        .map(|(mv, score)| (*mv, *score - baseline))
        .collect()
}

/// What a bot saw on its last turn, for display.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The side that ran the search.
    pub color: Color,

    /// The move that was played.
    pub chosen: Move,

    /// Baseline subtracted from every score.
    pub baseline: Score,

    /// Absolute score of every candidate.
    pub scores: ScoreMap,

    /// Score of every candidate, minus `baseline`.
    pub relative: ScoreMap,
}

impl Analysis {
    pub fn new(color: Color, chosen: Move, scores: ScoreMap, baseline: Score) -> Self {
        let relative = relative_scores(&scores, baseline);
        Self {
            color,
            chosen,
            baseline,
            scores,
            relative,
        }
    }

    /// Candidates paired with their relative score, best first, then by UCI notation.
    pub fn ranked(&self) -> Vec<(Move, Score)> {
        let mut ranked = self
            .relative
            .iter()
            .map(|(mv, score)| (*mv, *score))
            .collect::<Vec<_>>();

        ranked.sort_by_cached_key(|(mv, score)| (-*score, mv.to_string()));
        ranked
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} considered {} moves (baseline {})",
            self.color.name(),
            self.relative.len(),
            self.baseline
        )?;

        for (mv, score) in self.ranked() {
            let marker = if mv == self.chosen { '*' } else { ' ' };
            write!(f, "\n  {marker} {:<6} {score:+}", mv.to_string())?;
        }

        Ok(())
    }
}
