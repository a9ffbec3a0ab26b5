/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use chessie::{Color, Move};

use crate::{Board, Error, Evaluator, Outcome, Result, Score};

/// Default number of plies searched below each root move.
pub const DEFAULT_DEPTH: usize = 2;

/// The score of every root move, keyed by move.
pub type ScoreMap = HashMap<Move, Score>;

/// The result of a search: a score for every root move, and how much work it took.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Score of every legal move in the searched position.
    pub scores: ScoreMap,

    /// Number of nodes visited, counting one per move applied.
    pub nodes: u64,

    /// Depth each root move was searched to.
    pub depth: usize,

    /// Wall-clock time the search took.
    pub elapsed: Duration,
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of plies to search below each root move before evaluating.
    ///
    /// At depth 0 each root move is scored by the evaluator directly.
    pub depth: usize,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

/// Exhaustive fixed-depth minimax over every legal move, from one side's perspective.
///
/// There is no pruning, move ordering, or caching: every node down to the horizon is visited.
pub struct Search<'a, E: ?Sized> {
    /// Scores horizon positions.
    evaluator: &'a E,

    /// The side the search is maximizing for.
    color: Color,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Nodes visited so far.
    nodes: u64,
}

impl<'a, E: Evaluator + ?Sized> Search<'a, E> {
    /// Construct a new [`Search`] that scores moves for `color` with `evaluator`.
    #[inline(always)]
    pub fn new(evaluator: &'a E, color: Color, config: SearchConfig) -> Self {
        Self {
            evaluator,
            color,
            config,
            nodes: 0,
        }
    }

    /// Scores every legal move in `position`.
    ///
    /// The search runs on a private copy of `position`, which is never modified.
    /// Any failure aborts the entire search; no partial scores are returned.
    pub fn start(mut self, position: &Board) -> Result<SearchResult> {
        let starttime = Instant::now();
        let mut board = position.scratch()?;

        let moves = board.legal_moves();
        if moves.is_empty() {
            return Err(Error::EmptyLegalMoveSet);
        }

        log::debug!(
            "Scoring {} moves for {} at depth {} on {:?}",
            moves.len(),
            self.color.name(),
            self.config.depth,
            board.to_fen()
        );

        let mut scores = ScoreMap::with_capacity(moves.len());
        for mv in moves {
            let score = self.score_move(&mut board, mv, self.config.depth)?;
            log::trace!("{mv} scored {score}");
            scores.insert(mv, score);
        }

        Ok(SearchResult {
            scores,
            nodes: self.nodes,
            depth: self.config.depth,
            elapsed: starttime.elapsed(),
        })
    }

    /// Scores `mv` by applying it to `board` and searching `depth` more plies.
    ///
    /// `board` is returned to its original state before this returns, whether or not it succeeds.
    pub fn score_move(&mut self, board: &mut Board, mv: Move, depth: usize) -> Result<Score> {
        self.nodes += 1;
        let mut board = board.play(mv);

        if depth == 0 {
            return self.evaluator.try_evaluate(&board, self.color);
        }

        if let Some(outcome) = board.outcome() {
            return Ok(self.terminal_score(outcome));
        }

        // We pick the best reply for ourselves, and assume the opponent picks the worst one for us
        let maximizing = board.side_to_move() == self.color;
        let mut best: Option<Score> = None;

        for reply in board.legal_moves() {
            let score = self.score_move(&mut board, reply, depth - 1)?;

            best = Some(match best {
                None => score,
                Some(best) if maximizing => best.max(score),
                Some(best) => best.min(score),
            });
        }

        // Not terminal, so there was at least one reply.
        best.ok_or_else(|| Error::Collaborator {
            message: format!(
                "no legal moves in non-terminal position {:?}",
                board.to_fen()
            ),
        })
    }

    /// Score of a finished game, from the searching side's perspective.
    #[inline(always)]
    fn terminal_score(&self, outcome: Outcome) -> Score {
        match outcome.winner() {
            Some(winner) if winner == self.color => Score::WIN,
            Some(_) => Score::LOSS,
            None => Score::DRAW,
        }
    }
}
