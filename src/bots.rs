/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, Move};
use rand::Rng;

use crate::{
    pick, Analysis, Board, Error, Evaluator, Indifferent, Material, Result, Score, Search,
    SearchConfig,
};

/// Builds a fresh evaluator for a registered bot.
pub type EvaluatorFactory = fn() -> Box<dyn Evaluator + Send>;

/// A named bot definition.
#[derive(Clone, Copy)]
pub struct BotEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub factory: EvaluatorFactory,
}

impl fmt::Debug for BotEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotEntry").field("name", &self.name).finish()
    }
}

/// Every bot available to a session. The first entry is the default.
pub const REGISTRY: &[BotEntry] = &[
    BotEntry {
        name: "default",
        description: "material balance, king excluded",
        factory: material,
    },
    BotEntry {
        name: "random",
        description: "every position is equal; plays randomly but sees mates",
        factory: indifferent,
    },
];

fn material() -> Box<dyn Evaluator + Send> {
    Box::new(Material)
}

fn indifferent() -> Box<dyn Evaluator + Send> {
    Box::new(Indifferent)
}

/// Looks up a bot by (case-insensitive) name.
pub fn lookup(name: &str) -> Result<&'static BotEntry> {
    REGISTRY
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownBot {
            name: name.to_string(),
        })
}

/// What happened on one bot turn.
#[derive(Debug, Clone)]
pub struct BotTurn {
    /// The side that moved.
    pub color: Color,

    /// The move that was played.
    pub mv: Move,

    /// Absolute score of `mv`.
    pub score: Score,

    /// Every move that shared the best score.
    pub tied: Vec<Move>,

    /// Nodes visited by the search.
    pub nodes: u64,

    /// Depth each root move was searched to.
    pub depth: usize,
}

/// A bot bound to one color for its entire lifetime.
pub struct Bot {
    name: &'static str,
    color: Color,
    evaluator: Box<dyn Evaluator + Send>,
    config: SearchConfig,

    /// Scores of this bot's moves still on the board, oldest first.
    ///
    /// The newest one is the analysis baseline, so taking a move back restores the one before it.
    baselines: Vec<Score>,

    /// Analysis from this bot's most recent turn.
    analysis: Option<Analysis>,
}

impl Bot {
    /// Constructs the registered bot `entry`, playing as `color`.
    pub fn new(entry: &BotEntry, color: Color, config: SearchConfig) -> Self {
        Self {
            name: entry.name,
            color,
            evaluator: (entry.factory)(),
            config,
            baselines: Vec::new(),
            analysis: None,
        }
    }

    /// Constructs a bot around any evaluator.
    pub fn with_evaluator(
        name: &'static str,
        evaluator: Box<dyn Evaluator + Send>,
        color: Color,
        config: SearchConfig,
    ) -> Self {
        Self {
            name,
            color,
            evaluator,
            config,
            baselines: Vec::new(),
            analysis: None,
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Score of this bot's most recent move still on the board, or [`Score::DRAW`] if there is none.
    #[inline(always)]
    pub fn baseline(&self) -> Score {
        self.baselines.last().copied().unwrap_or(Score::DRAW)
    }

    #[inline(always)]
    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Searches `board` and picks a move, without playing it.
    ///
    /// Records the analysis against the current baseline, then moves the baseline
    /// to the chosen move's score.
    pub fn think<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> Result<BotTurn> {
        let result = Search::new(self.evaluator.as_ref(), self.color, self.config).start(board)?;
        let selection = pick(&result.scores, rng)?;

        log::info!(
            "{} bot ({}) picked {} randomly out of {} considered moves; {} nodes at depth {} in {}ms",
            self.color.name(),
            self.name,
            selection.mv,
            selection.tied.len(),
            result.nodes,
            result.depth,
            result.elapsed.as_millis()
        );

        self.analysis = Some(Analysis::new(
            self.color,
            selection.mv,
            result.scores,
            self.baseline(),
        ));
        self.baselines.push(selection.score);

        Ok(BotTurn {
            color: self.color,
            mv: selection.mv,
            score: selection.score,
            tied: selection.tied,
            nodes: result.nodes,
            depth: result.depth,
        })
    }

    /// Forgets this bot's most recent move, after it has been taken back.
    ///
    /// The baseline returns to the score of the move before it, and the stale analysis is dropped.
    pub fn rewind(&mut self) {
        self.baselines.pop();
        self.analysis = None;
    }

    /// Forgets the baseline and last analysis.
    pub fn reset(&mut self) {
        self.baselines.clear();
        self.analysis = None;
    }
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("config", &self.config)
            .field("baseline", &self.baseline())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("default").unwrap().name, "default");
        assert_eq!(lookup("RANDOM").unwrap().name, "random");
        assert!(matches!(lookup("stockfish"), Err(Error::UnknownBot { .. })));
        assert_eq!(REGISTRY[0].name, "default");
    }

    #[test]
    fn test_think_updates_baseline() {
        // White can win a free rook
        let board = Board::from_fen("4k3/8/8/3r4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut bot = Bot::new(lookup("default").unwrap(), Color::White, SearchConfig { depth: 0 });
        let mut rng = StdRng::seed_from_u64(11);

        assert_eq!(bot.baseline(), Score::DRAW);
        let turn = bot.think(&board, &mut rng).unwrap();

        assert_eq!(turn.mv.to_string(), "e4d5");
        assert_eq!(turn.score, Score::new(10));
        assert_eq!(bot.baseline(), turn.score);

        let analysis = bot.analysis().unwrap();
        assert_eq!(analysis.baseline, Score::DRAW);
        assert_eq!(analysis.chosen, turn.mv);

        bot.reset();
        assert_eq!(bot.baseline(), Score::DRAW);
        assert!(bot.analysis().is_none());
    }

    #[test]
    fn test_rewind_restores_previous_baseline() {
        let first = Board::from_fen("4k3/8/8/3r4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let second = Board::from_fen("4k3/8/8/3q4/4P3/8/8/R3K3 w - - 0 1").unwrap();
        let mut bot = Bot::new(lookup("default").unwrap(), Color::White, SearchConfig { depth: 0 });
        let mut rng = StdRng::seed_from_u64(3);

        let turn = bot.think(&first, &mut rng).unwrap();
        assert_eq!(turn.score, Score::new(10));
        let turn = bot.think(&second, &mut rng).unwrap();
        assert_eq!(turn.score, Score::new(60));
        assert_eq!(bot.baseline(), Score::new(60));
        assert_eq!(bot.analysis().unwrap().baseline, Score::new(10));

        bot.rewind();
        assert_eq!(bot.baseline(), Score::new(10));
        assert!(bot.analysis().is_none());

        bot.rewind();
        assert_eq!(bot.baseline(), Score::DRAW);

        // Nothing left to take back
        bot.rewind();
        assert_eq!(bot.baseline(), Score::DRAW);
    }

    #[test]
    fn test_random_bot_still_mates() {
        let board = Board::from_fen("k7/8/KQ6/8/8/8/8/8 w - - 0 1").unwrap();
        let mut bot = Bot::new(lookup("random").unwrap(), Color::White, SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(5);

        let turn = bot.think(&board, &mut rng).unwrap();
        assert_eq!(turn.score, Score::WIN);
        assert!(["b6b7", "b6a7", "b6d8"].contains(&turn.mv.to_string().as_str()));
    }
}
