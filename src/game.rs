/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, Move};
use rand::{rngs::StdRng, SeedableRng};

use crate::{Board, Bot, BotTurn, Error, Outcome, Result, SearchConfig, DEFAULT_DEPTH};

/// Default cap on the number of plies [`Session::play_bots`] will play in one call.
pub const DEFAULT_MAX_PLIES: usize = 300;

/// Who controls one side of the board.
#[derive(Debug)]
pub enum Player {
    Human,
    Bot(Bot),
}

impl Player {
    #[inline(always)]
    pub const fn is_bot(&self) -> bool {
        matches!(self, Self::Bot(_))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Bot(bot) => write!(f, "{} bot", bot.name()),
        }
    }
}

/// Where a session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the given side to move, by hand or by triggering its bot.
    AwaitingInput(Color),

    /// The given side's bot is searching.
    SearchInProgress(Color),

    /// The live position is terminal.
    GameOver(Outcome),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingInput(color) => write!(f, "awaiting {} to move", color.name()),
            Self::SearchInProgress(color) => write!(f, "{} is searching", color.name()),
            Self::GameOver(outcome) => write!(f, "game over: {outcome}"),
        }
    }
}

/// Configuration variables for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Search depth handed to each bot.
    pub depth: usize,

    /// Whether bots move on their own as soon as it is their turn.
    pub auto_play: bool,

    /// Maximum plies [`Session::play_bots`] will play before yielding.
    pub max_plies: usize,

    /// Seed for tie-breaking. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            auto_play: false,
            max_plies: DEFAULT_MAX_PLIES,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// The [`SearchConfig`] each bot in this session searches with.
    #[inline(always)]
    pub const fn search(&self) -> SearchConfig {
        SearchConfig { depth: self.depth }
    }
}

/// A game between two players, either of which may be a bot.
///
/// The session exclusively owns the live position. Bots search a private copy of it,
/// and the live position only changes once a move has been chosen.
#[derive(Debug)]
pub struct Session {
    /// The position being played.
    live: Board,

    /// The position the game started from, restored by [`Session::reset`].
    start: Board,

    white: Player,
    black: Player,

    phase: Phase,

    config: SessionConfig,

    /// Breaks ties between equally scored moves.
    rng: StdRng,
}

impl Session {
    /// Starts a game from `start` between `white` and `black`.
    ///
    /// Fails with [`Error::WrongSeat`] if a bot is seated at a color it is not bound to.
    pub fn new(start: Board, white: Player, black: Player, config: SessionConfig) -> Result<Self> {
        for (seat, player) in [(Color::White, &white), (Color::Black, &black)] {
            if let Player::Bot(bot) = player {
                if bot.color() != seat {
                    return Err(Error::WrongSeat {
                        seat,
                        bound: bot.color(),
                    });
                }
            }
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut session = Self {
            live: start.clone(),
            start,
            white,
            black,
            phase: Phase::AwaitingInput(Color::White),
            config,
            rng,
        };
        session.refresh_phase();

        log::info!(
            "New game: {} (White) vs {} (Black)",
            session.white,
            session.black
        );

        Ok(session)
    }

    /// The live position.
    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.live
    }

    #[inline(always)]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[inline(always)]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The player seated at `color`.
    #[inline(always)]
    pub const fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    #[inline(always)]
    fn player_mut(&mut self, color: Color) -> &mut Player {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// The bot seated at `color`, if that side is a bot.
    pub fn bot(&self, color: Color) -> Option<&Bot> {
        match self.player(color) {
            Player::Bot(bot) => Some(bot),
            Player::Human => None,
        }
    }

    /// Returns `true` if the side to move is a bot and the game is not over.
    pub fn is_bot_turn(&self) -> bool {
        match self.phase {
            Phase::AwaitingInput(color) => self.player(color).is_bot(),
            _ => false,
        }
    }

    /// Plays a move for the human side to move, given in UCI notation.
    pub fn submit_uci(&mut self, uci: &str) -> Result<Move> {
        self.ensure_human_turn()?;
        let mv = self.live.parse_move(uci)?;
        self.commit(mv);
        Ok(mv)
    }

    /// Plays `mv` for the human side to move.
    ///
    /// Nothing changes if `mv` is rejected.
    pub fn submit(&mut self, mv: Move) -> Result<()> {
        self.ensure_human_turn()?;
        if !self.live.is_legal(mv) {
            return Err(Error::IllegalMove { mv: mv.to_string() });
        }

        self.commit(mv);
        Ok(())
    }

    /// Lets the bot playing `color` search and play a move.
    ///
    /// Does nothing, returning `Ok(None)`, if `color` is not to move, is not a bot, or the game is over.
    /// If the search fails, the live position is left as it was.
    pub fn trigger_bot(&mut self, color: Color) -> Result<Option<BotTurn>> {
        if self.phase != Phase::AwaitingInput(color) {
            return Ok(None);
        }

        self.phase = Phase::SearchInProgress(color);

        // Disjoint borrows: the bot is mutated while the live board and rng are read
        let turn = match color {
            Color::White => Self::think(&mut self.white, &self.live, &mut self.rng),
            Color::Black => Self::think(&mut self.black, &self.live, &mut self.rng),
        };

        let turn = match turn {
            Ok(Some(turn)) => turn,
            other => {
                self.phase = Phase::AwaitingInput(color);
                return other;
            }
        };

        self.commit(turn.mv);
        Ok(Some(turn))
    }

    fn think(player: &mut Player, live: &Board, rng: &mut StdRng) -> Result<Option<BotTurn>> {
        match player {
            Player::Bot(bot) => bot.think(live, rng).map(Some),
            Player::Human => Ok(None),
        }
    }

    /// Triggers bots for as long as the side to move is a bot, up to `max_plies` moves.
    pub fn play_bots(&mut self) -> Result<Vec<BotTurn>> {
        let mut turns = Vec::new();

        while turns.len() < self.config.max_plies {
            let Phase::AwaitingInput(color) = self.phase else {
                break;
            };

            match self.trigger_bot(color)? {
                Some(turn) => turns.push(turn),
                None => break,
            }
        }

        Ok(turns)
    }

    /// Takes back the last ply, if any has been played.
    ///
    /// If a bot played it, that bot's baseline goes back to its previous move.
    pub fn undo(&mut self) -> Option<Move> {
        let mv = self.live.pop()?;
        log::info!("Undid {mv}");

        // Only a bot can move for a bot's seat
        let mover = self.live.side_to_move();
        if let Player::Bot(bot) = self.player_mut(mover) {
            bot.rewind();
        }

        self.refresh_phase();
        Some(mv)
    }

    /// Returns to the starting position and clears every bot's baseline.
    pub fn reset(&mut self) {
        self.live = self.start.clone();

        for color in [Color::White, Color::Black] {
            if let Player::Bot(bot) = self.player_mut(color) {
                bot.reset();
            }
        }

        self.refresh_phase();
        log::info!("Reset to {}", self.live.to_fen());
    }

    fn ensure_human_turn(&self) -> Result<()> {
        match self.phase {
            Phase::GameOver(_) => Err(Error::GameOver),
            Phase::AwaitingInput(color) if !self.player(color).is_bot() => Ok(()),
            Phase::AwaitingInput(color) | Phase::SearchInProgress(color) => {
                Err(Error::NotHumanTurn(color))
            }
        }
    }

    /// Plays a legal move on the live board and advances the turn.
    fn commit(&mut self, mv: Move) {
        let color = self.live.side_to_move();
        self.live.push(mv);
        log::info!("{} played {mv}", color.name());
        self.refresh_phase();
    }

    fn refresh_phase(&mut self) {
        self.phase = match self.live.outcome() {
            Some(outcome) => {
                log::info!("Game over: {outcome}");
                Phase::GameOver(outcome)
            }
            None => Phase::AwaitingInput(self.live.side_to_move()),
        };
    }
}
