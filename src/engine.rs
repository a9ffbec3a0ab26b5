/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use chessie::Color;

use crate::{
    bots, Board, Bot, BotTurn, Cli, EngineCommand, Evaluator, Material, MaterialReport, Player,
    PlayerArg, Search, SearchConfig, Session,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: usize = 2;

/// Positions searched by the `bench` command.
const BENCHMARK_FENS: [&str; 5] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

/// Interactive front end over a [`Session`].
///
/// Commands arrive on a channel, from `stdin` or from [`Engine::send_command`],
/// and are executed one at a time. Bot searches run to completion on this thread
/// before the next command is read, so two searches can never overlap.
#[derive(Debug)]
pub struct Engine {
    /// The game being played.
    session: Session,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] from command-line arguments, to be executed with [`Engine::run`].
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = cli.session_config();

        let start = match cli.fen.as_deref() {
            Some(fen) => Board::from_fen(fen).context("Failed to parse starting position")?,
            None => Board::new(),
        };

        let seat = |arg: &PlayerArg, color: Color| -> Result<Player> {
            Ok(match arg {
                PlayerArg::Human => Player::Human,
                PlayerArg::Bot(name) => {
                    Player::Bot(Bot::new(bots::lookup(name)?, color, config.search()))
                }
            })
        };

        let session = Session::new(
            start,
            seat(&cli.white, Color::White)?,
            seat(&cli.black, Color::Black)?,
            config,
        )?;

        let (sender, receiver) = channel();

        Ok(Self {
            session,
            sender,
            receiver,
        })
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The game being played.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if it's corresponding receiver doesn't exist,
        //  and the only way our engine's `Receiver` can no longer exist is when our engine
        //  doesn't exist either, so this is always safe.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.name());
        self.state();
        self.autoplay();

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                log::error!("Input handler thread stopping after fatal error: {err}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, EngineCommand::Exit) {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e}");
            }

            self.autoplay();
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`].
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Analysis { side } => {
                let colors = match side {
                    Some(side) => vec![side.into()],
                    None => vec![Color::White, Color::Black],
                };

                for color in colors {
                    match self.session.bot(color).and_then(Bot::analysis) {
                        Some(analysis) => println!("{analysis}"),
                        None => println!("{} has no analysis", color.name()),
                    }
                }
            }

            EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty)?,

            EngineCommand::Bots => {
                for entry in bots::REGISTRY {
                    println!("{:<10} {}", entry.name, entry.description);
                }
            }

            EngineCommand::Display => {
                let board = self.session.board();
                println!("{board}");

                let moves = board.moves().map(|mv| mv.to_string()).collect::<Vec<_>>();
                if !moves.is_empty() {
                    println!("Moves: {}", moves.join(" "));
                }
            }

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.session.board().to_fen()),

            EngineCommand::Go { side } => {
                let color = side
                    .map(Color::from)
                    .unwrap_or_else(|| self.session.board().side_to_move());

                match self.session.trigger_bot(color)? {
                    Some(turn) => {
                        report(&turn);
                        self.state();
                    }
                    None => println!(
                        "No {} bot is waiting to move ({})",
                        color.name(),
                        self.session.phase()
                    ),
                }
            }

            EngineCommand::Move { mv } => {
                if let Err(e) = self.session.submit_uci(&mv) {
                    log::warn!("Rejected move {mv:?}: {e}");
                    bail!(e);
                }
                self.state();
            }

            EngineCommand::Moves => {
                let moves = self.session.board().legal_moves();

                // If there are none, print "(none)"
                let moves_string = if moves.is_empty() {
                    String::from("(none)")
                } else {
                    // Otherwise, join them by comma-space
                    let mut moves = moves.into_iter().map(|mv| mv.to_string()).collect::<Vec<_>>();
                    moves.sort();
                    moves.join(", ")
                };
                println!("{moves_string}");
            }

            EngineCommand::Reset => {
                self.session.reset();
                self.state();
            }

            EngineCommand::State => self.state(),

            EngineCommand::Undo => match self.session.undo() {
                Some(mv) => {
                    println!("Took back {mv}");
                    self.state();
                }
                None => println!("Nothing to undo"),
            },
        }

        Ok(())
    }

    /// If auto-play is on, lets bots move until it is a human's turn or the game ends.
    fn autoplay(&mut self) {
        if !self.session.config().auto_play || !self.session.is_bot_turn() {
            return;
        }

        match self.session.play_bots() {
            Ok(turns) => {
                turns.iter().for_each(report);
                self.state();
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    /// Prints the current phase and players.
    fn state(&self) {
        println!(
            "White: {} | Black: {} | ply {} | {}",
            self.session.player(Color::White),
            self.session.player(Color::Black),
            self.session.board().ply(),
            self.session.phase()
        );
    }

    /// Executes the `eval` command, printing the material balance for the side to move.
    fn eval(&self, pretty: bool) {
        let board = self.session.board();
        if pretty {
            println!("{}", MaterialReport::new(board));
        } else {
            println!("{}", Material.evaluate(board, board.side_to_move()));
        }
    }

    /// Execute the `bench` command, running a fixed-depth search on a series of positions and displaying the results.
    fn bench(&self, depth: Option<usize>, pretty: bool) -> Result<()> {
        let config = SearchConfig {
            depth: depth.unwrap_or(BENCH_DEPTH),
        };

        let num_tests = BENCHMARK_FENS.len();
        let starttime = Instant::now();
        let mut nodes = 0;

        // Run a fixed search on each position
        for (i, fen) in BENCHMARK_FENS.into_iter().enumerate() {
            println!("Benchmark position {}/{}: {fen}", i + 1, num_tests);

            let board = Board::from_fen(fen)?;
            let res = Search::new(&Material, board.side_to_move(), config).start(&board)?;
            nodes += res.nodes;
        }

        // Compute results
        let elapsed = starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let m_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+--- Benchmark Complete ---+");
            println!("| depth      : {:<12}|", config.depth);
            println!("| time (ms)  : {ms:<12}|");
            println!("| nodes      : {nodes:<12}|");
            println!("| nps        : {nps:<12}|");
            println!("| Mnps       : {m_nps:<12.2}|");
            println!("+--------------------------+");
        } else {
            println!("{nodes} nodes {nps} nps");
        }

        Ok(())
    }
}

/// Prints the outcome of one bot turn.
fn report(turn: &BotTurn) {
    let mate = if turn.score.is_terminal_win_or_loss() {
        " mate"
    } else {
        ""
    };

    println!(
        "{} played {} (score {}{mate}, {} tied, {} nodes at depth {})",
        turn.color.name(),
        turn.mv,
        turn.score,
        turn.tied.len(),
        turn.nodes,
        turn.depth
    );
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Exit command and exit this function
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            return Ok(());
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<EngineCommand>() {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::Phase;

    fn engine(args: &[&str]) -> Engine {
        let cli = Cli::try_parse_from(std::iter::once("plybot").chain(args.iter().copied())).unwrap();
        Engine::new(&cli).unwrap()
    }

    #[test]
    fn test_commands_drive_the_session() {
        let mut engine = engine(&["--depth", "1", "--seed", "2"]);

        engine.execute("move e2e4".parse().unwrap()).unwrap();
        assert_eq!(engine.session().phase(), Phase::AwaitingInput(Color::Black));

        engine.execute("go".parse().unwrap()).unwrap();
        assert_eq!(engine.session().board().ply(), 2);
        assert!(engine.session().bot(Color::Black).unwrap().analysis().is_some());

        engine.execute("undo".parse().unwrap()).unwrap();
        engine.execute("undo".parse().unwrap()).unwrap();
        assert_eq!(engine.session().board().ply(), 0);

        assert!(engine.execute("move e2e5".parse().unwrap()).is_err());
        assert_eq!(engine.session().board().ply(), 0);
    }

    #[test]
    fn test_bad_fen_is_rejected() {
        let cli = Cli::try_parse_from(["plybot", "--fen", "not a fen"]).unwrap();
        assert!(Engine::new(&cli).is_err());
    }

    #[test]
    fn test_autoplay_stops_at_human_turn() {
        let mut engine = engine(&[
            "--white", "default", "--black", "human", "--depth", "1", "--seed", "4", "--auto",
        ]);

        engine.autoplay();
        assert_eq!(engine.session().board().ply(), 1);
        assert_eq!(engine.session().phase(), Phase::AwaitingInput(Color::Black));
        assert!(!engine.session().is_bot_turn());
    }
}
