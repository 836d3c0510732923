use std::path::PathBuf;

use risetris_engine::{GameSeed, GameSession, SessionState};
use risetris_evaluator::turn_evaluator::TurnEvaluator;
use serde::Serialize;

use crate::util::{self, ConfigArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Session seed as 32 hex digits (random if omitted)
    #[arg(long)]
    pub(crate) seed: Option<GameSeed>,
    /// Maximum number of ticks to run
    #[arg(long, default_value_t = 10_000)]
    pub(crate) ticks: u64,
    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 16)]
    pub(crate) tick_ms: u64,
    /// Include the final board in the summary
    #[arg(long)]
    pub(crate) print_board: bool,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[clap(flatten)]
    pub(crate) config: ConfigArg,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SimulationSummary {
    seed: GameSeed,
    ticks: u64,
    elapsed_ms: u64,
    game_over: bool,
    score: u64,
    level: u32,
    lines_cleared: u32,
    completed_pieces: u64,
    /// Locks that cleared 0, 1, 2, 3 and 4 rows.
    line_clears: [u64; 5],
    max_combo: u32,
    rising_lines: u64,
    active_power_ups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    board: Option<Vec<String>>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let mut config = arg.config.load()?;
    config.demo.auto_start = true;
    config.demo.after_game_over = false;
    let seed = arg.seed.unwrap_or_else(rand::random);

    let planner = TurnEvaluator::from_config(&config.demo);
    let session = GameSession::with_seed(config, seed)?.with_planner(Box::new(planner));
    log::info!("simulating {} ticks of {} ms with seed {seed}", arg.ticks, arg.tick_ms);

    let summary = simulate(session, seed, arg.ticks, arg.tick_ms, arg.print_board);
    log::info!(
        "simulation finished after {} ticks: score {}, {} lines",
        summary.ticks,
        summary.score,
        summary.lines_cleared
    );
    util::write_json(&summary, arg.output.as_deref())
}

/// Ticks `session` until it is over or `max_ticks` have passed.
pub(crate) fn simulate(
    mut session: GameSession,
    seed: GameSeed,
    max_ticks: u64,
    tick_ms: u64,
    include_board: bool,
) -> SimulationSummary {
    let mut ticks = 0;
    let mut max_combo = 0;
    let mut rising_lines = 0;
    let mut was_rising = false;
    while ticks < max_ticks && !session.is_game_over() {
        session.tick(tick_ms);
        ticks += 1;
        max_combo = max_combo.max(session.combo().count());
        let rising = session
            .rising()
            .animation_progress(&session.config().rising)
            .is_some();
        if rising && !was_rising {
            rising_lines += 1;
        }
        was_rising = rising;
    }

    let stats = session.stats();
    SimulationSummary {
        seed,
        ticks,
        elapsed_ms: ticks * tick_ms,
        game_over: session.state() == SessionState::GameOver,
        score: stats.score(),
        level: stats.level(),
        lines_cleared: stats.lines_cleared(),
        completed_pieces: stats.completed_pieces(),
        line_clears: *stats.line_clear_counter(),
        max_combo,
        rising_lines,
        active_power_ups: session
            .power_ups()
            .active()
            .map(|power_up| power_up.to_string())
            .collect(),
        board: include_board.then(|| {
            session
                .board()
                .to_string()
                .lines()
                .map(str::to_owned)
                .collect()
        }),
    }
}
