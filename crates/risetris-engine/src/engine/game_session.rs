use std::mem;

use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{Board, Piece, PieceKind, PowerUpKind};

use super::{
    autopilot::{DemoPilot, MovePlan, MovePlanner, PlanningSnapshot},
    command::{Command, MenuDirection},
    config::{ConfigChange, ConfigError, GameConfig},
    game_seed::GameSeed,
    menu::{ConfigMenu, MenuItem},
    power_up::PowerUpSystem,
    rising_lines::RisingLinesController,
    scoring::{ComboState, GameStats, compute_clear_score},
};

/// Offsets tried in order after a rotation until one fits.
const WALL_KICKS: [(i32, i32); 6] = [(0, 0), (-1, 0), (1, 0), (0, -1), (-1, -1), (1, -1)];

/// State a line-clear animation returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeState {
    Playing,
    Demo,
}

impl From<ResumeState> for SessionState {
    fn from(resume: ResumeState) -> Self {
        match resume {
            ResumeState::Playing => Self::Playing,
            ResumeState::Demo => Self::Demo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    /// Full rows are shown before they are removed.
    LineClearing {
        resume: ResumeState,
    },
    GameOver,
    /// The autopilot plays.
    Demo,
    ConfigMenu,
}

/// A game from the first spawn to game over.
///
/// The session is driven from outside by [`handle_command`](Self::handle_command)
/// and [`tick`](Self::tick); everything else is read-only. Every random draw
/// comes from one generator seeded by [`GameSeed`], so a session is fully
/// reproducible from its seed, configuration and input sequence.
///
/// # Example
///
/// ```
/// use risetris_engine::{Command, GameConfig, GameSeed, GameSession, SessionState};
///
/// let mut session = GameSession::with_seed(GameConfig::default(), GameSeed::from(1_u128)).unwrap();
/// session.handle_command(Command::HardDrop);
/// session.tick(16);
/// assert_eq!(session.stats().completed_pieces(), 1);
/// assert_eq!(session.state(), SessionState::Playing);
/// ```
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    rng: Pcg32,
    board: Board,
    /// `None` only while full rows are being cleared.
    current: Option<Piece>,
    next: Piece,
    hold: Option<Piece>,
    can_hold: bool,
    piece_id: u64,
    state: SessionState,
    stats: GameStats,
    combo: ComboState,
    power_ups: PowerUpSystem,
    rising: RisingLinesController,
    fall_interval_ms: u64,
    fall_timer_ms: u64,
    lock_delay_ms: u64,
    clearing_rows: Vec<usize>,
    clear_timer_ms: u64,
    game_over_timer_ms: u64,
    show_ghost: bool,
    menu: Option<ConfigMenu>,
    planner: Option<Box<dyn MovePlanner>>,
    pilot: Option<DemoPilot>,
}

impl GameSession {
    /// Starts a session with a random seed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    pub fn with_seed(config: GameConfig, seed: GameSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let width = config.grid.width;
        let mut session = Self {
            rng: seed.rng(),
            board: Board::new(width, config.grid.height),
            current: None,
            next: Piece::new(PieceKind::I, width),
            hold: None,
            can_hold: true,
            piece_id: 0,
            state: SessionState::Playing,
            stats: GameStats::new(),
            combo: ComboState::default(),
            power_ups: PowerUpSystem::new(),
            rising: RisingLinesController::default(),
            fall_interval_ms: config.timing.fall_interval(1),
            fall_timer_ms: 0,
            lock_delay_ms: 0,
            clearing_rows: vec![],
            clear_timer_ms: 0,
            game_over_timer_ms: 0,
            show_ghost: true,
            menu: None,
            planner: None,
            pilot: None,
            config,
        };
        session.reset();
        if session.config.demo.auto_start {
            session.enter_demo();
        }
        Ok(session)
    }

    /// Installs the planner the autopilot asks in Demo mode.
    ///
    /// Without a planner the autopilot leaves pieces to gravity.
    #[must_use]
    pub fn with_planner(mut self, planner: Box<dyn MovePlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn set_planner(&mut self, planner: Box<dyn MovePlanner>) {
        self.planner = Some(planner);
    }

    /// Starts a fresh game in [`SessionState::Playing`], keeping configuration
    /// and the random stream.
    pub fn reset(&mut self) {
        let grid = self.config.grid;
        self.board = Board::new(grid.width, grid.height);
        self.stats = GameStats::new();
        self.combo.reset();
        self.power_ups.clear();
        self.rising = RisingLinesController::new(1, &self.config.rising);
        self.fall_interval_ms = self.config.timing.fall_interval(1);
        self.hold = None;
        self.clearing_rows.clear();
        self.clear_timer_ms = 0;
        self.game_over_timer_ms = 0;
        self.menu = None;
        self.pilot = None;
        self.state = SessionState::Playing;
        self.next = self.generate_piece();
        self.spawn();
        log::info!("new game started");
    }

    fn enter_demo(&mut self) {
        self.state = SessionState::Demo;
        self.pilot = Some(DemoPilot::new());
        log::info!("demo started");
    }

    fn generate_piece(&mut self) -> Piece {
        let kind: PieceKind = self.rng.random();
        let mut piece = Piece::new(kind, self.config.grid.width);
        if self
            .power_ups
            .should_spawn_on_new_piece(&mut self.rng, &self.config.power_ups)
        {
            self.power_ups
                .tag_random_cell_of_piece(&mut self.rng, &mut piece);
        }
        piece
    }

    /// Moves the next piece into play. A piece that does not fit at its spawn
    /// position ends the game.
    fn spawn(&mut self) {
        let next = self.generate_piece();
        let piece = mem::replace(&mut self.next, next);
        self.can_hold = true;
        self.start_piece(piece);
    }

    fn start_piece(&mut self, piece: Piece) {
        self.piece_id += 1;
        self.fall_timer_ms = 0;
        self.lock_delay_ms = 0;
        let fits = self.board.is_valid_placement(&piece, 0, 0, false);
        self.current = Some(piece);
        if !fits {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.state = SessionState::GameOver;
        self.game_over_timer_ms = 0;
        self.pilot = None;
        log::info!(
            "game over: score {}, level {}, {} lines",
            self.stats.score(),
            self.stats.level(),
            self.stats.lines_cleared()
        );
    }

    fn phantom_active(&self) -> bool {
        self.power_ups.is_active(PowerUpKind::PhantomMode)
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let phantom = self.phantom_active();
        let Some(piece) = &mut self.current else {
            return false;
        };
        if !self.board.is_valid_placement(piece, dx, dy, phantom) {
            return false;
        }
        piece.shift(dx, dy);
        true
    }

    pub(crate) fn move_horizontal(&mut self, dx: i32) -> bool {
        self.try_move(dx, 0)
    }

    /// Rotates clockwise with wall kicks. The piece is untouched when no kick
    /// fits.
    pub(crate) fn rotate(&mut self) -> bool {
        let phantom = self.phantom_active();
        let Some(piece) = &mut self.current else {
            return false;
        };
        let mut rotated = piece.clone();
        rotated.rotate_clockwise();
        let Some((dx, dy)) = WALL_KICKS
            .into_iter()
            .find(|&(dx, dy)| self.board.is_valid_placement(&rotated, dx, dy, phantom))
        else {
            return false;
        };
        rotated.shift(dx, dy);
        *piece = rotated;
        true
    }

    pub(crate) fn soft_drop(&mut self) -> bool {
        if !self.try_move(0, 1) {
            return false;
        }
        self.stats.add_score(self.config.scoring.soft_drop_bonus);
        true
    }

    fn hard_drop(&mut self) {
        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        self.stats
            .add_score(rows * self.config.scoring.hard_drop_bonus);
        self.lock_piece();
    }

    /// Puts the current piece on hold, once per piece.
    ///
    /// The first hold brings in the next piece; later holds swap with the held
    /// piece. The hold slot stores a fresh piece of the same kind: spawn
    /// position and orientation, power-up tags dropped.
    pub(crate) fn hold(&mut self) -> bool {
        if !self.config.features.hold_enabled || !self.can_hold {
            return false;
        }
        let Some(current) = self.current.take() else {
            return false;
        };
        let piece = Piece::new(current.kind(), self.config.grid.width);
        log::debug!("hold {}", piece.kind());
        match self.hold.replace(piece) {
            None => self.spawn(),
            Some(held) => self.start_piece(held),
        }
        self.can_hold = false;
        true
    }

    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.power_ups.consume_use(PowerUpKind::PhantomMode);
        self.board.fill_piece(&piece);
        self.power_ups
            .transfer_tags_on_lock(&piece, self.board.height());

        let rows = self.board.find_full_rows();
        self.stats.record_lock(rows.len());
        if rows.is_empty() {
            self.combo.reset();
            self.spawn();
            return;
        }
        self.begin_clear(rows);
    }

    fn begin_clear(&mut self, rows: Vec<usize>) {
        let resume = if self.state.is_demo() {
            ResumeState::Demo
        } else {
            ResumeState::Playing
        };
        let scoring = &self.config.scoring;
        let points = compute_clear_score(
            rows.len(),
            self.stats.level(),
            self.combo.count(),
            self.power_ups.is_active(PowerUpKind::ScoreAmplifier),
            scoring,
        );
        self.stats.add_score(points);
        self.combo.on_clear(scoring);
        let lines = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        if self.stats.add_cleared_lines(lines, scoring.lines_per_level) {
            self.fall_interval_ms = self.config.timing.fall_interval(self.stats.level());
            log::info!("level up: {}", self.stats.level());
        }
        log::debug!("cleared rows {rows:?} for {points} points");

        for kind in self.power_ups.harvest_from_cleared_rows(&rows) {
            self.power_ups.activate(kind, &self.config.power_ups);
        }
        self.clearing_rows = rows;
        self.clear_timer_ms = 0;
        self.state = SessionState::LineClearing { resume };
    }

    fn finish_clear(&mut self, resume: ResumeState) {
        let rows = mem::take(&mut self.clearing_rows);
        self.board.remove_rows(&rows);
        self.power_ups.shift_on_rows_removed(&rows);
        self.state = resume.into();
        self.spawn();
    }

    /// Pushes a new row with holes in from the bottom. If row 0 is occupied
    /// the game ends and the board is left as it was.
    fn trigger_rise(&mut self) {
        if self.board.would_overflow_on_rise() {
            log::info!("rising line overflowed the board");
            self.game_over();
            return;
        }
        let row = RisingLinesController::generate_row_with_holes(
            &mut self.rng,
            self.board.width(),
            &self.config.rising,
        );
        log::debug!("line rising with {} holes", row.hole_count());
        if let Err(err) = self.board.insert_rising_row(row) {
            log::info!("{err}");
            self.game_over();
            return;
        }
        if let Some(piece) = &mut self.current {
            piece.shift(0, -1);
        }
        self.power_ups.shift_on_row_inserted();
        self.rising.on_rise(self.stats.level(), &self.config.rising);
    }

    /// Uses one line bomb charge to remove the bottom-most non-empty row.
    ///
    /// No points are awarded and power-ups in the removed row are lost.
    pub fn detonate_line_bomb(&mut self) -> bool {
        if !matches!(self.state, SessionState::Playing | SessionState::Demo)
            || !self.power_ups.is_active(PowerUpKind::LineBomb)
        {
            return false;
        }
        let Some(row) = self.board.bottom_non_empty_row() else {
            return false;
        };
        self.power_ups.consume_use(PowerUpKind::LineBomb);
        self.board.remove_rows(&[row]);
        self.power_ups.shift_on_rows_removed(&[row]);
        log::debug!("line bomb removed row {row}");
        true
    }

    /// Applies a configuration change and recomputes the fall interval.
    ///
    /// A change to the rising-lines settings restarts the rise timer under
    /// the new settings.
    pub fn apply_config_change(&mut self, change: ConfigChange) {
        let previous_rising = self.config.rising;
        self.config = self.config.clone().apply(change);
        self.fall_interval_ms = self.config.timing.fall_interval(self.stats.level());
        if self.config.rising != previous_rising {
            self.rising = RisingLinesController::new(self.stats.level(), &self.config.rising);
        }
        log::info!("configuration applied: {change:?}");
    }

    pub(crate) fn plan_move(&self) -> Option<MovePlan> {
        let planner = self.planner.as_deref()?;
        let current = self.current.as_ref()?;
        let snapshot = PlanningSnapshot {
            board: &self.board,
            current,
            hold: self.hold.as_ref(),
            next: &self.next,
            can_hold: self.can_hold && self.config.features.hold_enabled,
        };
        Some(planner.plan(&snapshot))
    }

    pub fn handle_command(&mut self, command: Command) {
        match self.state {
            SessionState::Playing => self.handle_playing_command(command),
            SessionState::Paused => {
                if command == Command::TogglePause {
                    self.state = SessionState::Playing;
                }
            }
            SessionState::LineClearing { .. } => {}
            SessionState::GameOver => {
                if command == Command::Restart {
                    self.reset();
                }
            }
            SessionState::Demo => {
                log::info!("demo interrupted");
                self.reset();
            }
            SessionState::ConfigMenu => self.handle_menu_command(command),
        }
    }

    fn handle_playing_command(&mut self, command: Command) {
        match command {
            Command::MoveLeft => {
                self.try_move(-1, 0);
            }
            Command::MoveRight => {
                self.try_move(1, 0);
            }
            Command::SoftDrop => {
                self.soft_drop();
            }
            Command::Rotate => {
                self.rotate();
            }
            Command::HardDrop => self.hard_drop(),
            Command::Hold => {
                self.hold();
            }
            Command::TogglePause => self.state = SessionState::Paused,
            Command::ToggleGhost => self.show_ghost = !self.show_ghost,
            Command::ToggleDemo => {
                self.reset();
                self.enter_demo();
            }
            Command::OpenMenu => {
                self.menu = Some(ConfigMenu::new(&self.config));
                self.state = SessionState::ConfigMenu;
            }
            Command::ManualRise => {
                if self.rising.try_manual_trigger(&self.config.rising) {
                    self.trigger_rise();
                }
            }
            Command::MenuNavigate(_)
            | Command::MenuAdjust(_)
            | Command::MenuConfirm
            | Command::MenuCancel
            | Command::Restart => {}
        }
    }

    fn handle_menu_command(&mut self, command: Command) {
        let Some(menu) = &mut self.menu else {
            self.state = SessionState::Playing;
            return;
        };
        match command {
            Command::MenuNavigate(direction) => menu.navigate(direction),
            Command::MenuAdjust(direction) => menu.adjust(direction),
            Command::MenuConfirm if menu.selected() == MenuItem::Back => {
                let changes = menu.changes();
                self.menu = None;
                for change in changes {
                    self.apply_config_change(change);
                }
                self.state = SessionState::Playing;
            }
            Command::MenuConfirm => menu.adjust(MenuDirection::Next),
            Command::MenuCancel | Command::OpenMenu => {
                self.menu = None;
                self.state = SessionState::Playing;
            }
            _ => {}
        }
    }

    /// Advances the session by `delta_ms` milliseconds.
    ///
    /// Within one tick the combo banner, power-ups and rising lines advance
    /// before the state update, so an effect expiring in this tick already
    /// applies to its gravity step.
    pub fn tick(&mut self, delta_ms: u64) {
        match self.state {
            SessionState::Paused | SessionState::ConfigMenu => return,
            SessionState::GameOver => {
                self.tick_game_over(delta_ms);
                return;
            }
            SessionState::LineClearing { resume } => {
                self.clear_timer_ms += delta_ms;
                if self.clear_timer_ms >= self.config.timing.clear_animation_ms {
                    self.finish_clear(resume);
                }
                return;
            }
            SessionState::Playing | SessionState::Demo => {}
        }

        self.combo.tick(delta_ms);
        self.power_ups.tick(delta_ms);
        if self.rising.tick(delta_ms, &self.config.rising) {
            self.trigger_rise();
        }
        if self.state.is_demo()
            && let Some(mut pilot) = self.pilot.take()
        {
            let demo = self.config.demo.clone();
            pilot.update(delta_ms, self, &demo);
            if self.state.is_demo() || self.state.is_line_clearing() {
                self.pilot = Some(pilot);
            }
        }
        if matches!(self.state, SessionState::Playing | SessionState::Demo) {
            self.update_fall(delta_ms);
        }
    }

    fn tick_game_over(&mut self, delta_ms: u64) {
        if !self.config.demo.after_game_over {
            return;
        }
        self.game_over_timer_ms += delta_ms;
        if self.game_over_timer_ms >= self.config.demo.game_over_delay_ms {
            self.reset();
            self.enter_demo();
        }
    }

    /// Fall interval after power-up effects.
    #[must_use]
    pub fn effective_fall_interval_ms(&self) -> u64 {
        if self.power_ups.is_active(PowerUpKind::TimeDilator) {
            self.fall_interval_ms * 2
        } else {
            self.fall_interval_ms
        }
    }

    fn update_fall(&mut self, delta_ms: u64) {
        let interval = self.effective_fall_interval_ms();
        self.fall_timer_ms += delta_ms;
        if self.fall_timer_ms < interval {
            return;
        }
        self.fall_timer_ms = 0;
        if self.try_move(0, 1) {
            self.lock_delay_ms = 0;
            return;
        }
        if self.power_ups.is_active(PowerUpKind::PrecisionLock) {
            self.lock_delay_ms += interval;
            if self.lock_delay_ms < self.config.power_ups.precision_lock_delay_ms {
                return;
            }
        }
        self.lock_piece();
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    /// Id of the piece in play, incremented whenever a piece enters play.
    #[must_use]
    pub fn current_piece_id(&self) -> u64 {
        self.piece_id
    }

    #[must_use]
    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    #[must_use]
    pub fn hold_piece(&self) -> Option<&Piece> {
        self.hold.as_ref()
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Landing preview of the current piece while the ghost is shown.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        if !self.show_ghost {
            return None;
        }
        let mut ghost = self.current.clone()?;
        let distance = self.board.drop_distance(&ghost, self.phantom_active());
        ghost.shift(0, distance);
        Some(ghost)
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.stats.score()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    #[must_use]
    pub fn combo(&self) -> &ComboState {
        &self.combo
    }

    #[must_use]
    pub fn combo_text(&self) -> Option<String> {
        self.combo.text()
    }

    #[must_use]
    pub fn power_ups(&self) -> &PowerUpSystem {
        &self.power_ups
    }

    #[must_use]
    pub fn rising(&self) -> &RisingLinesController {
        &self.rising
    }

    #[must_use]
    pub fn fall_interval_ms(&self) -> u64 {
        self.fall_interval_ms
    }

    /// Rows being cleared while in [`SessionState::LineClearing`].
    #[must_use]
    pub fn clearing_rows(&self) -> &[usize] {
        &self.clearing_rows
    }

    #[must_use]
    pub fn show_ghost(&self) -> bool {
        self.show_ghost
    }

    #[must_use]
    pub fn menu(&self) -> Option<&ConfigMenu> {
        self.menu.as_ref()
    }

    #[must_use]
    pub fn pilot(&self) -> Option<&DemoPilot> {
        self.pilot.as_ref()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Block, BlockRow, Difficulty, MenuDirection, Remaining, RisingMode};

    use super::*;

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.power_ups.enabled = false;
        config.rising.mode = RisingMode::Off;
        config
    }

    fn session(config: GameConfig) -> GameSession {
        GameSession::with_seed(config, GameSeed::from(7_u128)).unwrap()
    }

    fn vertical_i(x: i32, y: i32) -> Piece {
        let mut piece = Piece::new(PieceKind::I, 10);
        piece.rotate_clockwise();
        piece.set_position(x, y);
        piece
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.grid.width = 2;
        assert!(matches!(
            GameSession::new(config),
            Err(ConfigError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn test_single_clear_with_vertical_i() {
        let mut session = session(quiet_config());
        session.board = Board::from_ascii(10, 20, ".#########");
        session.current = Some(vertical_i(0, 0));

        session.handle_command(Command::HardDrop);
        // 16 rows of hard drop at 2 points each, then a single at level 1.
        assert_eq!(session.score(), 32 + 100);
        assert_eq!(
            session.state(),
            SessionState::LineClearing {
                resume: ResumeState::Playing
            }
        );
        assert_eq!(session.clearing_rows(), &[19]);
        assert!(session.current_piece().is_none());

        session.handle_command(Command::MoveLeft);
        session.tick(499);
        assert!(session.state().is_line_clearing());
        session.tick(1);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.board().cell(0, 19), Block::Piece(PieceKind::I));
        assert_eq!(session.board().cell(1, 19), Block::Empty);
        assert_eq!(session.board().cell(0, 16), Block::Empty);
        assert_eq!(session.stats().lines_cleared(), 1);
        assert_eq!(session.stats().line_clear_counter()[1], 1);
        assert!(session.current_piece().is_some());
    }

    #[test]
    fn test_combo_chain_and_reset() {
        let mut session = session(quiet_config());
        session.board = Board::from_ascii(
            10,
            20,
            "
            .#########
            #.########
            ",
        );
        session.current = Some(vertical_i(0, 15));
        session.lock_piece();
        assert_eq!(session.score(), 100);
        session.tick(500);

        session.current = Some(vertical_i(1, 16));
        session.lock_piece();
        assert_eq!(session.score(), 100 + 200);
        assert_eq!(session.combo().count(), 2);
        assert_eq!(session.combo_text().as_deref(), Some("x2.0 COMBO!"));
        session.tick(500);

        session.current = Some(vertical_i(5, 0));
        session.handle_command(Command::HardDrop);
        assert_eq!(session.combo().count(), 0);
        assert!((session.combo().multiplier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotation_rolls_back_when_no_kick_fits() {
        let mut session = session(quiet_config());
        let mut piece = Piece::new(PieceKind::I, 10);
        piece.set_position(3, 19);
        session.current = Some(piece.clone());
        session.handle_command(Command::Rotate);
        assert_eq!(session.current_piece(), Some(&piece));
    }

    #[test]
    fn test_rotation_kicks_off_the_wall() {
        let mut session = session(quiet_config());
        let mut piece = Piece::new(PieceKind::T, 10);
        piece.rotate_clockwise();
        piece.set_position(8, 5);
        session.current = Some(piece);
        session.handle_command(Command::Rotate);
        let piece = session.current_piece().unwrap();
        assert_eq!(piece.position(), (7, 5));
        assert_eq!(piece.rotation(), 2);
    }

    #[test]
    fn test_gravity_and_soft_drop() {
        let mut session = session(quiet_config());
        let (x, y) = session.current_piece().unwrap().position();
        session.tick(999);
        assert_eq!(session.current_piece().unwrap().position(), (x, y));
        session.tick(1);
        assert_eq!(session.current_piece().unwrap().position(), (x, y + 1));
        session.handle_command(Command::SoftDrop);
        assert_eq!(session.current_piece().unwrap().position(), (x, y + 2));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_time_dilator_doubles_fall_interval() {
        let mut session = session(quiet_config());
        session
            .power_ups
            .activate(PowerUpKind::TimeDilator, &session.config.power_ups);
        let y = session.current_piece().unwrap().y();
        session.tick(1000);
        assert_eq!(session.current_piece().unwrap().y(), y);
        session.tick(1000);
        assert_eq!(session.current_piece().unwrap().y(), y + 1);
    }

    #[test]
    fn test_precision_lock_delays_auto_lock() {
        let mut session = session(quiet_config());
        session.current = Some(vertical_i(0, 16));
        let id = session.current_piece_id();
        session.tick(1000);
        assert_ne!(session.current_piece_id(), id);

        session.current = Some(vertical_i(9, 16));
        session
            .power_ups
            .activate(PowerUpKind::PrecisionLock, &session.config.power_ups);
        let id = session.current_piece_id();
        session.tick(1000);
        assert_eq!(session.current_piece_id(), id);
        session.tick(1000);
        assert_ne!(session.current_piece_id(), id);
    }

    #[test]
    fn test_phantom_mode_passes_through_blocks() {
        let mut session = session(quiet_config());
        session.board = Board::from_ascii(10, 20, "#########.\n.........#");
        session
            .power_ups
            .activate(PowerUpKind::PhantomMode, &session.config.power_ups);
        session.current = Some(vertical_i(4, 0));
        let ghost = session.ghost_piece().unwrap();
        assert_eq!(ghost.y(), 16);

        session.handle_command(Command::HardDrop);
        assert_eq!(
            session.power_ups().remaining(PowerUpKind::PhantomMode),
            Some(Remaining::Uses(2))
        );
        assert_eq!(session.board().cell(4, 19), Block::Piece(PieceKind::I));
    }

    #[test]
    fn test_rise_shifts_board_piece_and_power_ups() {
        let mut config = quiet_config();
        config.rising.mode = RisingMode::Manual;
        let mut session = session(config);
        session.board = Board::from_ascii(10, 20, "##########");
        session.power_ups.transfer_tags_on_lock(
            &{
                let mut piece = vertical_i(3, 16);
                piece.tag((0, 3), PowerUpKind::LineBomb);
                piece
            },
            20,
        );
        let before = session.board().row(19).clone();
        let y = session.current_piece().unwrap().y();

        session.handle_command(Command::ManualRise);
        assert_eq!(session.board().row(18), &before);
        assert!((1..=3).contains(&session.board().row(19).hole_count()));
        assert_eq!(session.current_piece().unwrap().y(), y - 1);
        assert_eq!(session.power_ups().power_up_at(3, 18), Some(PowerUpKind::LineBomb));
        assert_eq!(session.rising().animation_progress(&session.config.rising), Some(0.0));

        // Cooldown blocks an immediate second rise.
        session.handle_command(Command::ManualRise);
        assert_eq!(session.board().row(18), &before);
    }

    #[test]
    fn test_rise_overflow_ends_game_without_touching_board() {
        let mut session = session(quiet_config());
        let mut board = Board::new(10, 20);
        board.set_cell(4, 0, Block::Rising);
        board.set_cell(4, 19, Block::Rising);
        session.board = board.clone();
        session.trigger_rise();
        assert!(session.is_game_over());
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn test_pressure_mode_rises_on_timer() {
        let mut config = GameConfig::default();
        config.power_ups.enabled = false;
        config.timing.initial_fall_ms = 1_000_000;
        config.timing.min_fall_ms = 1_000_000;
        let mut session = session(config);
        session.tick(29_999);
        assert!(session.board().row(19).is_empty());
        session.tick(1);
        assert!(!session.board().row(19).is_empty());
    }

    #[test]
    fn test_double_clear_harvests_both_amplifiers() {
        let mut session = session(quiet_config());
        session.board = Board::from_ascii(
            10,
            20,
            "
            #########.
            #########.
            ",
        );
        let mut piece = vertical_i(9, 16);
        assert!(piece.tag((0, 2), PowerUpKind::ScoreAmplifier));
        assert!(piece.tag((0, 3), PowerUpKind::ScoreAmplifier));
        session.current = Some(piece);
        session.lock_piece();
        assert_eq!(session.score(), 300);
        assert_eq!(
            session.power_ups().remaining(PowerUpKind::ScoreAmplifier),
            Some(Remaining::Millis(16_000))
        );
        assert!(session.power_ups().blocks().is_empty());
    }

    #[test]
    fn test_hold_rules() {
        let mut session = session(quiet_config());
        let first = session.current_piece().unwrap().kind();
        let second = session.next_piece().kind();
        session.handle_command(Command::Rotate);
        session.handle_command(Command::Hold);
        assert_eq!(session.hold_piece().map(Piece::kind), Some(first));
        assert_eq!(session.hold_piece().unwrap().rotation(), 0);
        assert_eq!(session.current_piece().unwrap().kind(), second);
        assert!(!session.can_hold());

        session.handle_command(Command::Hold);
        assert_eq!(session.current_piece().unwrap().kind(), second);

        session.handle_command(Command::HardDrop);
        assert!(session.can_hold());
        let third = session.current_piece().unwrap().kind();
        session.handle_command(Command::MoveLeft);
        session.handle_command(Command::Hold);
        let piece = session.current_piece().unwrap();
        assert_eq!(piece.kind(), first);
        assert_eq!(piece.position(), Piece::new(first, 10).position());
        assert_eq!(session.hold_piece().map(Piece::kind), Some(third));
    }

    #[test]
    fn test_hold_drops_power_up_tags() {
        let mut session = session(quiet_config());
        let mut tagged = Piece::new(PieceKind::T, 10);
        assert!(tagged.tag((1, 0), PowerUpKind::ScoreAmplifier));
        tagged.rotate_clockwise();
        session.current = Some(tagged);

        session.handle_command(Command::Hold);
        let held = session.hold_piece().unwrap();
        assert_eq!(held, &Piece::new(PieceKind::T, 10));
        assert!(held.tags().is_empty());
    }

    #[test]
    fn test_hold_disabled() {
        let mut config = quiet_config();
        config.features.hold_enabled = false;
        let mut session = session(config);
        let kind = session.current_piece().unwrap().kind();
        session.handle_command(Command::Hold);
        assert!(session.hold_piece().is_none());
        assert_eq!(session.current_piece().unwrap().kind(), kind);
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let mut session = session(quiet_config());
        let mut board = Board::new(10, 20);
        for y in 0..20 {
            board.set_cell(3, y, Block::Rising);
            board.set_cell(4, y, Block::Rising);
            board.set_cell(5, y, Block::Rising);
        }
        session.board = board;
        session.spawn();
        assert!(session.is_game_over());

        session.handle_command(Command::MoveLeft);
        assert!(session.is_game_over());
        session.handle_command(Command::Restart);
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.board().rows().iter().all(BlockRow::is_empty));
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut config = GameConfig::default();
        config.power_ups.enabled = false;
        let mut session = session(config);
        session
            .power_ups
            .activate(PowerUpKind::TimeDilator, &session.config.power_ups);
        let position = session.current_piece().unwrap().position();
        session.handle_command(Command::TogglePause);
        session.tick(100_000);
        session.handle_command(Command::MoveLeft);
        assert_eq!(session.current_piece().unwrap().position(), position);
        assert_eq!(session.rising().timer_ms(), 0);
        assert_eq!(
            session.power_ups().remaining(PowerUpKind::TimeDilator),
            Some(Remaining::Millis(10_000))
        );
        session.handle_command(Command::TogglePause);
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_menu_cancel_discards_draft() {
        let mut session = session(quiet_config());
        let config = session.config().clone();
        session.handle_command(Command::OpenMenu);
        assert_eq!(session.state(), SessionState::ConfigMenu);
        session.handle_command(Command::MenuNavigate(MenuDirection::Next));
        session.handle_command(Command::MenuAdjust(MenuDirection::Next));
        assert_eq!(session.menu().map(ConfigMenu::power_ups_enabled), Some(true));
        session.tick(5_000);
        session.handle_command(Command::MenuCancel);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.config(), &config);
        assert_eq!(session.current_piece().unwrap().y(), 0);
    }

    #[test]
    fn test_menu_confirm_applies_draft() {
        let mut session = session(quiet_config());
        session.handle_command(Command::OpenMenu);
        session.handle_command(Command::MenuAdjust(MenuDirection::Next));
        session.handle_command(Command::MenuNavigate(MenuDirection::Previous));
        assert_eq!(session.menu().map(ConfigMenu::selected), Some(MenuItem::Back));
        session.handle_command(Command::MenuConfirm);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.config().difficulty(), Some(Difficulty::Hard));
        assert_eq!(
            session.fall_interval_ms(),
            GameConfig::default()
                .with_difficulty(Difficulty::Hard)
                .timing
                .fall_interval(1)
        );
        assert!(!session.config().power_ups.enabled);
    }

    #[test]
    fn test_menu_rising_mode_takes_effect_on_confirm() {
        let mut session = session(quiet_config());
        session.handle_command(Command::OpenMenu);
        for _ in 0..3 {
            session.handle_command(Command::MenuNavigate(MenuDirection::Next));
        }
        assert_eq!(session.menu().map(ConfigMenu::selected), Some(MenuItem::RisingLines));
        // Off -> Pressure -> Survival
        session.handle_command(Command::MenuAdjust(MenuDirection::Next));
        session.handle_command(Command::MenuAdjust(MenuDirection::Next));
        assert_eq!(session.menu().map(ConfigMenu::rising_mode), Some(RisingMode::Survival));
        assert_eq!(session.config().rising.mode, RisingMode::Off);

        session.handle_command(Command::MenuNavigate(MenuDirection::Next));
        session.handle_command(Command::MenuConfirm);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.config().rising.mode, RisingMode::Survival);
        assert_eq!(session.rising().interval_ms(), Some(12_000));

        session.tick(1_000);
        assert_eq!(session.rising().timer_ms(), 1_000);
        assert_eq!(session.rising().time_until_rise_ms(), Some(11_000));
    }

    #[test]
    fn test_demo_toggle_and_interrupt() {
        let mut session = session(quiet_config());
        session.handle_command(Command::SoftDrop);
        session.handle_command(Command::ToggleDemo);
        assert_eq!(session.state(), SessionState::Demo);
        assert_eq!(session.score(), 0);
        assert!(session.pilot().is_some());
        session.handle_command(Command::MoveLeft);
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.pilot().is_none());
    }

    #[test]
    fn test_auto_demo_after_game_over() {
        let mut session = session(quiet_config());
        session.game_over();
        session.tick(2_999);
        assert!(session.is_game_over());
        session.tick(1);
        assert_eq!(session.state(), SessionState::Demo);

        let mut config = quiet_config();
        config.demo.after_game_over = false;
        let mut session = self::session(config);
        session.game_over();
        session.tick(60_000);
        assert!(session.is_game_over());
    }

    #[test]
    fn test_line_bomb_removes_bottom_row() {
        let mut session = session(quiet_config());
        session.board = Board::from_ascii(10, 20, "#.........\n##.#######");
        assert!(!session.detonate_line_bomb());
        session
            .power_ups
            .activate(PowerUpKind::LineBomb, &session.config.power_ups);
        assert!(session.detonate_line_bomb());
        assert_eq!(session.board().cell(0, 19), Block::Rising);
        assert_eq!(session.board().cell(1, 19), Block::Empty);
        assert!(session.board().row(18).is_empty());
        assert_eq!(session.score(), 0);
        assert!(!session.detonate_line_bomb());
    }

    #[test]
    fn test_ghost_toggle() {
        let mut session = session(quiet_config());
        session.current = Some(vertical_i(2, 0));
        assert_eq!(session.ghost_piece().map(|p| p.position()), Some((2, 16)));
        session.handle_command(Command::ToggleGhost);
        assert!(session.ghost_piece().is_none());
    }

    #[test]
    fn test_same_seed_same_game() {
        let run = || {
            let mut session = GameSession::with_seed(GameConfig::default(), GameSeed::from(99_u128))
                .unwrap();
            for i in 0..200 {
                if i % 3 == 0 {
                    session.handle_command(Command::MoveLeft);
                }
                session.handle_command(Command::HardDrop);
                session.tick(600);
            }
            (session.board().clone(), session.score(), session.state())
        };
        assert_eq!(run(), run());
    }
}
