use std::fmt;

use crate::{Board, Piece};

use super::{config::DemoConfig, game_session::GameSession};

/// Read-only view of the session handed to a [`MovePlanner`].
#[derive(Debug, Clone, Copy)]
pub struct PlanningSnapshot<'a> {
    pub board: &'a Board,
    pub current: &'a Piece,
    pub hold: Option<&'a Piece>,
    pub next: &'a Piece,
    /// Whether a hold is allowed for the current piece.
    pub can_hold: bool,
}

/// Target placement chosen by a planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    /// Column of the piece's left edge once rotated.
    pub column: i32,
    /// Clockwise quarter turns from the piece's current orientation.
    pub rotations: u8,
    /// Hold first, then place the piece that comes out of the hold slot.
    pub use_hold: bool,
}

/// Chooses where the autopilot should place the current piece.
///
/// Implementations must be pure with respect to the snapshot: they may clone
/// the board and pieces freely but never observe the live session.
pub trait MovePlanner: fmt::Debug + Send + Sync {
    fn plan(&self, snapshot: &PlanningSnapshot<'_>) -> MovePlan;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PilotPhase {
    Planning,
    Holding,
    Rotating,
    Moving,
    Dropping,
    Waiting,
}

/// Executes plans one step at a time with human-paced delays.
///
/// Every step (one rotation, one column, one soft drop) waits for the delay
/// set by the previous step. A new piece id restarts at planning.
#[derive(Debug, Clone)]
pub struct DemoPilot {
    phase: PilotPhase,
    plan: Option<MovePlan>,
    rotations_done: u8,
    piece_id: Option<u64>,
    timer_ms: u64,
    delay_ms: u64,
}

impl Default for DemoPilot {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoPilot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: PilotPhase::Planning,
            plan: None,
            rotations_done: 0,
            piece_id: None,
            timer_ms: 0,
            delay_ms: 0,
        }
    }

    /// The plan for the piece currently being steered.
    #[must_use]
    pub fn plan(&self) -> Option<MovePlan> {
        self.plan
    }

    pub(crate) fn update(&mut self, delta_ms: u64, session: &mut GameSession, config: &DemoConfig) {
        self.timer_ms += delta_ms;
        if self.timer_ms < self.delay_ms {
            return;
        }
        self.timer_ms = 0;
        self.step(session, config);
    }

    fn step(&mut self, session: &mut GameSession, config: &DemoConfig) {
        let Some(piece) = session.current_piece() else {
            self.phase = PilotPhase::Waiting;
            self.delay_ms = config.plan_delay_ms;
            return;
        };
        let piece_x = piece.x();
        let piece_id = session.current_piece_id();
        if self.piece_id != Some(piece_id) {
            self.piece_id = Some(piece_id);
            self.phase = PilotPhase::Planning;
        }

        match self.phase {
            PilotPhase::Planning => {
                self.plan = session.plan_move();
                self.rotations_done = 0;
                self.phase = match self.plan {
                    Some(plan) if plan.use_hold => PilotPhase::Holding,
                    Some(_) => PilotPhase::Rotating,
                    None => PilotPhase::Waiting,
                };
                self.delay_ms = config.rotation_delay_ms;
            }
            PilotPhase::Holding => {
                if session.hold() {
                    self.piece_id = Some(session.current_piece_id());
                }
                self.phase = PilotPhase::Rotating;
                self.delay_ms = config.rotation_delay_ms;
            }
            PilotPhase::Rotating => {
                let target = self.plan.map_or(0, |p| p.rotations);
                if self.rotations_done < target {
                    session.rotate();
                    self.rotations_done += 1;
                    self.delay_ms = config.rotation_delay_ms;
                } else {
                    self.phase = PilotPhase::Moving;
                    self.delay_ms = config.horizontal_delay_ms;
                }
            }
            PilotPhase::Moving => {
                let target = self.plan.map_or(piece_x, |p| p.column);
                let moved = match piece_x.cmp(&target) {
                    std::cmp::Ordering::Less => session.move_horizontal(1),
                    std::cmp::Ordering::Greater => session.move_horizontal(-1),
                    std::cmp::Ordering::Equal => false,
                };
                if moved {
                    self.delay_ms = config.horizontal_delay_ms;
                } else {
                    self.phase = PilotPhase::Dropping;
                    self.delay_ms = config.drop_delay_ms;
                }
            }
            PilotPhase::Dropping => {
                if session.soft_drop() {
                    self.delay_ms = config.fast_drop_delay_ms;
                } else {
                    self.phase = PilotPhase::Waiting;
                    self.delay_ms = config.plan_delay_ms;
                }
            }
            PilotPhase::Waiting => {
                self.delay_ms = config.plan_delay_ms;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameConfig, GameSeed, PieceKind, SessionState};

    /// Always asks for the left wall with one clockwise turn.
    #[derive(Debug)]
    struct LeftWallPlanner;

    impl MovePlanner for LeftWallPlanner {
        fn plan(&self, _snapshot: &PlanningSnapshot<'_>) -> MovePlan {
            MovePlan {
                column: 0,
                rotations: 1,
                use_hold: false,
            }
        }
    }

    #[derive(Debug)]
    struct HoldPlanner;

    impl MovePlanner for HoldPlanner {
        fn plan(&self, snapshot: &PlanningSnapshot<'_>) -> MovePlan {
            MovePlan {
                column: snapshot.current.x(),
                rotations: 0,
                use_hold: snapshot.can_hold,
            }
        }
    }

    fn demo_session(planner: Box<dyn MovePlanner>) -> GameSession {
        let mut config = GameConfig::default();
        config.demo.auto_start = true;
        config.power_ups.enabled = false;
        GameSession::with_seed(config, GameSeed::from(5_u128))
            .unwrap()
            .with_planner(planner)
    }

    #[test]
    fn test_pilot_rotates_moves_and_drops() {
        let mut session = demo_session(Box::new(LeftWallPlanner));
        assert_eq!(session.state(), SessionState::Demo);
        let first_id = session.current_piece_id();
        let kind = session.current_piece().unwrap().kind();

        // Plan, rotate, then step left until the wall.
        for _ in 0..30 {
            session.tick(50);
            if session.current_piece_id() != first_id {
                break;
            }
            let piece = session.current_piece().unwrap();
            if piece.x() == 0 && piece.y() > 0 {
                break;
            }
        }
        let piece = session.current_piece().unwrap();
        assert_eq!(piece.kind(), kind);
        assert_eq!(piece.x(), 0);
        if kind != PieceKind::O {
            assert_eq!(piece.rotation(), 1);
        }
        assert!(session.score() > 0, "soft drops award points");
    }

    #[test]
    fn test_pilot_holds_once_per_piece() {
        let mut session = demo_session(Box::new(HoldPlanner));
        let first = session.current_piece().unwrap().kind();
        session.tick(0);
        session.tick(50);
        assert_eq!(session.hold_piece().map(Piece::kind), Some(first));
        assert!(!session.can_hold());
        for _ in 0..5 {
            session.tick(50);
        }
        assert_eq!(session.hold_piece().map(Piece::kind), Some(first));
    }

    #[test]
    fn test_pilot_without_planner_waits() {
        let mut config = GameConfig::default();
        config.demo.auto_start = true;
        let mut session = GameSession::with_seed(config, GameSeed::from(9_u128)).unwrap();
        let start = session.current_piece().unwrap().position();
        session.tick(500);
        assert_eq!(session.current_piece().unwrap().position(), start);
        assert!(session.pilot().is_some_and(|p| p.plan().is_none()));
    }
}
