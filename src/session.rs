//! Game-state collaborator
//!
//! Folds simulation events into score, warmth and run state. The simulation
//! only reports; this is where a hit becomes lost warmth and lost warmth
//! becomes game over. Persistence of the best score is left to the host.

use serde::Serialize;

use crate::ecs::entity::{CollectibleKind, PlayerForm};
use crate::simulation::events::{SimulationEvent, TickReport};

pub const MAX_WARMTH: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Furthest depth reached
    pub distance: f32,
    pub enemies_defeated: u32,
    pub cocoa_drunk: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    pub state: RunState,
    pub score: u64,
    pub best_score: u64,
    pub warmth: f32,
    pub form: PlayerForm,
    pub film_rolls: u32,
    pub stats: RunStats,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameSession {
    pub fn new(best_score: u64) -> Self {
        Self {
            state: RunState::Playing,
            score: 0,
            best_score,
            warmth: MAX_WARMTH,
            form: PlayerForm::Kitten,
            film_rolls: 0,
            stats: RunStats::default(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.state == RunState::GameOver
    }

    pub fn record_depth(&mut self, z: f32) {
        self.stats.distance = self.stats.distance.max(z);
    }

    /// Fold one tick's events
    ///
    /// Returns the form the player entity must be switched to, if it changed.
    pub fn apply(&mut self, report: &TickReport) -> Option<PlayerForm> {
        let before = self.form;
        for event in &report.events {
            self.apply_event(event);
        }
        (self.form != before).then_some(self.form)
    }

    pub fn apply_event(&mut self, event: &SimulationEvent) {
        if self.is_over() {
            return;
        }

        match *event {
            SimulationEvent::ScoreDelta { amount } => {
                self.score += amount as u64;
                self.best_score = self.best_score.max(self.score);
            }
            SimulationEvent::DamageDelta { amount } => {
                self.warmth = (self.warmth - amount).max(0.0);
                if self.warmth <= 0.0 {
                    self.state = RunState::GameOver;
                    tracing::info!(score = self.score, distance = self.stats.distance, "game over");
                }
            }
            SimulationEvent::PickupApplied { kind, amount } => match kind {
                CollectibleKind::Cocoa => {
                    self.warmth = (self.warmth + amount).min(MAX_WARMTH);
                    self.stats.cocoa_drunk += 1;
                }
                CollectibleKind::Film => self.film_rolls += amount.max(0.0) as u32,
            },
            SimulationEvent::PlayerFormChanged { form } => self.form = form,
            SimulationEvent::EnemyDefeated { .. } => self.stats.enemies_defeated += 1,
            SimulationEvent::ChunkGenerated { .. }
            | SimulationEvent::ChunkDisposed { .. }
            | SimulationEvent::BossZoneReached { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::EnemyKind;
    use crate::simulation::events::DefeatCause;

    fn report(events: Vec<SimulationEvent>) -> TickReport {
        TickReport {
            tick: 0,
            events,
            cues: Vec::new(),
        }
    }

    #[test]
    fn test_score_tracks_best() {
        let mut session = GameSession::new(120);
        session.apply(&report(vec![SimulationEvent::ScoreDelta { amount: 100 }]));
        assert_eq!(session.best_score, 120);
        session.apply(&report(vec![SimulationEvent::ScoreDelta { amount: 50 }]));
        assert_eq!(session.score, 150);
        assert_eq!(session.best_score, 150);
    }

    #[test]
    fn test_warmth_runs_out() {
        let mut session = GameSession::default();
        let hits = vec![SimulationEvent::DamageDelta { amount: 15.0 }; 7];
        session.apply(&report(hits));
        assert_eq!(session.warmth, 0.0);
        assert!(session.is_over());

        // Nothing counts after game over
        session.apply(&report(vec![SimulationEvent::ScoreDelta { amount: 100 }]));
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_cocoa_caps_warmth() {
        let mut session = GameSession::default();
        session.apply(&report(vec![
            SimulationEvent::DamageDelta { amount: 15.0 },
            SimulationEvent::PickupApplied { kind: CollectibleKind::Cocoa, amount: 30.0 },
        ]));
        assert_eq!(session.warmth, MAX_WARMTH);
        assert_eq!(session.stats.cocoa_drunk, 1);
    }

    #[test]
    fn test_form_change_is_reported_once() {
        let mut session = GameSession::default();
        let changed = session.apply(&report(vec![
            SimulationEvent::EnemyDefeated { kind: EnemyKind::Snowman, cause: DefeatCause::Contact },
            SimulationEvent::PlayerFormChanged { form: PlayerForm::Snowman },
        ]));
        assert_eq!(changed, Some(PlayerForm::Snowman));
        assert_eq!(session.stats.enemies_defeated, 1);
        assert_eq!(session.apply(&report(vec![])), None);
    }
}
