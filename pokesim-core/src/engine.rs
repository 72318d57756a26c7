//! Step-based battle engine facade.
//!
//! Owns the state machine around the turn scheduler:
//! `AwaitingActions -> ExecutingTurn -> AwaitingForcedSwitches ->
//! AwaitingActions`, terminal `Ended`. A call to [`BattleEngine::step`]
//! resolves atomically; there are no suspension points inside a turn.

use serde::{Deserialize, Serialize};

use crate::battle_log::LogRecord;
use crate::data::Dex;
use crate::error::{ActionError, TeamError};
use crate::sim::battle::{self, Action};
use crate::sim::faint_handler::{battle_outcome, process_faints};
use crate::sim::state::{BattleState, FormatDescriptor, MonRef, PokemonBuild};
use crate::sim::switching;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    AwaitingActions,
    /// `(side, active_slot)` pairs that must be refilled before play resumes.
    AwaitingForcedSwitches(Vec<(usize, usize)>),
    Ended {
        /// `None` is a draw.
        winner: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    AwaitingActions,
    AwaitingForcedSwitches,
    Ended,
}

pub struct BattleEngine<'d> {
    dex: &'d Dex,
    state: BattleState,
    phase: Phase,
    pending: Vec<(usize, usize)>,
    winner: Option<usize>,
}

impl<'d> BattleEngine<'d> {
    /// Build a battle from two rosters and send out the leads. Switch-in
    /// abilities (Intimidate and friends) fire here, in side then slot
    /// order, exactly as they do mid-battle.
    pub fn new(
        dex: &'d Dex,
        seed: u32,
        format: FormatDescriptor,
        team_a: &[PokemonBuild],
        team_b: &[PokemonBuild],
    ) -> Result<Self, TeamError> {
        let mut state = BattleState::new(format, seed);
        state.load_team(dex, 0, team_a)?;
        state.load_team(dex, 1, team_b)?;
        // Place every lead, then fire switch-in behaviors in side/slot
        // order so entry abilities see the whole starting field.
        for side in 0..format.num_sides {
            let team_len = if side == 0 { team_a.len() } else { team_b.len() };
            for slot in 0..format.active_slots.min(team_len) {
                switching::place(&mut state, dex, side, slot, slot);
            }
        }
        for (_, _, m) in state.all_active() {
            if !state.is_fainted(m) {
                crate::sim::handlers::run_switch_in(&mut state, dex, m);
            }
        }
        process_faints(&mut state, dex, None);
        Ok(Self {
            dex,
            state,
            phase: Phase::AwaitingActions,
            pending: Vec::new(),
            winner: None,
        })
    }

    /// Resume from a serialized state. The phase is recomputed from the
    /// state itself, so `step` continues exactly where the original left off.
    pub fn from_state(dex: &'d Dex, state: BattleState) -> Self {
        let winner = battle_outcome(&state);
        let pending = battle::forced_switch_requirements(&state);
        let phase = if winner.is_some() {
            Phase::Ended
        } else if pending.is_empty() {
            Phase::AwaitingActions
        } else {
            Phase::AwaitingForcedSwitches
        };
        Self {
            dex,
            state,
            phase,
            pending,
            winner: winner.flatten(),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn dex(&self) -> &'d Dex {
        self.dex
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Selectable actions for a side in the current phase.
    pub fn legal_actions(&self, side: usize) -> Vec<Action> {
        match self.phase {
            Phase::Ended => Vec::new(),
            Phase::AwaitingForcedSwitches => {
                let mut out = Vec::new();
                for &(req_side, slot) in &self.pending {
                    if req_side != side {
                        continue;
                    }
                    for team_slot in self.state.available_switches(side) {
                        out.push(Action::Switch { slot, team_slot });
                    }
                }
                out
            }
            Phase::AwaitingActions => battle::legal_actions(&self.state, self.dex, side),
        }
    }

    /// Advance the battle by one turn (or one forced-switch round). Invalid
    /// input is rejected before any state changes.
    pub fn step(&mut self, actions: &[(usize, Action)]) -> Result<StepOutcome, ActionError> {
        match self.phase {
            Phase::Ended => Err(ActionError::BattleEnded),
            Phase::AwaitingForcedSwitches => self.step_forced_switches(actions),
            Phase::AwaitingActions => self.step_turn(actions),
        }
    }

    fn step_turn(&mut self, actions: &[(usize, Action)]) -> Result<StepOutcome, ActionError> {
        // Every occupied active slot needs exactly one action.
        let mut seen: Vec<(usize, usize)> = Vec::new();
        for (side, action) in actions {
            let key = (*side, action.slot());
            if seen.contains(&key) {
                return Err(ActionError::DuplicateAction {
                    side: key.0,
                    slot: key.1,
                });
            }
            seen.push(key);
            battle::validate_action(&self.state, self.dex, *side, action)?;
        }
        // No two switches may claim the same reserve.
        let mut switch_targets: Vec<(usize, usize)> = Vec::new();
        for (side, action) in actions {
            if let Action::Switch { team_slot, .. } = action {
                let key = (*side, *team_slot);
                if switch_targets.contains(&key) {
                    return Err(ActionError::BadSwitchTarget {
                        side: *side,
                        team_slot: *team_slot,
                    });
                }
                switch_targets.push(key);
            }
        }
        for side in 0..self.state.format.num_sides {
            for slot in 0..self.state.format.active_slots {
                if let Some(ts) = self.state.active_team_slot(side, slot) {
                    if !self.state.is_fainted(MonRef::new(side, ts))
                        && !seen.contains(&(side, slot))
                    {
                        return Err(ActionError::MissingAction { side, slot });
                    }
                }
            }
        }

        battle::run_turn(&mut self.state, self.dex, actions);
        self.after_mutation()
    }

    fn step_forced_switches(&mut self, actions: &[(usize, Action)]) -> Result<StepOutcome, ActionError> {
        let required = self.pending.clone();
        let mut chosen: Vec<(usize, usize, usize)> = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        for (side, action) in actions {
            let Action::Switch { slot, team_slot } = action else {
                return Err(ActionError::ForcedSwitchExpected);
            };
            if !required.contains(&(*side, *slot)) {
                return Err(ActionError::ForcedSwitchExpected);
            }
            if !self.state.available_switches(*side).contains(team_slot)
                || claimed.contains(&(*side, *team_slot))
            {
                return Err(ActionError::BadSwitchTarget {
                    side: *side,
                    team_slot: *team_slot,
                });
            }
            claimed.push((*side, *team_slot));
            chosen.push((*side, *slot, *team_slot));
        }
        for &(req_side, req_slot) in &required {
            if !chosen.iter().any(|&(s, a, _)| s == req_side && a == req_slot) {
                return Err(ActionError::MissingAction {
                    side: req_side,
                    slot: req_slot,
                });
            }
        }

        let mut ordered = chosen;
        ordered.sort_by_key(|&(side, slot, _)| (side, slot));
        for (side, slot, team_slot) in ordered {
            switching::perform_switch(&mut self.state, self.dex, side, slot, team_slot);
        }
        process_faints(&mut self.state, self.dex, None);
        self.after_mutation()
    }

    /// Shared post-mutation bookkeeping: detect the end of the battle, then
    /// either request forced switches or return to action collection.
    fn after_mutation(&mut self) -> Result<StepOutcome, ActionError> {
        if let Some(winner) = battle_outcome(&self.state) {
            self.phase = Phase::Ended;
            self.winner = winner;
            // The scheduler logs the end when it detects it mid-turn; a wipe
            // during forced switches is recorded here instead.
            if !matches!(self.state.log.last(), Some(LogRecord::Ended { .. })) {
                self.state.log.push(LogRecord::Ended { winner });
            }
            return Ok(StepOutcome::Ended { winner });
        }
        self.pending = battle::forced_switch_requirements(&self.state);
        if !self.pending.is_empty() {
            self.phase = Phase::AwaitingForcedSwitches;
            return Ok(StepOutcome::AwaitingForcedSwitches(self.pending.clone()));
        }
        // Vacate slots a side can no longer fill so every remaining active
        // entry points at a live Pokemon.
        for side in 0..self.state.format.num_sides {
            for slot in 0..self.state.format.active_slots {
                if let Some(ts) = self.state.active_team_slot(side, slot) {
                    if self.state.is_fainted(MonRef::new(side, ts)) {
                        self.state.set_active(side, slot, None);
                    }
                }
            }
        }
        self.phase = Phase::AwaitingActions;
        if cfg!(debug_assertions) {
            self.state.assert_invariants(self.dex);
        }
        Ok(StepOutcome::AwaitingActions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::SAMPLE_DEX;
    use crate::sim::battle::TargetRef;

    fn singles(team_a: &[PokemonBuild], team_b: &[PokemonBuild], seed: u32) -> BattleEngine<'static> {
        BattleEngine::new(
            &SAMPLE_DEX,
            seed,
            FormatDescriptor::singles(),
            team_a,
            team_b,
        )
        .unwrap()
    }

    fn mv(slot: usize, move_slot: usize) -> Action {
        Action::Move {
            slot,
            move_slot,
            target: TargetRef::Foe(0),
            tera: false,
        }
    }

    #[test]
    fn rejects_missing_actions() {
        let mut engine = singles(
            &[PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"])],
            &[PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle"])],
            1,
        );
        let err = engine.step(&[(0, mv(0, 0))]).unwrap_err();
        assert_eq!(err, ActionError::MissingAction { side: 1, slot: 0 });
    }

    #[test]
    fn rejects_action_after_end() {
        let mut engine = singles(
            &[PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"])],
            &[PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"])],
            1,
        );
        // Burn each other down until someone drops.
        for _ in 0..200 {
            match engine.step(&[(0, mv(0, 0)), (1, mv(0, 0))]) {
                Ok(StepOutcome::Ended { .. }) => break,
                Ok(_) => continue,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(engine.is_ended());
        assert_eq!(
            engine.step(&[(0, mv(0, 0))]).unwrap_err(),
            ActionError::BattleEnded
        );
    }

    #[test]
    fn invalid_action_leaves_state_untouched() {
        let mut engine = singles(
            &[PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"])],
            &[PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle"])],
            1,
        );
        let log_len = engine.state().log.len();
        let turn = engine.state().turn;
        let err = engine
            .step(&[(0, mv(0, 3)), (1, mv(0, 0))])
            .unwrap_err();
        assert!(matches!(err, ActionError::EmptyMoveSlot { .. }));
        assert_eq!(engine.state().log.len(), log_len);
        assert_eq!(engine.state().turn, turn);
    }

    #[test]
    fn forced_switch_round_trip() {
        let mut engine = singles(
            &[PokemonBuild::simple("Garchomp", 50, "Rough Skin", &["Earthquake"])],
            &[
                PokemonBuild::simple("Pikachu", 5, "Static", &["Tackle"]),
                PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle"]),
            ],
            7,
        );
        // A level-5 Pikachu will not survive Garchomp for long.
        let mut forced = None;
        for _ in 0..20 {
            match engine.step(&[(0, mv(0, 0)), (1, mv(0, 0))]) {
                Ok(StepOutcome::AwaitingForcedSwitches(req)) => {
                    forced = Some(req);
                    break;
                }
                Ok(_) => continue,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        let req = forced.expect("pikachu should faint");
        assert_eq!(req, vec![(1, 0)]);
        // Only a switch for the vacated slot is accepted now.
        assert_eq!(
            engine.step(&[(1, mv(0, 0))]).unwrap_err(),
            ActionError::ForcedSwitchExpected
        );
        let outcome = engine
            .step(&[(1, Action::Switch { slot: 0, team_slot: 1 })])
            .unwrap();
        assert_eq!(outcome, StepOutcome::AwaitingActions);
        assert_eq!(engine.state().active_team_slot(1, 0), Some(1));
    }

    #[test]
    fn legal_actions_offer_struggle_when_out_of_pp() {
        let mut engine = singles(
            &[PokemonBuild::simple("Pikachu", 50, "Static", &["Splash"])],
            &[PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Recover"])],
            3,
        );
        // Splash has 40 PP; drain it artificially by stepping is slow, so
        // instead check the legal action shape directly after zeroing PP.
        let m = MonRef::new(0, 0);
        for _ in 0..40 {
            engine.state.dec_pp(m, 0);
        }
        let actions = engine.legal_actions(0);
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::Move {
                move_slot: crate::data::moves::STRUGGLE_SLOT,
                ..
            }
        )));
    }
}
