//! Attack phase: the combat sub-machine.
//!
//! ```text
//! DeclareAttacker -> DeclareTarget -> DeclareBlocker -> BuildingChain -> Resolving
//!                         |                 |
//!                         +--- cancelAttack +--> Main
//! ```
//!
//! Steps are strictly linear. Each one emits a before/after pair. After the
//! blocker is declared an empty effect chain opens with the attacker holding
//! priority; both players may respond before damage. The chain's completion
//! resolves combat, so reactions such as `Game::cancel_combat` land first.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use super::Phase;
use crate::chain::EffectChain;
use crate::core::{EntityId, PlayerId};
use crate::error::{ChainError, CombatError, GameResult, ValidationError};
use crate::events::{ChainEvent, CombatEvent};
use crate::game::{EffectHandler, Game};
use crate::rules::AttackDeclaration;

/// Combat step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum CombatStep {
    #[default]
    DeclareAttacker,
    DeclareTarget,
    DeclareBlocker,
    BuildingChain,
    Resolving,
}

impl CombatStep {
    /// The step after this one. `Resolving` is last.
    #[must_use]
    pub fn next(self) -> CombatStep {
        match self {
            CombatStep::DeclareAttacker => CombatStep::DeclareTarget,
            CombatStep::DeclareTarget => CombatStep::DeclareBlocker,
            CombatStep::DeclareBlocker => CombatStep::BuildingChain,
            CombatStep::BuildingChain | CombatStep::Resolving => CombatStep::Resolving,
        }
    }
}

/// Attack phase controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatPhase {
    pub step: CombatStep,
    pub attacker: Option<EntityId>,
    pub target: Option<EntityId>,
    pub blocker: Option<EntityId>,
    pub cancelled: bool,
}

impl Game {
    fn combat(&self) -> GameResult<&CombatPhase> {
        Ok(self.phases.context::<CombatPhase>()?)
    }

    fn combat_mut(&mut self) -> GameResult<&mut CombatPhase> {
        Ok(self.phases.context_mut::<CombatPhase>()?)
    }

    fn ensure_step(&self, attempted: CombatStep) -> GameResult<()> {
        let current = self.combat()?.step;
        if current != attempted {
            return Err(CombatError::OutOfOrder { current, attempted }.into());
        }
        Ok(())
    }

    /// Run one step: before event, mutation, advance, after event.
    fn perform_step(&mut self, step: CombatStep, apply: impl FnOnce(&mut CombatPhase)) -> GameResult<()> {
        self.emit(CombatEvent::BeforeStep(step));
        let combat = self.combat_mut()?;
        apply(combat);
        combat.step = step.next();
        self.emit(CombatEvent::AfterStep(step));
        Ok(())
    }

    fn attacker(&self) -> GameResult<EntityId> {
        self.combat()?
            .attacker
            .ok_or_else(|| Game::corrupted("combat has no attacker").into())
    }

    pub(crate) fn declare_attacker(&mut self, player: PlayerId, unit: EntityId) -> GameResult<()> {
        self.ensure_current_player(player)?;
        if self.chain.is_some() {
            return Err(ChainError::AlreadyOpen.into());
        }
        self.interaction.ensure_idle()?;
        let attacker = self.state.unit(unit).ok_or(ValidationError::UnknownEntity(unit))?;
        if attacker.owner != player {
            return Err(ValidationError::NotOwned { entity: unit, player }.into());
        }
        if attacker.exhausted || !self.content.can_attack(&self.state, unit) {
            return Err(CombatError::CannotAttack(unit).into());
        }

        debug!(target: "tactics::combat", %player, attacker = %unit, "attack declared");
        self.send_transition(Phase::Attack)?;
        self.ensure_step(CombatStep::DeclareAttacker)?;
        self.perform_step(CombatStep::DeclareAttacker, |c| c.attacker = Some(unit))
    }

    pub(crate) fn declare_target(&mut self, player: PlayerId, target: EntityId) -> GameResult<()> {
        self.ensure_current_player(player)?;
        self.ensure_step(CombatStep::DeclareTarget)?;
        self.interaction.ensure_idle()?;
        let attacker = self.attacker()?;

        let defender = target
            .as_player()
            .or_else(|| self.state.unit(target).map(|u| u.owner));
        if defender != Some(player.opponent()) || !self.content.can_be_attacked(&self.state, attacker, target) {
            return Err(CombatError::IllegalTarget(target).into());
        }
        self.perform_step(CombatStep::DeclareTarget, |c| c.target = Some(target))
    }

    pub(crate) fn declare_blocker(&mut self, player: PlayerId, blocker: Option<EntityId>) -> GameResult<()> {
        self.ensure_step(CombatStep::DeclareBlocker)?;
        let attacking_player = self.phases.current_player();
        if player != attacking_player.opponent() {
            return Err(CombatError::NotDefender(player).into());
        }
        if self.chain.is_some() {
            return Err(ChainError::AlreadyOpen.into());
        }
        self.interaction.ensure_idle()?;
        let attacker = self.attacker()?;
        if let Some(unit) = blocker {
            let owned = self.state.unit(unit).is_some_and(|u| u.owner == player);
            if !owned || !self.content.can_block(&self.state, attacker, unit) {
                return Err(CombatError::CannotBlock(unit).into());
            }
        }

        self.perform_step(CombatStep::DeclareBlocker, |c| c.blocker = blocker)?;
        self.emit(CombatEvent::BeforeStep(CombatStep::BuildingChain));

        let completion: EffectHandler = Box::new(|g, _| g.resolve_combat());
        self.chain = Some(EffectChain::new(attacking_player).with_completion(completion));
        self.emit(ChainEvent::Opened {
            priority: attacking_player,
        });
        Ok(())
    }

    pub(crate) fn cancel_attack(&mut self, player: PlayerId) -> GameResult<()> {
        self.ensure_current_player(player)?;
        self.interaction.ensure_idle()?;
        let combat = self.combat_mut()?;
        if !matches!(combat.step, CombatStep::DeclareTarget | CombatStep::DeclareBlocker) {
            return Err(CombatError::NotCancellable.into());
        }
        combat.cancelled = true;
        let attacker = combat.attacker;

        debug!(target: "tactics::combat", %player, "attack withdrawn");
        self.emit(CombatEvent::Cancelled { attacker });
        self.schedule_transition(Phase::Main);
        Ok(())
    }

    /// Cancel the attack in progress. For content handlers reacting to it.
    ///
    /// Only possible while the combat chain is open. Combat then resolves
    /// without damage.
    pub fn cancel_combat(&mut self) -> GameResult<()> {
        if !self.can_cancel_combat() {
            return Err(CombatError::NotCancellable.into());
        }
        self.combat_mut()?.cancelled = true;
        Ok(())
    }

    /// Check if an attack is waiting on its response chain.
    #[must_use]
    pub fn can_cancel_combat(&self) -> bool {
        self.phases
            .context::<CombatPhase>()
            .is_ok_and(|c| c.step == CombatStep::BuildingChain && !c.cancelled)
    }

    /// Completion of the combat chain.
    pub(crate) fn resolve_combat(&mut self) -> GameResult<()> {
        self.emit(CombatEvent::AfterStep(CombatStep::BuildingChain));
        let combat = self.combat_mut()?;
        combat.step = CombatStep::Resolving;
        let (attacker, target, blocker, cancelled) =
            (combat.attacker, combat.target, combat.blocker, combat.cancelled);
        self.emit(CombatEvent::BeforeStep(CombatStep::Resolving));

        let attacker_alive = attacker.is_some_and(|a| self.state.unit(a).is_some());
        match (attacker, target) {
            (Some(attacker), Some(target)) if !cancelled && attacker_alive => {
                let declaration = AttackDeclaration {
                    attacker,
                    target,
                    blocker: blocker.filter(|&b| self.is_alive(b)),
                };
                let reports = self.content.resolve_combat(&self.state, &declaration);
                for report in reports {
                    if !self.is_alive(report.target) {
                        continue;
                    }
                    self.deal_damage(report.source, report.target, report.amount)?;
                    self.emit(CombatEvent::DamageDealt(report));
                }
                if let Some(unit) = self.state.unit_mut(attacker) {
                    unit.exhausted = true;
                }
            }
            _ => {
                debug!(target: "tactics::combat", ?attacker, cancelled, attacker_alive, "combat fizzled");
                self.emit(CombatEvent::Cancelled { attacker });
            }
        }
        self.emit(CombatEvent::AfterStep(CombatStep::Resolving));

        if !self.check_lethal()? {
            self.schedule_transition(Phase::Main);
        }
        Ok(())
    }

    /// Attack exit hook: an attack left before resolving counts as cancelled.
    pub(crate) fn exit_attack(&mut self) -> GameResult<()> {
        let combat = self.combat()?;
        if combat.cancelled || combat.step == CombatStep::Resolving {
            return Ok(());
        }
        let attacker = combat.attacker;
        self.emit(CombatEvent::Cancelled { attacker });
        Ok(())
    }
}
