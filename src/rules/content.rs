//! Content rules trait and the values it hands back.
//!
//! ## Implementation Notes
//!
//! - Queries (`card_cost`, `can_attack`, ...) are pure functions of the
//!   current `GameState`.
//! - `card_play` and `ability` build closures; they are only run if the play
//!   is committed.
//! - Turn hooks get the whole game and may do anything a content handler
//!   may do.

use serde::{Deserialize, Serialize};

use crate::cards::Affinity;
use crate::core::{EntityId, PlayerId};
use crate::error::GameResult;
use crate::game::{EffectHandler, Game};
use crate::interaction::SelectionSpec;
use crate::state::{CardInstance, GameState, Unit};

/// What an effect does, and the targets it needs first.
pub struct EffectPlan {
    /// Target selection run before the effect is added to the chain.
    pub targeting: Option<SelectionSpec<EntityId>>,
    pub handler: EffectHandler,
}

impl EffectPlan {
    /// Untargeted effect.
    pub fn new(handler: impl FnOnce(&mut Game, &[EntityId]) -> GameResult<()> + 'static) -> Self {
        Self {
            targeting: None,
            handler: Box::new(handler),
        }
    }

    /// Require targets (builder pattern).
    #[must_use]
    pub fn with_targeting(mut self, spec: SelectionSpec<EntityId>) -> Self {
        self.targeting = Some(spec);
        self
    }
}

impl std::fmt::Debug for EffectPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectPlan")
            .field("targeted", &self.targeting.is_some())
            .finish()
    }
}

/// What playing a card does.
#[derive(Debug)]
pub enum CardPlay {
    /// Summon a unit into a slot of the player's choice.
    Minion { attack: i64, health: i64 },

    /// Add an effect to the chain. Reactive spells may only be played in
    /// response.
    Spell { reactive: bool, effect: EffectPlan },
}

impl CardPlay {
    #[must_use]
    pub fn is_reactive(&self) -> bool {
        matches!(self, CardPlay::Spell { reactive: true, .. })
    }
}

/// A unit ability.
#[derive(Debug)]
pub struct AbilityUse {
    pub cost: u32,
    pub effect: EffectPlan,
}

/// An attack as declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDeclaration {
    pub attacker: EntityId,
    pub target: EntityId,
    /// Blocker, if one was declared and is still alive.
    pub blocker: Option<EntityId>,
}

impl AttackDeclaration {
    /// Entity that receives the attacker's damage.
    #[must_use]
    pub fn defender(&self) -> EntityId {
        self.blocker.unwrap_or(self.target)
    }
}

/// One hit dealt in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub source: EntityId,
    pub target: EntityId,
    pub amount: i64,
}

/// Card pool and combat rules.
pub trait ContentRules {
    /// Mana cost of playing a card.
    fn card_cost(&self, state: &GameState, card: &CardInstance) -> u32;

    /// What playing a card does. `None` if the card cannot be played from
    /// hand.
    fn card_play(&self, state: &GameState, card: &CardInstance) -> Option<CardPlay>;

    /// A unit's ability by index. `None` if it has no such ability.
    fn ability(&self, _state: &GameState, _unit: &Unit, _index: u8) -> Option<AbilityUse> {
        None
    }

    /// Affinities a destiny card offers.
    fn destiny_affinities(&self, _state: &GameState, _card: &CardInstance) -> Vec<Affinity> {
        Vec::new()
    }

    fn can_attack(&self, _state: &GameState, _unit: EntityId) -> bool {
        true
    }

    fn can_be_attacked(&self, _state: &GameState, _attacker: EntityId, _target: EntityId) -> bool {
        true
    }

    fn can_block(&self, _state: &GameState, _attacker: EntityId, _blocker: EntityId) -> bool {
        true
    }

    /// Derived-stat check on top of chain priority.
    fn can_add_effect(&self, _state: &GameState, _player: PlayerId) -> bool {
        true
    }

    /// Damage dealt by an attack.
    ///
    /// By default the attacker hits the blocker (or the target) for its
    /// attack, and a unit defender strikes back for its own attack.
    fn resolve_combat(&self, state: &GameState, attack: &AttackDeclaration) -> Vec<DamageReport> {
        let Some(attacker) = state.unit(attack.attacker) else {
            return Vec::new();
        };
        let defender = attack.defender();
        let mut reports = vec![DamageReport {
            source: attacker.id,
            target: defender,
            amount: attacker.attack,
        }];
        if let Some(unit) = state.unit(defender) {
            reports.push(DamageReport {
                source: unit.id,
                target: attacker.id,
                amount: unit.attack,
            });
        }
        reports.retain(|r| r.amount > 0);
        reports
    }

    /// Runs when a player's Draw phase begins, before the draw.
    fn on_turn_start(&self, _game: &mut Game, _player: PlayerId) -> GameResult<()> {
        Ok(())
    }

    /// Runs when a player's End phase begins.
    fn on_turn_end(&self, _game: &mut Game, _player: PlayerId) -> GameResult<()> {
        Ok(())
    }
}
