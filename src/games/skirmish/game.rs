//! Skirmish content rules.

use crate::cards::{Affinity, CardDefinition, CardKind, CardRegistry};
use crate::core::{EntityId, PlayerId};
use crate::error::GameResult;
use crate::game::Game;
use crate::interaction::SelectionSpec;
use crate::rules::{AbilityUse, CardPlay, ContentRules, EffectPlan};
use crate::state::{CardInstance, CardLocation, GameState, Unit};

use super::cards::{self, BOLT, EMBER_DRAKE, FORKED_LIGHTNING, PARRY, SCOUT};

/// Skirmish card pool.
#[derive(Clone, Debug)]
pub struct Skirmish {
    registry: CardRegistry,
}

impl Skirmish {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: cards::registry(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    fn definition(&self, card: &CardInstance) -> Option<&CardDefinition> {
        self.registry.get(card.blueprint)
    }

    fn spell_effect(&self, state: &GameState, card: &CardInstance) -> Option<EffectPlan> {
        let source = card.id;
        let owner = card.owner;
        let plan = match card.blueprint {
            BOLT => EffectPlan::new(move |g, targets| strike(g, source, targets, 2)).with_targeting(
                SelectionSpec::new(heroes().chain(state.units().keys().copied()))
                    .eligible(|state, _, target| target.is_player() || state.unit(*target).is_some())
                    .exactly(1),
            ),
            FORKED_LIGHTNING => EffectPlan::new(move |g, targets| strike(g, source, targets, 1)).with_targeting(
                SelectionSpec::new(state.units_of(owner.opponent()).map(|u| u.id))
                    .eligible(|state, _, target| state.unit(*target).is_some())
                    .up_to(2),
            ),
            PARRY => EffectPlan::new(|g, _| {
                if g.can_cancel_combat() {
                    g.cancel_combat()?;
                }
                Ok(())
            }),
            SCOUT => EffectPlan::new(move |g, _| {
                let options = g.state().top_of_deck(owner, 3);
                g.start_choosing_cards(owner, options, 1, 1, move |g, decision| {
                    for &card in decision.entities() {
                        g.state_mut().move_card(card, CardLocation::Hand)?;
                    }
                    Ok(())
                })
            }),
            _ => return None,
        };
        Some(plan)
    }
}

impl Default for Skirmish {
    fn default() -> Self {
        Self::new()
    }
}

fn heroes() -> impl Iterator<Item = EntityId> {
    PlayerId::all().map(EntityId::player)
}

/// Deal `amount` to every target still standing.
fn strike(game: &mut Game, source: EntityId, targets: &[EntityId], amount: i64) -> GameResult<()> {
    for &target in targets {
        if game.is_alive(target) {
            game.deal_damage(source, target, amount)?;
        }
    }
    Ok(())
}

impl ContentRules for Skirmish {
    fn card_cost(&self, _state: &GameState, card: &CardInstance) -> u32 {
        self.definition(card).map_or(0, |d| d.cost)
    }

    fn card_play(&self, state: &GameState, card: &CardInstance) -> Option<CardPlay> {
        let definition = self.definition(card)?;
        match definition.kind {
            CardKind::Minion { attack, health } => Some(CardPlay::Minion { attack, health }),
            CardKind::Spell => Some(CardPlay::Spell {
                reactive: definition.reactive,
                effect: self.spell_effect(state, card)?,
            }),
            CardKind::Destiny => None,
        }
    }

    fn ability(&self, state: &GameState, unit: &Unit, index: u8) -> Option<AbilityUse> {
        let card = state.card(unit.id)?;
        let definition = self.definition(card)?;
        let printed = definition.abilities.get(usize::from(index))?;
        match (card.blueprint, index) {
            // Breathe: one damage to an enemy hero or unit.
            (EMBER_DRAKE, 0) => {
                let source = unit.id;
                let enemy = unit.owner.opponent();
                let pool = std::iter::once(EntityId::player(enemy)).chain(state.units_of(enemy).map(|u| u.id));
                Some(AbilityUse {
                    cost: printed.cost,
                    effect: EffectPlan::new(move |g, targets| strike(g, source, targets, 1)).with_targeting(
                        SelectionSpec::new(pool)
                            .eligible(|state, _, target| target.is_player() || state.unit(*target).is_some()),
                    ),
                })
            }
            _ => None,
        }
    }

    fn destiny_affinities(&self, _state: &GameState, card: &CardInstance) -> Vec<Affinity> {
        match self.definition(card) {
            Some(definition) if definition.kind == CardKind::Destiny => definition.affinities.clone(),
            _ => Vec::new(),
        }
    }
}
