//! Board state: everything the content layer reads and the scheduler
//! checkpoints.
//!
//! ## Persistence
//!
//! All collections are `im` persistent structures, so cloning a
//! `GameState` is O(1). The scheduler clones the state before every command
//! and swaps the clone back in when the command is rejected.
//!
//! ## Ordering
//!
//! `OrdMap` keeps cards and units in id order, so iteration (and therefore
//! any decision derived from it) is identical across replays.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::zone::{CardLocation, SlotRef};
use crate::cards::{Affinity, CardId};
use crate::core::{EntityId, GameConfig, GameRng, PlayerId, PlayerMap};
use crate::error::{GameResult, InteractionError, InvariantError, ValidationError};

/// A physical card in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub id: EntityId,
    pub blueprint: CardId,
    pub owner: PlayerId,
    pub location: CardLocation,
}

/// A minion on the board. Shares its `EntityId` with the card it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: EntityId,
    pub owner: PlayerId,
    pub slot: SlotRef,
    pub attack: i64,
    pub health: i64,

    /// Exhausted units cannot attack. Cleared at the start of the owner's turn.
    pub exhausted: bool,

    /// Ability indices used this turn.
    pub abilities_used: SmallVec<[u8; 2]>,
}

/// One player's side of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBoard {
    pub health: i64,
    pub mana: u32,
    pub max_mana: u32,
    pub affinities: Vector<Affinity>,
    pub hand: Vector<EntityId>,
    /// Top of deck is the last element.
    pub deck: Vector<EntityId>,
    pub destiny: Vector<EntityId>,
    pub resources: Vector<EntityId>,
    pub discard: Vector<EntityId>,
    pub slots: Vector<Option<EntityId>>,
    /// Damage dealt by the next empty-deck draw.
    pub fatigue: i64,
}

impl PlayerBoard {
    fn new(health: i64, slot_count: usize) -> Self {
        Self {
            health,
            mana: 0,
            max_mana: 0,
            affinities: Vector::new(),
            hand: Vector::new(),
            deck: Vector::new(),
            destiny: Vector::new(),
            resources: Vector::new(),
            discard: Vector::new(),
            slots: std::iter::repeat(None).take(slot_count).collect(),
            fatigue: 1,
        }
    }

    fn zone(&self, location: CardLocation) -> Option<&Vector<EntityId>> {
        match location {
            CardLocation::Deck => Some(&self.deck),
            CardLocation::Hand => Some(&self.hand),
            CardLocation::Destiny => Some(&self.destiny),
            CardLocation::Resources => Some(&self.resources),
            CardLocation::Discard => Some(&self.discard),
            CardLocation::Board(_) | CardLocation::Resolving => None,
        }
    }

    fn zone_mut(&mut self, location: CardLocation) -> Option<&mut Vector<EntityId>> {
        match location {
            CardLocation::Deck => Some(&mut self.deck),
            CardLocation::Hand => Some(&mut self.hand),
            CardLocation::Destiny => Some(&mut self.destiny),
            CardLocation::Resources => Some(&mut self.resources),
            CardLocation::Discard => Some(&mut self.discard),
            CardLocation::Board(_) | CardLocation::Resolving => None,
        }
    }
}

/// Complete board state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub players: PlayerMap<PlayerBoard>,
    cards: OrdMap<EntityId, CardInstance>,
    units: OrdMap<EntityId, Unit>,
    next_entity: EntityId,
}

impl GameState {
    /// Empty board for a config. Decks are dealt by the game facade.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            players: PlayerMap::new(|_| PlayerBoard::new(config.starting_health, config.slot_count)),
            cards: OrdMap::new(),
            units: OrdMap::new(),
            next_entity: EntityId::first_card(),
        }
    }

    /// Get a player's board.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerBoard {
        &self.players[player]
    }

    /// Get a player's board mutably.
    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerBoard {
        &mut self.players[player]
    }

    // === Cards ===

    /// Create a card instance at the back of a list zone.
    pub fn create_card(
        &mut self,
        blueprint: CardId,
        owner: PlayerId,
        location: CardLocation,
    ) -> GameResult<EntityId> {
        let id = self.next_entity;
        self.players[owner]
            .zone_mut(location)
            .ok_or_else(|| InvariantError::Corrupted(format!("cannot deal into {location:?}")))?
            .push_back(id);
        self.next_entity = id.next();
        self.cards.insert(
            id,
            CardInstance {
                id,
                blueprint,
                owner,
                location,
            },
        );
        Ok(id)
    }

    /// Look up a card instance.
    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    /// All card instances in id order.
    #[must_use]
    pub fn cards(&self) -> &OrdMap<EntityId, CardInstance> {
        &self.cards
    }

    /// Owner of a hero or card.
    #[must_use]
    pub fn owner_of(&self, entity: EntityId) -> Option<PlayerId> {
        entity
            .as_player()
            .or_else(|| self.cards.get(&entity).map(|c| c.owner))
    }

    /// Check if an entity is a hero or a card.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        entity.is_player() || self.cards.contains_key(&entity)
    }

    /// Move a card to a list zone (or the resolving area).
    ///
    /// Leaving the board removes the unit as well.
    pub fn move_card(&mut self, id: EntityId, to: CardLocation) -> GameResult<()> {
        if matches!(to, CardLocation::Board(_)) {
            return Err(InvariantError::Corrupted(format!("{id} must be summoned onto the board")).into());
        }
        let card = self.detach(id)?;
        self.attach(card.owner, id, to, None);
        Ok(())
    }

    /// Remove `card` from `player`'s hand into the resolving area.
    ///
    /// Returns the hand position it was taken from.
    pub fn take_from_hand(&mut self, player: PlayerId, id: EntityId) -> Result<usize, InteractionError> {
        let index = self.players[player]
            .hand
            .index_of(&id)
            .ok_or(InteractionError::NotInHand(id))?;
        self.players[player].hand.remove(index);
        if let Some(card) = self.cards.get_mut(&id) {
            card.location = CardLocation::Resolving;
        }
        Ok(index)
    }

    /// Put a card back into its owner's hand at `index`.
    pub fn return_to_hand(&mut self, id: EntityId, index: usize) -> GameResult<()> {
        let card = self.detach(id)?;
        self.attach(card.owner, id, CardLocation::Hand, Some(index));
        Ok(())
    }

    /// Draw the top card of a player's deck.
    ///
    /// Returns `None` if the deck is empty.
    pub fn draw(&mut self, player: PlayerId) -> Option<EntityId> {
        let id = self.players[player].deck.pop_back()?;
        self.attach(player, id, CardLocation::Hand, None);
        Some(id)
    }

    /// Top `count` cards of a deck, topmost first.
    #[must_use]
    pub fn top_of_deck(&self, player: PlayerId, count: usize) -> Vec<EntityId> {
        self.players[player].deck.iter().rev().take(count).copied().collect()
    }

    /// Shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId, rng: &mut GameRng) {
        let mut cards: Vec<EntityId> = self.players[player].deck.iter().copied().collect();
        rng.shuffle(&mut cards);
        self.players[player].deck = cards.into_iter().collect();
    }

    fn detach(&mut self, id: EntityId) -> GameResult<CardInstance> {
        let card = self
            .cards
            .get(&id)
            .cloned()
            .ok_or(ValidationError::UnknownEntity(id))?;
        match card.location {
            CardLocation::Board(slot) => {
                self.units.remove(&id);
                self.players[slot.player].slots.set(slot.index, None);
            }
            CardLocation::Resolving => {}
            location => {
                let zone = self.players[card.owner]
                    .zone_mut(location)
                    .ok_or_else(|| InvariantError::Corrupted(format!("{id} has no zone")))?;
                let index = zone
                    .index_of(&id)
                    .ok_or_else(|| InvariantError::Corrupted(format!("{id} missing from {location:?}")))?;
                zone.remove(index);
            }
        }
        Ok(card)
    }

    fn attach(&mut self, owner: PlayerId, id: EntityId, to: CardLocation, index: Option<usize>) {
        if let Some(zone) = self.players[owner].zone_mut(to) {
            match index {
                Some(i) => zone.insert(i.min(zone.len()), id),
                None => zone.push_back(id),
            }
        }
        if let Some(card) = self.cards.get_mut(&id) {
            card.location = to;
        }
    }

    /// Cards of a player in a list zone.
    #[must_use]
    pub fn zone(&self, player: PlayerId, location: CardLocation) -> Vec<EntityId> {
        self.players[player]
            .zone(location)
            .map(|z| z.iter().copied().collect())
            .unwrap_or_default()
    }

    // === Units ===

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// All units in id order.
    #[must_use]
    pub fn units(&self) -> &OrdMap<EntityId, Unit> {
        &self.units
    }

    /// Units controlled by a player, in id order.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values().filter(move |u| u.owner == player)
    }

    /// Empty slots on a player's side.
    #[must_use]
    pub fn empty_slots(&self, player: PlayerId) -> Vec<SlotRef> {
        self.players[player]
            .slots
            .iter()
            .enumerate()
            .filter(|(_, occupant)| occupant.is_none())
            .map(|(index, _)| SlotRef::new(player, index))
            .collect()
    }

    /// Check if a slot exists and is empty.
    #[must_use]
    pub fn is_slot_empty(&self, slot: SlotRef) -> bool {
        matches!(self.players[slot.player].slots.get(slot.index), Some(None))
    }

    /// Put a card onto the board as a unit.
    pub fn summon(&mut self, id: EntityId, slot: SlotRef, attack: i64, health: i64) -> GameResult<()> {
        if !self.is_slot_empty(slot) {
            return Err(InvariantError::Corrupted(format!("{slot} is not free")).into());
        }
        let card = self.detach(id)?;
        if card.owner != slot.player {
            return Err(InvariantError::Corrupted(format!("{id} summoned on the wrong side")).into());
        }
        self.players[slot.player].slots.set(slot.index, Some(id));
        if let Some(card) = self.cards.get_mut(&id) {
            card.location = CardLocation::Board(slot);
        }
        self.units.insert(
            id,
            Unit {
                id,
                owner: slot.player,
                slot,
                attack,
                health,
                // Summoning sickness.
                exhausted: true,
                abilities_used: SmallVec::new(),
            },
        );
        Ok(())
    }

    /// Deal damage to a hero or unit. Units at zero health are destroyed.
    ///
    /// Returns the target's remaining health.
    pub fn damage(&mut self, target: EntityId, amount: i64) -> GameResult<i64> {
        if let Some(player) = target.as_player() {
            let board = &mut self.players[player];
            board.health -= amount;
            return Ok(board.health);
        }
        let unit = self
            .units
            .get_mut(&target)
            .ok_or(ValidationError::UnknownEntity(target))?;
        unit.health -= amount;
        let remaining = unit.health;
        if remaining <= 0 {
            self.move_card(target, CardLocation::Discard)?;
        }
        Ok(remaining)
    }

    /// Unexhaust a player's units and reset their ability usage.
    pub fn ready_units(&mut self, player: PlayerId) {
        let owned: Vec<EntityId> = self.units.values().filter(|u| u.owner == player).map(|u| u.id).collect();
        for id in owned {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.exhausted = false;
                unit.abilities_used.clear();
            }
        }
    }

    // === Mana ===

    /// Pay a mana cost.
    pub fn spend_mana(&mut self, player: PlayerId, amount: u32) -> Result<(), ValidationError> {
        let board = &mut self.players[player];
        if board.mana < amount {
            return Err(ValidationError::InsufficientMana {
                needed: amount,
                available: board.mana,
            });
        }
        board.mana -= amount;
        Ok(())
    }

    /// Refill current mana to the maximum.
    pub fn refill_mana(&mut self, player: PlayerId) {
        let board = &mut self.players[player];
        board.mana = board.max_mana;
    }
}
