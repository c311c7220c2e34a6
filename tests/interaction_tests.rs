//! Interaction machine integration tests.
//!
//! These tests drive plays, selections and choices through `Game::dispatch`
//! with the Skirmish card pool.

use std::rc::Rc;

use serde_json::{json, Value};
use tactics_core::cards::{Affinity, CardId};
use tactics_core::core::{DeckList, EntityId, GameConfig, PlayerId};
use tactics_core::error::{GameError, InteractionError};
use tactics_core::game::{Dispatch, Game};
use tactics_core::games::skirmish::{
    Skirmish, BARREN_SHRINE, BOLT, CROSSROADS, EMBER_DRAKE, EMBER_SHRINE, FORKED_LIGHTNING, PARRY, SCOUT, SQUIRE,
    WISP,
};
use tactics_core::input::RawCommand;
use tactics_core::interaction::{InteractionState, SelectionSpec};
use tactics_core::phases::Phase;
use tactics_core::rules::{CardPlay, ContentRules, EffectPlan};
use tactics_core::state::{CardInstance, CardLocation, GameState, SlotRef};

fn p0() -> PlayerId {
    PlayerId::new(0)
}

fn p1() -> PlayerId {
    PlayerId::new(1)
}

fn raw(kind: &str, payload: Value) -> RawCommand {
    RawCommand::new(kind, payload)
}

/// Both players get `main` in hand and `destiny` face up. No fatigue.
fn config(main: Vec<CardId>, destiny: Vec<CardId>) -> GameConfig {
    let deck = DeckList::new(main.clone(), destiny);
    GameConfig::new(11)
        .with_starting_hand_size(main.len())
        .with_deck(p0(), deck.clone())
        .with_deck(p1(), deck)
        .without_fatigue()
}

fn new_game(config: GameConfig) -> Game {
    Game::new(config, Rc::new(Skirmish::new())).unwrap()
}

/// First card of `blueprint` owned by `player` in `location`.
fn find(game: &Game, player: PlayerId, blueprint: CardId, location: CardLocation) -> EntityId {
    game.state()
        .cards()
        .values()
        .find(|c| c.owner == player && c.blueprint == blueprint && c.location == location)
        .map(|c| c.id)
        .unwrap()
}

fn hand_card(game: &Game, player: PlayerId, blueprint: CardId) -> EntityId {
    find(game, player, blueprint, CardLocation::Hand)
}

fn to_main(game: &mut Game) {
    game.dispatch(p0(), &raw("skipDestiny", json!({}))).unwrap();
    assert_eq!(game.phase(), Phase::Main);
}

fn put_unit(game: &mut Game, player: PlayerId, blueprint: CardId, index: usize) -> EntityId {
    let card = hand_card(game, player, blueprint);
    game.state_mut()
        .summon(card, SlotRef::new(player, index), 1, 2)
        .unwrap();
    card
}

fn suspended(state: InteractionState, owner: PlayerId) -> Dispatch {
    Dispatch::Suspended { state, owner }
}

// =============================================================================
// Playing Cards
// =============================================================================

/// Test that a zero-cost minion skips payment and asks for a slot.
#[test]
fn test_zero_cost_minion_asks_for_slot() {
    let mut game = new_game(config(vec![WISP, SQUIRE], vec![]));
    to_main(&mut game);
    let wisp = hand_card(&game, p0(), WISP);

    let result = game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap();
    assert_eq!(result, suspended(InteractionState::SelectingMinionSlot, p0()));
    assert_eq!(game.state().card(wisp).unwrap().location, CardLocation::Resolving);

    let slot = json!({ "slot": { "player": 0, "index": 2 } });
    let result = game.dispatch(p0(), &raw("selectMinionSlot", slot)).unwrap();
    assert_eq!(result, Dispatch::Completed);

    let unit = game.state().unit(wisp).unwrap();
    assert_eq!(unit.slot, SlotRef::new(p0(), 2));
    assert!(unit.exhausted);
    assert_eq!(game.interaction_state(), InteractionState::Idle);
}

/// Test that a paid card waits for commit and pays on commit.
#[test]
fn test_paid_card_waits_for_commit() {
    let mut game = new_game(config(vec![SQUIRE], vec![BARREN_SHRINE]));
    let shrine = find(&game, p0(), BARREN_SHRINE, CardLocation::Destiny);
    game.dispatch(p0(), &raw("playDestinyCard", json!({ "card": shrine }))).unwrap();
    assert_eq!(game.phase(), Phase::Main);
    assert_eq!(game.state().player(p0()).mana, 1);

    let squire = hand_card(&game, p0(), SQUIRE);
    let result = game.dispatch(p0(), &raw("playCard", json!({ "card": squire }))).unwrap();
    assert_eq!(result, suspended(InteractionState::PlayingCard, p0()));
    assert_eq!(game.state().player(p0()).mana, 1);

    let result = game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();
    assert_eq!(result, suspended(InteractionState::SelectingMinionSlot, p0()));
    assert_eq!(game.state().player(p0()).mana, 0);
}

/// Test that cancelling a play returns the card to its hand position.
#[test]
fn test_cancel_play_restores_hand_order() {
    let mut game = new_game(config(vec![SQUIRE, BOLT, WISP], vec![]));
    to_main(&mut game);
    let hand_before: Vec<EntityId> = game.state().player(p0()).hand.iter().copied().collect();
    let squire = hand_card(&game, p0(), SQUIRE);

    game.dispatch(p0(), &raw("playCard", json!({ "card": squire }))).unwrap();
    assert!(!game.state().player(p0()).hand.contains(&squire));

    let result = game.dispatch(p0(), &raw("cancelInteraction", json!({}))).unwrap();
    assert_eq!(result, Dispatch::Completed);
    let hand_after: Vec<EntityId> = game.state().player(p0()).hand.iter().copied().collect();
    assert_eq!(hand_after, hand_before);
}

/// Test that an unpaid commit is rejected and the play stays pending.
#[test]
fn test_commit_without_mana_is_rejected() {
    let mut game = new_game(config(vec![SQUIRE], vec![]));
    to_main(&mut game);
    let squire = hand_card(&game, p0(), SQUIRE);
    game.dispatch(p0(), &raw("playCard", json!({ "card": squire }))).unwrap();

    let err = game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_MANA");
    assert_eq!(game.pending_decision(), Some((InteractionState::PlayingCard, p0())));
    assert_eq!(game.log().len(), 2);
}

/// Test that cancelling slot selection sends the minion to the discard pile.
#[test]
fn test_cancel_slot_selection_discards() {
    let mut game = new_game(config(vec![WISP], vec![]));
    to_main(&mut game);
    let wisp = hand_card(&game, p0(), WISP);
    game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap();

    game.dispatch(p0(), &raw("cancelInteraction", json!({}))).unwrap();
    assert_eq!(game.state().card(wisp).unwrap().location, CardLocation::Discard);
    assert!(game.state().unit(wisp).is_none());
}

/// Test that a minion cannot be played onto a full board.
#[test]
fn test_no_free_slot() {
    let mut game = new_game(config(vec![WISP, SQUIRE], vec![]).with_slot_count(1));
    to_main(&mut game);
    put_unit(&mut game, p0(), SQUIRE, 0);
    let wisp = hand_card(&game, p0(), WISP);

    let err = game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap_err();
    assert_eq!(err.code(), "NO_FREE_SLOT");
    assert_eq!(game.state().card(wisp).unwrap().location, CardLocation::Hand);
}

/// Test that only the active player may play outside a chain.
#[test]
fn test_inactive_player_cannot_play() {
    let mut game = new_game(config(vec![WISP], vec![]));
    to_main(&mut game);
    let wisp = hand_card(&game, p1(), WISP);

    let err = game.dispatch(p1(), &raw("playCard", json!({ "card": wisp }))).unwrap_err();
    assert_eq!(err.code(), "NOT_ACTIVE_PLAYER");
}

/// Test that reactive cards need a chain to respond to.
#[test]
fn test_reactive_card_needs_chain() {
    let mut game = new_game(config(vec![PARRY], vec![]));
    to_main(&mut game);
    let parry = hand_card(&game, p0(), PARRY);

    let err = game.dispatch(p0(), &raw("playCard", json!({ "card": parry }))).unwrap_err();
    assert_eq!(err.code(), "REACTIVE_ONLY");
}

// =============================================================================
// Selections
// =============================================================================

/// Test that Bolt targets through a single-pick selection.
#[test]
fn test_bolt_single_target() {
    let mut game = new_game(config(vec![BOLT], vec![]));
    to_main(&mut game);
    game.state_mut().player_mut(p0()).mana = 1;
    let bolt = hand_card(&game, p0(), BOLT);

    game.dispatch(p0(), &raw("playCard", json!({ "card": bolt }))).unwrap();
    let result = game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();
    assert_eq!(result, suspended(InteractionState::SelectingCardsOnBoard, p0()));

    let hero = EntityId::player(p1());
    let result = game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": hero }))).unwrap();
    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.chain_view().unwrap().effects.len(), 1);
    assert_eq!(game.right_to_act(), p1());
}

/// Test that picking an entity outside the pool is rejected.
#[test]
fn test_selection_rejects_ineligible_target() {
    let mut game = new_game(config(vec![FORKED_LIGHTNING, SQUIRE], vec![]));
    to_main(&mut game);
    let ours = put_unit(&mut game, p0(), SQUIRE, 0);
    put_unit(&mut game, p1(), SQUIRE, 0);
    game.state_mut().player_mut(p0()).mana = 2;
    let spell = hand_card(&game, p0(), FORKED_LIGHTNING);

    game.dispatch(p0(), &raw("playCard", json!({ "card": spell }))).unwrap();
    game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();

    let err = game
        .dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": ours })))
        .unwrap_err();
    assert_eq!(err.code(), "ILLEGAL_TARGET");
    assert_eq!(game.interaction_state(), InteractionState::SelectingCardsOnBoard);
}

/// Test that an up-to-two selection commits by itself at two picks.
#[test]
fn test_multi_select_auto_commits() {
    let mut game = new_game(config(vec![FORKED_LIGHTNING, SQUIRE, WISP], vec![]));
    to_main(&mut game);
    let a = put_unit(&mut game, p1(), SQUIRE, 0);
    let b = put_unit(&mut game, p1(), WISP, 1);
    game.state_mut().player_mut(p0()).mana = 2;
    let spell = hand_card(&game, p0(), FORKED_LIGHTNING);

    game.dispatch(p0(), &raw("playCard", json!({ "card": spell }))).unwrap();
    game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();

    let result = game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": a }))).unwrap();
    assert_eq!(result, suspended(InteractionState::SelectingCardsOnBoard, p0()));

    let err = game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": a }))).unwrap_err();
    assert_eq!(err.code(), "ALREADY_SELECTED");

    let result = game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": b }))).unwrap();
    assert_eq!(result, Dispatch::Completed);

    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();
    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    assert_eq!(game.state().unit(a).unwrap().health, 1);
    assert_eq!(game.state().unit(b).unwrap().health, 1);
    assert!(game.chain_state().is_none());
    assert_eq!(game.state().card(spell).unwrap().location, CardLocation::Discard);
}

/// Test that a partial selection can be committed early.
#[test]
fn test_commit_partial_selection() {
    let mut game = new_game(config(vec![FORKED_LIGHTNING, SQUIRE, WISP], vec![]));
    to_main(&mut game);
    let a = put_unit(&mut game, p1(), SQUIRE, 0);
    put_unit(&mut game, p1(), WISP, 1);
    game.state_mut().player_mut(p0()).mana = 2;
    let spell = hand_card(&game, p0(), FORKED_LIGHTNING);

    game.dispatch(p0(), &raw("playCard", json!({ "card": spell }))).unwrap();
    game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();

    let err = game.dispatch(p0(), &raw("commitSelection", json!({}))).unwrap_err();
    assert_eq!(err.code(), "CANNOT_COMMIT");

    game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": a }))).unwrap();
    let result = game.dispatch(p0(), &raw("commitSelection", json!({}))).unwrap();
    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.chain_view().unwrap().effects.len(), 1);
}

/// Test that committing outside a selection names the state actually live.
#[test]
fn test_commit_selection_without_selection() {
    let mut game = new_game(config(vec![WISP], vec![]));
    to_main(&mut game);

    let err = game.dispatch(p0(), &raw("commitSelection", json!({}))).unwrap_err();
    assert_eq!(err.code(), "NO_SELECTION");
    assert_eq!(
        err,
        GameError::from(InteractionError::NoSelection {
            actual: InteractionState::Idle
        })
    );
    assert_eq!(game.phase(), Phase::Main);
}

/// Test that a spell with no legal targets fizzles after payment.
#[test]
fn test_impossible_targeting_fizzles() {
    let mut game = new_game(config(vec![FORKED_LIGHTNING], vec![]));
    to_main(&mut game);
    game.state_mut().player_mut(p0()).mana = 2;
    let spell = hand_card(&game, p0(), FORKED_LIGHTNING);

    game.dispatch(p0(), &raw("playCard", json!({ "card": spell }))).unwrap();
    let result = game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();

    assert_eq!(result, Dispatch::Completed);
    assert!(game.chain_state().is_none());
    assert_eq!(game.state().card(spell).unwrap().location, CardLocation::Discard);
    assert_eq!(game.state().player(p0()).mana, 0);
}

/// Content whose only spell is free and needs two distinct picks from a
/// pool holding just the opposing hero. It cannot be cancelled.
struct DoubleTap;

impl ContentRules for DoubleTap {
    fn card_cost(&self, _state: &GameState, _card: &CardInstance) -> u32 {
        0
    }

    fn card_play(&self, _state: &GameState, card: &CardInstance) -> Option<CardPlay> {
        let foe = EntityId::player(card.owner.opponent());
        let targeting = SelectionSpec::new([foe]).exactly(2).mandatory();
        Some(CardPlay::Spell {
            reactive: false,
            effect: EffectPlan::new(|_, _| Ok(())).with_targeting(targeting),
        })
    }
}

/// Test that a selection which runs out of candidates mid-way cancels
/// itself instead of waiting forever.
#[test]
fn test_selection_cancels_when_candidates_run_out() {
    let mut game = Game::new(config(vec![BOLT], vec![]), Rc::new(DoubleTap)).unwrap();
    to_main(&mut game);
    let spell = hand_card(&game, p0(), BOLT);

    let result = game.dispatch(p0(), &raw("playCard", json!({ "card": spell }))).unwrap();
    assert_eq!(result, suspended(InteractionState::SelectingCardsOnBoard, p0()));

    let foe = EntityId::player(p1());
    let result = game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": foe }))).unwrap();
    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.interaction_state(), InteractionState::Idle);
    assert!(game.pending_decision().is_none());
    assert!(game.chain_state().is_none());
    assert_eq!(game.state().card(spell).unwrap().location, CardLocation::Discard);

    game.dispatch(p0(), &raw("endTurn", json!({}))).unwrap();
    assert_eq!(game.current_player(), p1());
}

// =============================================================================
// Abilities
// =============================================================================

/// Test that an ability is paid, targeted and limited to once per turn.
#[test]
fn test_ability_once_per_turn() {
    let mut game = new_game(config(vec![EMBER_DRAKE], vec![]));
    to_main(&mut game);
    let drake = put_unit(&mut game, p0(), EMBER_DRAKE, 0);
    game.state_mut().player_mut(p0()).mana = 2;

    let result = game
        .dispatch(p0(), &raw("useAbility", json!({ "unit": drake, "ability": 0 })))
        .unwrap();
    assert_eq!(result, suspended(InteractionState::UsingAbility, p0()));
    game.dispatch(p0(), &raw("commitAbility", json!({}))).unwrap();
    let hero = EntityId::player(p1());
    game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": hero }))).unwrap();
    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();
    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();

    assert_eq!(game.state().player(p1()).health, 19);
    assert_eq!(game.state().player(p0()).mana, 1);

    let err = game
        .dispatch(p0(), &raw("useAbility", json!({ "unit": drake, "ability": 0 })))
        .unwrap_err();
    assert_eq!(err.code(), "ABILITY_EXHAUSTED");

    let err = game
        .dispatch(p0(), &raw("useAbility", json!({ "unit": drake, "ability": 1 })))
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_ABILITY");
}

// =============================================================================
// Choices
// =============================================================================

/// Test that a two-affinity destiny card pauses on a mandatory choice.
#[test]
fn test_affinity_choice_is_mandatory() {
    let mut game = new_game(config(vec![SQUIRE], vec![CROSSROADS]));
    let card = find(&game, p0(), CROSSROADS, CardLocation::Destiny);

    let result = game.dispatch(p0(), &raw("playDestinyCard", json!({ "card": card }))).unwrap();
    assert_eq!(result, suspended(InteractionState::ChoosingAffinity, p0()));

    let err = game.dispatch(p0(), &raw("cancelInteraction", json!({}))).unwrap_err();
    assert_eq!(err.code(), "NOT_CANCELLABLE");

    let err = game
        .dispatch(p0(), &raw("chooseAffinity", json!({ "affinity": "earth" })))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_CHOICE");

    let result = game
        .dispatch(p0(), &raw("chooseAffinity", json!({ "affinity": "water" })))
        .unwrap();
    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.phase(), Phase::Main);
    let affinities: Vec<Affinity> = game.state().player(p0()).affinities.iter().copied().collect();
    assert_eq!(affinities, vec![Affinity::Water]);
}

/// Test that a single-affinity destiny card chooses by itself.
#[test]
fn test_single_affinity_is_automatic() {
    let mut game = new_game(config(vec![SQUIRE], vec![EMBER_SHRINE]));
    let card = find(&game, p0(), EMBER_SHRINE, CardLocation::Destiny);

    let result = game.dispatch(p0(), &raw("playDestinyCard", json!({ "card": card }))).unwrap();
    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.phase(), Phase::Main);
    assert!(game.state().player(p0()).affinities.contains(&Affinity::Fire));
    assert_eq!(game.state().player(p0()).max_mana, 1);
}

/// Test that Scout offers the top of the deck during resolution.
#[test]
fn test_scout_choice_during_resolution() {
    let deck = DeckList::new(vec![SQUIRE, WISP, BOLT, SCOUT], vec![]);
    let config = GameConfig::new(5)
        .with_starting_hand_size(0)
        .with_deck(p0(), deck.clone())
        .with_deck(p1(), deck)
        .without_fatigue();
    let mut game = new_game(config);
    to_main(&mut game);

    let scout = game
        .state()
        .cards()
        .values()
        .find(|c| c.owner == p0() && c.blueprint == SCOUT)
        .map(|c| c.id)
        .unwrap();
    if game.state().card(scout).unwrap().location != CardLocation::Hand {
        game.state_mut().move_card(scout, CardLocation::Hand).unwrap();
    }
    game.state_mut().player_mut(p0()).mana = 1;

    game.dispatch(p0(), &raw("playCard", json!({ "card": scout }))).unwrap();
    game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();
    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();
    let result = game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    assert_eq!(result, suspended(InteractionState::ChoosingCards, p0()));

    let offered = game.state().top_of_deck(p0(), 3);
    assert!(offered.len() >= 2);

    let err = game
        .dispatch(p0(), &raw("chooseCards", json!({ "cards": offered })))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_CHOICE");

    let pick = offered[0];
    let result = game.dispatch(p0(), &raw("chooseCards", json!({ "cards": [pick] }))).unwrap();
    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.state().card(pick).unwrap().location, CardLocation::Hand);
    assert!(game.chain_state().is_none());
    assert_eq!(game.state().card(scout).unwrap().location, CardLocation::Discard);
}
