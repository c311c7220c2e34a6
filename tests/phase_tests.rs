//! Phase machine integration tests.
//!
//! These tests verify the turn cycle (Draw, Destiny, Main, End), the combat
//! sub-machine, fatigue and game end.

use std::rc::Rc;

use serde_json::{json, Value};
use tactics_core::cards::CardId;
use tactics_core::core::{DeckList, EntityId, GameConfig, PlayerId};
use tactics_core::events::{BoardEvent, CombatEvent, GameEvent, PhaseEvent};
use tactics_core::game::{Dispatch, Game};
use tactics_core::games::skirmish::{self, Skirmish, BARREN_SHRINE, SQUIRE, WISP};
use tactics_core::input::RawCommand;
use tactics_core::phases::{CombatStep, EndReason, Phase, PhaseController};
use tactics_core::state::{CardLocation, SlotRef};

fn p0() -> PlayerId {
    PlayerId::new(0)
}

fn p1() -> PlayerId {
    PlayerId::new(1)
}

fn raw(kind: &str, payload: Value) -> RawCommand {
    RawCommand::new(kind, payload)
}

fn skirmish() -> Rc<Skirmish> {
    Rc::new(Skirmish::new())
}

fn demo_game() -> Game {
    Game::new(skirmish::demo_config(21), skirmish()).unwrap()
}

fn events(game: &Game) -> &[GameEvent] {
    &game.snapshot().unwrap().events
}

/// Skip Destiny and end the turn for the current player.
fn pass_turn(game: &mut Game) {
    let player = game.current_player();
    game.dispatch(player, &raw("skipDestiny", json!({}))).unwrap();
    game.dispatch(player, &raw("endTurn", json!({}))).unwrap();
}

/// A game in p0's Main phase where each side holds `main`.
fn main_phase_game(main: Vec<CardId>) -> Game {
    let deck = DeckList::new(main.clone(), vec![]);
    let config = GameConfig::new(8)
        .with_starting_hand_size(main.len())
        .with_deck(p0(), deck.clone())
        .with_deck(p1(), deck)
        .without_fatigue();
    let mut game = Game::new(config, skirmish()).unwrap();
    game.dispatch(p0(), &raw("skipDestiny", json!({}))).unwrap();
    game
}

/// Put a ready unit of `player` on the board straight from hand.
fn ready_unit(game: &mut Game, player: PlayerId, blueprint: CardId, attack: i64, health: i64) -> EntityId {
    let card = game
        .state()
        .player(player)
        .hand
        .iter()
        .copied()
        .find(|&id| game.state().card(id).is_some_and(|c| c.blueprint == blueprint))
        .unwrap();
    let slot = game.state().empty_slots(player)[0];
    game.state_mut().summon(card, slot, attack, health).unwrap();
    game.state_mut().unit_mut(card).unwrap().exhausted = false;
    card
}

// =============================================================================
// Turn Cycle
// =============================================================================

/// Test that a new game runs the first Draw phase and waits in Destiny.
#[test]
fn test_setup_reaches_destiny() {
    let game = demo_game();
    assert_eq!(game.phase(), Phase::Destiny);
    assert_eq!(game.current_player(), p0());
    assert_eq!(game.turn(), 1);

    let config = game.config();
    assert_eq!(game.state().player(p0()).hand.len(), config.starting_hand_size + 1);
    assert_eq!(game.state().player(p1()).hand.len(), config.starting_hand_size);
    assert_eq!(game.state().player(p0()).destiny.len(), 4);
    assert_eq!(game.snapshot().unwrap().sequence, 1);
}

/// Test that ending a turn hands control over and ticks the turn counter
/// only when it comes back to the first player.
#[test]
fn test_turn_rotation() {
    let mut game = demo_game();

    pass_turn(&mut game);
    assert_eq!(game.current_player(), p1());
    assert_eq!(game.phase(), Phase::Destiny);
    assert_eq!(game.turn(), 1);
    assert!(events(&game).contains(&GameEvent::Phase(PhaseEvent::TurnEnded { player: p0(), turn: 1 })));

    pass_turn(&mut game);
    assert_eq!(game.current_player(), p0());
    assert_eq!(game.turn(), 2);
}

/// Test that a command outside its phases is rejected and not logged.
#[test]
fn test_end_turn_in_destiny_is_rejected() {
    let mut game = demo_game();

    let err = game.dispatch(p0(), &raw("endTurn", json!({}))).unwrap_err();
    assert_eq!(err.code(), "WRONG_PHASE");
    assert!(game.log().is_empty());
    assert_eq!(game.phase(), Phase::Destiny);
}

/// Test that only the active player acts in Destiny, once.
#[test]
fn test_destiny_gates() {
    let mut game = demo_game();

    let err = game.dispatch(p1(), &raw("skipDestiny", json!({}))).unwrap_err();
    assert_eq!(err.code(), "NOT_ACTIVE_PLAYER");

    let foreign = game.state().player(p1()).destiny[0];
    let err = game
        .dispatch(p0(), &raw("playDestinyCard", json!({ "card": foreign })))
        .unwrap_err();
    assert_eq!(err.code(), "NOT_IN_DESTINY");
}

/// Test that destiny cards raise max mana and refill on the next turn.
#[test]
fn test_destiny_mana_growth() {
    let deck = DeckList::new(vec![SQUIRE; 6], vec![BARREN_SHRINE, BARREN_SHRINE]);
    let config = GameConfig::new(2)
        .with_deck(p0(), deck.clone())
        .with_deck(p1(), deck);
    let mut game = Game::new(config, skirmish()).unwrap();

    let shrine = game.state().player(p0()).destiny[0];
    game.dispatch(p0(), &raw("playDestinyCard", json!({ "card": shrine }))).unwrap();
    assert_eq!(game.state().player(p0()).max_mana, 1);
    assert_eq!(game.state().card(shrine).unwrap().location, CardLocation::Resources);

    game.dispatch(p0(), &raw("endTurn", json!({}))).unwrap();
    pass_turn(&mut game);

    assert_eq!(game.current_player(), p0());
    assert_eq!(game.state().player(p0()).mana, 1);
    assert!(events(&game).contains(&GameEvent::Board(BoardEvent::ManaRefilled { player: p0(), mana: 1 })));
}

/// Test that the Main phase cannot end while a decision is pending.
#[test]
fn test_end_turn_while_paused() {
    let mut game = main_phase_game(vec![WISP]);
    let wisp = game.state().player(p0()).hand[0];
    game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap();

    let err = game.dispatch(p0(), &raw("endTurn", json!({}))).unwrap_err();
    assert_eq!(err.code(), "AWAITING_DECISION");
    assert_eq!(game.phase(), Phase::Main);
}

// =============================================================================
// Fatigue
// =============================================================================

/// Test that drawing from an empty deck deals growing damage.
#[test]
fn test_fatigue_grows() {
    let config = GameConfig::new(1).with_starting_hand_size(0);
    let mut game = Game::new(config, skirmish()).unwrap();

    assert_eq!(game.state().player(p0()).health, 19);
    assert!(events(&game).contains(&GameEvent::Board(BoardEvent::Fatigue { player: p0(), damage: 1 })));

    pass_turn(&mut game);
    assert_eq!(game.state().player(p1()).health, 19);
    pass_turn(&mut game);
    assert_eq!(game.state().player(p0()).health, 17);
    assert_eq!(game.state().player(p0()).fatigue, 3);
}

/// Test that fatigue can be lethal.
#[test]
fn test_fatigue_lethal() {
    let config = GameConfig::new(1).with_starting_hand_size(0).with_starting_health(1);
    let game = Game::new(config, skirmish()).unwrap();

    assert!(game.is_over());
    assert_eq!(game.phase(), Phase::GameEnd);
    let outcome = game.outcome().unwrap();
    assert_eq!(outcome.winner, Some(p1()));
    assert_eq!(outcome.reason, EndReason::Lethal);
}

// =============================================================================
// Combat
// =============================================================================

/// Test that combat steps advance in order and a blocker trades damage.
#[test]
fn test_blocked_attack() {
    let mut game = main_phase_game(vec![SQUIRE, WISP]);
    let attacker = ready_unit(&mut game, p0(), SQUIRE, 2, 2);
    let blocker = ready_unit(&mut game, p1(), WISP, 1, 1);

    game.dispatch(p0(), &raw("declareAttacker", json!({ "unit": attacker }))).unwrap();
    match game.phases().controller() {
        PhaseController::Attack(combat) => {
            assert_eq!(combat.step, CombatStep::DeclareTarget);
            assert_eq!(combat.attacker, Some(attacker));
        }
        other => panic!("expected Attack, got {other:?}"),
    }

    let err = game
        .dispatch(p0(), &raw("declareTarget", json!({ "target": EntityId::player(p0()) })))
        .unwrap_err();
    assert_eq!(err.code(), "ILLEGAL_ATTACK_TARGET");

    game.dispatch(p0(), &raw("declareTarget", json!({ "target": EntityId::player(p1()) })))
        .unwrap();
    game.dispatch(p1(), &raw("declareBlocker", json!({ "blocker": blocker }))).unwrap();
    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    let result = game.dispatch(p1(), &raw("pass", json!({}))).unwrap();

    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.phase(), Phase::Main);
    assert_eq!(game.state().player(p1()).health, 20);
    assert!(game.state().unit(blocker).is_none());
    assert_eq!(game.state().card(blocker).unwrap().location, CardLocation::Discard);
    assert_eq!(game.state().unit(attacker).unwrap().health, 1);
    assert!(game.state().unit(attacker).unwrap().exhausted);
}

/// Test that exhausted units cannot attack.
#[test]
fn test_exhausted_unit_cannot_attack() {
    let mut game = main_phase_game(vec![SQUIRE]);
    let unit = ready_unit(&mut game, p0(), SQUIRE, 1, 2);
    game.state_mut().unit_mut(unit).unwrap().exhausted = true;

    let err = game.dispatch(p0(), &raw("declareAttacker", json!({ "unit": unit }))).unwrap_err();
    assert_eq!(err.code(), "CANNOT_ATTACK");
    assert_eq!(game.phase(), Phase::Main);
}

/// Test that steps cannot be skipped.
#[test]
fn test_combat_out_of_order() {
    let mut game = main_phase_game(vec![SQUIRE]);
    let unit = ready_unit(&mut game, p0(), SQUIRE, 1, 2);
    game.dispatch(p0(), &raw("declareAttacker", json!({ "unit": unit }))).unwrap();

    let err = game.dispatch(p1(), &raw("declareBlocker", json!({ "blocker": null }))).unwrap_err();
    assert_eq!(err.code(), "COMBAT_OUT_OF_ORDER");
}

/// Test that the attacker may withdraw before blockers are declared.
#[test]
fn test_cancel_attack() {
    let mut game = main_phase_game(vec![SQUIRE]);
    let unit = ready_unit(&mut game, p0(), SQUIRE, 1, 2);
    game.dispatch(p0(), &raw("declareAttacker", json!({ "unit": unit }))).unwrap();
    game.dispatch(p0(), &raw("cancelAttack", json!({}))).unwrap();

    assert_eq!(game.phase(), Phase::Main);
    assert!(!game.state().unit(unit).unwrap().exhausted);
    assert!(events(&game).contains(&GameEvent::Combat(CombatEvent::Cancelled { attacker: Some(unit) })));
}

/// Test that units are readied at their owner's next Draw phase.
#[test]
fn test_units_ready_on_owner_turn() {
    let deck = DeckList::new(vec![WISP; 4], vec![]);
    let config = GameConfig::new(4)
        .with_deck(p0(), deck.clone())
        .with_deck(p1(), deck);
    let mut game = Game::new(config, skirmish()).unwrap();
    game.dispatch(p0(), &raw("skipDestiny", json!({}))).unwrap();

    let wisp = game.state().player(p0()).hand[0];
    game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap();
    let slot = SlotRef::new(p0(), 0);
    game.dispatch(p0(), &raw("selectMinionSlot", json!({ "slot": slot }))).unwrap();
    assert!(game.state().unit(wisp).unwrap().exhausted);

    game.dispatch(p0(), &raw("endTurn", json!({}))).unwrap();
    assert!(game.state().unit(wisp).unwrap().exhausted);
    pass_turn(&mut game);
    assert!(!game.state().unit(wisp).unwrap().exhausted);
}

// =============================================================================
// Game End
// =============================================================================

/// Test that surrender ends the game for the opponent.
#[test]
fn test_surrender() {
    let mut game = demo_game();
    let result = game.dispatch(p1(), &raw("surrender", json!({}))).unwrap();

    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.phase(), Phase::GameEnd);
    let outcome = game.outcome().unwrap();
    assert_eq!(outcome.winner, Some(p0()));
    assert_eq!(outcome.reason, EndReason::Surrender);
    assert!(matches!(events(&game).last(), Some(GameEvent::Command(_))));
}
