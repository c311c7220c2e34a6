//! Effect chain integration tests.
//!
//! These tests verify priority passing, LIFO resolution and combat
//! responses, both on the bare `EffectChain` and through the game.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use serde_json::{json, Value};
use tactics_core::cards::CardId;
use tactics_core::chain::{ChainState, Effect, EffectChain, PassOutcome, PASS_THRESHOLD};
use tactics_core::core::{DeckList, EntityId, GameConfig, PlayerId};
use tactics_core::events::{BoardEvent, CombatEvent, GameEvent};
use tactics_core::game::{Dispatch, Game};
use tactics_core::games::skirmish::{Skirmish, BOLT, PARRY, WISP};
use tactics_core::input::RawCommand;
use tactics_core::interaction::InteractionState;
use tactics_core::phases::{EndReason, Phase};
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

fn game_with(main: Vec<CardId>, health: i64) -> Game {
    let deck = DeckList::new(main.clone(), vec![]);
    let config = GameConfig::new(3)
        .with_starting_hand_size(main.len())
        .with_starting_health(health)
        .with_deck(p0(), deck.clone())
        .with_deck(p1(), deck)
        .without_fatigue();
    let mut game = Game::new(config, Rc::new(Skirmish::new())).unwrap();
    game.dispatch(p0(), &raw("skipDestiny", json!({}))).unwrap();
    game
}

fn hand_card(game: &Game, player: PlayerId, blueprint: CardId) -> EntityId {
    game.state()
        .player(player)
        .hand
        .iter()
        .copied()
        .find(|&id| game.state().card(id).is_some_and(|c| c.blueprint == blueprint))
        .unwrap()
}

/// Play Bolt at `target` and leave it on the chain.
fn cast_bolt(game: &mut Game, target: EntityId) -> EntityId {
    game.state_mut().player_mut(p0()).mana = 1;
    let bolt = hand_card(game, p0(), BOLT);
    game.dispatch(p0(), &raw("playCard", json!({ "card": bolt }))).unwrap();
    game.dispatch(p0(), &raw("commitPlayCard", json!({}))).unwrap();
    game.dispatch(p0(), &raw("selectCardOnBoard", json!({ "entity": target })))
        .unwrap();
    bolt
}

/// Summon a ready Wisp for p0 and send it at p1's hero, unblocked.
fn attack_with_wisp(game: &mut Game) -> EntityId {
    attack_with_wisp_into(game, None)
}

/// As `attack_with_wisp`, with p1 declaring `blocker`.
fn attack_with_wisp_into(game: &mut Game, blocker: Option<EntityId>) -> EntityId {
    let wisp = hand_card(game, p0(), WISP);
    game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap();
    game.dispatch(p0(), &raw("selectMinionSlot", json!({ "slot": { "player": 0, "index": 0 } })))
        .unwrap();
    game.state_mut().unit_mut(wisp).unwrap().exhausted = false;

    game.dispatch(p0(), &raw("declareAttacker", json!({ "unit": wisp }))).unwrap();
    assert_eq!(game.phase(), Phase::Attack);
    game.dispatch(p0(), &raw("declareTarget", json!({ "target": EntityId::player(p1()) })))
        .unwrap();
    game.dispatch(p1(), &raw("declareBlocker", json!({ "blocker": blocker }))).unwrap();
    assert_eq!(game.chain_state(), Some(ChainState::Building));
    wisp
}

fn saw(game: &Game, predicate: impl Fn(&GameEvent) -> bool) -> bool {
    game.snapshot().unwrap().events.iter().any(predicate)
}

// =============================================================================
// Priority
// =============================================================================

/// Test that a pass out of turn is rejected and never logged.
#[test]
fn test_pass_without_priority() {
    let mut game = game_with(vec![BOLT], 20);
    cast_bolt(&mut game, EntityId::player(p1()));
    let logged = game.log().len();

    let err = game.dispatch(p0(), &raw("pass", json!({}))).unwrap_err();
    assert_eq!(err.code(), "NO_PRIORITY");
    assert_eq!(game.log().len(), logged);
    assert_eq!(game.chain_view().unwrap().consecutive_passes, 0);
}

/// Test that passing with no chain open is rejected.
#[test]
fn test_pass_without_chain() {
    let mut game = game_with(vec![BOLT], 20);
    let err = game.dispatch(p0(), &raw("pass", json!({}))).unwrap_err();
    assert_eq!(err.code(), "NO_ONGOING_EFFECT_CHAIN");
}

/// Test that two passes resolve the chain and discard the spell.
#[test]
fn test_two_passes_resolve() {
    let mut game = game_with(vec![BOLT], 20);
    let bolt = cast_bolt(&mut game, EntityId::player(p1()));
    assert_eq!(game.state().card(bolt).unwrap().location, CardLocation::Resolving);

    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();
    assert_eq!(game.state().player(p1()).health, 20);
    let result = game.dispatch(p0(), &raw("pass", json!({}))).unwrap();

    assert_eq!(result, Dispatch::Completed);
    assert_eq!(game.state().player(p1()).health, 18);
    assert_eq!(game.state().card(bolt).unwrap().location, CardLocation::Discard);
    assert!(game.chain_state().is_none());
    assert_eq!(game.right_to_act(), p0());
}

/// Test that lethal damage from a resolving effect ends the game.
#[test]
fn test_lethal_effect_ends_game() {
    let mut game = game_with(vec![BOLT], 2);
    cast_bolt(&mut game, EntityId::player(p1()));
    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();
    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();

    assert_eq!(game.phase(), Phase::GameEnd);
    let outcome = game.outcome().unwrap();
    assert_eq!(outcome.winner, Some(p0()));
    assert_eq!(outcome.reason, EndReason::Lethal);
    assert!(game.chain_state().is_none());

    let err = game.dispatch(p1(), &raw("surrender", json!({}))).unwrap_err();
    assert_eq!(err.code(), "GAME_OVER");
}

// =============================================================================
// Combat Responses
// =============================================================================

/// Test that an unanswered attack resolves when both players pass.
#[test]
fn test_unanswered_attack_hits() {
    let mut game = game_with(vec![WISP, PARRY], 20);
    let wisp = attack_with_wisp(&mut game);

    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();

    assert_eq!(game.state().player(p1()).health, 19);
    assert_eq!(game.phase(), Phase::Main);
    assert!(game.state().unit(wisp).unwrap().exhausted);
    assert!(saw(&game, |e| matches!(e, GameEvent::Combat(CombatEvent::DamageDealt(_)))));
}

/// Test that Parry on the combat chain cancels the attack.
#[test]
fn test_parry_cancels_combat() {
    let mut game = game_with(vec![WISP, PARRY], 20);
    attack_with_wisp(&mut game);

    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    game.state_mut().player_mut(p1()).mana = 1;
    let parry = hand_card(&game, p1(), PARRY);

    let result = game.dispatch(p1(), &raw("playCard", json!({ "card": parry }))).unwrap();
    assert_eq!(
        result,
        Dispatch::Suspended {
            state: InteractionState::PlayingCard,
            owner: p1()
        }
    );
    game.dispatch(p1(), &raw("commitPlayCard", json!({}))).unwrap();
    assert_eq!(game.chain_view().unwrap().effects, vec![(parry, p1())]);
    assert_eq!(game.right_to_act(), p0());

    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();

    assert_eq!(game.state().player(p1()).health, 20);
    assert_eq!(game.phase(), Phase::Main);
    assert_eq!(game.state().card(parry).unwrap().location, CardLocation::Discard);
    assert!(saw(&game, |e| matches!(e, GameEvent::Combat(CombatEvent::Cancelled { .. }))));
}

/// Test that Parry against a blocked attack deals no damage to anyone.
#[test]
fn test_parry_cancels_blocked_combat() {
    let mut game = game_with(vec![WISP, PARRY], 20);
    let guard = hand_card(&game, p1(), WISP);
    game.state_mut()
        .summon(guard, SlotRef::new(p1(), 0), 1, 1)
        .unwrap();

    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    game.events().any.subscribe(move |e| {
        if matches!(
            e,
            GameEvent::Board(BoardEvent::Damaged { .. }) | GameEvent::Combat(CombatEvent::DamageDealt(_))
        ) {
            counter.set(counter.get() + 1);
        }
    });

    let wisp = attack_with_wisp_into(&mut game, Some(guard));
    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    game.state_mut().player_mut(p1()).mana = 1;
    let parry = hand_card(&game, p1(), PARRY);
    game.dispatch(p1(), &raw("playCard", json!({ "card": parry }))).unwrap();
    game.dispatch(p1(), &raw("commitPlayCard", json!({}))).unwrap();

    game.dispatch(p0(), &raw("pass", json!({}))).unwrap();
    game.dispatch(p1(), &raw("pass", json!({}))).unwrap();

    assert_eq!(game.phase(), Phase::Main);
    assert!(game.chain_state().is_none());
    assert_eq!(hits.get(), 0);
    assert_eq!(game.state().unit(guard).unwrap().health, 1);
    assert_eq!(game.state().unit(wisp).unwrap().health, 1);
    assert_eq!(game.state().player(p1()).health, 20);
}

/// Test that only the defender declares blockers.
#[test]
fn test_attacker_cannot_declare_blocker() {
    let mut game = game_with(vec![WISP], 20);
    let wisp = hand_card(&game, p0(), WISP);
    game.dispatch(p0(), &raw("playCard", json!({ "card": wisp }))).unwrap();
    game.dispatch(p0(), &raw("selectMinionSlot", json!({ "slot": { "player": 0, "index": 0 } })))
        .unwrap();
    game.state_mut().unit_mut(wisp).unwrap().exhausted = false;
    game.dispatch(p0(), &raw("declareAttacker", json!({ "unit": wisp }))).unwrap();
    game.dispatch(p0(), &raw("declareTarget", json!({ "target": EntityId::player(p1()) })))
        .unwrap();

    let err = game.dispatch(p0(), &raw("declareBlocker", json!({ "blocker": null }))).unwrap_err();
    assert_eq!(err.code(), "NOT_DEFENDER");
}

// =============================================================================
// Chain State Machine Properties
// =============================================================================

proptest! {
    /// Invariant: whoever holds priority acts; resolution order is the
    /// reverse of the order effects were added.
    #[test]
    fn chain_resolves_lifo(adds in proptest::collection::vec(any::<bool>(), 0..24)) {
        let mut chain: EffectChain<u32> = EffectChain::new(p0());
        let mut added = Vec::new();
        let mut passes = 0u8;

        for (n, add) in adds.into_iter().enumerate() {
            let holder = chain.current_player();
            if add {
                let depth = chain.add_effect(holder, Effect::new(EntityId(100 + n as u32), holder, n as u32)).unwrap();
                added.push(n as u32);
                passes = 0;
                prop_assert_eq!(depth, added.len());
                prop_assert_eq!(chain.current_player(), holder.opponent());
            } else {
                match chain.pass(holder).unwrap() {
                    PassOutcome::PriorityPassed { to } => {
                        passes += 1;
                        prop_assert!(passes < PASS_THRESHOLD);
                        prop_assert_eq!(to, holder.opponent());
                    }
                    PassOutcome::Resolve => {
                        prop_assert_eq!(passes + 1, PASS_THRESHOLD);
                        break;
                    }
                }
            }
            let waiting = chain.current_player().opponent();
            prop_assert!(chain.pass(waiting).is_err());
        }

        if chain.state() == ChainState::Resolving {
            let mut resolved = Vec::new();
            while let Some(effect) = chain.pop_resolving() {
                prop_assert_eq!(chain.resolving_controller(), Some(effect.controller));
                resolved.push(effect.handler);
            }
            added.reverse();
            prop_assert_eq!(resolved, added);
        } else {
            prop_assert_eq!(chain.len(), added.len());
            prop_assert_eq!(chain.state(), ChainState::Building);
        }
    }
}
