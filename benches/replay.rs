//! Benchmarks for command dispatch and log replay.
//!
//! Run with: `cargo bench --bench replay`

use std::hint::black_box;
use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use tactics_core::core::{EntityId, PlayerId};
use tactics_core::game::Game;
use tactics_core::games::skirmish::{self, Skirmish};
use tactics_core::input::{LoggedCommand, RawCommand};
use tactics_core::rules::ContentRules;

fn content() -> Rc<dyn ContentRules> {
    Rc::new(Skirmish::new())
}

/// Play `turns` turns of the demo match: skip destiny, try each hand card
/// into the first free slot, then end the turn.
fn play(turns: usize) -> Game {
    let mut game = Game::new(skirmish::demo_config(42), content()).unwrap_or_else(|e| panic!("{e}"));
    for _ in 0..turns {
        if game.is_over() {
            break;
        }
        let player = game.current_player();
        let _ = game.dispatch(player, &RawCommand::new("skipDestiny", json!({})));
        let hand: Vec<EntityId> = game.state().player(player).hand.iter().copied().collect();
        for card in hand {
            if game.dispatch(player, &RawCommand::new("playCard", json!({ "card": card }))).is_err() {
                continue;
            }
            let _ = game.dispatch(player, &RawCommand::new("commitPlayCard", json!({})));
            if let Some(slot) = game.state().empty_slots(player).into_iter().next() {
                let _ = game.dispatch(player, &RawCommand::new("selectMinionSlot", json!({ "slot": slot })));
            }
            let _ = game.dispatch(player, &RawCommand::new("cancelInteraction", json!({})));
        }
        let _ = game.dispatch(player, &RawCommand::new("endTurn", json!({})));
    }
    game
}

fn logged(turns: usize) -> Vec<LoggedCommand> {
    play(turns).log().entries().to_vec()
}

/// Benchmark replaying logs of increasing length.
fn benchmark_replay(c: &mut Criterion) {
    let config = skirmish::demo_config(42);
    let mut group = c.benchmark_group("Replay");

    for turns in [4, 16, 40] {
        let commands = logged(turns);
        group.bench_with_input(BenchmarkId::new("turns", turns), &commands, |b, commands| {
            b.iter(|| black_box(Game::replay(config.clone(), content(), black_box(commands))));
        });
    }
    group.finish();
}

/// Benchmark a single rejected command: checkpoint, fail, roll back, resync.
fn benchmark_rejection(c: &mut Criterion) {
    let mut game = play(8);
    let wrong = game.current_player().opponent();
    let command = RawCommand::new("endTurn", json!({}));

    c.bench_function("rejected_command", |b| {
        b.iter(|| black_box(game.dispatch(black_box(wrong), &command)));
    });
}

/// Benchmark the digest used to compare replays.
fn benchmark_digest(c: &mut Criterion) {
    let game = play(16);
    c.bench_function("state_digest", |b| {
        b.iter(|| black_box(game.state_digest()));
    });

    let snapshot = game.snapshot().cloned();
    c.bench_function("redact_snapshot", |b| {
        b.iter(|| black_box(snapshot.as_ref().map(|s| s.redacted_for(PlayerId::new(1)))));
    });
}

criterion_group!(benches, benchmark_replay, benchmark_rejection, benchmark_digest);
criterion_main!(benches);
