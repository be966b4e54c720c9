use criterion::{criterion_group, criterion_main, Criterion};
use mahjong_core::game_loop::{FirstActionSelector, GameRunner};
use mahjong_core::simulator::{run_batch_simple, BatchConfig};
use mahjong_engine::hand_evaluator::HandEvaluator;
use mahjong_engine::parser::parse_tiles;
use mahjong_engine::rule::GameRule;

fn bench_single_game(c: &mut Criterion) {
    c.bench_function("single_game_first_action", |b| {
        b.iter(|| {
            let mut runner = GameRunner::new(Some(42), GameRule::default()).unwrap();
            runner.run_to_completion(&mut FirstActionSelector).unwrap();
            runner.scores()
        });
    });
}

fn bench_batch_100(c: &mut Criterion) {
    let config = BatchConfig {
        num_games: 100,
        base_seed: Some(0),
        ..Default::default()
    };
    c.bench_function("batch_100_games", |b| {
        b.iter(|| run_batch_simple(&config).unwrap());
    });
}

fn bench_evaluator(c: &mut Criterion) {
    // Many overlapping readings: pure one-suit hand.
    let hand = parse_tiles("1w 1w 1w 2w 2w 2w 3w 3w 3w 4w 4w 4w 5w 5w").unwrap();
    c.bench_function("evaluate_full_flush_1000x", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                std::hint::black_box(HandEvaluator::new(&hand, &[]).calc(true));
            }
        });
    });
}

criterion_group!(benches, bench_single_game, bench_batch_100, bench_evaluator);
criterion_main!(benches);
