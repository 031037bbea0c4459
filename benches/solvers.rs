use criterion::{black_box, criterion_group, criterion_main, Criterion};

use logic_magnets::engine::PuzzleState;
use logic_magnets::levels::{level, LEVELS};
use logic_magnets::solver::{solve, Algorithm};
use logic_magnets::utils::config_from_str;

const PUSH_ROW: &str = "
gpTG.";

fn criterion_bench(c: &mut Criterion) {
    for number in 1..=LEVELS.len() {
        let config = level(number).unwrap().unwrap();
        let state = PuzzleState::from_config(&config).unwrap();
        for algorithm in Algorithm::ALL {
            c.bench_function(&format!("level {} {}", number, algorithm), |b| {
                b.iter(|| {
                    let _ = solve(black_box(algorithm), black_box(&state));
                })
            });
        }
    }

    c.bench_function("push row astar", |b| {
        let state = PuzzleState::from_config(&config_from_str(PUSH_ROW).unwrap()).unwrap();
        b.iter(|| {
            let _ = solve(Algorithm::AStar, black_box(&state));
        })
    });
}

criterion_group!(benches, criterion_bench);
criterion_main!(benches);
