//! Performance benchmarks for the battle engine
//!
//! Two iteration modes:
//!
//! 1. **Fresh** - Build a new session from the content tables each iteration
//! 2. **Snapshot** - Clone a prepared session each iteration
//!
//! Both play the starter deck against the Slime with a random controller.
//! A third group measures the parallel simulation throughput.

use card_battle_rs::{
    game::{
        controllers::RandomController, BattleConfig, BattleLoop, BattleReport, BattleSession,
        PlayerSetup, VerbosityLevel,
    },
    journal::BattleJournal,
    loader::{builtin, BattleInitializer, ContentTables, DeckList},
    simulation::{run_simulation, SimulationSetup},
    Result,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};

/// Metrics collected during one battle
#[derive(Debug, Clone)]
struct BattleMetrics {
    turns: u32,
    /// Journal length
    events: usize,
    duration: Duration,
}

impl BattleMetrics {
    fn battles_per_sec(&self) -> f64 {
        1.0 / self.duration.as_secs_f64()
    }

    fn events_per_turn(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.events as f64 / self.turns as f64
        }
    }
}

struct BenchmarkSetup {
    content: ContentTables,
    deck: DeckList,
}

impl BenchmarkSetup {
    fn load() -> Self {
        BenchmarkSetup {
            content: builtin::content(),
            deck: builtin::starter_deck(),
        }
    }

    fn session(&self, seed: u64) -> Result<BattleSession> {
        BattleInitializer::new(&self.content).init_from_deck(
            PlayerSetup::new("Hero", 80, 3),
            &self.deck,
            "Slime",
            seed,
        )
    }
}

fn play(session: &mut BattleSession, seed: u64) -> Result<BattleReport> {
    let mut controller = RandomController::with_seed(seed);
    BattleLoop::new(session)
        .with_verbosity(VerbosityLevel::Silent)
        .run(&mut controller)
}

fn run_battle_with_metrics(setup: &BenchmarkSetup, seed: u64) -> Result<BattleMetrics> {
    let start = Instant::now();
    let mut session = setup.session(seed)?;
    let report = play(&mut session, seed)?;
    Ok(BattleMetrics {
        turns: report.turns,
        events: session.journal.len(),
        duration: start.elapsed(),
    })
}

/// Benchmark: Fresh mode - build a new session each iteration
fn bench_battle_fresh(c: &mut Criterion) {
    let setup = BenchmarkSetup::load();
    let mut group = c.benchmark_group("battle_execution");
    group.sample_size(50);

    let seed = 42u64;
    println!("\nWarmup battle (seed {}):", seed);
    if let Ok(metrics) = run_battle_with_metrics(&setup, seed) {
        println!("  Turns: {}", metrics.turns);
        println!("  Events: {}", metrics.events);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Battles/sec: {:.2}", metrics.battles_per_sec());
        println!("  Events/turn: {:.2}", metrics.events_per_turn());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| {
            run_battle_with_metrics(&setup, black_box(seed))
                .expect("battle should complete successfully")
        });
    });

    group.finish();
}

/// Benchmark: Snapshot mode - clone a prepared session each iteration
fn bench_battle_snapshot(c: &mut Criterion) {
    let setup = BenchmarkSetup::load();
    let mut group = c.benchmark_group("battle_execution");
    group.sample_size(50);

    let seed = 42u64;
    let mut initial = setup.session(seed).expect("failed to initialize battle");
    initial.journal = BattleJournal::disabled();

    group.bench_function(BenchmarkId::new("snapshot", seed), |b| {
        b.iter(|| {
            let mut session = initial.clone();
            play(&mut session, black_box(seed)).expect("battle should complete successfully")
        });
    });

    group.finish();
}

/// Benchmark: many battles across the rayon pool
fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for games in [64usize, 256] {
        let setup = SimulationSetup {
            games,
            seed: 1,
            enemy: "Goblin".to_string(),
            player: PlayerSetup::new("Hero", 80, 3),
            deck: builtin::starter_deck(),
            content: builtin::content(),
            config: BattleConfig::default(),
            max_turns: 100,
        };
        group.bench_with_input(BenchmarkId::new("games", games), &setup, |b, setup| {
            b.iter(|| run_simulation(setup).expect("simulation should complete"));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_battle_fresh,
    bench_battle_snapshot,
    bench_simulation
);
criterion_main!(benches);
