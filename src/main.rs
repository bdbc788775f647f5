//! Card Battle - Main Binary
//!
//! Runs single battles, batch simulations and dumps the built-in content

use card_battle_rs::{
    game::{
        controllers::{RandomController, ScriptedController},
        BattleConfig, BattleLoop, PlayerAction, PlayerController, PlayerSetup, VerbosityLevel,
    },
    loader::{
        BattleInitializer, ContentTables, DeckList, JsonProfileStore, PlayerProfile, ProfileStore,
    },
    simulation::{run_simulation, SimulationSetup},
    BattleError, Result,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Controller type for the player
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Makes random choices
    Random,
    /// Plays a fixed list of actions (requires --script)
    Scripted,
}

/// Verbosity level for battle output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Card Battle - turn-based card battle engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one battle and print the report
    Run {
        /// Enemy to fight
        #[arg(long, short = 'e', default_value = "Slime")]
        enemy: String,

        /// Deck file (text or .json); defaults to the starter deck
        #[arg(long, short = 'd')]
        deck: Option<PathBuf>,

        /// Content tables (JSON); defaults to the built-in content
        #[arg(long)]
        content: Option<PathBuf>,

        /// Battle configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Player controller type
        #[arg(long, value_enum, default_value = "random")]
        controller: ControllerType,

        /// JSON list of player actions for the scripted controller
        #[arg(long, value_name = "SCRIPT_FILE", required_if_eq("controller", "scripted"))]
        script: Option<PathBuf>,

        /// Set random seed for deterministic battles
        #[arg(long)]
        seed: Option<u64>,

        /// Player name
        #[arg(long, default_value = "Hero")]
        name: String,

        /// Player max health
        #[arg(long, default_value_t = 80)]
        health: i32,

        /// Player energy per turn
        #[arg(long, default_value_t = 3)]
        energy: i32,

        /// Profile key; the profile supplies the deck and receives the result
        #[arg(long, requires = "profile_dir")]
        profile: Option<String>,

        /// Directory of JSON profiles
        #[arg(long)]
        profile_dir: Option<PathBuf>,

        /// Turns before the player concedes
        #[arg(long, default_value_t = 200)]
        max_turns: u32,

        /// Verbosity level for battle output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Print only the last N log lines
        #[arg(long, value_name = "LINES")]
        log_tail: Option<usize>,
    },

    /// Run many seeded battles in parallel with random controllers
    Simulate {
        /// Number of battles to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Seed of the first battle; battle i uses seed + i
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Enemy to fight
        #[arg(long, short = 'e', default_value = "Slime")]
        enemy: String,

        /// Deck file (text or .json); defaults to the starter deck
        #[arg(long, short = 'd')]
        deck: Option<PathBuf>,

        /// Content tables (JSON); defaults to the built-in content
        #[arg(long)]
        content: Option<PathBuf>,

        /// Battle configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Turns before the player concedes
        #[arg(long, default_value_t = 100)]
        max_turns: u32,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print or save the built-in content tables
    Content {
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            enemy,
            deck,
            content,
            config,
            controller,
            script,
            seed,
            name,
            health,
            energy,
            profile,
            profile_dir,
            max_turns,
            verbosity,
            json,
            log_tail,
        } => {
            let sources = Sources::load(content.as_deref(), deck.as_deref(), config.as_deref())?;
            let options = RunOptions {
                enemy,
                controller,
                script,
                seed,
                player: PlayerSetup::new(&name, health, energy),
                max_turns,
                verbosity: verbosity.into(),
                json,
                log_tail,
            };
            match (profile, profile_dir) {
                (Some(key), Some(dir)) => run_with_profile(&sources, &options, &key, dir)?,
                _ => {
                    run_battle(&sources, &options, None)?;
                }
            }
        }
        Commands::Simulate {
            games,
            seed,
            enemy,
            deck,
            content,
            config,
            max_turns,
            json,
        } => {
            let sources = Sources::load(content.as_deref(), deck.as_deref(), config.as_deref())?;
            run_simulate(sources, games, seed, enemy, max_turns, json)?
        }
        Commands::Content { output } => {
            let content = ContentTables::builtin();
            match output {
                Some(path) => {
                    content.save_to_file(&path)?;
                    println!("Wrote built-in content to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&content)?),
            }
        }
    }

    Ok(())
}

/// Content, deck and config resolved from the command line
struct Sources {
    content: ContentTables,
    deck: DeckList,
    config: BattleConfig,
}

impl Sources {
    fn load(content: Option<&Path>, deck: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let content = match content {
            Some(path) => ContentTables::load_from_file(path)?,
            None => ContentTables::builtin(),
        };
        let deck = match deck {
            Some(path) => DeckList::load_from_file(path)?,
            None => content.starter_deck.clone().ok_or_else(|| {
                BattleError::InvalidContent("content has no starter deck; pass --deck".into())
            })?,
        };
        let config = match config {
            Some(path) => BattleConfig::load_from_file(path)?,
            None => BattleConfig::default(),
        };
        Ok(Sources {
            content,
            deck,
            config,
        })
    }
}

struct RunOptions {
    enemy: String,
    controller: ControllerType,
    script: Option<PathBuf>,
    seed: Option<u64>,
    player: PlayerSetup,
    max_turns: u32,
    verbosity: VerbosityLevel,
    json: bool,
    log_tail: Option<usize>,
}

fn load_script(path: &Path) -> Result<Vec<PlayerAction>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn run_battle(
    sources: &Sources,
    options: &RunOptions,
    profile: Option<&PlayerProfile>,
) -> Result<card_battle_rs::game::BattleReport> {
    let seed = options.seed.unwrap_or_else(rand::random);
    let initializer = BattleInitializer::new(&sources.content).with_config(sources.config.clone());
    let mut session = match profile {
        Some(profile) => initializer.init_battle(profile, &options.enemy, seed)?,
        None => initializer.init_from_deck(
            options.player.clone(),
            &sources.deck,
            &options.enemy,
            seed,
        )?,
    };

    let mut controller: Box<dyn PlayerController> = match options.controller {
        ControllerType::Random => Box::new(RandomController::with_seed(seed.wrapping_add(1))),
        ControllerType::Scripted => {
            let path = options.script.as_deref().ok_or_else(|| {
                BattleError::InvalidContent("scripted controller needs --script".into())
            })?;
            Box::new(ScriptedController::new(load_script(path)?))
        }
    };

    if !options.json {
        println!("=== Card Battle ===");
        println!(
            "{} vs {} (seed {seed})",
            session.player().name,
            session.enemy().name
        );
        println!();
    }

    // JSON output keeps stdout parseable
    let verbosity = if options.json {
        VerbosityLevel::Silent
    } else {
        options.verbosity
    };
    let mut battle_loop = BattleLoop::new(&mut session)
        .with_max_turns(options.max_turns)
        .with_verbosity(verbosity);
    if let Some(lines) = options.log_tail {
        battle_loop = battle_loop.with_log_tail(lines);
    }
    let report = battle_loop.run(controller.as_mut())?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{report}");
    }
    Ok(report)
}

fn run_with_profile(sources: &Sources, options: &RunOptions, key: &str, dir: PathBuf) -> Result<()> {
    let mut store = JsonProfileStore::new(dir);
    let mut profile = match store.load(key)? {
        Some(profile) => profile,
        None => PlayerProfile::new(
            &options.player.name,
            options.player.max_health,
            options.player.max_energy,
            sources.deck.clone(),
        ),
    };

    let report = run_battle(sources, options, Some(&profile))?;
    profile.record(&report);
    store.save(key, &profile)?;

    if !options.json {
        println!(
            "Profile '{key}': {}/{} battles won, {} gold, {} xp",
            profile.victories, profile.battles, profile.gold, profile.xp
        );
    }
    Ok(())
}

fn run_simulate(
    sources: Sources,
    games: usize,
    seed: u64,
    enemy: String,
    max_turns: u32,
    json: bool,
) -> Result<()> {
    let setup = SimulationSetup {
        games,
        seed,
        enemy,
        player: PlayerSetup::new("Hero", 80, 3),
        deck: sources.deck,
        content: sources.content,
        config: sources.config,
        max_turns,
    };

    if !json {
        println!("=== Card Battle - Simulation ===");
        println!("Running {games} battles against {} with seed {seed}", setup.enemy);
        println!();
    }

    let start = std::time::Instant::now();
    let summary = run_simulation(&setup)?;
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
        println!();
        println!(
            "Completed in {:.2}ms ({:.1} battles/sec)",
            elapsed.as_secs_f64() * 1000.0,
            games as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
    }
    Ok(())
}
