use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use runner_rhythm::{GameConfig, RhythmLevelGenerator, RhythmServiceConfig};
use serde::Deserialize;

mod simulate;

#[derive(Debug, Parser)]
#[command(name = "runner")]
#[command(about = "Rhythm level generator for the lane-grid quiz runner", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a session headless and print the spawn timeline.
    Simulate {
        questions: PathBuf,
        #[arg(long)]
        seed: Option<u32>,
        /// Game seconds to simulate.
        #[arg(long, default_value_t = 60.0)]
        duration: f64,
        #[arg(long, default_value_t = 60)]
        fps: u32,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Trigger slow-mo once the game clock passes this time.
        #[arg(long)]
        slow_mo_at: Option<f64>,
    },
    /// Dump generated segments as JSON.
    Generate {
        questions: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        segments: usize,
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a question file.
    Check { questions: PathBuf },
}

/// Optional `--config` file; every section falls back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    rhythm: RhythmServiceConfig,
    game: GameConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Simulate {
            questions,
            seed,
            duration,
            fps,
            config,
            slow_mo_at,
        } => {
            let questions = load_questions(&questions)?;
            let mut run = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                run.rhythm.seed = seed;
            }
            let options = simulate::Options {
                duration,
                fps,
                slow_mo_at,
            };
            simulate::run_simulation(run.game, run.rhythm, questions, &options)?;
        }
        Command::Generate {
            questions,
            output,
            segments,
            seed,
            config,
        } => {
            let questions = load_questions(&questions)?;
            let run = load_config(config.as_deref())?;
            let seed = seed.unwrap_or(run.rhythm.seed);
            let mut generator = RhythmLevelGenerator::new(run.rhythm.level.generator, questions, seed)
                .context("invalid generator config")?;
            let level: Vec<_> = (0..segments).map(|_| generator.generate_next_segment()).collect();

            let json = serde_json::to_string_pretty(&level).context("failed to serialize segments")?;
            match output {
                Some(out_path) => fs::write(&out_path, json)
                    .with_context(|| format!("failed to write: {}", out_path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Check { questions } => {
            let text = fs::read_to_string(&questions)
                .with_context(|| format!("failed to read questions: {}", questions.display()))?;
            let parsed = runner_content::parse_questions_json(&text)
                .with_context(|| format!("check failed: {}", questions.display()))?;
            let errors = runner_content::validate_questions(&parsed);
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                anyhow::bail!("{} problem(s) in {}", errors.len(), questions.display());
            }
            println!("ok: {} question(s)", parsed.len());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_questions(path: &Path) -> anyhow::Result<Vec<runner_schema::Question>> {
    let questions = runner_content::load_questions_json_from_path(path)?;
    info!("loaded {} question(s) from {}", questions.len(), path.display());
    Ok(questions)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let bytes = fs::read(path).with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse config json: {}", path.display()))
}
