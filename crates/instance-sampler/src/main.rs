//! CLI entry point for the instance sampler.
//!
//! Usage:
//!   instance-sampler [options] puzzle [--width W] [--height H] [--longest (3x3 only)]
//!   instance-sampler [options] hanoi [--disks D] [--towers T]
//!   instance-sampler [options] lightsout [--size S]
//!
//! Options:
//!   --steps <n>           Distance of the sampled states from the origin (default: 5)
//!   --instances <n>       Number of initial states (default: 100)
//!   --seed <n>            Random seed (default: 42)
//!   --sampler <kind>      frontier | walk (default: frontier)
//!   --include-shallower   Also sample states closer than --steps
//!   --max-restarts <n>    Walk restarts before giving up (default: 100)
//!   --timeout <seconds>   Time allowed per walk
//!   --strict              Fail when the space runs out before --steps
//!   --output <file>       Write JSON here instead of stdout
//!
//! Set RUST_LOG=info (or debug) for search progress on stderr.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use instance_sampler::{
    generate_instances, Domain, GenerationConfig, Hanoi, LightsOut, SamplerKind,
};

#[derive(Parser)]
#[command(name = "instance-sampler")]
#[command(about = "Sample planning benchmark instances from puzzle state spaces")]
#[command(version)]
struct Cli {
    /// Distance of the sampled initial states from the search origin
    #[arg(long, default_value = "5")]
    steps: u32,

    /// Number of initial states to produce
    #[arg(long, default_value = "100")]
    instances: usize,

    /// Random seed for reproducible output
    #[arg(long, default_value = "42")]
    seed: u64,

    /// How states are drawn from the space
    #[arg(long, value_enum, default_value = "frontier")]
    sampler: SamplerArg,

    /// Also sample states closer than --steps (frontier sampler)
    #[arg(long)]
    include_shallower: bool,

    /// Whole-walk restarts allowed per instance (walk sampler)
    #[arg(long, default_value = "100")]
    max_restarts: u32,

    /// Seconds allowed per walk (walk sampler)
    #[arg(long)]
    timeout: Option<u64>,

    /// Fail instead of warning when the space runs out before --steps
    #[arg(long)]
    strict: bool,

    /// Write the instance set to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SamplerArg {
    Frontier,
    Walk,
}

impl From<SamplerArg> for SamplerKind {
    fn from(arg: SamplerArg) -> Self {
        match arg {
            SamplerArg::Frontier => SamplerKind::Frontier,
            SamplerArg::Walk => SamplerKind::Walk,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sliding tile puzzle
    Puzzle {
        #[arg(long, default_value = "3")]
        width: usize,

        #[arg(long, default_value = "3")]
        height: usize,

        /// Emit the fixed list of hard instances instead of sampling (3x3 only)
        #[arg(long)]
        longest: bool,
    },
    /// Tower of Hanoi
    Hanoi {
        #[arg(long, default_value = "5")]
        disks: usize,

        #[arg(long, default_value = "3")]
        towers: usize,
    },
    /// Lights-Out
    Lightsout {
        #[arg(long, default_value = "4")]
        size: usize,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let domain = match cli.command {
        Commands::Puzzle {
            width,
            height,
            longest,
        } => Domain::sliding_tile(width, height, longest)?,
        Commands::Hanoi { disks, towers } => Domain::Hanoi(Hanoi::new(disks, towers)?),
        Commands::Lightsout { size } => Domain::LightsOut(LightsOut::new(size)?),
    };

    let config = GenerationConfig {
        steps: cli.steps,
        instances: cli.instances,
        sampler: cli.sampler.into(),
        include_shallower: cli.include_shallower,
        max_restarts: Some(cli.max_restarts),
        timeout: cli.timeout.map(Duration::from_secs),
        strict: cli.strict,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let set = generate_instances(&domain, &config, &mut rng)?;
    let json = serde_json::to_string_pretty(&set)?;

    match &cli.output {
        Some(path) => fs::write(path, json + "\n")?,
        None => println!("{}", json),
    }
    Ok(())
}
