use crate::solver::moeca::Encoding;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "servicemap")]
#[command(
    about = "Recommend microservice decompositions of a class-dependency graph",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by both solvers.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Graph document (JSON) to decompose
    pub graph: PathBuf,

    /// Configuration file (defaults to the nearest .servicemap.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Minimum number of microservices
    #[arg(long)]
    pub min: Option<usize>,

    /// Maximum number of microservices
    #[arg(long)]
    pub max: Option<usize>,

    /// Known solution to start from (run record or bare solution JSON)
    #[arg(long = "seed-solution")]
    pub seed_solution: Option<PathBuf>,

    /// Directory to store the run in
    #[arg(short, long, env = "SERVICEMAP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Print the run record as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Number of worker threads (0 = all cores)
    #[arg(short = 'j', long, default_value = "0")]
    pub jobs: usize,

    /// Increase verbosity level (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Greedy agglomerative clustering
    Ahca {
        #[command(flatten)]
        run: RunArgs,

        /// Only merge clusters joined by a dependence or data edge
        #[arg(long = "shared-edges")]
        shared_edges: Option<bool>,

        /// Score candidates on per-step normalized metrics
        #[arg(long)]
        normalize: bool,
    },

    /// Multi-objective evolutionary clustering
    Moeca {
        #[command(flatten)]
        run: RunArgs,

        /// Genome encoding (cluster-label, graph-adjacency)
        #[arg(long)]
        encoding: Option<Encoding>,

        /// Population size
        #[arg(long)]
        population: Option<usize>,

        /// Evaluation budget
        #[arg(long)]
        evaluations: Option<usize>,

        /// Wall-clock budget in seconds
        #[arg(long = "max-time")]
        max_time: Option<u64>,

        /// Random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Optimizer name: nsga2 (default) or archive-evolution
        #[arg(long)]
        algorithm: Option<String>,
    },

    /// Print the metrics of a stored solution
    Evaluate {
        /// Graph document (JSON)
        graph: PathBuf,

        /// Run record or bare solution JSON
        solution: PathBuf,

        /// Which solution of a run record to evaluate
        #[arg(long, default_value = "0")]
        index: usize,

        /// Configuration file (defaults to the nearest .servicemap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// List runs stored in a directory
    Runs {
        /// Store directory
        #[arg(default_value = "servicemap-runs")]
        dir: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    pub fn verbosity(&self) -> u8 {
        match self {
            Commands::Ahca { run, .. } | Commands::Moeca { run, .. } => run.verbosity,
            Commands::Evaluate { verbosity, .. } => *verbosity,
            Commands::Runs { .. } | Commands::Init { .. } => 0,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
