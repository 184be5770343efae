//! Form size-bounded teams from a JSON file of feature vectors
//!
//! The input is a JSON array of `{ "id": "...", "features": [..] }` objects.
//! Teams are printed one per line as `team <i>: id, id, ...`.
//!
//! Usage: `form-teams --input people.json --n-teams 4 --size-min 3 --size-max 4`

use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use teamkmeans_rs::{KMeansConfig, Point, TeamBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Split a pool of individuals into teams of bounded size
#[derive(Parser, Debug)]
#[command(name = "form-teams")]
#[command(about = "Cluster feature vectors into size-constrained teams")]
struct Args {
    /// JSON file with an array of { "id", "features" } objects
    #[arg(long)]
    input: PathBuf,

    /// Number of teams to form
    #[arg(long)]
    n_teams: usize,

    /// Minimum size of each team
    #[arg(long)]
    size_min: usize,

    /// Maximum size of each team
    #[arg(long)]
    size_max: usize,

    /// Maximum iterations per restart
    #[arg(long, default_value = "300")]
    max_iters: usize,

    /// Seed of the first restart
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of restarts; the lowest objective wins
    #[arg(long, default_value = "10")]
    n_init: usize,

    /// Use the features as given instead of z-scores
    #[arg(long)]
    no_standardize: bool,

    /// Print the assignment as JSON instead of team rosters
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let reader = BufReader::new(File::open(&args.input)?);
    let points: Vec<Point> = serde_json::from_reader(reader)?;
    info!(
        points = points.len(),
        input = %args.input.display(),
        "loaded feature vectors"
    );

    let mut builder = TeamBuilder::new(&points)?;
    if !args.no_standardize {
        builder = builder.standardize();
    }

    let config = KMeansConfig::new(args.n_teams)
        .with_size_bounds(args.size_min, args.size_max)
        .with_max_iters(args.max_iters)
        .with_seed(args.seed)
        .with_n_init(args.n_init);

    let assignment = builder.form_teams(&config)?;
    info!(
        objective = assignment.objective,
        iterations = assignment.n_iterations,
        converged = assignment.converged(),
        "teams formed"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assignment)?);
        return Ok(());
    }

    let teams = assignment.teams();
    let width = teams.len().to_string().len();
    for (i, team) in teams.iter().enumerate() {
        println!("team {:>width$}: {}", i + 1, team.join(", "), width = width);
    }

    Ok(())
}
