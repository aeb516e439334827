use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use estimator_core::{
    estimate_drawing, estimate_materials, estimate_wall_materials, EstimatorConfig, MaterialProfile,
    Quantization, WallSpec,
};
use tracing::info;

mod fixtures;
mod report;

use report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "estimate")]
#[command(about = "Estimate construction materials from floor-plan drawings")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate materials for the enclosed area of a .dxf or .json drawing
    #[command(name = "drawing")]
    Drawing(DrawingArgs),
    /// Apply the coefficient table to a known area
    #[command(name = "materials")]
    Materials(MaterialsArgs),
    /// Bricks, cement and sand for a straight wall
    #[command(name = "wall")]
    Wall(WallArgs),
    /// Write sample drawings as .json and .dxf
    #[command(name = "fixtures")]
    Fixtures(FixturesArgs),
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    /// JSON material profile replacing the built-in coefficients
    #[arg(long)]
    profile: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
struct DrawingArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// Round coordinates to this many decimals before matching endpoints
    #[arg(long)]
    precision: Option<u32>,
    #[arg(long, default_value_t = 10_000)]
    max_entities: usize,
    /// LINE endpoints plus polyline vertices
    #[arg(long, default_value_t = 50_000)]
    max_vertices: usize,
    #[command(flatten)]
    output: ProfileArgs,
}

#[derive(Args, Debug, Clone)]
struct MaterialsArgs {
    #[arg(long, required = true)]
    area: f64,
    #[command(flatten)]
    output: ProfileArgs,
}

#[derive(Args, Debug, Clone)]
struct WallArgs {
    #[arg(long, required = true)]
    length: f64,
    #[arg(long, default_value_t = 3.0)]
    height: f64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
struct FixturesArgs {
    #[arg(long, default_value = "data")]
    out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.cmd {
        Command::Drawing(args) => {
            let drawing = dxf_loader::load_drawing(&args.input)
                .with_context(|| format!("Failed to load drawing {}", args.input.display()))?;
            let config = EstimatorConfig {
                quantization: Quantization::from_precision(args.precision),
                profile: load_profile(args.output.profile.as_deref())?,
                max_entities: args.max_entities,
                max_vertices: args.max_vertices,
            };
            let report = estimate_drawing(&drawing, &config)?;
            info!(
                "Estimated {} rooms in {}ms",
                report.rooms.len(),
                report.diagnostics.execution_time_ms
            );
            report::write_report(&mut stdout, &report, args.output.format)?;
        }
        Command::Materials(args) => {
            let profile = load_profile(args.output.profile.as_deref())?;
            let estimate = estimate_materials(args.area, &profile)?;
            report::write_materials(&mut stdout, &estimate, args.output.format)?;
        }
        Command::Wall(args) => {
            let estimate = estimate_wall_materials(args.length, &WallSpec::with_height(args.height))?;
            report::write_wall(&mut stdout, &estimate, args.format)?;
        }
        Command::Fixtures(args) => {
            let written = fixtures::write_fixtures(&args.out)?;
            for path in written {
                writeln!(stdout, "Saved {}", path.display())?;
            }
        }
    }

    Ok(())
}

fn load_profile(path: Option<&Path>) -> Result<MaterialProfile> {
    let Some(path) = path else {
        return Ok(MaterialProfile::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read material profile {}", path.display()))?;
    let profile = MaterialProfile::from_json(&json)
        .with_context(|| format!("Invalid material profile {}", path.display()))?;
    Ok(profile)
}
