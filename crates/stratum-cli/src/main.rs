//! stratum CLI - slice triangle meshes into layers
//!
//! Reads STL files, slices them and prints a summary or writes the layer
//! paths as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stratum_math::Point3;
use stratum_mesh::stl::{read_stl, write_stl};
use stratum_mesh::Mesh;
use stratum_slicer::Slicer;
use tracing_subscriber::EnvFilter;

mod config;
mod export;

use config::Overrides;

#[derive(Parser)]
#[command(name = "stratum")]
#[command(about = "Slice triangle meshes into printable layers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about an STL file
    Info {
        /// Input STL file
        file: PathBuf,
    },
    /// Slice an STL file
    Slice {
        /// Input STL file
        input: PathBuf,
        /// Settings file (TOML); flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the layer paths of every layer to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the paths of a single layer instead of the summary
        #[arg(short, long)]
        level: Option<usize>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Write an axis-aligned box as a binary STL
    Cube {
        /// Output STL file
        output: PathBuf,
        /// Edge lengths along x, y and z
        #[arg(long, num_args = 3, default_values_t = [10.0, 10.0, 10.0])]
        size: Vec<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => {
            show_info(&file)?;
        }
        Commands::Slice {
            input,
            config,
            output,
            level,
            overrides,
        } => {
            slice_file(&input, config.as_deref(), output.as_deref(), level, &overrides)?;
        }
        Commands::Cube { output, size } => {
            write_cube(&output, &size)?;
        }
    }

    Ok(())
}

fn load_mesh(path: &Path) -> Result<Mesh> {
    read_stl(path).with_context(|| format!("failed to read {}", path.display()))
}

fn show_info(file: &Path) -> Result<()> {
    let mesh = load_mesh(file)?;

    println!("STL mesh: {}", file.display());
    println!("  Triangles: {}", mesh.face_count());
    println!("  Vertices: {}", mesh.vertices().len());
    match mesh.bounds() {
        Some((min, max)) => {
            println!("  Min: [{:.3}, {:.3}, {:.3}]", min.x, min.y, min.z);
            println!("  Max: [{:.3}, {:.3}, {:.3}]", max.x, max.y, max.z);
        }
        None => println!("  Empty mesh"),
    }
    Ok(())
}

fn slice_file(
    input: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    level: Option<usize>,
    overrides: &Overrides,
) -> Result<()> {
    let mut settings = match config {
        Some(path) => config::load(path)?,
        None => Default::default(),
    };
    overrides.apply(&mut settings);

    let mesh = load_mesh(input)?;
    let slicer = Slicer::new(&mesh, settings)?;

    if let Some(level) = level {
        let paths = slicer.layer_paths(level);
        let json = serde_json::to_string_pretty(&export::LayerRecord::from(&paths))?;
        println!("{json}");
        return Ok(());
    }

    let stats = slicer.stats();
    println!("Sliced {}", input.display());
    println!("  Triangles: {}", stats.faces);
    println!(
        "  Extent: {:.3} .. {:.3} along {}",
        stats.mesh_min,
        stats.mesh_max,
        slicer.settings().axis
    );
    println!("  Mesh layers: {}", stats.mesh_layers);
    println!("  Raft layers: {}", stats.raft_layers);
    println!("  Slice segments: {}", stats.segments);

    if let Some(output) = output {
        let document = export::PathsDocument::new(&slicer);
        let json = serde_json::to_string(&document)?;
        std::fs::write(output, json)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!(
            "Exported {} layers ({} segments) to {}",
            document.layers.len(),
            document.segment_count(),
            output.display()
        );
    }

    Ok(())
}

fn write_cube(output: &Path, size: &[f64]) -> Result<()> {
    let [x, y, z] = size else {
        anyhow::bail!("expected three edge lengths, got {}", size.len());
    };
    if size.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
        anyhow::bail!("edge lengths must be positive");
    }
    let mesh = Mesh::cuboid(Point3::origin(), Point3::new(*x, *y, *z));
    write_stl(&mesh, output)?;
    println!("Wrote {} triangles to {}", mesh.face_count(), output.display());
    Ok(())
}
