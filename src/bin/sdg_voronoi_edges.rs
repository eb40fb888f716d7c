//! Read point and segment sites, build their segment Delaunay graph and print
//! the classified Voronoi edges.
//!
//! ```text
//! sdg-voronoi-edges sites.txt --validate-level local --with-sites
//! RUST_LOG=segment_voronoi=debug sdg-voronoi-edges < sites.txt
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use segment_voronoi::core::segment_delaunay_graph::SegmentDelaunayGraph;
use segment_voronoi::core::util::delaunay_validation::ValidationLevel;
use segment_voronoi::io::{ReadOptions, read_sites, write_dual_edges};

#[derive(Parser, Debug)]
#[command(name = "sdg-voronoi-edges")]
#[command(about = "Print the Voronoi edges of point and segment sites")]
struct Cli {
    /// Site file (`p x y` / `s x1 y1 x2 y2` per line); stdin when omitted
    input: Option<PathBuf>,

    /// Validation before output: combinatorial, local or global
    #[arg(long, default_value_t = ValidationLevel::Global)]
    validate_level: ValidationLevel,

    /// Append the four defining sites of every edge
    #[arg(long)]
    with_sites: bool,

    /// Read zero-length segments as points
    #[arg(long)]
    collapse_point_segments: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    let cli = Cli::parse();

    let options = ReadOptions {
        collapse_point_segments: cli.collapse_point_segments,
    };
    let sites = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            read_sites(BufReader::new(file), &options)
        }
        None => read_sites(io::stdin().lock(), &options),
    }
    .context("cannot read sites")?;
    tracing::info!(sites = sites.len(), "read input");

    let sdg = SegmentDelaunayGraph::from_sites(sites).context("construction aborted")?;
    tracing::info!(
        vertices = sdg.number_of_vertices(),
        faces = sdg.number_of_faces(),
        "built segment Delaunay graph"
    );

    if let Err(report) = sdg.validation_report(cli.validate_level) {
        for violation in &report.violations {
            tracing::error!(kind = ?violation.kind, "{}", violation.error);
        }
        bail!(
            "{} validation failed with {} violation(s)",
            cli.validate_level,
            report.violations.len()
        );
    }

    let edges = sdg
        .dual_edges()
        .collect::<Result<Vec<_>, _>>()
        .context("cannot classify a Voronoi edge")?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_dual_edges(&mut out, &edges, cli.with_sites)?;
    out.flush()?;
    Ok(())
}
