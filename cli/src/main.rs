//! Skymap CLI: run the community pipeline over a JSON request file
//!
//! The request file holds `edges`, `bios` and optionally `resolution` and
//! `dimensions`. Logs go to stderr so stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use skymap::{graph_stats, Pipeline, PipelineConfig, PipelineOutput, PipelineRequest};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skymap", version, about = "Social graph communities, layout and labels")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true, env = "SKYMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log level written to stderr (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline
    Run {
        /// Request JSON file
        request: PathBuf,

        /// Community granularity (overrides request and config)
        #[arg(long)]
        resolution: Option<f64>,

        /// Embedding width (overrides request and config)
        #[arg(long)]
        dimensions: Option<usize>,
    },
    /// Show graph statistics without running any oracle
    Stats {
        /// Request JSON file
        request: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Run {
            request,
            resolution,
            dimensions,
        } => run_pipeline(&config, request, *resolution, *dimensions, &cli.format),
        Commands::Stats { request } => run_stats(request, &cli.format),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn load_request(path: &Path) -> Result<PipelineRequest> {
    PipelineRequest::load(path).with_context(|| format!("reading request {}", path.display()))
}

fn run_pipeline(
    config: &PipelineConfig,
    request: &Path,
    resolution: Option<f64>,
    dimensions: Option<usize>,
    format: &OutputFormat,
) -> Result<()> {
    let mut input = load_request(request)?.into_input(config);
    if let Some(resolution) = resolution {
        input.resolution = resolution;
    }
    if let Some(dimensions) = dimensions {
        input.dimensions = dimensions;
    }

    let run = Pipeline::from_config(config).run_with_report(&input)?;
    tracing::info!("Labeling: {:?}", run.labeling);

    match format {
        OutputFormat::Json => println!("{}", run.output.to_json_pretty()?),
        OutputFormat::Csv => print_nodes_csv(&run.output),
        OutputFormat::Table => print_communities_table(&run.output),
    }
    Ok(())
}

fn run_stats(request: &Path, format: &OutputFormat) -> Result<()> {
    let request = load_request(request)?;
    let stats = graph_stats(&request.edges, &request.bios);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        _ => {
            println!("Nodes:            {}", stats.node_count);
            println!("Input edges:      {}", stats.input_edges);
            println!("Kept edges:       {}", stats.kept_edges);
            println!("Dropped edges:    {}", stats.dropped_edges);
            println!("Self-loops:       {}", stats.self_loops);
            println!("Isolated nodes:   {}", stats.isolated_nodes);
            println!("Weak components:  {}", stats.weak_components);
            println!("Unmatched bios:   {}", stats.unmatched_bios);
        }
    }
    Ok(())
}

fn print_communities_table(output: &PipelineOutput) {
    if output.communities.is_empty() {
        println!("(no communities)");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["id", "label", "members", "color", "centroid"]);

    for community in &output.communities {
        table.add_row(vec![
            community.id.to_string(),
            community.label.clone(),
            community.member_count.to_string(),
            community.color.to_string(),
            format!("({:.3}, {:.3})", community.centroid_x, community.centroid_y),
        ]);
    }

    println!("{}", table);
    println!(
        "{} communit{}, {} node(s)",
        output.communities.len(),
        if output.communities.len() == 1 { "y" } else { "ies" },
        output.node_count()
    );
}

fn print_nodes_csv(output: &PipelineOutput) {
    println!("identifier,x,y,community_id");
    for node in &output.embeddings {
        println!(
            "{},{},{},{}",
            csv_field(&node.identifier),
            node.x,
            node.y,
            node.community_id
        );
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
