mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use graph::Graph;
use irloom_extenders::ExtenderRegistry;
use reader::{restore_graph_from_ir, ReaderConfig};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).context("invalid --log filter")?)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Inspect { ir, config, fallback } => {
            let mut cfg = match &config {
                Some(path) => ReaderConfig::from_file(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ReaderConfig::default(),
            };
            cfg.infer.fallback_to_ir_shapes |= fallback;

            let (graph, report) = restore_graph_from_ir(&ir, &cfg)
                .with_context(|| format!("restoring {}", ir.display()))?;
            print!("{}", render(&graph));
            tracing::info!(?report, "done");
            Ok(())
        }
        Command::Extenders => {
            let mut registry = ExtenderRegistry::with_builtins();
            registry.collect_inventory();
            for op_type in registry.op_types() {
                println!("{op_type}");
            }
            Ok(())
        }
    }
}

/// One line per node: id, op type, name, strategy, output shapes
fn render(graph: &Graph) -> String {
    let mut out = format!("{} (IR v{})\n", graph.name(), graph.version());
    for node in graph.nodes() {
        let shapes = node
            .output_shapes()
            .into_iter()
            .map(|s| s.map_or_else(|| "-".to_string(), ToString::to_string))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "{:>4}  {:<14} {:<16} {:<14} {}\n",
            node.id().to_string(),
            node.op_type(),
            node.name(),
            node.infer().to_string(),
            shapes
        ));
    }
    out
}
