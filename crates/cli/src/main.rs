//! oas2proxy CLI
//!
//! Command-line interface for generating API proxy bundles from OpenAPI
//! documents.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use oas2proxy_generator::{BundleWriter, ProxyGenerator, DEFAULT_ENDPOINT_NAME};
use oas2proxy_parser::{resolve_backend, wildcard_path, LoadedDocument, OperationMapper};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas2proxy")]
#[command(version, about = "Generate API proxy bundles from OpenAPI documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a proxy bundle from an OpenAPI document
    #[command(after_help = "EXAMPLES:\n  \
        # Generate from a local YAML document\n  \
        oas2proxy generate --name petstore --oas-file petstore.yaml\n\n  \
        # Generate from a published document into ./bundles\n  \
        oas2proxy generate \\\n    \
        --name petstore \\\n    \
        --oas-uri https://example.com/specs/petstore.json \\\n    \
        --output ./bundles")]
    Generate {
        /// Proxy display name
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(short, long, env = "OAS2PROXY_OUTPUT", default_value = "./output")]
        output: PathBuf,
    },

    /// Load an OpenAPI document and show the flows a bundle would contain
    #[command(after_help = "EXAMPLES:\n  \
        oas2proxy inspect --oas-file petstore.yaml\n  \
        oas2proxy -v inspect --oas-uri https://example.com/specs/petstore.json")]
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where to read the OpenAPI document from
#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Path to a local OpenAPI document (.json, .yaml or .yml)
    #[arg(long)]
    oas_file: Option<PathBuf>,

    /// URI of a remote OpenAPI document
    #[arg(long)]
    oas_uri: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Generate {
            name,
            source,
            output,
        } => {
            generate_command(&name, &source, output.as_path(), cli.verbose)?;
        }
        Commands::Inspect { source } => {
            inspect_command(&source, cli.verbose)?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_document<'a>(
    generator: &'a mut ProxyGenerator,
    source: &SourceArgs,
) -> Result<&'a LoadedDocument> {
    match (&source.oas_file, &source.oas_uri) {
        (Some(path), _) => {
            println!("{} Loading OpenAPI document: {}", "→".cyan(), path.display());
            generator
                .load_from_file(path)
                .with_context(|| format!("Failed to load OpenAPI document {}", path.display()))
        }
        (None, Some(uri)) => {
            println!("{} Fetching OpenAPI document: {}", "→".cyan(), uri);
            generator
                .load_from_uri(uri)
                .with_context(|| format!("Failed to fetch OpenAPI document {}", uri))
        }
        (None, None) => anyhow::bail!("Either --oas-file or --oas-uri must be provided"),
    }
}

fn generate_command(name: &str, source: &SourceArgs, output: &Path, verbose: bool) -> Result<()> {
    let mut generator = ProxyGenerator::new();
    let document = load_document(&mut generator, source)?;
    let resource_name = document.base_name().to_string();

    println!(
        "{} Loaded {} ({} paths)",
        "✓".green(),
        document.base_name().yellow(),
        document.spec().path_items().count()
    );

    if verbose {
        println!("  Name: {}", name);
        println!("  Format: {:?}", document.format());
        println!("  Output: {}", output.display());
    }

    println!("{} Assembling proxy bundle...", "→".cyan());
    let bundle = generator
        .generate(name)
        .context("Failed to generate proxy bundle")?;

    if let Some(target) = &bundle.target_endpoint {
        println!("  Target: {}", target.url.yellow());
    }
    println!("  Base path: {}", bundle.base_path.yellow());
    println!("  Flows: {}", bundle.flows().len());

    if verbose {
        for flow in bundle.flows() {
            println!(
                "  • {} {} {}",
                flow.method.as_str().to_uppercase().cyan(),
                flow.path_pattern,
                flow.name.dimmed()
            );
        }
    }

    println!("{} Writing bundle files...", "→".cyan());
    debug!(output = %output.display(), "writing proxy bundle");
    let root = BundleWriter::new(bundle)
        .context("Failed to create bundle writer")?
        .write_to_directory(output)
        .context("Failed to write proxy bundle")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    println!("  📄 {}/{}.xml", root.display(), name);
    println!("  📄 {}/proxies/{}.xml", root.display(), DEFAULT_ENDPOINT_NAME);
    println!("  📄 {}/targets/{}.xml", root.display(), DEFAULT_ENDPOINT_NAME);
    println!("  📄 {}/resources/oas/{}", root.display(), resource_name);

    Ok(())
}

fn inspect_command(source: &SourceArgs, verbose: bool) -> Result<()> {
    let mut generator = ProxyGenerator::new();
    let document = load_document(&mut generator, source)?;
    let spec = document.spec();

    println!("\n{}", "✓ Document valid!".green().bold());
    if let Some(info) = &spec.info {
        println!("  Title: {}", info.title.yellow());
        println!("  Version: {}", info.version.yellow());
    }

    match resolve_backend(spec) {
        Ok(backend) => {
            println!("  Target: {}", backend.target_url().yellow());
            println!("  Base path: {}", backend.base_path().yellow());
        }
        Err(e) => println!("  {} {}", "⚠".yellow(), e),
    }

    println!("\n{}", "Flows:".bold());
    let mut total = 0;
    for (path, item) in spec.path_items() {
        let pattern = wildcard_path(path);
        for (method, detail) in OperationMapper::map_methods(item, path) {
            total += 1;
            println!(
                "  • {} {} {}",
                method.as_str().to_uppercase().cyan(),
                pattern,
                detail.operation_id.dimmed()
            );
            if verbose && !detail.description.is_empty() {
                println!("      {}", detail.description);
            }
        }
    }
    println!("  Total: {}", total);

    Ok(())
}
