//! CLI entry point for sourcedocs

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use sourcedocs::{Config, LocalFs, Pipeline, PluginRegistry, core_plugin, print_json};

#[derive(Parser, Debug)]
#[command(name = "sourcedocs")]
#[command(about = "Extract documentation nodes from directives in source comments")]
#[command(version)]
struct Args {
    /// Config file (default: sourcedocs.json in the current directory, if present)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory for resolving glob patterns
    #[arg(short = 'r', long = "root", value_name = "DIR")]
    root: Option<PathBuf>,

    /// Include pattern (can be used multiple times; replaces the config's list)
    #[arg(short = 'i', long = "include", value_name = "GLOB")]
    include: Vec<String>,

    /// Exclude pattern (can be used multiple times; replaces the config's list)
    #[arg(short = 'e', long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pretty: bool,

    /// Number of files scanned in parallel (1 = scan files as they are read)
    #[arg(short = 'j', long = "jobs", default_value = "1")]
    jobs: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        2 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(args: &Args) -> Result<Config, sourcedocs::ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = Config::discover(args.config.as_deref(), &cwd)?;

    if !args.include.is_empty() {
        config = config.with_include(args.include.iter().cloned());
    }
    if !args.exclude.is_empty() {
        config = config.with_exclude(args.exclude.iter().cloned());
    }
    if let Some(root) = &args.root {
        config = config.with_root(root.clone());
    }
    config.normalize(&cwd)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sourcedocs: {}", e);
            process::exit(1);
        }
    };
    if config.include.is_empty() {
        log::warn!("No include patterns configured; nothing to scan");
    }

    let mut registry = PluginRegistry::new();
    registry.register(core_plugin());
    let commands = registry.into_command_map();
    log::debug!("Registered commands: {:?}", commands.names());

    let pipeline = Pipeline::new(config, commands, Arc::new(LocalFs));
    let result = if args.jobs > 1 {
        pipeline.scan_parallel(args.jobs)
    } else {
        pipeline.collect_nodes()
    };

    let nodes = match result {
        Ok(nodes) => nodes,
        Err(e) => {
            eprintln!("sourcedocs: {}", e);
            process::exit(1);
        }
    };
    log::info!("Extracted {} node(s)", nodes.len());

    if let Err(e) = print_json(&nodes, args.pretty) {
        eprintln!("sourcedocs: error writing output: {}", e);
        process::exit(1);
    }
}
