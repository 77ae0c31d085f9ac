// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, bail, Context, Result};
use std::env;
use the_sprocket::backends::local;
use the_sprocket::config::consts::DEFAULT_LOG_FILTER;
use the_sprocket::config::{load_and_validate_definitions, register_cluster_definitions, Config};
use the_sprocket::pipeline::ProcessRegistry;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: the-sprocket <definitions.yaml|toml> <cluster-type> [--name NAME] [--set key=value]... [--reconfigure key=value]... [--json]";

/// Parsed command line
#[derive(Debug, PartialEq)]
struct CliArgs {
    definitions: String,
    cluster_type: String,
    name: Option<String>,
    settings: Vec<(String, String)>,
    reconfigure: Vec<(String, String)>,
    json: bool,
}

fn split_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        bail!("empty key in '{}'", raw);
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut name = None;
    let mut settings = Vec::new();
    let mut reconfigure = Vec::new();
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--name" => {
                let value = iter.next().ok_or_else(|| anyhow!("--name needs a value"))?;
                name = Some(value.clone());
            }
            "--set" => {
                let value = iter.next().ok_or_else(|| anyhow!("--set needs key=value"))?;
                settings.push(split_assignment(value)?);
            }
            "--reconfigure" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--reconfigure needs key=value"))?;
                reconfigure.push(split_assignment(value)?);
            }
            flag if flag.starts_with("--") => bail!("unknown option '{}'", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let [definitions, cluster_type]: [String; 2] = positional
        .try_into()
        .map_err(|_| anyhow!("expected a definitions file and a cluster type"))?;

    Ok(CliArgs {
        definitions,
        cluster_type,
        name,
        settings,
        reconfigure,
        json,
    })
}

fn config_from(assignments: &[(String, String)]) -> Result<Config> {
    let config = Config::new();
    for (key, value) in assignments {
        config.set(key, value.as_str())?;
    }
    Ok(config)
}

fn run(cli: CliArgs) -> Result<()> {
    if local::list_available_types().contains(&cli.cluster_type.as_str()) {
        bail!("'{}' is a built-in process type, not a cluster type", cli.cluster_type);
    }

    let definitions = load_and_validate_definitions(&cli.definitions)
        .with_context(|| format!("loading {}", cli.definitions))?;

    let mut registry = ProcessRegistry::new();
    local::register_processes(&mut registry)?;
    register_cluster_definitions(&mut registry, &definitions)?;

    let name = cli.name.as_deref().unwrap_or(&cli.cluster_type);
    let process = registry
        .create_process(&cli.cluster_type, name, config_from(&cli.settings)?)
        .with_context(|| format!("building cluster '{}'", cli.cluster_type))?;
    let cluster = process
        .as_cluster()
        .ok_or_else(|| anyhow!("'{}' is a process type, not a cluster type", cli.cluster_type))?;

    if !cli.reconfigure.is_empty() {
        process.reconfigure(&config_from(&cli.reconfigure)?)?;
        // the cluster adopts its own tunables last; a second pass pushes them down
        process.reconfigure(&Config::new())?;
    }

    let layout = cluster.layout();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        print!("{}", layout);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    run(cli)
}
