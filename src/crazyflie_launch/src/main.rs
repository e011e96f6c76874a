//! crazyflie_launch CLI

use clap::{Parser, Subcommand};
use crazyflie_launch::{
    crazyflie::load_crazyflie_add, list_arguments, parse_launch_file, record::LaunchRecord,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process,
};

#[derive(Parser)]
#[command(name = "crazyflie_launch")]
#[command(about = "Launch manifest loader for the Crazyflie ROS driver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the bundled crazyflie_add manifest
    Crazyflie {
        /// Launch arguments (name:=value)
        #[arg(value_parser = parse_launch_arg)]
        args: Vec<(String, String)>,

        /// Output file path
        #[arg(short, long, default_value = "record.json")]
        output: PathBuf,
    },

    /// Load a launch file from a path
    File {
        /// Launch file path
        path: PathBuf,

        /// Launch arguments (name:=value)
        #[arg(value_parser = parse_launch_arg)]
        args: Vec<(String, String)>,

        /// Output file path
        #[arg(short, long, default_value = "record.json")]
        output: PathBuf,
    },

    /// Print the arguments a launch file declares
    Args {
        /// Launch file path
        path: PathBuf,
    },
}

fn parse_launch_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once(":=") {
        Some((name, value)) if !name.is_empty() && !value.contains(":=") => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid launch argument format: {} (expected name:=value)", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Crazyflie { args, output } => run_crazyflie(args, &output),
        Commands::File { path, args, output } => run_file(&path, args, &output),
        Commands::Args { path } => print_arguments(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_crazyflie(
    args: Vec<(String, String)>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading bundled crazyflie_add manifest");
    let (record, config) = load_crazyflie_add(args.into_iter().collect())?;
    log::info!("  uri {}, {} log topics", config.uri, config.log_topics.len());
    for topic in &config.log_topics {
        log::debug!(
            "  {} @ {} Hz: {}",
            topic.name,
            topic.frequency,
            topic.variables.join(", ")
        );
    }
    write_record(&record, output)
}

fn run_file(
    path: &Path,
    args: Vec<(String, String)>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading launch file: {}", path.display());
    let overrides: HashMap<String, String> = args.into_iter().collect();
    let record = parse_launch_file(path, overrides)?;
    write_record(&record, output)
}

fn write_record(record: &LaunchRecord, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = record.to_json()?;
    std::fs::write(output, json)?;

    log::info!("Generated record.json: {}", output.display());
    log::info!(
        "  {} nodes, {} parameters",
        record.node.len(),
        record.params.len()
    );

    Ok(())
}

fn print_arguments(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for arg in list_arguments(path)? {
        let value = match (&arg.value, &arg.default) {
            (Some(value), _) => format!("{} (fixed)", value),
            (None, Some(default)) => format!("default: '{}'", default),
            (None, None) => "required".to_string(),
        };
        match &arg.doc {
            Some(doc) => println!("  {}: {} - {}", arg.name, value, doc),
            None => println!("  {}: {}", arg.name, value),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_launch_arg() {
        assert_eq!(
            parse_launch_arg("uri:=radio://0/100/2M").unwrap(),
            ("uri".to_string(), "radio://0/100/2M".to_string())
        );
        assert_eq!(
            parse_launch_arg("tf_prefix:=").unwrap(),
            ("tf_prefix".to_string(), String::new())
        );
        assert!(parse_launch_arg("uri=radio").is_err());
        assert!(parse_launch_arg(":=x").is_err());
        assert!(parse_launch_arg("a:=b:=c").is_err());
    }
}
