use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use confyglot::Value;
use confyglot::config::{DateMode, LoadOptions, Loader, Options};

#[derive(Parser)]
#[command(name = "confyglot")]
#[command(
	author,
	version,
	about = "Cascading configuration loader for TOML, JSON, YAML and INI files"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the merged configuration as JSON
	Show(LoadArgs),
	/// List configuration files in cascade order
	Find(LoadArgs),
	/// Check every configuration file in the cascade for errors
	Validate(LoadArgs),
}

#[derive(Args)]
struct LoadArgs {
	/// Directory to load configuration for (defaults to the current directory)
	directory: Option<PathBuf>,

	/// Highest directory to search; must contain DIRECTORY
	#[arg(long)]
	root: Option<PathBuf>,

	/// File name prefix of configuration files
	#[arg(long, default_value = ".project")]
	prefix: String,

	/// Return parser output without cross-format normalization
	#[arg(long)]
	no_normalize: bool,

	/// Allow arrays whose elements have different types
	#[arg(long)]
	allow_mixed_arrays: bool,

	/// Keep TOML strings that are exactly "null"
	#[arg(long)]
	keep_null_strings: bool,

	/// Keep dates as dates instead of ISO-8601 UTC strings
	#[arg(long)]
	native_dates: bool,

	/// JSON schema file every configuration file must satisfy
	#[arg(long, value_name = "FILE")]
	schema: Option<PathBuf>,
}

impl LoadArgs {
	fn options(&self) -> Result<Options> {
		let schema = match self.schema {
			Some(ref path) => {
				let text = std::fs::read_to_string(path)
					.with_context(|| format!("Failed to read schema {}", path.display()))?;
				Some(
					serde_json::from_str(&text)
						.with_context(|| format!("Failed to parse schema {}", path.display()))?,
				)
			}
			None => None,
		};

		Ok(Options {
			config_prefix: self.prefix.clone(),
			normalize: !self.no_normalize,
			transform_null_string_to_null: !self.keep_null_strings,
			forbid_mixed_arrays: !self.allow_mixed_arrays,
			date_mode: if self.native_dates {
				DateMode::Native
			} else {
				DateMode::Iso8601String
			},
			schema,
			..Options::default()
		})
	}

	fn directory(&self) -> Result<PathBuf> {
		match self.directory {
			Some(ref dir) => Ok(dir.clone()),
			None => std::env::current_dir().context("Failed to get current directory"),
		}
	}

	fn load_options(&self) -> LoadOptions {
		LoadOptions {
			root: self.root.clone(),
		}
	}
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_env("CONFYGLOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(std::io::stderr)
		.init();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Show(args) => handle_show(&args),
		Commands::Find(args) => handle_find(&args),
		Commands::Validate(args) => handle_validate(&args),
	}
}

fn loader(args: &LoadArgs) -> Result<(Loader, PathBuf)> {
	let loader = Loader::new(args.options()?).context("Failed to build loader")?;
	Ok((loader, args.directory()?))
}

fn handle_show(args: &LoadArgs) -> Result<ExitCode> {
	let (loader, directory) = loader(args)?;
	let config = loader
		.load(&directory, &args.load_options())
		.context("Failed to load configuration")?;

	match config {
		Some(config) => {
			let json = serde_json::to_string_pretty(&Value::Object(config))
				.context("Failed to render configuration")?;
			println!("{}", json);
		}
		None => println!("No configuration files found."),
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_find(args: &LoadArgs) -> Result<ExitCode> {
	let (loader, directory) = loader(args)?;
	let files = loader
		.find(&directory, &args.load_options())
		.context("Failed to discover config files")?;

	if files.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");
	for file in &files {
		println!("  {} ({})", file.path.display(), file.format);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(args: &LoadArgs) -> Result<ExitCode> {
	let (loader, directory) = loader(args)?;

	match loader.discover(&directory, &args.load_options()) {
		Ok(configs) => {
			if configs.is_empty() {
				println!("No configuration files found.");
			} else {
				println!("All configuration files are valid:");
				for loaded in &configs {
					println!("  {} ({} keys)", loaded.path.display(), loaded.config.len());
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}
