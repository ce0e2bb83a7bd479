use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::LevelFilter;

use reapair_core::settings::DEFAULT_SETTINGS_FILE;
use reapair_core::{DevicePrinter, HtmlRenderer, PoolLoader, Printer, Receipt, Settings, compose, make_rng};

/// reapAir is a tool to generate and distribute useful repair instructions for your everyday life.
#[derive(Parser, Debug)]
#[command(name = "reapair", version)]
struct Cli {
	/// Language of the generated repair instructions
	#[arg(short, long)]
	lang: Option<String>,

	/// Number of instructions to be created
	#[arg(short)]
	n: Option<usize>,

	/// Do not print the sentences to STDOUT
	#[arg(long)]
	quiet: bool,

	/// Prefix printed sentences with their position
	#[arg(long)]
	numbered: bool,

	/// Render HTML output
	#[arg(long)]
	html: bool,

	/// Custom HTML template to be used
	#[arg(long)]
	template: Option<PathBuf>,

	/// Filename of the HTML output file
	#[arg(long)]
	out: Option<PathBuf>,

	/// Overwrite an existing HTML output file
	#[arg(long)]
	overwrite: bool,

	/// Send the instructions to the receipt printer
	#[arg(long)]
	print: bool,

	/// Printer device, overrides the settings file
	#[arg(long)]
	printer: Option<PathBuf>,

	/// Seed for a reproducible sequence
	#[arg(long)]
	seed: Option<u64>,

	/// List the available languages and exit
	#[arg(long)]
	list: bool,

	/// Settings file
	#[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
	config: PathBuf,

	/// Verbose output
	#[arg(short, long)]
	verbose: bool,
}

fn init_logging(verbose: bool) {
	let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
	if verbose {
		builder.filter_level(LevelFilter::Debug);
	}
	builder.init();
}

/// `reapair_<local timestamp>.html`, colons left out for portable file names.
fn default_output_path() -> PathBuf {
	PathBuf::from(format!("reapair_{}.html", Local::now().format("%Y-%m-%dT%H%M%S")))
}

fn echo(instructions: &[String], numbered: bool) -> io::Result<()> {
	let mut stdout = io::stdout().lock();
	for (index, instruction) in instructions.iter().enumerate() {
		if numbered {
			writeln!(stdout, "{}: {}", index + 1, instruction)?;
		} else {
			writeln!(stdout, "{}", instruction)?;
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	let settings = Settings::load_or_default(&cli.config)?;
	let loader = PoolLoader::new(&settings);

	if cli.list {
		for identifier in loader.identifiers() {
			println!("{}", identifier);
		}
		return Ok(());
	}

	let lang = cli.lang.as_deref().unwrap_or(&settings.default_language);
	let pool = loader.load(lang)?;

	let n = cli.n.unwrap_or(settings.count);
	let instructions = compose(&pool, n, &mut make_rng(cli.seed))?;

	if !cli.quiet {
		echo(&instructions, cli.numbered)?;
	}

	if cli.html {
		let template = cli.template.clone().unwrap_or_else(|| settings.template_path());
		let out = cli.out.clone().unwrap_or_else(default_output_path);
		HtmlRenderer::from_file(&template)?
			.write(&instructions, &out, cli.overwrite)
			.with_context(|| format!("could not write {}", out.display()))?;
	}

	if cli.print {
		let device = cli.printer.clone().unwrap_or_else(|| settings.printer.device.clone());
		let mut printer = DevicePrinter::new(&device);
		printer
			.send(&Receipt::new(&settings.printer).encode(&instructions))
			.with_context(|| format!("could not print on {}", device.display()))?;
	}

	Ok(())
}
