use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use reapair_core::settings::DEFAULT_SETTINGS_FILE;
use reapair_core::{DevicePrinter, Listener, PoolLoader, Receipt, Settings, make_rng};

/// Prints fresh repair instructions whenever the serial trigger fires.
#[derive(Parser, Debug)]
#[command(name = "reapair-listener", version)]
struct Args {
	/// Trigger device (serial line settings are configured outside, e.g. with stty)
	#[arg(long)]
	device: Option<PathBuf>,

	/// Printer device
	#[arg(long)]
	printer: Option<PathBuf>,

	/// Line content that fires a print
	#[arg(long)]
	trigger: Option<String>,

	/// Number of instructions per print
	#[arg(short)]
	n: Option<usize>,

	/// Language of the generated repair instructions
	#[arg(short, long)]
	lang: Option<String>,

	/// Seed for a reproducible series of prints
	#[arg(long)]
	seed: Option<u64>,

	/// Settings file
	#[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
	config: PathBuf,

	/// Verbose output
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	/// Applies command line overrides on top of the settings file.
	fn apply(&self, settings: &mut Settings) {
		if let Some(device) = &self.device {
			settings.listener.device = device.clone();
		}
		if let Some(printer) = &self.printer {
			settings.printer.device = printer.clone();
		}
		if let Some(trigger) = &self.trigger {
			settings.listener.trigger = trigger.clone();
		}
		if let Some(n) = self.n {
			settings.listener.count = n;
		}
		if let Some(lang) = &self.lang {
			settings.default_language = lang.clone();
		}
	}
}

/// Main entry point for the listener.
///
/// Loads the pool once, opens the trigger device and blocks until the
/// device closes. Every trigger composes and prints independently.
fn main() -> Result<()> {
	let args = Args::parse();

	let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
	if args.verbose {
		builder.filter_level(LevelFilter::Debug);
	}
	builder.init();

	let mut settings = Settings::load_or_default(&args.config)?;
	args.apply(&mut settings);

	let pool = PoolLoader::new(&settings).load(&settings.default_language)?;
	let listener = Listener::new(&pool, &settings.listener, Receipt::new(&settings.printer))?;
	let mut printer = DevicePrinter::new(&settings.printer.device);

	let device = File::open(&settings.listener.device)
		.with_context(|| format!("could not open trigger device {}", settings.listener.device.display()))?;
	log::info!(
		"listening on {}, printing on {}",
		settings.listener.device.display(),
		printer.path().display()
	);

	let printed = listener
		.run(BufReader::new(device), &mut printer, &mut make_rng(args.seed))
		.context("trigger device failed")?;
	log::info!("stopped after {} receipts", printed);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn overrides_replace_settings() {
		let args = Args::try_parse_from([
			"reapair-listener", "--device", "/dev/ttyUSB0", "--trigger", "PRESS", "-n", "5",
		])
		.unwrap();
		let mut settings = Settings::default();
		args.apply(&mut settings);

		assert_eq!(settings.listener.device, PathBuf::from("/dev/ttyUSB0"));
		assert_eq!(settings.listener.trigger, "PRESS");
		assert_eq!(settings.listener.count, 5);
		assert_eq!(settings.printer.device, Settings::default().printer.device);
	}

	#[test]
	fn no_overrides_keep_settings() {
		let args = Args::try_parse_from(["reapair-listener"]).unwrap();
		let mut settings = Settings::default();
		args.apply(&mut settings);
		assert_eq!(settings, Settings::default());
	}
}
