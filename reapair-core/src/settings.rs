//! Runtime settings shared by the `reapair` and `reapair-listener` binaries.
//!
//! Every field has a default, so a missing settings file is not an error.
//! A relative `assets_path` resolves against the directory of the settings
//! file, or against the install location when there is no file. Corpus and
//! template names resolve against `assets_path`.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::io;

/// Default settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "reapair.json";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Directory holding sentence corpora and templates.
	pub assets_path: PathBuf,

	/// Registered identifiers mapped to corpus file names inside `assets_path`.
	pub languages: BTreeMap<String, String>,

	/// Identifier used when none is given on the command line.
	pub default_language: String,

	/// HTML template file name inside `assets_path`.
	pub template: String,

	/// Instruction count used when none is given on the command line.
	pub count: usize,

	pub printer: PrinterSettings,

	pub listener: ListenerSettings,
}

/// Receipt printer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
	/// Character device the receipt bytes are written to.
	pub device: PathBuf,

	/// Printable columns per line.
	pub line_width: usize,

	/// Blank lines fed after the last instruction.
	pub feed_lines: u8,

	/// Whether to send a partial cut after feeding.
	pub cut: bool,

	/// Optional title printed above the instructions.
	pub header: Option<String>,
}

/// Serial trigger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerSettings {
	/// Device the trigger lines are read from.
	pub device: PathBuf,

	/// Line content (after trimming) that fires a print.
	pub trigger: String,

	/// Instruction count used for every triggered print.
	pub count: usize,

	/// How many times a failed print is retried.
	pub reconnect_attempts: u32,

	/// Pause between retries, in milliseconds.
	pub reconnect_delay_ms: u64,
}

impl Default for Settings {
	fn default() -> Self {
		let mut languages = BTreeMap::new();
		languages.insert("de_DE".to_owned(), "sentences-de_DE.json".to_owned());

		Self {
			assets_path: PathBuf::from("./assets"),
			languages,
			default_language: "de_DE".to_owned(),
			template: "template.hbs.html".to_owned(),
			count: 10,
			printer: PrinterSettings::default(),
			listener: ListenerSettings::default(),
		}
	}
}

impl Default for PrinterSettings {
	fn default() -> Self {
		Self {
			device: PathBuf::from("/dev/usb/lp0"),
			line_width: 32,
			feed_lines: 4,
			cut: true,
			header: Some("Reparaturanleitung".to_owned()),
		}
	}
}

impl Default for ListenerSettings {
	fn default() -> Self {
		Self {
			device: PathBuf::from("/dev/ttyACM0"),
			trigger: "1".to_owned(),
			count: 10,
			reconnect_attempts: 3,
			reconnect_delay_ms: 1000,
		}
	}
}

impl Settings {
	/// Loads settings from a JSON file.
	///
	/// A relative `assets_path` is resolved against the file's directory.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or parsed.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let content = io::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let settings: Self = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
			path: path.to_path_buf(),
			source,
		})?;

		Ok(settings.resolved_against(path.parent().unwrap_or(Path::new(""))))
	}

	/// Loads settings from `path` if it exists, defaults otherwise.
	///
	/// Defaults resolve `assets_path` against [`install_dir`], never against
	/// the working directory. A file that exists but cannot be parsed is
	/// still an error.
	pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
		if path.as_ref().is_file() {
			return Self::load(path);
		}

		let defaults = Self::default();
		let base = install_dir(&defaults.assets_path);
		log::debug!(
			"no settings file at {}, using defaults from {}",
			path.as_ref().display(),
			base.display()
		);
		Ok(defaults.resolved_against(&base))
	}

	fn resolved_against(mut self, base: &Path) -> Self {
		self.assets_path = io::resolve_against(base, &self.assets_path);
		self
	}

	pub fn assets_dir(&self) -> &Path {
		&self.assets_path
	}

	/// Full path of the configured HTML template.
	pub fn template_path(&self) -> PathBuf {
		self.assets_dir().join(&self.template)
	}
}

/// Directory a relative `assets` path resolves against when there is no
/// settings file.
///
/// The closest ancestor of the executable's directory that holds `assets`,
/// so both an installed binary next to its assets and a build inside the
/// source tree find the bundled corpus. Falls back to the executable's
/// directory.
pub fn install_dir(assets: &Path) -> PathBuf {
	let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) else {
		log::warn!("executable location unknown, assets resolve against the working directory");
		return PathBuf::new();
	};

	closest_holding(&exe_dir, assets)
}

/// First of `start` and its ancestors under which `assets` is a directory,
/// `start` itself when there is none.
fn closest_holding(start: &Path, assets: &Path) -> PathBuf {
	start
		.ancestors()
		.find(|dir| io::resolve_against(dir, assets).is_dir())
		.unwrap_or(start)
		.to_path_buf()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_file_keeps_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("reapair.json");
		std::fs::write(&path, r#"{ "count": 7, "listener": { "trigger": "GO" } }"#).unwrap();

		let settings = Settings::load(&path).unwrap();
		assert_eq!(settings.count, 7);
		assert_eq!(settings.listener.trigger, "GO");
		assert_eq!(settings.listener.count, 10);
		assert_eq!(settings.default_language, "de_DE");
		assert_eq!(settings.printer.line_width, 32);
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let settings = Settings::load_or_default(dir.path().join("absent.json")).unwrap();

		assert_eq!(settings.languages, Settings::default().languages);
		assert_eq!(settings.count, 10);
		assert!(settings.assets_path.is_absolute());
		assert!(settings.assets_path.ends_with("assets"));
		assert!(!settings.assets_path.starts_with(dir.path()));
	}

	#[test]
	fn relative_assets_resolve_against_the_settings_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("reapair.json");
		std::fs::write(&path, r#"{ "assets_path": "./corpus" }"#).unwrap();

		let settings = Settings::load(&path).unwrap();
		assert_eq!(settings.assets_dir(), dir.path().join("corpus"));
		assert_eq!(settings.template_path(), dir.path().join("corpus").join("template.hbs.html"));
	}

	#[test]
	fn default_assets_resolve_against_the_settings_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("reapair.json");
		std::fs::write(&path, "{}").unwrap();

		assert_eq!(Settings::load(&path).unwrap().assets_dir(), dir.path().join("assets"));
	}

	#[test]
	fn absolute_assets_are_kept() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("reapair.json");
		std::fs::write(&path, r#"{ "assets_path": "/srv/reapair" }"#).unwrap();

		assert_eq!(Settings::load(&path).unwrap().assets_dir(), Path::new("/srv/reapair"));
	}

	#[test]
	fn install_location_is_searched_upwards() {
		let root = tempfile::tempdir().unwrap();
		let bin = root.path().join("target").join("release");
		std::fs::create_dir_all(&bin).unwrap();
		std::fs::create_dir(root.path().join("assets")).unwrap();

		assert_eq!(closest_holding(&bin, Path::new("./assets")), root.path());
		assert_eq!(closest_holding(&bin, Path::new("missing")), bin);
	}

	#[test]
	fn broken_file_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("reapair.json");
		std::fs::write(&path, "{ count: ").unwrap();

		assert!(matches!(Settings::load_or_default(&path), Err(SettingsError::Parse { .. })));
	}

	#[test]
	fn template_resolves_inside_assets() {
		let settings = Settings { assets_path: PathBuf::from("/srv/reapair"), ..Settings::default() };
		assert_eq!(settings.template_path(), PathBuf::from("/srv/reapair/template.hbs.html"));
	}
}
