use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::pool::{Category, SentencePool};
use crate::error::PoolError;
use crate::io;
use crate::settings::Settings;

/// Prefix of corpus files discovered in the assets directory.
const CORPUS_PREFIX: &str = "sentences-";

/// Lines starting with this marker are ignored in text corpora.
const COMMENT_MARKER: char = '#';

/// JSON shape of a corpus file. Unknown keys are ignored.
#[derive(Deserialize)]
struct RawPool {
	safety_notes: Vec<String>,
	instructions: Vec<String>,
	conditionals: Vec<String>,
	finals: Vec<String>,
}

/// Resolves language/category identifiers to corpus files and loads them.
///
/// # Responsibilities
/// - Keep the registry of known identifiers (configured + discovered)
/// - Map identifiers to files inside the assets directory
/// - Parse JSON and sectioned text corpora into a `SentencePool`
#[derive(Debug, Clone)]
pub struct PoolLoader {
	registry: BTreeMap<String, PathBuf>,
}

impl PoolLoader {
	/// Builds the registry from `settings`.
	///
	/// # Behavior
	/// - Starts with every `sentences-<key>.json` / `sentences-<key>.txt`
	///   file found directly inside the assets directory.
	/// - Configured `languages` entries are applied last and win.
	/// - An unreadable assets directory only disables discovery.
	pub fn new(settings: &Settings) -> Self {
		let assets = settings.assets_dir();
		let mut registry = BTreeMap::new();

		for extension in ["txt", "json"] {
			match io::list_files(&assets, extension) {
				Ok(files) => {
					for file in files {
						let Ok(stem) = io::get_filename(&file) else { continue };
						if let Some(key) = stem.strip_prefix(CORPUS_PREFIX).filter(|k| !k.is_empty()) {
							registry.insert(key.to_owned(), assets.join(&file));
						}
					}
				}
				Err(e) => log::debug!("no corpus discovery in {}: {}", assets.display(), e),
			}
		}

		for (key, file) in &settings.languages {
			registry.insert(key.clone(), assets.join(file));
		}

		Self { registry }
	}

	/// Known identifiers, sorted.
	pub fn identifiers(&self) -> Vec<&str> {
		self.registry.keys().map(String::as_str).collect()
	}

	/// Corpus file registered for `identifier`.
	///
	/// # Errors
	/// Returns `PoolError::NotFound` for an unknown identifier.
	pub fn resolve(&self, identifier: &str) -> Result<&Path, PoolError> {
		self.registry
			.get(identifier)
			.map(PathBuf::as_path)
			.ok_or_else(|| PoolError::NotFound(identifier.to_owned()))
	}

	/// Loads the pool registered for `identifier`.
	///
	/// # Errors
	/// - `NotFound` if the identifier is unknown
	/// - `MissingResource` if its file does not exist
	/// - `MalformedResource` if the file lacks a list or holds non-string entries
	pub fn load(&self, identifier: &str) -> Result<SentencePool, PoolError> {
		let path = self.resolve(identifier)?;
		let pool = load_file(path)?;
		log::info!(
			"loaded {} from {}: {} safety notes, {} instructions, {} conditionals, {} finals",
			identifier,
			path.display(),
			pool.safety_notes().len(),
			pool.instructions().len(),
			pool.conditionals().len(),
			pool.finals().len()
		);
		Ok(pool)
	}
}

/// Loads a corpus file, picking the parser from the extension.
///
/// `.txt` files use the sectioned text format, everything else is JSON.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SentencePool, PoolError> {
	let path = path.as_ref();
	if !path.is_file() {
		return Err(PoolError::MissingResource(path.to_path_buf()));
	}

	let is_text = path.extension().is_some_and(|ext| ext == "txt");
	if is_text {
		let lines = io::read_file(path).map_err(|source| PoolError::Io { path: path.to_path_buf(), source })?;
		parse_sections(path, &lines)
	} else {
		let content = io::read_to_string(path).map_err(|source| PoolError::Io { path: path.to_path_buf(), source })?;
		parse_json(path, &content)
	}
}

fn parse_json(path: &Path, content: &str) -> Result<SentencePool, PoolError> {
	let raw: RawPool = serde_json::from_str(content).map_err(|e| PoolError::malformed(path, e.to_string()))?;
	SentencePool::new(raw.safety_notes, raw.instructions, raw.conditionals, raw.finals)
		.map_err(|e| PoolError::malformed(path, e.to_string()))
}

/// Parses the sectioned text format:
///
/// ```text
/// # comment
/// [safety_notes]
/// Wear gloves.
///
/// [instructions]
/// ...
/// ```
fn parse_sections(path: &Path, lines: &[String]) -> Result<SentencePool, PoolError> {
	let mut sections: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
	let mut current: Option<Category> = None;

	for (number, line) in lines.iter().enumerate() {
		if line.starts_with(COMMENT_MARKER) {
			continue;
		}
		let stripped = line.trim();
		if stripped.is_empty() {
			continue;
		}

		if let Some(header) = stripped.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
			let category = Category::from_key(header.trim()).ok_or_else(|| {
				PoolError::malformed(path, format!("line {}: unknown section [{}]", number + 1, header))
			})?;
			sections.entry(category.key()).or_default();
			current = Some(category);
			continue;
		}

		match current {
			Some(category) => sections.entry(category.key()).or_default().push(stripped.to_owned()),
			None => {
				return Err(PoolError::malformed(
					path,
					format!("line {}: sentence outside of a section", number + 1),
				));
			}
		}
	}

	let mut take = |category: Category| {
		sections
			.remove(category.key())
			.ok_or_else(|| PoolError::malformed(path, format!("missing section [{}]", category)))
	};

	SentencePool::new(
		take(Category::SafetyNotes)?,
		take(Category::Instructions)?,
		take(Category::Conditionals)?,
		take(Category::Finals)?,
	)
	.map_err(|e| PoolError::malformed(path, e.to_string()))
}
