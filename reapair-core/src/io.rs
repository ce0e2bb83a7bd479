use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::{fs, io};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_to_string(filename)?.lines().map(str::to_owned).collect())
}

/// Reads a whole text file into a `String`.
pub(crate) fn read_to_string<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./assets/sentences-de_DE.json"` → `"sentences-de_DE"`
/// - `"sentences-de_DE.txt"` → `"sentences-de_DE"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Resolves `path` against `base` unless it is already absolute.
///
/// Leading `.` components are dropped, so `"./assets"` under `/opt/reapair`
/// becomes `/opt/reapair/assets`. An empty `base` leaves `path` relative.
pub(crate) fn resolve_against<B: AsRef<Path>, P: AsRef<Path>>(base: B, path: P) -> PathBuf {
	let path = path.as_ref();
	if path.is_absolute() {
		return path.to_path_buf();
	}

	path.components()
		.filter(|component| !matches!(component, Component::CurDir))
		.fold(base.as_ref().to_path_buf(), |resolved, component| resolved.join(component))
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted so that discovery is stable.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
