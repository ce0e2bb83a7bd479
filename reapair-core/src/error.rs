//! Error types for the ReapAir core.
//!
//! Composition errors are kept apart from loader and output errors so that
//! callers can tell a bad request from a bad corpus or a broken device.

use std::path::PathBuf;

/// Errors raised by the instruction composer.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
	/// Requested count is below 1.
	#[error("invalid instruction count {0}, at least 1 is required")]
	InvalidCount(usize),

	/// Pool violates its structural contract or cannot satisfy a required sample.
	#[error("invalid sentence pool: {0}")]
	InvalidPool(String),
}

/// Errors raised while loading a sentence pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
	/// Identifier is not a registered language/category key.
	#[error("sentences for {0} not found")]
	NotFound(String),

	/// Registered file does not exist.
	#[error("the sentences file at {} does not exist", .0.display())]
	MissingResource(PathBuf),

	/// File exists but does not hold the four required string lists.
	#[error("malformed sentences file {}: {reason}", .path.display())]
	MalformedResource { path: PathBuf, reason: String },

	/// Reading the file failed.
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl PoolError {
	pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
		Self::MalformedResource { path: path.into(), reason: reason.into() }
	}
}

/// Errors raised by the HTML renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	#[error("the template file at {} does not exist", .0.display())]
	MissingTemplate(PathBuf),

	#[error("invalid template: {0}")]
	Template(#[from] Box<handlebars::TemplateError>),

	#[error("failed to render template: {0}")]
	Render(#[from] handlebars::RenderError),

	#[error("file {} already exists and will not be overwritten", .0.display())]
	OutputExists(PathBuf),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Errors raised by a printer capability.
#[derive(Debug, thiserror::Error)]
pub enum PrinterError {
	#[error("printer I/O failed: {0}")]
	Io(#[from] std::io::Error),

	#[error("printer unavailable: {0}")]
	Unavailable(String),
}

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("failed to read settings {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse settings {}: {source}", .path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	/// A value that parses but cannot be used.
	#[error("invalid setting {field}: {reason}")]
	Invalid { field: &'static str, reason: String },
}
