use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::RenderError;
use crate::io;

const TEMPLATE_NAME: &str = "document";

#[derive(Serialize)]
struct DocumentContext<'a> {
	instructions: &'a [String],
}

/// Renders instruction sequences into an HTML document ready to be printed.
///
/// Templates use Handlebars syntax and receive a single `instructions`
/// array. Values are HTML-escaped.
pub struct HtmlRenderer {
	registry: Handlebars<'static>,
}

impl HtmlRenderer {
	/// Loads a template file.
	///
	/// # Errors
	/// - `MissingTemplate` if the file does not exist
	/// - `Template` if the file is not a valid Handlebars template
	pub fn from_file<P: AsRef<Path>>(template_path: P) -> Result<Self, RenderError> {
		let template_path = template_path.as_ref();
		if !template_path.is_file() {
			return Err(RenderError::MissingTemplate(template_path.to_path_buf()));
		}
		Self::from_template(&io::read_to_string(template_path)?)
	}

	/// Builds a renderer from template source.
	pub fn from_template(template: &str) -> Result<Self, RenderError> {
		let mut registry = Handlebars::new();
		registry
			.register_template_string(TEMPLATE_NAME, template)
			.map_err(Box::new)?;
		Ok(Self { registry })
	}

	pub fn render(&self, instructions: &[String]) -> Result<String, RenderError> {
		Ok(self.registry.render(TEMPLATE_NAME, &DocumentContext { instructions })?)
	}

	/// Renders `instructions` and saves the document at `out`.
	///
	/// # Errors
	/// `OutputExists` if `out` exists and `overwrite` is false. Nothing is
	/// written when rendering fails, and a partly written file is removed.
	pub fn write<P: AsRef<Path>>(&self, instructions: &[String], out: P, overwrite: bool) -> Result<(), RenderError> {
		let out = out.as_ref();
		let document = self.render(instructions)?;

		let mut options = OpenOptions::new();
		options.write(true);
		if overwrite {
			options.create(true).truncate(true);
		} else {
			options.create_new(true);
		}

		let file = options.open(out).map_err(|e| match e.kind() {
			std::io::ErrorKind::AlreadyExists => RenderError::OutputExists(out.to_path_buf()),
			_ => RenderError::Io(e),
		})?;
		save(file, out, document.as_bytes())?;

		log::info!("wrote {} instructions to {}", instructions.len(), out.display());
		Ok(())
	}
}

/// Writes `document` through `writer`, removing `out` if that fails.
fn save<W: Write>(mut writer: W, out: &Path, document: &[u8]) -> Result<(), RenderError> {
	if let Err(e) = writer.write_all(document).and_then(|()| writer.flush()) {
		drop(writer);
		if let Err(cleanup) = fs::remove_file(out) {
			log::warn!("could not remove partial output {}: {}", out.display(), cleanup);
		}
		return Err(RenderError::Io(e));
	}
	Ok(())
}
