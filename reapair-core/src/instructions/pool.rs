use std::collections::HashSet;
use std::fmt;

use crate::error::ComposeError;

/// One of the four categorized sentence lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	SafetyNotes,
	Instructions,
	Conditionals,
	Finals,
}

impl Category {
	/// All categories, in output order.
	pub const ALL: [Category; 4] = [
		Category::SafetyNotes,
		Category::Instructions,
		Category::Conditionals,
		Category::Finals,
	];

	/// Key used for this category in corpus files.
	pub fn key(self) -> &'static str {
		match self {
			Category::SafetyNotes => "safety_notes",
			Category::Instructions => "instructions",
			Category::Conditionals => "conditionals",
			Category::Finals => "finals",
		}
	}

	/// Parses a corpus key back into a category.
	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|category| category.key() == key)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// The four sentence lists a composition draws from.
///
/// # Invariants
/// - Every entry is trimmed and non-empty
/// - Entries are unique within their list (first occurrence wins)
/// - The pool never changes after construction; the composer only reads it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentencePool {
	safety_notes: Vec<String>,
	instructions: Vec<String>,
	conditionals: Vec<String>,
	finals: Vec<String>,
}

impl SentencePool {
	/// Builds a pool from its four lists.
	///
	/// Entries are trimmed and duplicates inside a list are dropped.
	///
	/// # Errors
	/// Returns `ComposeError::InvalidPool` if an entry is blank.
	pub fn new(
		safety_notes: Vec<String>,
		instructions: Vec<String>,
		conditionals: Vec<String>,
		finals: Vec<String>,
	) -> Result<Self, ComposeError> {
		Ok(Self {
			safety_notes: Self::normalize(Category::SafetyNotes, safety_notes)?,
			instructions: Self::normalize(Category::Instructions, instructions)?,
			conditionals: Self::normalize(Category::Conditionals, conditionals)?,
			finals: Self::normalize(Category::Finals, finals)?,
		})
	}

	fn normalize(category: Category, sentences: Vec<String>) -> Result<Vec<String>, ComposeError> {
		let mut seen = HashSet::new();
		let mut normalized = Vec::with_capacity(sentences.len());

		for (index, sentence) in sentences.into_iter().enumerate() {
			let trimmed = sentence.trim();
			if trimmed.is_empty() {
				return Err(ComposeError::InvalidPool(format!(
					"entry {} of {} is empty",
					index, category
				)));
			}
			if seen.insert(trimmed.to_owned()) {
				normalized.push(trimmed.to_owned());
			} else {
				log::debug!("dropping duplicate {} entry: {}", category, trimmed);
			}
		}

		Ok(normalized)
	}

	/// Returns the list for `category`.
	pub fn get(&self, category: Category) -> &[String] {
		match category {
			Category::SafetyNotes => &self.safety_notes,
			Category::Instructions => &self.instructions,
			Category::Conditionals => &self.conditionals,
			Category::Finals => &self.finals,
		}
	}

	pub fn safety_notes(&self) -> &[String] {
		&self.safety_notes
	}

	pub fn instructions(&self) -> &[String] {
		&self.instructions
	}

	pub fn conditionals(&self) -> &[String] {
		&self.conditionals
	}

	pub fn finals(&self) -> &[String] {
		&self.finals
	}

	/// Finds which list a sentence came from.
	pub fn category_of(&self, sentence: &str) -> Option<Category> {
		Category::ALL
			.into_iter()
			.find(|category| self.get(*category).iter().any(|s| s == sentence))
	}
}
