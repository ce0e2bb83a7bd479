//! Repair instruction generation library.
//!
//! This crate turns a categorized sentence corpus into randomized repair
//! instructions:
//! - Corpus loading (JSON or sectioned text) by language/category identifier
//! - Proportional composition with interleaved conditionals and a final sentence
//! - HTML rendering, ESC/POS receipt encoding and a printer capability
//! - A trigger loop printing a fresh sequence per received signal
//!
//! Composition is deterministic for a given random generator; callers inject it.

/// Error types of every component.
pub mod error;

/// Sentence pools, their loader and the composer.
pub mod instructions;

/// Serial trigger loop feeding the printer.
pub mod listener;

/// HTML, receipt and printer consumers of composed sequences.
pub mod output;

/// Settings file with defaults.
pub mod settings;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{ComposeError, PoolError, PrinterError, RenderError, SettingsError};
pub use instructions::composer::{compose, make_rng};
pub use instructions::distribution::Distribution;
pub use instructions::loader::{PoolLoader, load_file};
pub use instructions::pool::{Category, SentencePool};
pub use listener::Listener;
pub use output::html::HtmlRenderer;
pub use output::printer::{DevicePrinter, Printer};
pub use output::receipt::Receipt;
pub use settings::Settings;
