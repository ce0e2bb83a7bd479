//! Consumers of composed instruction sequences.
//!
//! None of these are called by the composer; callers hand them its output.

/// Handlebars HTML rendering to a file.
pub mod html;

/// Printer capability and the device-backed implementation.
pub mod printer;

/// ESC/POS receipt encoding.
pub mod receipt;
