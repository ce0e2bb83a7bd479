use std::io::{self, BufRead, Read};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::error::{PrinterError, SettingsError};
use crate::instructions::composer::compose;
use crate::instructions::pool::SentencePool;
use crate::output::printer::Printer;
use crate::output::receipt::Receipt;
use crate::settings::ListenerSettings;

/// Longest trigger line kept, in bytes. Longer lines are discarded.
pub const MAX_LINE_LENGTH: u64 = 256;

/// Prints a fresh set of instructions whenever a trigger line arrives.
///
/// # Responsibilities
/// - Read lines from a trigger source (usually a serial device)
/// - Compose `count` instructions for every trigger, from a shared read-only pool
/// - Hand the encoded receipt to the printer, retrying failed sends
///
/// A failed trigger never stops the loop; only the end of the source or a
/// read error does.
pub struct Listener<'a> {
	pool: &'a SentencePool,
	receipt: Receipt,
	trigger: String,
	count: usize,
	reconnect_attempts: u32,
	reconnect_delay: Duration,
}

impl<'a> Listener<'a> {
	/// # Errors
	/// `SettingsError::Invalid` if the trigger is blank.
	pub fn new(pool: &'a SentencePool, settings: &ListenerSettings, receipt: Receipt) -> Result<Self, SettingsError> {
		let trigger = settings.trigger.trim();
		if trigger.is_empty() {
			return Err(SettingsError::Invalid {
				field: "listener.trigger",
				reason: "the trigger must not be blank".to_owned(),
			});
		}

		Ok(Self {
			pool,
			receipt,
			trigger: trigger.to_owned(),
			count: settings.count,
			reconnect_attempts: settings.reconnect_attempts,
			reconnect_delay: Duration::from_millis(settings.reconnect_delay_ms),
		})
	}

	/// Whether a received line fires a print.
	pub fn is_trigger(&self, line: &str) -> bool {
		line.trim() == self.trigger
	}

	/// Runs until `source` is exhausted.
	///
	/// # Returns
	/// The number of receipts printed.
	///
	/// # Errors
	/// Only read errors on `source`. Composition and printer failures are
	/// logged and the loop continues.
	pub fn run<S, P, R>(&self, mut source: S, printer: &mut P, rng: &mut R) -> io::Result<usize>
	where
		S: BufRead,
		P: Printer + ?Sized,
		R: Rng + ?Sized,
	{
		let mut printed = 0;
		let mut buffer = Vec::new();

		log::info!("waiting for trigger {:?}", self.trigger);
		loop {
			buffer.clear();
			let read = source.by_ref().take(MAX_LINE_LENGTH).read_until(b'\n', &mut buffer)?;
			if read == 0 {
				break;
			}
			if buffer.last() != Some(&b'\n') && read as u64 == MAX_LINE_LENGTH {
				log::warn!("discarding a line longer than {} bytes", MAX_LINE_LENGTH);
				skip_line(&mut source)?;
				continue;
			}
			// Serial lines may carry noise; never fail on encoding
			let line = String::from_utf8_lossy(&buffer);

			if !self.is_trigger(&line) {
				if !line.trim().is_empty() {
					log::warn!("ignoring unrecognized signal {:?}", line.trim());
				}
				continue;
			}

			if self.handle_trigger(printer, rng) {
				printed += 1;
			}
		}

		log::info!("trigger source closed after {} receipts", printed);
		Ok(printed)
	}

	fn handle_trigger<P, R>(&self, printer: &mut P, rng: &mut R) -> bool
	where
		P: Printer + ?Sized,
		R: Rng + ?Sized,
	{
		let instructions = match compose(self.pool, self.count, rng) {
			Ok(instructions) => instructions,
			Err(e) => {
				log::error!("dropping trigger: {}", e);
				return false;
			}
		};

		match self.send_with_retry(printer, &self.receipt.encode(&instructions)) {
			Ok(()) => {
				log::info!("printed {} instructions", instructions.len());
				true
			}
			Err(e) => {
				log::error!("dropping trigger after {} retries: {}", self.reconnect_attempts, e);
				false
			}
		}
	}

	fn send_with_retry<P: Printer + ?Sized>(&self, printer: &mut P, bytes: &[u8]) -> Result<(), PrinterError> {
		let mut attempt = 0;
		loop {
			match printer.send(bytes) {
				Ok(()) => return Ok(()),
				Err(e) if attempt < self.reconnect_attempts => {
					attempt += 1;
					log::warn!("print failed ({}), retry {}/{}", e, attempt, self.reconnect_attempts);
					thread::sleep(self.reconnect_delay);
				}
				Err(e) => return Err(e),
			}
		}
	}
}

/// Consumes `source` up to and including the next newline.
fn skip_line<S: BufRead>(source: &mut S) -> io::Result<()> {
	let mut chunk = Vec::new();
	loop {
		chunk.clear();
		let read = source.by_ref().take(MAX_LINE_LENGTH).read_until(b'\n', &mut chunk)?;
		if read == 0 || chunk.last() == Some(&b'\n') {
			return Ok(());
		}
	}
}
