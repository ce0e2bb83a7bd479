use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::PrinterError;

/// Capability to push raw bytes to a printing device.
pub trait Printer {
	fn send(&mut self, bytes: &[u8]) -> Result<(), PrinterError>;
}

/// Printer reached through a character device or file, e.g. `/dev/usb/lp0`.
///
/// The device is opened lazily and dropped after a failed write, so the next
/// `send` reopens it (the printer may have been unplugged meanwhile).
#[derive(Debug)]
pub struct DevicePrinter {
	path: PathBuf,
	device: Option<File>,
}

impl DevicePrinter {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self { path: path.as_ref().to_path_buf(), device: None }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn open(&mut self) -> Result<&mut File, PrinterError> {
		if self.device.is_none() {
			if !self.path.exists() {
				return Err(PrinterError::Unavailable(format!("{} does not exist", self.path.display())));
			}
			let device = OpenOptions::new().append(true).open(&self.path)?;
			log::debug!("opened printer {}", self.path.display());
			self.device = Some(device);
		}
		self.device
			.as_mut()
			.ok_or_else(|| PrinterError::Unavailable(format!("{} is not open", self.path.display())))
	}
}

impl Printer for DevicePrinter {
	fn send(&mut self, bytes: &[u8]) -> Result<(), PrinterError> {
		let device = self.open()?;
		let written = device.write_all(bytes).and_then(|_| device.flush());
		if let Err(e) = written {
			self.device = None;
			return Err(e.into());
		}
		Ok(())
	}
}
