use crate::settings::PrinterSettings;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// ESC @: reset the printer.
const INITIALIZE: [u8; 2] = [ESC, b'@'];
/// GS V 1: partial cut.
const PARTIAL_CUT: [u8; 3] = [GS, b'V', 1];

/// Encodes instruction sequences as ESC/POS byte streams for receipt printers.
///
/// Layout: reset, optional bold header, numbered instructions wrapped to
/// `line_width` with a hanging indent, `feed_lines` blank lines, optional cut.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
	line_width: usize,
	feed_lines: u8,
	cut: bool,
	header: Option<String>,
}

impl Receipt {
	pub fn new(settings: &PrinterSettings) -> Self {
		Self {
			line_width: settings.line_width.max(1),
			feed_lines: settings.feed_lines,
			cut: settings.cut,
			header: settings.header.clone().filter(|h| !h.trim().is_empty()),
		}
	}

	pub fn encode(&self, instructions: &[String]) -> Vec<u8> {
		let mut bytes = INITIALIZE.to_vec();

		if let Some(header) = &self.header {
			bytes.extend_from_slice(&[ESC, b'E', 1]);
			for line in wrap(header, self.line_width, 0) {
				push_line(&mut bytes, &line);
			}
			bytes.extend_from_slice(&[ESC, b'E', 0]);
			bytes.push(b'\n');
		}

		for (index, instruction) in instructions.iter().enumerate() {
			let prefix = format!("{}. ", index + 1);
			let text = format!("{}{}", prefix, instruction);
			for line in wrap(&text, self.line_width, prefix.chars().count()) {
				push_line(&mut bytes, &line);
			}
		}

		// ESC d n: print and feed n lines
		bytes.extend_from_slice(&[ESC, b'd', self.feed_lines]);
		if self.cut {
			bytes.extend_from_slice(&PARTIAL_CUT);
		}
		bytes
	}
}

fn push_line(bytes: &mut Vec<u8>, line: &str) {
	bytes.extend_from_slice(line.as_bytes());
	bytes.push(b'\n');
}

/// Word-wraps `text` to `width` characters.
///
/// Continuation lines start with `indent` spaces (ignored when it would
/// leave no room). Words longer than a line are split.
pub(crate) fn wrap(text: &str, width: usize, indent: usize) -> Vec<String> {
	let width = width.max(1);
	let indent = if indent < width { indent } else { 0 };
	let pad = " ".repeat(indent);

	let mut lines = Vec::new();
	let mut line = String::new();
	let mut len = 0;
	let mut empty = true;

	for word in text.split_whitespace() {
		let mut rest: Vec<char> = word.chars().collect();
		while !rest.is_empty() {
			let gap = usize::from(!empty);
			if len + gap + rest.len() <= width {
				if gap == 1 {
					line.push(' ');
				}
				len += gap + rest.len();
				line.extend(rest.drain(..));
				empty = false;
			} else if empty {
				let take = width - len;
				line.extend(rest.drain(..take));
				lines.push(std::mem::replace(&mut line, pad.clone()));
				len = indent;
			} else {
				lines.push(std::mem::replace(&mut line, pad.clone()));
				len = indent;
				empty = true;
			}
		}
	}

	if !empty {
		lines.push(line);
	}
	lines
}
