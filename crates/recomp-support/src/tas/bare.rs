//! Bare fixed-width logs: one `RLDUTSBA` code per port, one frame per line.
//!
//! ```text
//! R.......
//! R......A ......B.
//! ```

use std::fmt::Write as _;

use crate::{
    error::SupportError,
    tas::{InputFrame, Movie, TasData},
};

/// Button letters from bit 7 down to bit 0.
pub const BUTTON_CHARS: [char; 8] = ['R', 'L', 'D', 'U', 'T', 'S', 'B', 'A'];

pub const CODE_WIDTH: usize = BUTTON_CHARS.len();

fn released(c: char) -> bool {
    c == '.' || c == ' '
}

/// Decodes a positional code into a controller mask.
///
/// The first character lands in bit 7. `.` and space are released, any other
/// character is pressed. Characters past the eighth are ignored.
pub fn decode(code: &str) -> u8 {
    code.chars()
        .take(CODE_WIDTH)
        .fold(0u8, |mask, c| (mask << 1) | u8::from(!released(c)))
}

pub fn encode(mask: u8) -> String {
    BUTTON_CHARS
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if mask & (0x80 >> i) != 0 { c } else { '.' }
        })
        .collect()
}

/// Accepts one or two whitespace-separated fields of exactly eight characters.
pub(crate) fn parse_line(line: &str) -> Option<InputFrame> {
    if line.contains('+') {
        return None;
    }
    let mut fields = line.split_whitespace();
    let p1 = fields.next().filter(|f| f.chars().count() == CODE_WIDTH)?;
    let p2 = match fields.next() {
        Some(f) if f.chars().count() == CODE_WIDTH => decode(f),
        Some(_) => return None,
        None => 0,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(InputFrame::new(decode(p1), p2))
}

/// Reads a bare log. Lines that are not codes are skipped.
pub fn parse_str(s: &str) -> Result<Movie, SupportError> {
    let mut frames = Vec::new();
    for (idx, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some(frame) => frames.push(frame),
            None => tracing::debug!(line_no = idx + 1, line, "skipping non-code line"),
        }
    }
    Ok(Movie::with_data(TasData::Plain, frames))
}

/// Writes one P1 code per line. The P2 column is added only when some frame
/// presses a port 2 button.
pub fn format(movie: &Movie) -> String {
    let with_p2 = movie.frames().iter().any(|f| f.ports[1] != 0);
    let mut out = String::with_capacity(movie.len() * (CODE_WIDTH * 2 + 2));
    for frame in movie.frames() {
        out.push_str(&encode(frame.ports[0]));
        if with_p2 {
            let _ = write!(out, " {}", encode(frame.ports[1]));
        }
        out.push('\n');
    }
    out
}
