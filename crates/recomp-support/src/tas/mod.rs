pub mod bare;
pub mod fm2;
pub mod tokens;

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
};

use bitflags::bitflags;

use crate::error::SupportError;

/// Unified internal Movie IR used to drive the core.
/// It is decoupled from the textual dialects it was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Movie {
    /// Format-specific metadata.
    pub data: TasData,

    /// Whether the movie was recorded on a PAL console.
    pub is_pal: bool,

    /// Initial savestate (if any).
    pub savestate: Option<Vec<u8>>,

    /// Input data for each frame. Never mutated after construction.
    frames: Vec<InputFrame>,
}

/// Metadata carried by the dialect a movie came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TasData {
    Fm2(fm2::Fm2Header),
    /// Bare or token logs, which have no header.
    #[default]
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputFrame {
    /// Command flags for the frame (Reset, Power, FDS, etc.)
    pub commands: FrameFlags,
    /// Controller bitmasks for ports 1 and 2.
    /// Bit mapping (matching recomp-core/standard NES):
    /// 0: A, 1: B, 2: Select, 3: Start, 4: Up, 5: Down, 6: Left, 7: Right
    pub ports: [u8; 2],
}

impl InputFrame {
    /// No buttons, no commands.
    pub const NEUTRAL: Self = Self {
        commands: FrameFlags::empty(),
        ports: [0, 0],
    };

    pub const fn new(port1: u8, port2: u8) -> Self {
        Self {
            commands: FrameFlags::empty(),
            ports: [port1, port2],
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u8 {
        const RESET = 1 << 0;
        const POWER = 1 << 1;
        const FDS_INSERT = 1 << 2;
        const FDS_SELECT = 1 << 3;
        const VS_INSERT_COIN = 1 << 4;
        const VS_INSERT_COIN2 = 1 << 5;
        const VS_SERVICE = 1 << 6;
    }
}

impl Movie {
    /// Headerless movie over the given frames.
    pub fn new(frames: Vec<InputFrame>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    pub(crate) fn with_data(data: TasData, frames: Vec<InputFrame>) -> Self {
        let is_pal = matches!(&data, TasData::Fm2(header) if header.pal_flag);
        Self {
            data,
            is_pal,
            savestate: None,
            frames,
        }
    }

    /// Reads a movie file, auto-detecting the dialect.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SupportError> {
        let path = path.as_ref();
        if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && matches!(ext.to_ascii_lowercase().as_str(), "bk2" | "fmv" | "zip")
        {
            return Err(SupportError::UnsupportedTasFormat(ext.to_string()));
        }
        let file = File::open(path)?;
        parse(BufReader::new(file))
    }

    /// Input for frame `index`, or [`InputFrame::NEUTRAL`] past the end.
    pub fn frame(&self, index: usize) -> InputFrame {
        self.frames
            .get(index)
            .copied()
            .unwrap_or(InputFrame::NEUTRAL)
    }

    pub fn frames(&self) -> &[InputFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Port masks for a fixed budget of `count` frames, padded with neutral input.
    pub fn inputs(&self, count: usize) -> impl Iterator<Item = [u8; 2]> + '_ {
        (0..count).map(|i| self.frame(i).ports)
    }
}

/// Parses any supported dialect. Dialects may be mixed line by line.
///
/// Recognized lines, in order of precedence:
/// - blank lines and comments (`#`, `;`, `//`), skipped
/// - `|`-delimited FM2 records
/// - FM2 header lines (`key value`)
/// - one or two 8-character positional codes (`RLDUTSBA`)
/// - `TOKEN+TOKEN` button lists
///
/// Anything else is skipped.
pub fn parse<R: BufRead>(reader: R) -> Result<Movie, SupportError> {
    let mut parser = LineParser::default();
    for line in reader.lines() {
        parser.feed(&line?);
    }
    Ok(parser.finish())
}

pub fn parse_str(s: &str) -> Result<Movie, SupportError> {
    parse(Cursor::new(s))
}

#[derive(Debug, Default)]
pub(crate) struct LineParser {
    header: Option<fm2::Fm2Header>,
    savestate: Option<Vec<u8>>,
    frames: Vec<InputFrame>,
    skipped: usize,
    line_no: usize,
}

impl LineParser {
    pub(crate) fn feed(&mut self, raw: &str) {
        self.line_no += 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with("//")
        {
            return;
        }

        if line.starts_with('|') {
            let header = self.header.as_ref();
            match fm2::parse_record(line, header) {
                Some(frame) => self.frames.push(frame),
                None => self.skip(line),
            }
            return;
        }

        if let Some((key, value)) = fm2::split_header_line(line) {
            let header = self.header.get_or_insert_with(fm2::Fm2Header::default);
            fm2::install_value(header, &mut self.savestate, key, value);
            return;
        }

        if let Some(frame) = bare::parse_line(line).or_else(|| tokens::parse_line(line)) {
            self.frames.push(frame);
            return;
        }

        self.skip(line);
    }

    fn skip(&mut self, line: &str) {
        self.skipped += 1;
        tracing::debug!(line_no = self.line_no, line, "skipping unrecognized movie line");
    }

    pub(crate) fn finish(self) -> Movie {
        if self.skipped > 0 {
            tracing::warn!(
                skipped = self.skipped,
                frames = self.frames.len(),
                "movie contained unparsable lines"
            );
        }
        let data = self.header.map_or(TasData::Plain, TasData::Fm2);
        let mut movie = Movie::with_data(data, self.frames);
        movie.savestate = self.savestate;
        movie
    }
}
