use std::{
    fmt::Write as _,
    io::{BufRead, Cursor},
};

use crate::{
    error::SupportError,
    tas::{FrameFlags, InputFrame, Movie, TasData, bare},
};

/// FM2-specific header metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fm2Header {
    pub version: u32,
    pub emu_version: String,
    pub rerecord_count: u32,
    pub pal_flag: bool,
    pub rom_filename: String,
    pub guid: String,
    pub fourscore: bool,
    pub microphone: bool,
    pub ports: [u8; 3],
    pub fds: bool,
    pub ppu_flag: bool,
    pub ram_init_option: u32,
    pub ram_init_seed: u32,
    pub comments: Vec<String>,
    pub subtitles: Vec<String>,
    pub binary_flag: bool,
}

/// Port type FCEUX uses for the Zapper. Its column carries no joypad bits.
const PORT_ZAPPER: u8 = 2;

const KEYS: &[&str] = &[
    "version",
    "emuVersion",
    "rerecordCount",
    "palFlag",
    "romFilename",
    "romChecksum",
    "guid",
    "fourscore",
    "microphone",
    "port0",
    "port1",
    "port2",
    "FDS",
    "NewPPU",
    "RAMInitOption",
    "RAMInitSeed",
    "comment",
    "subtitle",
    "binary",
    "length",
    "savestate",
];

/// Strict FM2 reader: the document must start with `version 3`.
///
/// Header lines with unknown keys are ignored, but a `|` record that does not
/// have at least the command and port 1 fields, or whose joypad field is not
/// a full positional code, is an error.
pub fn parse<R: BufRead>(reader: R) -> Result<Movie, SupportError> {
    let mut lines = reader.lines();
    let first = lines.next().transpose()?.unwrap_or_default();
    if first.trim_end() != "version 3" {
        return Err(SupportError::InvalidTasData(
            "Invalid FM2 version header".to_string(),
        ));
    }

    let mut header = Fm2Header {
        version: 3,
        ..Default::default()
    };
    let mut savestate = None;
    let mut frames = Vec::new();

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('|') {
            let frame = parse_record(line, Some(&header)).ok_or_else(|| {
                SupportError::InvalidTasData(format!("malformed record on line {}", idx + 2))
            })?;
            frames.push(frame);
            continue;
        }
        let (key, value) = line.split_once([' ', '\t']).unwrap_or((line, ""));
        install_value(&mut header, &mut savestate, key, value.trim());
    }

    let mut movie = Movie::with_data(TasData::Fm2(header), frames);
    movie.savestate = savestate;
    Ok(movie)
}

pub fn parse_str(s: &str) -> Result<Movie, SupportError> {
    parse(Cursor::new(s))
}

/// Splits `key value` when `key` is a known FM2 header key.
pub(crate) fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once([' ', '\t']).unwrap_or((line, ""));
    KEYS.contains(&key).then(|| (key, value.trim()))
}

pub(crate) fn install_value(
    header: &mut Fm2Header,
    savestate: &mut Option<Vec<u8>>,
    key: &str,
    val: &str,
) {
    match key {
        "version" => header.version = val.parse().unwrap_or(0),
        "emuVersion" => header.emu_version = val.to_string(),
        "rerecordCount" => header.rerecord_count = val.parse().unwrap_or(0),
        "palFlag" => header.pal_flag = val == "1",
        "romFilename" => header.rom_filename = val.to_string(),
        "guid" => header.guid = val.to_string(),
        "fourscore" => header.fourscore = val == "1",
        "microphone" => header.microphone = val == "1",
        "port0" => header.ports[0] = val.parse().unwrap_or(0),
        "port1" => header.ports[1] = val.parse().unwrap_or(0),
        "port2" => header.ports[2] = val.parse().unwrap_or(0),
        "FDS" => header.fds = val == "1",
        "NewPPU" => header.ppu_flag = val == "1",
        "RAMInitOption" => header.ram_init_option = val.parse().unwrap_or(0),
        "RAMInitSeed" => header.ram_init_seed = val.parse().unwrap_or(0),
        "comment" => header.comments.push(val.to_string()),
        "subtitle" => header.subtitles.push(val.to_string()),
        "binary" => header.binary_flag = val == "1",
        "savestate" => match hex::decode(val) {
            Ok(bytes) => *savestate = Some(bytes),
            Err(err) => tracing::debug!(%err, "ignoring undecodable savestate"),
        },
        _ => {}
    }
}

/// Parses `|commands|port1|port2|...`. Fields past port 2 (the expansion
/// port, four-score pads 3 and 4) are ignored.
///
/// A joypad field must be empty (neutral) or exactly one positional code
/// wide; anything else rejects the record.
pub(crate) fn parse_record(line: &str, header: Option<&Fm2Header>) -> Option<InputFrame> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let commands = FrameFlags::from_bits_truncate(parts[1].trim().parse().unwrap_or(0));
    let mut frame = InputFrame {
        commands,
        ports: [0; 2],
    };
    for (port, field) in parts[2..].iter().take(2).enumerate() {
        let zapper = header.is_some_and(|h| !h.fourscore && h.ports[port] == PORT_ZAPPER);
        if zapper || field.is_empty() {
            continue;
        }
        if field.chars().count() != bare::CODE_WIDTH {
            return None;
        }
        frame.ports[port] = bare::decode(field);
    }
    Some(frame)
}

/// Writes `movie` as an FM2 document. Header metadata is taken from the
/// movie when it came from FM2, and defaulted otherwise.
pub fn format(movie: &Movie) -> String {
    let default_header = Fm2Header::default();
    let header = match &movie.data {
        TasData::Fm2(header) => header,
        TasData::Plain => &default_header,
    };

    let mut out = String::from("version 3\n");
    let flag = |b: bool| u8::from(b);
    let _ = writeln!(out, "emuVersion {}", header.emu_version);
    let _ = writeln!(out, "rerecordCount {}", header.rerecord_count);
    let _ = writeln!(out, "palFlag {}", flag(movie.is_pal));
    if !header.rom_filename.is_empty() {
        let _ = writeln!(out, "romFilename {}", header.rom_filename);
    }
    if !header.guid.is_empty() {
        let _ = writeln!(out, "guid {}", header.guid);
    }
    let _ = writeln!(out, "fourscore {}", flag(header.fourscore));
    let _ = writeln!(out, "microphone {}", flag(header.microphone));
    for (i, port) in header.ports.iter().enumerate() {
        let _ = writeln!(out, "port{i} {port}");
    }
    let _ = writeln!(out, "FDS {}", flag(header.fds));
    let _ = writeln!(out, "NewPPU {}", flag(header.ppu_flag));
    for comment in &header.comments {
        let _ = writeln!(out, "comment {comment}");
    }
    for subtitle in &header.subtitles {
        let _ = writeln!(out, "subtitle {subtitle}");
    }
    if let Some(state) = &movie.savestate {
        let _ = writeln!(out, "savestate {}", hex::encode(state));
    }

    for frame in movie.frames() {
        let _ = writeln!(
            out,
            "|{}|{}|{}||",
            frame.commands.bits(),
            bare::encode(frame.ports[0]),
            bare::encode(frame.ports[1])
        );
    }
    out
}
