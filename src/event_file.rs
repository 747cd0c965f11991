//! Plain-text event files: one `sample code reject` triple per line.
//!
//! Blank lines and lines starting with `#` are skipped. Triples need not be
//! sorted; [`crate::EventTrack::load`] sorts them.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::error::DecodeError;
use crate::event_track::RawEvent;
use crate::traits::EventFileReader;

#[derive(Debug, Default)]
pub struct TextEventReader;

impl TextEventReader {
    pub fn new() -> Self {
        TextEventReader
    }
}

impl EventFileReader for TextEventReader {
    fn read_events(&self, path: &Path) -> Result<Vec<RawEvent>, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let events = parse_events(BufReader::new(file), path)?;
        info!("read {} events from {}", events.len(), path.display());
        Ok(events)
    }
}

fn parse_events(reader: impl BufRead, path: &Path) -> Result<Vec<RawEvent>, DecodeError> {
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line_no = line_num + 1;
        let line = line_result.map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(DecodeError::malformed(
                line_no,
                format!("expected 3 fields, found {}", fields.len()),
            ));
        }

        let sample = fields[0]
            .parse::<u64>()
            .map_err(|e| DecodeError::malformed(line_no, format!("sample '{}': {}", fields[0], e)))?;
        let code = fields[1]
            .parse::<i32>()
            .map_err(|e| DecodeError::malformed(line_no, format!("code '{}': {}", fields[1], e)))?;
        let reject = match fields[2] {
            "0" => 0,
            "1" => 1,
            other => {
                return Err(DecodeError::malformed(
                    line_no,
                    format!("reject flag must be 0 or 1, found '{}'", other),
                ))
            }
        };

        events.push(RawEvent::new(sample, code, reject));
    }

    Ok(events)
}

/// Writes triples in the order given.
pub fn write_event_file(path: &Path, events: &[RawEvent]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create event file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# sample code reject").context("Failed to write event file header")?;
    for event in events {
        writeln!(writer, "{} {} {}", event.sample, event.code, event.reject)
            .context("Failed to write event line")?;
    }
    writer.flush().context("Failed to flush event file")?;
    Ok(())
}

/// `session.eegj.br` and `session.eegj` both pair with `session.evt`.
pub fn sidecar_event_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let name = name.strip_suffix(".br").unwrap_or(name);
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    Some(path.with_file_name(format!("{}.evt", stem)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Vec<RawEvent>, DecodeError> {
        parse_events(Cursor::new(text.as_bytes()), Path::new("mem.evt"))
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let events = parse("# header\n\n500 2 0\n  100 1 0 \n300 -1 1\n").unwrap();
        assert_eq!(
            events,
            vec![
                RawEvent::new(500, 2, 0),
                RawEvent::new(100, 1, 0),
                RawEvent::new(300, -1, 1),
            ]
        );
    }

    #[test]
    fn test_parse_errors_report_line() {
        assert!(matches!(parse("1 2\n"), Err(DecodeError::Malformed { line: 1, .. })));
        assert!(matches!(parse("1 2 0\nx 2 0\n"), Err(DecodeError::Malformed { line: 2, .. })));
        assert!(matches!(parse("1 2 7\n"), Err(DecodeError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_write_then_read() {
        let path = std::env::temp_dir().join("eegscope_event_file_unit.evt");
        let events = vec![RawEvent::new(10, 1, 0), RawEvent::new(5, 2, 1)];
        write_event_file(&path, &events).unwrap();
        let read = TextEventReader::new().read_events(&path).unwrap();
        assert_eq!(read, events);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TextEventReader::new()
            .read_events(Path::new("/definitely/not/here.evt"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    #[test]
    fn test_sidecar_event_path() {
        assert_eq!(
            sidecar_event_path(Path::new("/data/s01.eegj")),
            Some(PathBuf::from("/data/s01.evt"))
        );
        assert_eq!(
            sidecar_event_path(Path::new("/data/s01.eegj.br")),
            Some(PathBuf::from("/data/s01.evt"))
        );
        assert_eq!(
            sidecar_event_path(Path::new("noext")),
            Some(PathBuf::from("noext.evt"))
        );
    }
}
