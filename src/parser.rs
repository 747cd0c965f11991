use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use brotli::Decompressor;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::traits::{ChannelDescriptor, RecordingDecoder, RecordingInfo, RecordingSource};

/// Format version written by [`crate::RecordingWriter`] and accepted here.
pub const EEGJ_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EegjChannel {
    pub label: String,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RecordingLine {
    #[serde(rename = "header")]
    Header {
        version: String,
        sampling_frequency_hz: f64,
        channels: Vec<EegjChannel>,
    },
    #[serde(rename = "block")]
    Block { samples: Vec<Vec<f32>> },
    #[serde(rename = "footer")]
    Footer { sample_count: u64 },
}

/// Reader for `.eegj` recordings: JSON Lines with a header, sample blocks and
/// an optional footer.
///
/// Each block line carries one array per channel; all arrays of a block have
/// the same length. A `.br` suffix selects Brotli decompression.
///
/// ```text
/// {"type":"header","version":"1.0","sampling_frequency_hz":256.0,"channels":[{"label":"Fp1","unit":"uV"}]}
/// {"type":"block","samples":[[0.1,0.2,0.3]]}
/// {"type":"footer","sample_count":3}
/// ```
#[derive(Debug, Default)]
pub struct EegjReader;

impl EegjReader {
    pub fn new() -> Self {
        EegjReader
    }
}

impl RecordingDecoder for EegjReader {
    fn read(&self, path: &Path) -> Result<RecordingSource, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let reader: Box<dyn BufRead> = if has_brotli_suffix(path) {
            Box::new(BufReader::new(Decompressor::new(file, 4096)))
        } else {
            Box::new(BufReader::new(file))
        };

        let source = parse_recording(reader, path)?;
        info!(
            "decoded {}: {} channels, {} samples at {} Hz",
            path.display(),
            source.info.channels.len(),
            source.info.sample_count,
            source.info.sampling_frequency_hz
        );
        Ok(source)
    }
}

fn parse_recording(reader: impl BufRead, path: &Path) -> Result<RecordingSource, DecodeError> {
    let mut header: Option<(f64, Vec<ChannelDescriptor>)> = None;
    let mut samples: Vec<Vec<f32>> = Vec::new();
    let mut declared_count: Option<u64> = None;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line_no = line_num + 1;
        let line = line_result.map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let parsed: RecordingLine = serde_json::from_str(&line)
            .map_err(|e| DecodeError::malformed(line_no, e.to_string()))?;

        match parsed {
            RecordingLine::Header {
                version,
                sampling_frequency_hz,
                channels,
            } => {
                if header.is_some() {
                    return Err(DecodeError::malformed(line_no, "duplicate header"));
                }
                if line_num != 0 {
                    return Err(DecodeError::malformed(line_no, "header must be the first line"));
                }
                if version != EEGJ_VERSION {
                    return Err(DecodeError::UnsupportedVersion {
                        found: version,
                        expected: EEGJ_VERSION,
                    });
                }
                let channels: Vec<ChannelDescriptor> = channels
                    .into_iter()
                    .map(|c| ChannelDescriptor::new(c.label, c.unit))
                    .collect();
                samples = vec![Vec::new(); channels.len()];
                header = Some((sampling_frequency_hz, channels));
            }

            RecordingLine::Block { samples: block } => {
                if header.is_none() {
                    return Err(DecodeError::malformed(line_no, "sample block before header"));
                }
                if block.len() != samples.len() {
                    return Err(DecodeError::malformed(
                        line_no,
                        format!("block has {} channels, header declares {}", block.len(), samples.len()),
                    ));
                }
                let width = block.first().map(Vec::len).unwrap_or(0);
                if block.iter().any(|b| b.len() != width) {
                    return Err(DecodeError::malformed(line_no, "ragged sample block"));
                }
                for (channel, values) in samples.iter_mut().zip(block) {
                    channel.extend(values);
                }
            }

            RecordingLine::Footer { sample_count } => {
                declared_count = Some(sample_count);
            }
        }
    }

    let (sampling_frequency_hz, channels) =
        header.ok_or_else(|| DecodeError::UnsupportedFormat("missing header line".to_string()))?;

    let sample_count = samples.first().map(|c| c.len() as u64).unwrap_or(0);
    if let Some(declared) = declared_count {
        if declared != sample_count {
            return Err(DecodeError::malformed(
                0,
                format!("footer declares {} samples, found {}", declared, sample_count),
            ));
        }
    }

    RecordingSource::new(
        RecordingInfo {
            sample_count,
            sampling_frequency_hz,
            channels,
        },
        samples,
    )
}

pub(crate) fn has_brotli_suffix(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "br")
}

/// Picks a decoder from the file name.
///
/// `.eegj`, `.jsonl` and their `.br` variants are read by [`EegjReader`];
/// anything else is reported as an unsupported format.
pub fn decoder_for_path(path: &Path) -> Result<Box<dyn RecordingDecoder>, DecodeError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".br").unwrap_or(&name);

    if name.ends_with(".eegj") || name.ends_with(".jsonl") {
        Ok(Box::new(EegjReader::new()))
    } else {
        Err(DecodeError::UnsupportedFormat(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<RecordingSource, DecodeError> {
        parse_recording(Cursor::new(text.as_bytes()), Path::new("mem.eegj"))
    }

    const HEADER: &str = r#"{"type":"header","version":"1.0","sampling_frequency_hz":100.0,"channels":[{"label":"C3","unit":"uV"},{"label":"C4","unit":"uV"}]}"#;

    #[test]
    fn test_parse_blocks_are_concatenated() {
        let text = format!(
            "{HEADER}\n{}\n\n{}\n{}\n",
            r#"{"type":"block","samples":[[1,2],[3,4]]}"#,
            r#"{"type":"block","samples":[[5],[6]]}"#,
            r#"{"type":"footer","sample_count":3}"#,
        );
        let source = parse(&text).unwrap();
        assert_eq!(source.info.sample_count, 3);
        assert_eq!(source.info.channels[1].label, "C4");
        assert_eq!(source.channel_samples(0, 0..3), &[1.0, 2.0, 5.0]);
        assert_eq!(source.channel_samples(1, 1..10), &[4.0, 6.0]);
    }

    #[test]
    fn test_header_only_is_valid_and_empty() {
        let source = parse(HEADER).unwrap();
        assert_eq!(source.info.sample_count, 0);
        assert_eq!(source.channel_count(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(parse(""), Err(DecodeError::UnsupportedFormat(_))));

        let wrong_version = HEADER.replace("\"1.0\"", "\"9.9\"");
        assert!(matches!(parse(&wrong_version), Err(DecodeError::UnsupportedVersion { .. })));

        let ragged = format!("{HEADER}\n{}", r#"{"type":"block","samples":[[1,2],[3]]}"#);
        assert!(matches!(parse(&ragged), Err(DecodeError::Malformed { line: 2, .. })));

        let bad_footer = format!("{HEADER}\n{}", r#"{"type":"footer","sample_count":5}"#);
        assert!(matches!(parse(&bad_footer), Err(DecodeError::Malformed { .. })));

        let orphan = r#"{"type":"block","samples":[[1]]}"#;
        assert!(matches!(parse(orphan), Err(DecodeError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_decoder_selection_by_extension() {
        assert!(decoder_for_path(Path::new("a.eegj")).is_ok());
        assert!(decoder_for_path(Path::new("a.EEGJ.br")).is_ok());
        assert!(decoder_for_path(Path::new("a.jsonl")).is_ok());
        assert!(matches!(
            decoder_for_path(Path::new("a.edf")),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }
}
