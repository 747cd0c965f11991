use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use brotli::enc::BrotliEncoderParams;
use brotli::CompressorWriter;

use crate::parser::{has_brotli_suffix, EegjChannel, EEGJ_VERSION};
use crate::traits::{ChannelDescriptor, RecordingSource};

/// Samples per channel in each block line written by [`RecordingWriter::write_source`].
pub const DEFAULT_BLOCK_SAMPLES: usize = 256;

/// Streams a recording in the `.eegj` JSON Lines format.
pub struct RecordingWriter {
    writer: Box<dyn Write>,
    channel_count: Option<usize>,
    sample_count: u64,
}

impl RecordingWriter {
    /// Creates a new RecordingWriter for the specified file path.
    ///
    /// Automatically enables Brotli compression if the file path ends with `.br`
    /// (e.g., `session.eegj.br`).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use eegscope::RecordingWriter;
    /// # fn main() -> anyhow::Result<()> {
    /// let mut writer = RecordingWriter::new("session.eegj.br")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self> {
        let path = file_path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;

        let writer: Box<dyn Write> = if has_brotli_suffix(path) {
            let buf_writer = BufWriter::new(file);
            let params = BrotliEncoderParams {
                quality: 6,
                lgwin: 22,
                ..Default::default()
            };
            Box::new(CompressorWriter::with_params(buf_writer, 4096, &params))
        } else {
            Box::new(BufWriter::new(file))
        };

        Ok(RecordingWriter {
            writer,
            channel_count: None,
            sample_count: 0,
        })
    }

    pub fn write_header(&mut self, sampling_frequency_hz: f64, channels: &[ChannelDescriptor]) -> Result<()> {
        if self.channel_count.is_some() {
            return Err(anyhow!("Header already written"));
        }
        let channels: Vec<EegjChannel> = channels
            .iter()
            .map(|c| EegjChannel { label: c.label.clone(), unit: c.unit.clone() })
            .collect();
        let header = serde_json::json!({
            "type": "header",
            "version": EEGJ_VERSION,
            "sampling_frequency_hz": sampling_frequency_hz,
            "channels": channels,
        });

        self.write_line(&header)?;
        self.channel_count = Some(channels.len());
        Ok(())
    }

    /// Writes one block; `samples[channel]` must all have the same length.
    pub fn write_block(&mut self, samples: &[&[f32]]) -> Result<()> {
        let channel_count = self.channel_count
            .ok_or_else(|| anyhow!("Block written before header"))?;
        if samples.len() != channel_count {
            return Err(anyhow!("Block has {} channels, header declares {}", samples.len(), channel_count));
        }
        let width = samples.first().map(|s| s.len()).unwrap_or(0);
        if samples.iter().any(|s| s.len() != width) {
            return Err(anyhow!("Ragged sample block"));
        }

        let block = serde_json::json!({
            "type": "block",
            "samples": samples,
        });
        self.write_line(&block)?;
        self.sample_count += width as u64;
        Ok(())
    }

    pub fn write_footer(&mut self) -> Result<()> {
        let footer = serde_json::json!({
            "type": "footer",
            "sample_count": self.sample_count,
        });

        self.write_line(&footer)?;
        Ok(())
    }

    /// Writes a whole decoded recording: header, blocks and footer.
    pub fn write_source(&mut self, source: &RecordingSource) -> Result<()> {
        self.write_header(source.info.sampling_frequency_hz, &source.info.channels)?;
        let total = source.info.sample_count;
        let mut start = 0u64;
        while start < total {
            let end = (start + DEFAULT_BLOCK_SAMPLES as u64).min(total);
            let block: Vec<&[f32]> = (0..source.channel_count())
                .map(|ch| source.channel_samples(ch, start..end))
                .collect();
            self.write_block(&block)?;
            start = end;
        }
        self.write_footer()
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .context("Failed to serialize to JSON")?;

        writeln!(self.writer, "{}", json)
            .context("Failed to write line")?;

        Ok(())
    }
}

impl Drop for RecordingWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
