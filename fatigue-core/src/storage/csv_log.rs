use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::SessionError;
use crate::models::sample::Sample;
use crate::traits::log_sink::LogSink;

/// Leading columns of every log, before the per-channel columns.
pub const FIXED_COLUMNS: [&str; 3] = ["iteration", "time_seconds", "cycle_count"];

/// Header line for a log with `channel_count` analog channels.
///
/// ```text
/// iteration,time_seconds,cycle_count,channel_0,...,channel_{N-1}
/// ```
pub fn header_line(channel_count: usize) -> String {
    let mut line = FIXED_COLUMNS.join(",");
    for channel in 0..channel_count {
        let _ = write!(line, ",channel_{}", channel);
    }
    line.push('\n');
    line
}

/// One data line for `sample`, terminator included.
pub fn format_row(sample: &Sample) -> String {
    let mut line = format!("{},{},{}", sample.iteration(), sample.time_secs(), sample.cycle_count());
    for reading in sample.readings() {
        let _ = write!(line, ",{}", reading.value);
    }
    line.push('\n');
    line
}

/// Append-only CSV log file.
///
/// ## File Format
///
/// ```text
/// [header line]
/// [one line per sample, comma separated, '\n' terminated]
/// ```
///
/// The writer itself is format-agnostic: `SampleRecorder` supplies the
/// header and rows. Every append is written and `sync_data`'d before
/// returning. A failed append truncates the file back to the last
/// complete line.
pub struct CsvLogWriter {
    file_path: PathBuf,
    file: Option<File>,
    committed_len: u64,
    lines_written: u64,
}

impl CsvLogWriter {
    /// Create (or truncate) the log file, creating parent directories.
    pub fn create(file_path: PathBuf) -> Result<Self, SessionError> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| SessionError::LogWriteFailure(format!("failed to create directory: {}", e)))?;
            }
        }

        let file = File::create(&file_path)
            .map_err(|e| SessionError::LogWriteFailure(format!("failed to create log: {}", e)))?;

        Ok(Self {
            file_path,
            file: Some(file),
            committed_len: 0,
            lines_written: 0,
        })
    }

    /// Complete lines written so far, header included.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Bytes of complete lines in the file.
    pub fn bytes_written(&self) -> u64 {
        self.committed_len
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Cut the file back to the last complete line and reposition there.
    fn rollback(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.set_len(self.committed_len)?;
            file.seek(SeekFrom::Start(self.committed_len))?;
        }
        Ok(())
    }
}

impl LogSink for CsvLogWriter {
    fn append(&mut self, line: &[u8]) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("log is not open"))?;

        if let Err(e) = file.write_all(line).and_then(|_| file.sync_data()) {
            if let Err(rollback_err) = self.rollback() {
                log::error!(
                    "Failed to roll back partial line in {}: {}",
                    self.file_path.display(),
                    rollback_err
                );
            }
            return Err(e);
        }

        self.committed_len += line.len() as u64;
        self.lines_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.file_path)
    }
}

/// Compute SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, SessionError> {
    let data = fs::read(path)
        .map_err(|e| SessionError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample::ChannelReading;

    fn sample(iteration: u64, cycles: u64, values: &[f64]) -> Sample {
        let readings = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ChannelReading::new(i, v))
            .collect();
        Sample::new(iteration, iteration as f64 * 0.5, cycles, readings)
    }

    #[test]
    fn header_lists_channels_in_order() {
        assert_eq!(
            header_line(3),
            "iteration,time_seconds,cycle_count,channel_0,channel_1,channel_2\n"
        );
    }

    #[test]
    fn row_formatting() {
        let row = format_row(&sample(3, 2, &[0.125, -0.5]));
        assert_eq!(row, "3,1.5,2,0.125,-0.5\n");
    }

    #[test]
    fn appends_complete_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.csv");

        let mut writer = CsvLogWriter::create(path.clone()).unwrap();
        writer.append(header_line(2).as_bytes()).unwrap();
        writer.append(format_row(&sample(0, 0, &[0.1, 0.2])).as_bytes()).unwrap();
        writer.append(format_row(&sample(1, 1, &[0.3, 0.4])).as_bytes()).unwrap();
        assert_eq!(writer.lines_written(), 3);
        writer.finish().unwrap();
        assert!(!writer.is_open());

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "iteration,time_seconds,cycle_count,channel_0,channel_1");
        assert_eq!(lines[2], "1,0.5,1,0.3,0.4");
        assert_eq!(writer.bytes_written(), contents.len() as u64);
    }

    #[test]
    fn create_truncates_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        fs::write(&path, "stale data from an earlier run\n").unwrap();

        let mut writer = CsvLogWriter::create(path.clone()).unwrap();
        writer.finish().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn append_after_finish_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvLogWriter::create(dir.path().join("run.csv")).unwrap();
        writer.finish().unwrap();
        assert!(writer.append(b"0,0,0,0\n").is_err());
    }

    #[test]
    fn create_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = CsvLogWriter::create(blocker.join("run.csv")).err().unwrap();
        assert!(matches!(err, SessionError::LogWriteFailure(_)));
    }

    #[test]
    fn rollback_discards_partial_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let mut writer = CsvLogWriter::create(path.clone()).unwrap();
        writer.append(header_line(2).as_bytes()).unwrap();
        writer.append(format_row(&sample(0, 0, &[0.1, 0.2])).as_bytes()).unwrap();

        // A row interrupted midway, as a failing write_all leaves it.
        writer.file.as_mut().unwrap().write_all(b"1,0.5,1,0.3").unwrap();
        writer.rollback().unwrap();
        writer.append(format_row(&sample(1, 1, &[0.3, 0.4])).as_bytes()).unwrap();
        writer.finish().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "iteration,time_seconds,cycle_count,channel_0,channel_1\n0,0,0,0.1,0.2\n1,0.5,1,0.3,0.4\n"
        );
        assert_eq!(writer.bytes_written(), contents.len() as u64);
        assert_eq!(writer.lines_written(), 3);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_append_is_not_counted() {
        let full = PathBuf::from("/dev/full");
        if !full.exists() {
            return;
        }
        let mut writer = match CsvLogWriter::create(full) {
            Ok(writer) => writer,
            Err(_) => return,
        };
        assert!(writer.append(b"0,0,0,0.5\n").is_err());
        assert_eq!(writer.lines_written(), 0);
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn checksum_is_stable_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
