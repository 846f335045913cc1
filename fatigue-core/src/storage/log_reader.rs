//! Parses a persisted log back into samples, for plotting or replay.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use super::csv_log::FIXED_COLUMNS;
use crate::models::error::SessionError;
use crate::models::sample::{ChannelReading, Sample};

/// Read every complete row of the log at `path`.
pub fn read_log(path: &Path) -> Result<Vec<Sample>, SessionError> {
    let file = File::open(path)
        .map_err(|e| SessionError::StorageError(format!("failed to open log {}: {}", path.display(), e)))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|e| SessionError::StorageError(format!("failed to read header: {}", e)))?,
        None => return Err(SessionError::StorageError("log is empty".into())),
    };
    let channel_count = parse_header(&header)?;

    let mut samples = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line.map_err(|e| SessionError::StorageError(format!("failed to read row: {}", e)))?;
        if line.is_empty() {
            continue;
        }
        // Line numbers are 1-based and the header is line 1.
        samples.push(parse_row(&line, channel_count, index + 2)?);
    }
    Ok(samples)
}

fn parse_header(header: &str) -> Result<usize, SessionError> {
    let columns: Vec<&str> = header.split(',').collect();
    if columns.len() < FIXED_COLUMNS.len() || columns[..FIXED_COLUMNS.len()] != FIXED_COLUMNS {
        return Err(SessionError::StorageError(format!("unrecognized header: {}", header)));
    }

    let channels = &columns[FIXED_COLUMNS.len()..];
    for (i, name) in channels.iter().enumerate() {
        if *name != format!("channel_{}", i) {
            return Err(SessionError::StorageError(format!(
                "unexpected column {:?} at channel position {}",
                name, i
            )));
        }
    }
    Ok(channels.len())
}

fn parse_row(line: &str, channel_count: usize, line_no: usize) -> Result<Sample, SessionError> {
    let fields: Vec<&str> = line.split(',').collect();
    let expected = FIXED_COLUMNS.len() + channel_count;
    if fields.len() != expected {
        return Err(SessionError::StorageError(format!(
            "line {}: expected {} columns, found {}",
            line_no,
            expected,
            fields.len()
        )));
    }

    let iteration: u64 = parse_field(fields[0], line_no)?;
    let time_secs: f64 = parse_field(fields[1], line_no)?;
    let cycle_count: u64 = parse_field(fields[2], line_no)?;
    let readings = fields[FIXED_COLUMNS.len()..]
        .iter()
        .enumerate()
        .map(|(channel, field)| parse_field(field, line_no).map(|value| ChannelReading::new(channel, value)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sample::new(iteration, time_secs, cycle_count, readings))
}

fn parse_field<T: FromStr>(field: &str, line_no: usize) -> Result<T, SessionError> {
    field
        .trim()
        .parse()
        .map_err(|_| SessionError::StorageError(format!("line {}: invalid value {:?}", line_no, field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv_log::{format_row, header_line};
    use std::fs;

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let samples = vec![
            Sample::new(0, 0.0, 0, vec![ChannelReading::new(0, 0.25), ChannelReading::new(1, -0.001)]),
            Sample::new(1, 1.0, 1, vec![ChannelReading::new(0, 0.3), ChannelReading::new(1, 0.0)]),
        ];
        let mut text = header_line(2);
        for s in &samples {
            text.push_str(&format_row(s));
        }
        fs::write(&path, text).unwrap();

        assert_eq!(read_log(&path).unwrap(), samples);
    }

    #[test]
    fn header_only_log_has_no_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        fs::write(&path, header_line(4)).unwrap();
        assert!(read_log(&path).unwrap().is_empty());
    }

    #[test]
    fn rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        fs::write(&path, "Signal Iteration,Time (s),ch0 (V/V)\n").unwrap();
        assert!(matches!(read_log(&path), Err(SessionError::StorageError(_))));
    }

    #[test]
    fn rejects_short_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        fs::write(&path, format!("{}0,0,0,0.1\n", header_line(2))).unwrap();
        let err = read_log(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        fs::write(&path, "").unwrap();
        assert!(read_log(&path).is_err());
    }
}
