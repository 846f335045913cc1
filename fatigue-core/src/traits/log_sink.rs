use std::io;
use std::path::Path;

/// Append-only destination for log rows.
///
/// Implemented by `CsvLogWriter`. Each `append` call carries exactly one
/// complete line; when it returns `Ok` the line must be durable, and when
/// it returns `Err` no fragment of the line may remain.
pub trait LogSink: Send {
    /// Append one complete line (terminator included).
    fn append(&mut self, line: &[u8]) -> io::Result<()>;

    /// Flush and release the destination. Called at most once.
    fn finish(&mut self) -> io::Result<()>;

    /// File backing this sink, if any.
    fn location(&self) -> Option<&Path> {
        None
    }
}
