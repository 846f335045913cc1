pub mod csv_log;
pub mod log_reader;
pub mod metadata;
