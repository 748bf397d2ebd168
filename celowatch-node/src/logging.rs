use anyhow::Result;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::constants::LOG_FILE_NAME;

/// Map a level name to a filter; unknown names fall back to info
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize logging to the terminal, and additionally to
/// `<logs_path>/celowatch.log` (append mode) when a directory is given
pub fn init_logging(logs_path: Option<PathBuf>, log_level: Option<String>) -> Result<()> {
    let level_str = log_level.unwrap_or_else(|| "info".to_string());
    let level_filter = parse_level(&level_str);

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&level_str));
    builder.filter_level(level_filter);

    match logs_path {
        Some(logs_dir) => {
            std::fs::create_dir_all(&logs_dir)?;

            let log_file_path = logs_dir.join(LOG_FILE_NAME);
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file_path)?;

            builder.target(env_logger::Target::Pipe(Box::new(DualWriter::new(log_file))));
            builder.try_init()?;

            log::info!(
                "Logging initialized. Logs will be written to both terminal and: {} (level: {})",
                log_file_path.display(),
                level_str
            );
        }
        None => {
            builder.try_init()?;
            log::info!("Logging initialized. Logs will be written to terminal only (level: {})", level_str);
        }
    }

    Ok(())
}

/// A writer that writes to both a file and stderr
struct DualWriter {
    file: std::fs::File,
}

impl DualWriter {
    fn new(file: std::fs::File) -> Self {
        Self { file }
    }
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stderr().flush()?;
        Ok(())
    }
}
