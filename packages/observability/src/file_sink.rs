//! Append-only JSONL log file.
//!
//! Each event is flushed as soon as it is written so `tail -f` sees it
//! immediately.

use crate::json_layer::JsonLayer;
use crate::{env_filter, init_stderr_only, LogConfig};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Shared handle on the log file; clones write to the same file.
#[derive(Clone)]
pub struct LogFileWriter {
    file: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    /// Open `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock();
        let written = file.write(buf)?;
        file.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub(crate) fn init_file_subscriber(config: &LogConfig, log_path: &Path) {
    let writer = match LogFileWriter::open(log_path) {
        Ok(writer) => writer,
        Err(err) => {
            init_stderr_only(&config.default_level);
            tracing::warn!(
                log_path = %log_path.display(),
                error = %err,
                "log file unavailable, logging to stderr only"
            );
            return;
        }
    };

    let stderr = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let _ = tracing_subscriber::registry()
        .with(
            JsonLayer::new(config.service_name.clone(), writer)
                .with_filter(env_filter(&config.default_level)),
        )
        .with(stderr)
        .try_init();

    tracing::debug!(log_path = %log_path.display(), "log file opened");
}
