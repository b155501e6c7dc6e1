//! Logging setup for Tapeflow binaries.
//!
//! Two sinks: a size-rotated log file under `$TAPEFLOW_HOME/logs` and stderr.
//! The file always receives the `RUST_LOG` (or default) filter; stderr stays
//! at `warn` unless the binary runs verbose.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "tapeflow_frontend=info,tapeflow_catalogue=info";
const QUIET_CONSOLE_FILTER: &str = "warn";
const HOME_ENV: &str = "TAPEFLOW_HOME";
const KEEP_ROTATED: usize = 4;
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Overrides `$TAPEFLOW_HOME/logs`.
    pub log_dir: Option<PathBuf>,
}

/// Install the global tracing subscriber.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let dir = match config.log_dir {
        Some(dir) => dir,
        None => logs_dir()?,
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;

    let file = RotatingFile::open(&dir, config.app_name, ROTATE_AT_BYTES, KEEP_ROTATED)
        .with_context(|| format!("Failed to open log file for {}", config.app_name))?;
    let writer = FileWriter::new(file);

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    } else {
        EnvFilter::new(QUIET_CONSOLE_FILTER)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .map_err(|err| anyhow!("Failed to install tracing subscriber: {err}"))?;

    Ok(())
}

/// Tapeflow home directory: `$TAPEFLOW_HOME`, else `~/.tapeflow`.
pub fn tapeflow_home() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".tapeflow"))
        .ok_or_else(|| anyhow!("Could not determine home directory; set {HOME_ENV}"))
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(tapeflow_home()?.join("logs"))
}

// ============================================================================
// Size-rotated log file
// ============================================================================

/// `<name>.log`, rotated to `<name>.log.1` .. `<name>.log.<keep>` once it
/// would grow past `limit` bytes.
struct RotatingFile {
    active: PathBuf,
    limit: u64,
    keep: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    fn open(dir: &Path, name: &str, limit: u64, keep: usize) -> io::Result<Self> {
        let active = dir.join(format!("{}.log", file_stem(name)));
        let file = append_to(&active)?;
        let written = file.metadata()?.len();
        Ok(Self {
            active,
            limit,
            keep,
            file,
            written,
        })
    }

    fn numbered(&self, n: usize) -> PathBuf {
        let mut raw = self.active.clone().into_os_string();
        raw.push(format!(".{n}"));
        PathBuf::from(raw)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.keep > 0 {
            let _ = fs::remove_file(self.numbered(self.keep));
            for n in (1..self.keep).rev() {
                let from = self.numbered(n);
                if from.exists() {
                    fs::rename(&from, self.numbered(n + 1))?;
                }
            }
            fs::rename(&self.active, self.numbered(1))?;
        } else {
            fs::remove_file(&self.active)?;
        }
        self.file = append_to(&self.active)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.limit {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn append_to(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

/// Cloneable handle handed to `tracing_subscriber` as a `MakeWriter`.
#[derive(Clone)]
struct FileWriter {
    inner: Arc<Mutex<RotatingFile>>,
}

impl FileWriter {
    fn new(file: RotatingFile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(file)),
        }
    }

    fn with_file<T>(&self, f: impl FnOnce(&mut RotatingFile) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        f(&mut guard)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}
