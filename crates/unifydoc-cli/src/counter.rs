//! Persistent count of completed conversions

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEFAULT_COUNTER_FILE: &str = "counter.json";

pub trait ConversionCounter: Send + Sync {
    /// Add one completed conversion and return the new total
    fn increment(&self) -> Result<u64>;

    fn current(&self) -> Result<u64>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CounterRecord {
    converted_pdf_count: u64,
}

/// Counter stored as `{"converted_pdf_count": n}`
pub struct JsonFileCounter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable record counts as zero
    fn read(&self) -> Result<CounterRecord> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CounterRecord::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read counter {}", self.path.display()));
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(record),
            Err(e) => {
                log::warn!(
                    "Resetting counter {}: {}",
                    self.path.display(),
                    e
                );
                Ok(CounterRecord::default())
            }
        }
    }

    fn write(&self, record: &CounterRecord) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer(&mut temp, record)?;
        temp.flush()?;
        temp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write counter {}", self.path.display()))?;
        Ok(())
    }
}

impl ConversionCounter for JsonFileCounter {
    fn increment(&self) -> Result<u64> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Counter lock poisoned"))?;

        let mut record = self.read()?;
        record.converted_pdf_count += 1;
        self.write(&record)?;
        Ok(record.converted_pdf_count)
    }

    fn current(&self) -> Result<u64> {
        Ok(self.read()?.converted_pdf_count)
    }
}
