//! Sinks for scalar training metrics.

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Receives named scalars tagged with a step counter.
pub trait MetricsSink {
    fn record(&mut self, name: &str, value: f64, step: usize) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Emits every metric as a `tracing` event on the `metrics` target.
#[derive(Debug, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn record(&mut self, name: &str, value: f64, step: usize) -> Result<()> {
        tracing::debug!(target: "metrics", name, value, step);
        Ok(())
    }
}

/// Keeps every record in memory. Clones share the same storage, so a handle
/// kept by the caller sees what a boxed copy records.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<(String, f64, usize)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, f64, usize)>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn records(&self) -> Vec<(String, f64, usize)> {
        self.lock().clone()
    }

    /// `(step, value)` pairs recorded under `name`, in recording order.
    pub fn series(&self, name: &str) -> Vec<(usize, f64)> {
        self.lock()
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|&(_, value, step)| (step, value))
            .collect()
    }
}

impl MetricsSink for MemorySink {
    fn record(&mut self, name: &str, value: f64, step: usize) -> Result<()> {
        self.lock().push((name.to_string(), value, step));
        Ok(())
    }
}

/// Appends `name,value,step` rows to a CSV file.
pub struct CsvSink {
    writer: BufWriter<File>,
}

impl CsvSink {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "name,value,step")?;
        Ok(CsvSink { writer })
    }
}

impl MetricsSink for CsvSink {
    fn record(&mut self, name: &str, value: f64, step: usize) -> Result<()> {
        writeln!(self.writer, "{},{},{}", name, value, step)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<S: MetricsSink + ?Sized> MetricsSink for Box<S> {
    fn record(&mut self, name: &str, value: f64, step: usize) -> Result<()> {
        (**self).record(name, value, step)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
