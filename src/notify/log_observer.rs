use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::event::UpdateEvent;
use super::observer::{Observer, ObserverCategory, ObserverError};

enum Sink {
    File { path: PathBuf, file: Mutex<File> },
    Buffer(Arc<Mutex<Vec<String>>>),
}

/// Observer that appends one JSON line per received event.
///
/// File sinks are opened in append mode and never truncated.
pub struct LogObserver {
    name: String,
    category: ObserverCategory,
    sink: Sink,
}

impl LogObserver {
    /// Append events to the file at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>, category: ObserverCategory) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(LogObserver {
            name: format!("log:{}", path.display()),
            category,
            sink: Sink::File {
                path,
                file: Mutex::new(file),
            },
        })
    }

    /// Collect event lines in a shared buffer.
    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>, category: ObserverCategory) -> Self {
        LogObserver {
            name: "log:buffer".to_string(),
            category,
            sink: Sink::Buffer(buffer),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            Sink::File { path, .. } => Some(path),
            Sink::Buffer(_) => None,
        }
    }

    fn fail(&self, message: impl Into<String>) -> ObserverError {
        ObserverError::new(self.name.clone(), message)
    }
}

impl Observer for LogObserver {
    fn category(&self) -> ObserverCategory {
        self.category
    }

    fn update(&self, event: &UpdateEvent) -> Result<(), ObserverError> {
        let line = serde_json::to_string(event).map_err(|e| self.fail(e.to_string()))?;
        match &self.sink {
            Sink::File { file, .. } => {
                let mut file = file.lock().map_err(|_| self.fail("file lock poisoned"))?;
                writeln!(file, "{}", line).map_err(|e| self.fail(e.to_string()))?;
                file.flush().map_err(|e| self.fail(e.to_string()))
            }
            Sink::Buffer(buffer) => {
                let mut buffer = buffer.lock().map_err(|_| self.fail("buffer poisoned"))?;
                buffer.push(line);
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
