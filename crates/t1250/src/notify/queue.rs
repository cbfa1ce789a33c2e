//! Hand-off of pending notifications to the dispatcher.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::PendingComms;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write flag '{path}': {source}")]
    WriteFlag {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Queue lock poisoned")]
    LockPoisoned,
}

pub trait CommsQueue {
    /// Queues one marker. Queuing the same marker twice is not an error.
    fn enqueue(&self, comms: &PendingComms) -> Result<(), QueueError>;
}

impl<Q: CommsQueue + ?Sized> CommsQueue for Box<Q> {
    fn enqueue(&self, comms: &PendingComms) -> Result<(), QueueError> {
        (**self).enqueue(comms)
    }
}

/// Returns the default flag directory: `~/.t1250/flags`.
pub fn default_flags_directory() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".t1250").join("flags"))
}

/// Writes one empty flag file per marker into a directory the dispatcher
/// polls.
pub struct FlagDirQueue {
    directory: PathBuf,
}

impl FlagDirQueue {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn flag_name(comms: &PendingComms) -> String {
        format!(
            "{}-{}-{}.flag",
            comms.channel, comms.job_item_id, comms.template
        )
    }
}

impl CommsQueue for FlagDirQueue {
    fn enqueue(&self, comms: &PendingComms) -> Result<(), QueueError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| QueueError::CreateDirectory {
            path: self.directory.clone(),
            source: e,
        })?;

        let path = self.directory.join(Self::flag_name(comms));
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => {
                log::debug!("Queued {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                log::debug!("Flag already queued: {}", path.display());
                Ok(())
            }
            Err(e) => Err(QueueError::WriteFlag { path, source: e }),
        }
    }
}

/// Keeps markers in memory. Used for dry runs and tests.
#[derive(Default)]
pub struct MemoryQueue {
    queued: Mutex<Vec<PendingComms>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> Vec<PendingComms> {
        self.queued
            .lock()
            .map(|queued| queued.clone())
            .unwrap_or_default()
    }
}

impl CommsQueue for MemoryQueue {
    fn enqueue(&self, comms: &PendingComms) -> Result<(), QueueError> {
        let mut queued = self.queued.lock().map_err(|_| QueueError::LockPoisoned)?;
        if !queued.contains(comms) {
            queued.push(*comms);
        }
        Ok(())
    }
}
