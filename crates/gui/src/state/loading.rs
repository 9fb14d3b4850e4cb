//! Background model loading
//!
//! Files are read and imported on a tokio blocking task. Progress and the
//! final result come back over a channel that the UI drains once per frame.

use std::path::{Path, PathBuf};

use shared::LoadProgress;
use tokio::sync::mpsc;
use viewer_core::{loader, LoadedModel};

/// Message from a loading task
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Loaded(LoadedModel),
    Failed(String),
}

/// Runs model loads off the UI thread
#[derive(Default)]
pub struct ModelLoader {
    runtime: Option<tokio::runtime::Runtime>,
    rx: Option<mpsc::UnboundedReceiver<LoadEvent>>,
    path: Option<PathBuf>,
    progress: Option<LoadProgress>,
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a load is in flight
    pub fn is_loading(&self) -> bool {
        self.rx.is_some()
    }

    /// File currently being loaded
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Last progress update of the in-flight load
    pub fn progress(&self) -> Option<LoadProgress> {
        self.progress
    }

    /// Start loading `path`. A load that is already running is not cancelled,
    /// but its results are discarded. `notify` runs after every event, e.g.
    /// to wake the UI.
    pub fn load(
        &mut self,
        path: impl Into<PathBuf>,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> std::io::Result<()> {
        let path = path.into();
        let runtime = self.runtime()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let task_path = path.clone();
        runtime.spawn_blocking(move || {
            let result = loader::load_gltf_path(&task_path, |p| {
                let _ = tx.send(LoadEvent::Progress(p));
                notify();
            });
            let event = match result {
                Ok(model) => LoadEvent::Loaded(model),
                Err(e) => LoadEvent::Failed(e.to_string()),
            };
            // receiver gone: a newer load replaced this one
            if tx.send(event).is_ok() {
                notify();
            }
        });

        tracing::info!("Loading model from {}", path.display());
        self.rx = Some(rx);
        self.path = Some(path);
        self.progress = None;
        Ok(())
    }

    /// Drain pending events without blocking. Once the final event
    /// (`Loaded` or `Failed`) is seen the loader becomes idle.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        let Some(rx) = self.rx.as_mut() else {
            return events;
        };

        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(LoadEvent::Progress(p)) => {
                    self.progress = Some(p);
                    events.push(LoadEvent::Progress(p));
                }
                Ok(event) => {
                    events.push(event);
                    finished = true;
                    break;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    events.push(LoadEvent::Failed("Loading task stopped unexpectedly".to_string()));
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.rx = None;
            self.progress = None;
        }
        events
    }

    fn runtime(&mut self) -> std::io::Result<&tokio::runtime::Runtime> {
        if self.runtime.is_none() {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("model-loader")
                .enable_all()
                .build()?;
            self.runtime = Some(runtime);
        }
        match self.runtime.as_ref() {
            Some(runtime) => Ok(runtime),
            None => Err(std::io::Error::other("tokio runtime unavailable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_loader_polls_nothing() {
        let mut loader = ModelLoader::new();
        assert!(!loader.is_loading());
        assert!(loader.poll().is_empty());
        assert_eq!(loader.path(), None);
    }
}
