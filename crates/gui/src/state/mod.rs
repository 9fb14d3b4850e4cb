pub mod loading;
pub mod settings;

use std::path::PathBuf;

use shared::{BoxSelectionReport, ElementId};
use viewer_core::Viewer;

pub use loading::{LoadEvent, ModelLoader};
pub use settings::{AppSettings, UiSettings};

/// Panel visibility flags
pub struct PanelVisibility {
    pub parts: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self { parts: true }
    }
}

/// What the status bar shows besides counters
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatusMessage {
    #[default]
    Ready,
    Info(String),
    Error(String),
}

/// Combined application state
pub struct AppState {
    pub viewer: Viewer,
    pub settings: AppSettings,
    pub loader: ModelLoader,
    pub panels: PanelVisibility,
    pub status: StatusMessage,
    /// Element id returned by the last click
    pub last_pick: Option<ElementId>,
    /// Result of the last finished box selection
    pub last_box: Option<BoxSelectionReport>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            viewer: Viewer::new(settings.viewer.clone()),
            settings,
            loader: ModelLoader::new(),
            panels: PanelVisibility::default(),
            status: StatusMessage::Ready,
            last_pick: None,
            last_box: None,
        }
    }

    /// Start loading a model in the background
    pub fn open_model(&mut self, path: impl Into<PathBuf>, notify: impl Fn() + Send + Sync + 'static) {
        let path = path.into();
        match self.loader.load(&path, notify) {
            Ok(()) => self.status = StatusMessage::Info(path.display().to_string()),
            Err(e) => {
                tracing::error!("Failed to start loading {}: {e}", path.display());
                self.status = StatusMessage::Error(e.to_string());
            }
        }
    }

    /// Apply finished loads to the viewer. Returns true when anything changed.
    pub fn poll_loading(&mut self) -> bool {
        let events = self.loader.poll();
        let changed = !events.is_empty();
        for event in events {
            match event {
                LoadEvent::Progress(_) => {}
                LoadEvent::Loaded(model) => {
                    let name = model.name.clone();
                    self.viewer.set_model(model);
                    self.last_pick = None;
                    self.last_box = None;
                    self.status = StatusMessage::Info(name);
                }
                LoadEvent::Failed(message) => {
                    tracing::error!("Model loading failed: {message}");
                    self.status = StatusMessage::Error(message);
                }
            }
        }
        changed
    }

    /// Replace the scene with the demo boxes
    pub fn load_demo(&mut self) {
        self.viewer.load_demo();
        self.last_pick = None;
        self.last_box = None;
        self.status = StatusMessage::Ready;
    }

    /// Push edited viewer settings into the running viewer and persist them
    pub fn apply_viewer_settings(&mut self) {
        self.viewer.apply_settings(self.settings.viewer.clone());
        self.settings.save();
    }

    pub fn toggle_box_selection(&mut self) {
        if self.viewer.is_box_selecting() {
            self.viewer.stop_box_selection();
        } else {
            self.last_pick = None;
            self.viewer.start_box_selection();
        }
    }

    pub fn toggle_auto_rotation(&mut self) {
        if self.viewer.is_auto_rotating() {
            self.viewer.stop_auto_rotation();
        } else {
            self.viewer.start_auto_rotation();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}
