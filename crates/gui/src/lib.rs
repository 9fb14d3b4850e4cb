// Library crate: exposes the application state (settings, background loading)
// and render data extraction for integration tests. GUI-specific modules
// (app, ui, GL rendering) remain in the binary crate.

pub mod i18n;
pub mod state;

/// CPU-side render data. The GL renderer itself stays in the binary crate.
pub mod viewport {
    pub mod mesh;
}
