mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state` and `crate::i18n`
// resolve to the lib crate types everywhere in the binary.
pub use model_viewer_lib::i18n;
pub use model_viewer_lib::state;

use std::path::PathBuf;

use app::ViewerApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "model_viewer=info,viewer_core=info".into()),
        )
        .init();

    // Parse --model <path> argument
    let initial_model = parse_model_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Model Viewer")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "model-viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, initial_model)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_model_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--model" && i + 1 < args.len() {
            let path = PathBuf::from(&args[i + 1]);
            if path.is_file() {
                return Some(path);
            }
            tracing::error!("Model file {} not found, showing the demo scene", path.display());
            break;
        }
        i += 1;
    }
    None
}
