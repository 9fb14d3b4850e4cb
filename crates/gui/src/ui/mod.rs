pub mod parts_panel;
pub mod status_bar;
pub mod toolbar;
