mod app;
mod theme;
mod views;

pub use app::TripboardApp;
pub use theme::{setup_fonts, setup_theme};
