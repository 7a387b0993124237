//! Terminal User Interface components

mod app;
pub mod browser;
mod render;
pub mod sessions;
pub mod theme;
mod widgets;

pub use app::{App, AppState, AppView};
pub use render::draw;
pub use theme::ThemeColors;
pub use widgets::*;
