mod app;
mod charts;
mod maps;

pub use app::launch_gui;
