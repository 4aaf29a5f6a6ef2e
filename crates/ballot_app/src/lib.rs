pub mod app;
pub mod devices;
pub mod navigation;
