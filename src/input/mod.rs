//! Input processing module
//! Handles file detection, layout-aware PDF reading, and input management

pub mod file_detector;
pub mod pdf_reader;
pub mod manager;

pub use manager::InputManager;
