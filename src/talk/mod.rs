pub mod commands;
pub mod controller;

pub use controller::TalkController;
