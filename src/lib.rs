pub mod ai;
pub mod chat;
pub mod designer;
pub mod types;
pub mod ui;
pub mod views;
