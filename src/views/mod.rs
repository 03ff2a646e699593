pub mod chat;
pub mod designer;
pub mod shared;

pub use chat::DecoraChatbot;
pub use designer::RoomDesigner;
