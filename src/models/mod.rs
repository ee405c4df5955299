pub mod capabilities;
pub mod catalog;
pub mod chat;
