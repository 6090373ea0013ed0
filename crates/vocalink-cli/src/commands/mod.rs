pub mod chat;
pub mod discord;
pub mod init;
pub mod voice;
