pub mod client;

pub use client::TelegramClient;
