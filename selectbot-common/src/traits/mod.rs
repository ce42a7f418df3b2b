pub mod chat_traits;
pub mod repository_traits;
