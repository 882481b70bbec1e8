pub mod client;
pub mod gateway;
pub mod models;
pub mod response;

pub use client::build_http_client;
pub use gateway::{Completion, CompletionGateway, ModelConfig, OpenAiGateway};
pub use models::RequestBody;
