use crate::models::Turn;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct RequestBody<'a> {
    pub model: &'a str,
    pub messages: &'a [Turn],
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
pub struct CompletionResponse {
    pub choices: Option<Vec<Choice>>,
}
