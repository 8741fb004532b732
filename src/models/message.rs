use rocket::serde::Serialize;
use schemars::JsonSchema;

/// Confirmation for operations that have no record left to return.
#[derive(Serialize, Debug, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
