mod client;
mod files_api;
mod responses_api;
mod vector_stores_api;

pub use client::{OpenAIClient, OpenAIClientOptions};
pub use files_api::*;
pub use responses_api::*;
pub use vector_stores_api::*;
