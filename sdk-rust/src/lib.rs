pub mod bbp_sdk_test;
mod client_utils;
mod document_index;
mod errors;
pub mod openai;
mod opentelemetry;

pub use document_index::{DocumentIndex, RawResponse, ResponsesService};
pub use errors::*;
