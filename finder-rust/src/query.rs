use crate::{Backend, FinderResult};
use bbp_sdk::{
    openai::{ResponseCreateParams, Tool},
    RawResponse,
};
use tracing::info;

/// The instruction sent for every lookup. The answer is asked to be a single
/// JSON object with `Found`, `Source`, `Rewards` and `Program Url`.
#[must_use]
pub fn build_query(user_input: &str) -> String {
    format!(
        "You're assigned a task to determine whether a bug bounty program exists for the given \
         input. Use the file_search tool on the provided vector store to verify. Respond strictly \
         in a **single JSON object only**, with no explanations or extra text. Fields required: \
         'Found' (Yes/No), 'Source', 'Rewards' (Yes/No), 'Program Url'. Input: {}",
        user_input.trim()
    )
}

/// One completion request with `file_search` bound to `collection_id`.
/// Failures are returned as-is and never retried.
pub async fn submit_query(
    backend: &dyn Backend,
    prompt: String,
    collection_id: &str,
    model: &str,
) -> FinderResult<RawResponse> {
    info!(collection_id, model, "submitting bug bounty lookup");
    let raw = backend
        .create_response(ResponseCreateParams {
            model: Some(model.to_string()),
            input: Some(prompt),
            tools: Some(vec![Tool::file_search(collection_id)]),
            ..Default::default()
        })
        .await?;
    Ok(raw)
}
