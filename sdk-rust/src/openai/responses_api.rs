#![allow(clippy::pedantic)]
use serde::{Deserialize, Deserializer, Serialize};

// https://platform.openai.com/docs/api-reference/responses/create

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ResponseCreateParams {
    /// Specify additional output data to include in the model response.
    /// Currently supported values relevant here:
    ///
    /// - `file_search_call.results`: Include the search results of the file
    ///   search tool call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<ResponseIncludable>>,

    /// Text input to the model, used to generate a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// A system (or developer) message inserted into the model's context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// An upper bound for the number of tokens that can be generated for a
    /// response, including visible output tokens and reasoning tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Model ID used to generate the response, like `gpt-4.1-mini` or `o3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Whether to store the generated model response for later retrieval via
    /// API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,

    /// What sampling temperature to use, between 0 and 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// An array of tools the model may call while generating a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResponseIncludable {
    #[serde(rename = "file_search_call.results")]
    FileSearchCallResults,
}

/// A tool that can be used to generate a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    FileSearch(FileSearchTool),
}

/// A tool that searches for relevant content from uploaded files. Learn more
/// about the
/// [file search tool](https://platform.openai.com/docs/guides/tools-file-search).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FileSearchTool {
    /// The IDs of the vector stores to search.
    pub vector_store_ids: Vec<String>,

    /// The maximum number of results to return. This number should be between
    /// 1 and 50 inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_num_results: Option<u32>,

    /// A filter to apply based on file attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
}

impl Tool {
    /// A `file_search` tool scoped to a single vector store.
    #[must_use]
    pub fn file_search(vector_store_id: impl Into<String>) -> Self {
        Self::FileSearch(FileSearchTool {
            vector_store_ids: vec![vector_store_id.into()],
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Unique identifier for this Response.
    #[serde(default)]
    pub id: String,

    /// Unix timestamp (in seconds) of when this Response was created.
    #[serde(default)]
    pub created_at: i64,

    /// Model ID used to generate the response.
    #[serde(default)]
    pub model: String,

    /// An array of content items generated by the model.
    ///
    /// - The length and order of items in the `output` array is dependent on
    ///   the model's response.
    /// - A `file_search_call` item usually precedes the assistant `message`
    ///   when the file search tool is attached.
    pub output: Vec<ResponseOutputItem>,

    /// The status of the response generation. One of `completed`, `failed`,
    /// `in_progress`, `cancelled`, `queued`, or `incomplete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,

    /// Represents token usage details including input tokens, output tokens
    /// and the total tokens used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
}

/// An output item from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseOutputItem {
    Message(ResponseOutputMessage),
    FileSearchCall(ResponseFileSearchToolCall),
    /// Output items this client does not model (reasoning, web search, ...).
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOutputMessage {
    /// The unique ID of the output message.
    #[serde(default)]
    pub id: String,

    /// The content of the output message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ResponseOutputContent>,

    /// The role of the output message. Always `assistant`.
    #[serde(default)]
    pub role: String,

    /// The status of the message input. One of `in_progress`, `completed`, or
    /// `incomplete`.
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseOutputContent {
    OutputText(ResponseOutputText),
    Refusal(ResponseOutputRefusal),
    /// Content blocks this client does not model (audio, ...).
    #[serde(other)]
    Other,
}

/// A text output from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOutputText {
    /// The annotations of the text output.
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<ResponseOutputTextAnnotation>,

    /// The text output from the model. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseOutputTextAnnotation {
    FileCitation(ResponseOutputTextFileCitation),
    UrlCitation(ResponseOutputTextURLCitation),
    FilePath(ResponseOutputTextFilePath),
    #[serde(other)]
    Other,
}

/// A citation to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOutputTextFileCitation {
    /// The ID of the file.
    #[serde(default)]
    pub file_id: String,

    /// The filename of the file cited.
    #[serde(default)]
    pub filename: String,

    /// The index of the file in the list of files.
    #[serde(default)]
    pub index: u32,
}

/// A citation for a web resource used to generate a model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOutputTextURLCitation {
    /// The index of the last character of the URL citation in the message.
    pub end_index: u32,

    /// The index of the first character of the URL citation in the message.
    pub start_index: u32,

    /// The title of the web resource.
    pub title: String,

    /// The URL of the web resource.
    pub url: String,
}

/// A path to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOutputTextFilePath {
    /// The ID of the file.
    pub file_id: String,

    /// The index of the file in the list of files.
    pub index: u32,
}

/// A refusal from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOutputRefusal {
    /// The refusal explanation from the model.
    pub refusal: String,
}

/// The results of a file search tool call. See the
/// [file search guide](https://platform.openai.com/docs/guides/tools-file-search)
/// for more information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFileSearchToolCall {
    /// The unique ID of the file search tool call.
    pub id: String,

    /// The queries used to search for files.
    #[serde(default)]
    pub queries: Vec<String>,

    /// The status of the file search tool call. One of `in_progress`,
    /// `searching`, `incomplete` or `failed`.
    #[serde(default)]
    pub status: String,

    /// The results of the file search tool call. Only present when
    /// `file_search_call.results` is included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<FileSearchResult>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSearchResult {
    /// The unique ID of the file.
    #[serde(default)]
    pub file_id: String,

    /// The name of the file.
    #[serde(default)]
    pub filename: String,

    /// The relevance score of the file - a value between 0 and 1.
    #[serde(default)]
    pub score: f64,

    /// The text that was retrieved from the file.
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Completed,
    Failed,
    InProgress,
    Cancelled,
    Queued,
    Incomplete,
}

/// Represents token usage details including input tokens, output tokens and
/// the total tokens used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseUsage {
    /// The number of input tokens.
    pub input_tokens: u32,

    /// The number of output tokens.
    pub output_tokens: u32,

    /// The total number of tokens used.
    pub total_tokens: u32,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
