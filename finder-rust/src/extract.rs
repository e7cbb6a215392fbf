use bbp_sdk::openai::{
    Response, ResponseOutputContent, ResponseOutputItem, ResponseOutputTextAnnotation,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub file_id: String,
    pub filename: String,
}

/// What could be read out of a completion. The text is shown as-is in both
/// cases; it is not checked against the requested JSON fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Text gathered from the assistant messages, with file citations.
    Structured {
        text: String,
        citations: Vec<Citation>,
    },
    /// The completion did not have the expected shape; this is the whole raw
    /// body, stringified.
    Unstructured { raw: String },
}

impl Extraction {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Structured { text, .. } => text,
            Self::Unstructured { raw } => raw,
        }
    }

    #[must_use]
    pub fn citations(&self) -> &[Citation] {
        match self {
            Self::Structured { citations, .. } => citations,
            Self::Unstructured { .. } => &[],
        }
    }

    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }
}

/// Concatenate every `output_text` block of every `message` item, in order,
/// collecting `file_citation` annotations along the way. Never fails.
#[must_use]
pub fn extract(raw: &Value) -> Extraction {
    let response = match serde_json::from_value::<Response>(raw.clone()) {
        Ok(response) => response,
        Err(error) => {
            debug!(%error, "completion has an unexpected shape");
            return Extraction::Unstructured {
                raw: raw.to_string(),
            };
        }
    };

    let mut text = String::new();
    let mut citations = Vec::new();

    for item in response.output {
        let ResponseOutputItem::Message(message) = item else {
            continue;
        };
        for content in message.content {
            let ResponseOutputContent::OutputText(output_text) = content else {
                continue;
            };
            text.push_str(&output_text.text);
            for annotation in output_text.annotations {
                if let ResponseOutputTextAnnotation::FileCitation(citation) = annotation {
                    citations.push(Citation {
                        file_id: citation.file_id,
                        filename: citation.filename,
                    });
                }
            }
        }
    }

    Extraction::Structured { text, citations }
}
