use crate::{ServiceError, ServiceResult};
use reqwest::{header::HeaderMap, multipart::Form, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Create a JSON request, parse the response.
/// Throws error on non OK status code.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
) -> ServiceResult<R> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    parse_json(response).await
}

/// Issue a GET request with query parameters, parse the response.
pub async fn get_json<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    headers: HeaderMap,
) -> ServiceResult<R> {
    let response = client.get(url).headers(headers).query(query).send().await?;
    parse_json(response).await
}

/// Issue a DELETE request, parse the response.
pub async fn delete_json<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: HeaderMap,
) -> ServiceResult<R> {
    let response = client.delete(url).headers(headers).send().await?;
    parse_json(response).await
}

/// Upload a multipart form, parse the response.
pub async fn send_multipart<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    form: Form,
    headers: HeaderMap,
) -> ServiceResult<R> {
    let response = client
        .post(url)
        .headers(headers)
        .multipart(form)
        .send()
        .await?;
    parse_json(response).await
}

async fn parse_json<R: DeserializeOwned>(response: Response) -> ServiceResult<R> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::StatusCode(status, error_message(&body)));
    }
    Ok(response.json::<R>().await?)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// `OpenAI` wraps failures as `{"error": {"message": ...}}`. Anything else is
/// passed through as-is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}
