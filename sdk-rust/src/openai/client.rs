use super::{
    DeletionStatus, FileObject, FileUpload, ListPage, ResponseCreateParams, VectorStore,
    VectorStoreCreateParams, VectorStoreFile, VectorStoreFileCreateParams,
};
use crate::{
    client_utils, opentelemetry::trace_request, DocumentIndex, RawResponse, ResponsesService,
    ServiceError, ServiceResult,
};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    multipart::{Form, Part},
    Client, Method,
};
use std::{collections::HashMap, time::Duration};

const PROVIDER: &str = "openai";
const LIST_LIMIT: &str = "100";
/// Upper bound for one request on the default HTTP client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct OpenAIClientOptions {
    pub base_url: Option<String>,
    pub api_key: String,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl OpenAIClient {
    #[must_use]
    pub fn new(options: OpenAIClientOptions) -> Self {
        let OpenAIClientOptions {
            base_url,
            api_key,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(default_client);
        let headers = headers.unwrap_or_default();

        Self {
            api_key,
            base_url,
            client,
            headers,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request_headers(&self) -> ServiceResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth_header =
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|error| {
                ServiceError::InvalidInput(format!("Invalid OpenAI API key header value: {error}"))
            })?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                ServiceError::InvalidInput(format!("Invalid OpenAI header name '{key}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                ServiceError::InvalidInput(format!(
                    "Invalid OpenAI header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

fn default_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[async_trait::async_trait]
impl ResponsesService for OpenAIClient {
    async fn create_response(&self, params: ResponseCreateParams) -> ServiceResult<RawResponse> {
        let path = "/responses";
        trace_request(PROVIDER, "responses.create", &Method::POST, path, async {
            let headers = self.request_headers()?;
            client_utils::send_json(&self.client, &self.url(path), &params, headers).await
        })
        .await
    }
}

#[async_trait::async_trait]
impl DocumentIndex for OpenAIClient {
    async fn create_vector_store(
        &self,
        params: VectorStoreCreateParams,
    ) -> ServiceResult<VectorStore> {
        let path = "/vector_stores";
        trace_request(PROVIDER, "vector_stores.create", &Method::POST, path, async {
            let headers = self.request_headers()?;
            client_utils::send_json(&self.client, &self.url(path), &params, headers).await
        })
        .await
    }

    async fn list_vector_stores(&self) -> ServiceResult<Vec<VectorStore>> {
        let path = "/vector_stores";
        trace_request(PROVIDER, "vector_stores.list", &Method::GET, path, async {
            let headers = self.request_headers()?;
            let page: ListPage<VectorStore> = client_utils::get_json(
                &self.client,
                &self.url(path),
                &[("limit", LIST_LIMIT)],
                headers,
            )
            .await?;
            Ok(page.data)
        })
        .await
    }

    async fn delete_vector_store(&self, vector_store_id: &str) -> ServiceResult<DeletionStatus> {
        let path = format!("/vector_stores/{vector_store_id}");
        trace_request(PROVIDER, "vector_stores.delete", &Method::DELETE, &path, async {
            let headers = self.request_headers()?;
            client_utils::delete_json(&self.client, &self.url(&path), headers).await
        })
        .await
    }

    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> ServiceResult<Vec<VectorStoreFile>> {
        let path = format!("/vector_stores/{vector_store_id}/files");
        trace_request(PROVIDER, "vector_stores.files.list", &Method::GET, &path, async {
            let headers = self.request_headers()?;
            let page: ListPage<VectorStoreFile> = client_utils::get_json(
                &self.client,
                &self.url(&path),
                &[("limit", LIST_LIMIT)],
                headers,
            )
            .await?;
            Ok(page.data)
        })
        .await
    }

    async fn create_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> ServiceResult<VectorStoreFile> {
        let path = format!("/vector_stores/{vector_store_id}/files");
        let params = VectorStoreFileCreateParams {
            file_id: file_id.to_string(),
        };
        trace_request(PROVIDER, "vector_stores.files.create", &Method::POST, &path, async {
            let headers = self.request_headers()?;
            client_utils::send_json(&self.client, &self.url(&path), &params, headers).await
        })
        .await
    }

    async fn delete_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> ServiceResult<DeletionStatus> {
        let path = format!("/vector_stores/{vector_store_id}/files/{file_id}");
        trace_request(PROVIDER, "vector_stores.files.delete", &Method::DELETE, &path, async {
            let headers = self.request_headers()?;
            client_utils::delete_json(&self.client, &self.url(&path), headers).await
        })
        .await
    }

    async fn create_file(&self, upload: FileUpload) -> ServiceResult<FileObject> {
        let path = "/files";
        trace_request(PROVIDER, "files.create", &Method::POST, path, async {
            let headers = self.request_headers()?;
            let FileUpload {
                filename,
                bytes,
                purpose,
            } = upload;
            let form = Form::new()
                .text("purpose", purpose.as_str())
                .part("file", Part::bytes(bytes).file_name(filename));
            client_utils::send_multipart(&self.client, &self.url(path), form, headers).await
        })
        .await
    }

    async fn retrieve_file(&self, file_id: &str) -> ServiceResult<FileObject> {
        let path = format!("/files/{file_id}");
        trace_request(PROVIDER, "files.retrieve", &Method::GET, &path, async {
            let headers = self.request_headers()?;
            client_utils::get_json(&self.client, &self.url(&path), &[], headers).await
        })
        .await
    }

    async fn delete_file(&self, file_id: &str) -> ServiceResult<DeletionStatus> {
        let path = format!("/files/{file_id}");
        trace_request(PROVIDER, "files.delete", &Method::DELETE, &path, async {
            let headers = self.request_headers()?;
            client_utils::delete_json(&self.client, &self.url(&path), headers).await
        })
        .await
    }
}
