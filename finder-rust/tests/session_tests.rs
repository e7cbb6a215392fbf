use bbp_finder::{
    Backend, Connector, FileStatus, FinderError, IndexingStatus, PollOptions, Session,
    SessionConfig, UploadFile,
};
use bbp_sdk::{
    bbp_sdk_test::{MockCall, MockOpenAI, MockOperation},
    openai::Tool,
    ServiceError,
};
use reqwest::StatusCode;
use serde_json::json;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio_util::sync::CancellationToken;

fn config(api_key: &str, store: Option<&str>) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.set_api_key(api_key);
    if let Some(store) = store {
        config.set_active_store(store);
    }
    config
}

fn answer(text: &str, file_id: &str, filename: &str) -> serde_json::Value {
    json!({
        "id": "resp_1",
        "object": "response",
        "status": "completed",
        "model": "gpt-4.1-mini",
        "output": [
            {
                "type": "file_search_call",
                "id": "fs_1",
                "status": "completed",
                "queries": ["example.com bug bounty"]
            },
            {
                "type": "message",
                "id": "msg_1",
                "role": "assistant",
                "status": "completed",
                "content": [{
                    "type": "output_text",
                    "text": text,
                    "annotations": [{
                        "type": "file_citation",
                        "index": 12,
                        "file_id": file_id,
                        "filename": filename
                    }]
                }]
            }
        ]
    })
}

struct CountingConnector {
    backend: Arc<MockOpenAI>,
    connects: Arc<AtomicUsize>,
}

impl Connector for CountingConnector {
    fn connect(&self, _config: &SessionConfig) -> Arc<dyn Backend> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.backend.clone()
    }
}

#[tokio::test]
async fn missing_api_key_fails_without_remote_calls() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let mut session = Session::new(config("", Some(store.as_str())), mock.clone());

    assert!(matches!(
        session.find_program("example.com").await,
        Err(FinderError::MissingApiKey)
    ));
    assert!(matches!(
        session.create_store("kb").await,
        Err(FinderError::MissingApiKey)
    ));
    assert!(matches!(
        session.list_stores().await,
        Err(FinderError::MissingApiKey)
    ));
    assert!(matches!(
        session.delete_store(&store).await,
        Err(FinderError::MissingApiKey)
    ));
    assert!(matches!(
        session.list_files(None).await,
        Err(FinderError::MissingApiKey)
    ));
    assert!(matches!(
        session
            .upload_files(
                vec![UploadFile::new("policy.pdf", b"scope".to_vec())],
                &CancellationToken::new()
            )
            .await,
        Err(FinderError::MissingApiKey)
    ));
    assert!(matches!(
        session.remove_file(None, "file_1").await,
        Err(FinderError::MissingApiKey)
    ));

    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn query_without_active_store_skips_completion() {
    let mock = Arc::new(MockOpenAI::new());
    let session = Session::new(config("sk-test", None), mock.clone());

    let error = session
        .find_program("example.com")
        .await
        .expect_err("no active store");

    assert!(matches!(error, FinderError::NoActiveStore));
    assert_eq!(mock.call_count(MockOperation::CreateResponse), 0);
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());

    let error = session.find_program("  \n ").await.expect_err("blank input");

    assert!(matches!(error, FinderError::EmptyInput));
    assert!(error.to_string().starts_with("Please provide some input"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn finds_program_against_the_active_store() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let policy = mock.add_store_file(&store, "policies.pdf", "completed");
    let body = r#"{"Found": "Yes", "Source": "policies.pdf", "Rewards": "Yes", "Program Url": "https://example.com/security"}"#;
    mock.enqueue_response(answer(body, &policy, "policies.pdf"));

    let mut config = config("sk-test", Some(store.as_str()));
    config.set_model("gpt-4.1");
    let session = Session::new(config, mock.clone());

    let extraction = session
        .find_program(" example.com ")
        .await
        .expect("lookup succeeds");

    assert!(extraction.is_structured());
    assert_eq!(extraction.text(), body);
    assert!(extraction.text().contains("\"Found\""));
    assert_eq!(extraction.citations().len(), 1);
    assert_eq!(extraction.citations()[0].file_id, policy);
    assert_eq!(extraction.citations()[0].filename, "policies.pdf");

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    let MockCall::CreateResponse(params) = &calls[0] else {
        panic!("expected a completion request, got {calls:?}");
    };
    assert_eq!(params.model.as_deref(), Some("gpt-4.1"));
    assert!(params
        .input
        .as_deref()
        .is_some_and(|input| input.ends_with("Input: example.com")));
    assert_eq!(params.tools, Some(vec![Tool::file_search(store)]));
}

#[tokio::test]
async fn remote_errors_are_passed_through_verbatim() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    mock.fail_next(
        MockOperation::CreateResponse,
        None,
        ServiceError::StatusCode(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit reached for gpt-4.1-mini".to_string(),
        ),
    );
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());

    let error = session
        .find_program("example.com")
        .await
        .expect_err("remote failure");

    assert!(matches!(error, FinderError::Remote(_)));
    assert!(error
        .to_string()
        .contains("Rate limit reached for gpt-4.1-mini"));
    assert_eq!(mock.call_count(MockOperation::CreateResponse), 1);
}

#[tokio::test]
async fn unexpected_completion_shape_falls_back_to_raw_text() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    mock.enqueue_response(json!({ "unexpected": true }));
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());

    let extraction = session
        .find_program("example.com")
        .await
        .expect("lookup succeeds");

    assert!(!extraction.is_structured());
    assert!(extraction.text().contains("unexpected"));
    assert!(extraction.citations().is_empty());
}

#[tokio::test]
async fn creating_a_store_activates_it() {
    let mock = Arc::new(MockOpenAI::new());
    let mut session = Session::new(config("sk-test", None), mock.clone());

    let collection = session.create_store("knowledge_base").await.expect("create");

    assert_eq!(collection.name.as_deref(), Some("knowledge_base"));
    assert_eq!(
        session.config().active_store_id(),
        Some(collection.id.as_str())
    );
    let stores = session.list_stores().await.expect("list");
    assert_eq!(stores, vec![collection]);
}

#[tokio::test]
async fn deleting_the_active_store_clears_it() {
    let mock = Arc::new(MockOpenAI::new());
    let active = mock.add_vector_store("active");
    let other = mock.add_vector_store("other");
    mock.add_store_file(&active, "a.pdf", "completed");
    mock.add_store_file(&active, "b.pdf", "completed");
    let mut session = Session::new(config("sk-test", Some(active.as_str())), mock.clone());

    let report = session.delete_store(&other).await.expect("delete other");
    assert!(report.succeeded.is_empty());
    assert_eq!(session.config().active_store_id(), Some(active.as_str()));

    let report = session.delete_store(&active).await.expect("delete active");
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.is_complete());
    assert_eq!(session.config().active_store_id(), None);
    assert!(mock.vector_store_ids().is_empty());
    assert!(mock.file_ids().is_empty());
}

#[tokio::test]
async fn listing_files_of_a_deleted_store_asks_for_refresh() {
    let mock = Arc::new(MockOpenAI::new());
    let session = Session::new(config("sk-test", Some("vs_stale")), mock.clone());

    let error = session.list_files(None).await.expect_err("stale store");

    assert!(matches!(error, FinderError::StoreNotFound(_)));
    assert!(error.to_string().contains("vs_stale"));
}

#[tokio::test(start_paused = true)]
async fn just_uploaded_file_is_listed_as_pending() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone()).with_upload_poll(
        PollOptions {
            timeout: Duration::from_secs(3),
            interval: Duration::from_secs(1),
        },
    );

    let report = session
        .upload_files(
            vec![UploadFile::new("policy.pdf", b"%PDF-1.7".to_vec())],
            &CancellationToken::new(),
        )
        .await
        .expect("upload");

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.succeeded[0].status, IndexingStatus::Timeout);

    let files = session.list_files(None).await.expect("list");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "policy.pdf");
    assert_eq!(files[0].file_id, report.succeeded[0].file_id);
    assert!(!files[0].status.is_terminal());
    assert_eq!(files[0].status, FileStatus::Pending("in_progress".to_string()));
}

#[tokio::test(start_paused = true)]
async fn upload_batch_continues_past_failures() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    mock.fail_next(
        MockOperation::CreateFile,
        Some("broken.md"),
        ServiceError::StatusCode(StatusCode::BAD_REQUEST, "File is empty.".to_string()),
    );
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());

    let report = session
        .upload_files(
            vec![
                UploadFile::new("payload.exe", b"MZ".to_vec()),
                UploadFile::new("broken.md", Vec::new()),
                UploadFile::new("scope.md", b"# Scope".to_vec()),
            ],
            &CancellationToken::new(),
        )
        .await
        .expect("batch runs");

    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].item, "payload.exe");
    assert!(report.failed[0].error.contains("Unsupported file type"));
    assert_eq!(report.failed[1].item, "broken.md");
    assert!(report.failed[1].error.contains("File is empty."));

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.succeeded[0].filename, "scope.md");
    assert_eq!(report.succeeded[0].status, IndexingStatus::Timeout);

    assert_eq!(mock.call_count(MockOperation::CreateFile), 2);
    assert!(!mock
        .calls()
        .contains(&MockCall::CreateFile("payload.exe".to_string())));
}

#[tokio::test(start_paused = true)]
async fn uploaded_file_reports_completed_once_indexed() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    // The mock hands out IDs in sequence: the store took the first.
    mock.script_file_statuses("file_2", &["in_progress", "completed"]);
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());

    let report = session
        .upload_files(
            vec![UploadFile::new("Policy.PDF", b"%PDF-1.7".to_vec())],
            &CancellationToken::new(),
        )
        .await
        .expect("upload");

    assert_eq!(report.succeeded[0].file_id, "file_2");
    assert_eq!(report.succeeded[0].status, IndexingStatus::Completed);
}

#[tokio::test]
async fn upload_needs_files_and_an_active_store() {
    let mock = Arc::new(MockOpenAI::new());
    let session = Session::new(config("sk-test", None), mock.clone());
    let cancel = CancellationToken::new();

    assert!(matches!(
        session.upload_files(Vec::new(), &cancel).await,
        Err(FinderError::NoFiles)
    ));
    assert!(matches!(
        session
            .upload_files(vec![UploadFile::new("a.txt", b"a".to_vec())], &cancel)
            .await,
        Err(FinderError::NoActiveStore)
    ));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn remove_file_only_detaches() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let file = mock.add_store_file(&store, "a.pdf", "completed");
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());

    session.remove_file(None, &file).await.expect("remove");

    assert!(session.list_files(None).await.expect("list").is_empty());
    assert_eq!(mock.file_ids(), vec![file]);
    assert_eq!(mock.call_count(MockOperation::DeleteFile), 0);
}

#[tokio::test]
async fn cancelled_upload_reports_every_file() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = session
        .upload_files(
            vec![
                UploadFile::new("a.md", b"a".to_vec()),
                UploadFile::new("b.md", b"b".to_vec()),
            ],
            &cancel,
        )
        .await
        .expect("batch runs");

    assert!(report.succeeded.is_empty());
    let items: Vec<_> = report.failed.iter().map(|f| f.item.as_str()).collect();
    assert_eq!(items, ["a.md", "b.md"]);
    assert!(report
        .failed
        .iter()
        .all(|failure| failure.error.contains("cancelled")));
    assert!(mock.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancelling_mid_batch_reports_the_remaining_files() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let session = Session::new(config("sk-test", Some(store.as_str())), mock.clone());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        canceller.cancel();
    });

    let report = session
        .upload_files(
            vec![
                UploadFile::new("a.md", b"a".to_vec()),
                UploadFile::new("b.md", b"b".to_vec()),
            ],
            &cancel,
        )
        .await
        .expect("batch runs");

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.succeeded[0].filename, "a.md");
    assert_eq!(report.succeeded[0].status, IndexingStatus::Cancelled);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].item, "b.md");
    assert_eq!(mock.call_count(MockOperation::CreateFile), 1);
}

#[tokio::test]
async fn connects_once_per_credential() {
    let mock = Arc::new(MockOpenAI::new());
    let store = mock.add_vector_store("programs");
    let connects = Arc::new(AtomicUsize::new(0));
    let mut session = Session::new(
        config("sk-test", Some(store.as_str())),
        CountingConnector {
            backend: mock.clone(),
            connects: connects.clone(),
        },
    );

    session.list_stores().await.expect("list stores");
    session.list_files(None).await.expect("list files");
    session.set_active_store(&store);
    session.list_files(None).await.expect("list files again");
    assert_eq!(connects.load(Ordering::SeqCst), 1);

    session.config_mut().set_api_key("sk-rotated");
    session.list_stores().await.expect("list with new key");
    assert_eq!(connects.load(Ordering::SeqCst), 2);

    session
        .config_mut()
        .set_base_url("https://proxy.example.com/v1");
    session.list_stores().await.expect("list through proxy");
    assert_eq!(connects.load(Ordering::SeqCst), 3);
}
