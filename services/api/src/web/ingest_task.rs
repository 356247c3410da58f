//! services/api/src/web/ingest_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! one full ingestion run: persist the uploads, prompt the model, parse the
//! reply, and append the resulting paper to the catalog. Each step returns a
//! typed result and the first failure short-circuits; there are no retries.

use crate::web::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use studyai_core::domain::{Difficulty, DocumentPayload, ModuleSeed, Paper};
use studyai_core::parser::parse_question_reply;
use studyai_core::ports::{GatewayError, PipelineError};
use studyai_core::prompt::build_question_prompt;
use tracing::info;
use uuid::Uuid;

/// Difficulty attached to generated papers until callers can choose one.
const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Medium;
/// Time limit attached to generated papers.
const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;

/// One ingestion request, as assembled by the HTTP layer.
#[derive(Debug)]
pub struct IngestRequest {
    pub module_id: String,
    pub module_name: Option<String>,
    pub documents: Vec<DocumentPayload>,
    pub question_count: u32,
}

/// The main asynchronous task for one module ingestion.
///
/// Uploaded blobs written before a later failure stay on disk; only the
/// catalog append is skipped, so a failed run never leaves a partial paper.
pub async fn ingest_process(
    app_state: Arc<AppState>,
    request: IngestRequest,
) -> Result<Paper, PipelineError> {
    let start_time = Instant::now();
    info!(
        "Ingestion started for module '{}' ({} document(s), {} question(s) requested).",
        request.module_id,
        request.documents.len(),
        request.question_count
    );

    if request.documents.is_empty() {
        return Err(PipelineError::NoDocuments);
    }

    let mut documents = request.documents;
    // Lexical filename order keeps the gateway payload reproducible.
    documents.sort_by(|a, b| a.filename.cmp(&b.filename));

    for doc in &documents {
        app_state
            .blob_store
            .put(&request.module_id, &doc.filename, &doc.bytes)
            .await?;
    }

    let instruction = build_question_prompt(request.question_count);

    let gateway_start = Instant::now();
    let raw_reply = match tokio::time::timeout(
        app_state.config.gateway_timeout,
        app_state
            .question_adapter
            .generate_questions(&documents, &instruction),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(GatewayError::Timeout(app_state.config.gateway_timeout).into());
        }
    };
    info!("⏱️ Gateway took: {:?}", gateway_start.elapsed());

    let questions = parse_question_reply(&raw_reply)?;
    info!(
        "Parsed {} question(s) for module '{}'.",
        questions.len(),
        request.module_id
    );

    let seed = ModuleSeed {
        id: request.module_id.clone(),
        name: request.module_name,
        description: Some(describe_documents(&documents)),
    };
    let paper = Paper {
        id: Uuid::new_v4(),
        // Left empty here; the catalog titles the paper by its position.
        name: String::new(),
        questions,
        completed: 0,
        difficulty: DEFAULT_DIFFICULTY,
        time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
        created_at: Utc::now(),
    };
    let paper_id = paper.id;

    let module = app_state.catalog.append_paper(seed, paper).await;
    let appended = module
        .papers
        .into_iter()
        .find(|p| p.id == paper_id)
        .ok_or_else(|| PipelineError::NotFound(request.module_id.clone()))?;

    info!("⏱️ Total ingestion took: {:?}", start_time.elapsed());
    Ok(appended)
}

/// Placeholder description for a module created by this run.
fn describe_documents(documents: &[DocumentPayload]) -> String {
    let names: Vec<&str> = documents.iter().map(|d| d.filename.as_str()).collect();
    format!("Generated from {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FsBlobAdapter, MemoryCatalogAdapter};
    use crate::config::Config;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use studyai_core::ports::{PlanGenerationService, QuestionGenerationService};
    use tokio::sync::Mutex;

    const THREE_QUESTIONS: &str = r#"[
  {"question": "Q1?", "options": ["a", "b", "c", "d"], "correctAnswer": 0, "explanation": "e1"},
  {"question": "Q2?", "options": ["a", "b", "c", "d"], "correctAnswer": 1, "explanation": "e2"},
  {"question": "Q3?", "options": ["a", "b", "c", "d"], "correctAnswer": 2, "explanation": "e3"}
]"#;

    /// Scripted gateway: returns a canned reply after an optional delay and
    /// records what it was asked to generate from.
    struct StubGateway {
        reply: String,
        delay: Duration,
        calls: AtomicUsize,
        seen_filenames: Mutex<Vec<String>>,
    }

    impl StubGateway {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                seen_filenames: Mutex::new(Vec::new()),
            }
        }

        fn slow(reply: &str, delay: Duration) -> Self {
            Self {
                delay,
                ..Self::replying(reply)
            }
        }
    }

    #[async_trait]
    impl QuestionGenerationService for StubGateway {
        async fn generate_questions(
            &self,
            documents: &[DocumentPayload],
            _instruction: &str,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut seen = self.seen_filenames.lock().await;
            seen.extend(documents.iter().map(|d| d.filename.clone()));
            drop(seen);
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.clone())
        }
    }

    struct NoopPlan;

    #[async_trait]
    impl PlanGenerationService for NoopPlan {
        async fn generate_plan(&self, _goal: &str) -> Result<String, GatewayError> {
            Ok(String::new())
        }
    }

    fn test_config(upload_dir: &Path, timeout: Duration) -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            log_level: tracing::Level::INFO,
            upload_dir: upload_dir.to_path_buf(),
            openai_api_key: None,
            question_model: "test-model".to_string(),
            plan_model: "test-model".to_string(),
            gateway_timeout: timeout,
            default_question_count: 5,
            frontend_origin: "http://localhost:5173".to_string(),
        }
    }

    fn test_state(
        upload_dir: &Path,
        gateway: Arc<StubGateway>,
        timeout: Duration,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(test_config(upload_dir, timeout)),
            blob_store: Arc::new(FsBlobAdapter::new(upload_dir)),
            catalog: Arc::new(MemoryCatalogAdapter::new()),
            question_adapter: gateway,
            plan_adapter: Arc::new(NoopPlan),
        })
    }

    fn doc(filename: &str, bytes: &[u8]) -> DocumentPayload {
        DocumentPayload {
            filename: filename.to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[tokio::test]
    async fn successful_ingestion_builds_and_catalogs_a_paper() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway::replying(THREE_QUESTIONS));
        let state = test_state(tmp.path(), gateway.clone(), Duration::from_secs(5));

        let paper = ingest_process(
            state.clone(),
            IngestRequest {
                module_id: "cs101b".to_string(),
                module_name: Some("Computer Science 101B".to_string()),
                documents: vec![doc("lecture.pdf", b"pdf bytes")],
                question_count: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(paper.questions.len(), 3);
        let ordinals: Vec<u32> = paper.questions.iter().map(|q| q.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(paper.completed, 0);
        assert_eq!(paper.name, "Practice Paper 1");
        assert_eq!(paper.difficulty, Difficulty::Medium);

        let modules = state.catalog.list_modules().await;
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, "cs101b");
        assert_eq!(modules[0].name, "Computer Science 101B");
        assert_eq!(modules[0].papers.len(), 1);

        assert!(tmp.path().join("cs101b").join("lecture.pdf").exists());
    }

    #[tokio::test]
    async fn documents_reach_the_gateway_in_lexical_order() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway::replying(THREE_QUESTIONS));
        let state = test_state(tmp.path(), gateway.clone(), Duration::from_secs(5));

        ingest_process(
            state,
            IngestRequest {
                module_id: "cs101b".to_string(),
                module_name: None,
                documents: vec![doc("b_notes.pdf", b"b"), doc("a_notes.pdf", b"a")],
                question_count: 3,
            },
        )
        .await
        .unwrap();

        let seen = gateway.seen_filenames.lock().await;
        assert_eq!(*seen, vec!["a_notes.pdf", "b_notes.pdf"]);
    }

    #[tokio::test]
    async fn malformed_reply_skips_the_catalog_but_keeps_the_blobs() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway::replying("Sorry, I cannot process this file."));
        let state = test_state(tmp.path(), gateway, Duration::from_secs(5));

        let err = ingest_process(
            state.clone(),
            IngestRequest {
                module_id: "cs101b".to_string(),
                module_name: None,
                documents: vec![doc("lecture.pdf", b"pdf bytes")],
                question_count: 3,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Parse(_)));
        assert!(state.catalog.list_modules().await.is_empty());
        // The upload is not rolled back.
        assert!(tmp.path().join("cs101b").join("lecture.pdf").exists());
    }

    #[tokio::test]
    async fn slow_gateway_times_out_without_touching_the_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway::slow(
            THREE_QUESTIONS,
            Duration::from_millis(200),
        ));
        let state = test_state(tmp.path(), gateway, Duration::from_millis(20));

        let err = ingest_process(
            state.clone(),
            IngestRequest {
                module_id: "cs101b".to_string(),
                module_name: None,
                documents: vec![doc("lecture.pdf", b"pdf bytes")],
                question_count: 3,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Gateway(GatewayError::Timeout(_))
        ));
        assert!(state.catalog.list_modules().await.is_empty());
        assert!(tmp.path().join("cs101b").join("lecture.pdf").exists());
    }

    #[tokio::test]
    async fn empty_document_set_never_reaches_storage_or_gateway() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway::replying(THREE_QUESTIONS));
        let state = test_state(tmp.path(), gateway.clone(), Duration::from_secs(5));

        let err = ingest_process(
            state,
            IngestRequest {
                module_id: "cs101b".to_string(),
                module_name: None,
                documents: Vec::new(),
                question_count: 3,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::NoDocuments));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert!(!tmp.path().join("cs101b").exists());
    }

    #[tokio::test]
    async fn storage_failure_aborts_before_the_gateway_is_called() {
        let tmp = tempfile::tempdir().unwrap();
        // A plain file where the upload root should be makes every write fail.
        let blocked_root = tmp.path().join("blocked");
        std::fs::write(&blocked_root, b"not a directory").unwrap();

        let gateway = Arc::new(StubGateway::replying(THREE_QUESTIONS));
        let state = test_state(&blocked_root, gateway.clone(), Duration::from_secs(5));

        let err = ingest_process(
            state,
            IngestRequest {
                module_id: "cs101b".to_string(),
                module_name: None,
                documents: vec![doc("lecture.pdf", b"pdf bytes")],
                question_count: 3,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Storage(_)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_ingestion_appends_to_the_same_module() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway::replying(THREE_QUESTIONS));
        let state = test_state(tmp.path(), gateway, Duration::from_secs(5));

        for _ in 0..2 {
            ingest_process(
                state.clone(),
                IngestRequest {
                    module_id: "cs101b".to_string(),
                    module_name: None,
                    documents: vec![doc("lecture.pdf", b"pdf bytes")],
                    question_count: 3,
                },
            )
            .await
            .unwrap();
        }

        let modules = state.catalog.list_modules().await;
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].papers.len(), 2);
        assert_eq!(modules[0].papers[1].name, "Practice Paper 2");
    }
}
