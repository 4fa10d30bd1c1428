//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a full [`AppContext`] around a
//! [`FakeExtractor`] so the download flow can be exercised without network
//! access or an installed yt-dlp.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mg_core::config::Config;
use mg_extract::{ExtractionJob, Extractor, MediaMetadata, ToolRegistry};
use mg_server::context::AppContext;
use mg_server::router::build_router;
use tower::ServiceExt;

type Behavior = Box<dyn Fn(&ExtractionJob) -> mg_core::Result<MediaMetadata> + Send + Sync>;

/// Extractor double that records every job and runs a scripted behavior.
pub struct FakeExtractor {
    behavior: Behavior,
    jobs: Mutex<Vec<ExtractionJob>>,
    cookies_seen: Mutex<Vec<Option<Vec<u8>>>>,
}

impl FakeExtractor {
    pub fn new(
        behavior: impl Fn(&ExtractionJob) -> mg_core::Result<MediaMetadata> + Send + Sync + 'static,
    ) -> Self {
        Self {
            behavior: Box::new(behavior),
            jobs: Mutex::new(Vec::new()),
            cookies_seen: Mutex::new(Vec::new()),
        }
    }

    /// Writes `file_name` into the working directory and reports `title`.
    pub fn producing(title: &str, file_name: &str) -> Self {
        let title = title.to_string();
        let file_name = file_name.to_string();
        Self::new(move |job| {
            std::fs::write(job.output_dir.join(&file_name), b"fake media bytes")?;
            Ok(MediaMetadata {
                title: Some(title.clone()),
                ..Default::default()
            })
        })
    }

    /// Succeeds without writing anything.
    pub fn producing_nothing() -> Self {
        Self::new(|_| {
            Ok(MediaMetadata {
                title: Some("Ghost".into()),
                planned_filename: Some("Ghost.webm".into()),
                ..Default::default()
            })
        })
    }

    /// Fails with an extraction error carrying `message`.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| Err(mg_core::Error::Extraction(message.clone())))
    }

    pub fn jobs(&self) -> Vec<ExtractionJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Working directories handed to the extractor so far.
    pub fn work_dirs(&self) -> Vec<PathBuf> {
        self.jobs().into_iter().map(|j| j.output_dir).collect()
    }

    /// Contents of the cookie file each job referenced, read during the job.
    pub fn cookies_seen(&self) -> Vec<Option<Vec<u8>>> {
        self.cookies_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract(&self, job: &ExtractionJob) -> mg_core::Result<MediaMetadata> {
        let cookies = job
            .cookies_file
            .as_ref()
            .map(std::fs::read)
            .transpose()?;
        self.cookies_seen.lock().unwrap().push(cookies);
        self.jobs.lock().unwrap().push(job.clone());
        (self.behavior)(job)
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub extractor: Arc<FakeExtractor>,
}

impl TestHarness {
    /// Harness with default configuration.
    pub fn new(extractor: FakeExtractor) -> Self {
        Self::with_config(Config::default(), extractor)
    }

    /// Harness with a custom configuration.
    pub fn with_config(config: Config, extractor: FakeExtractor) -> Self {
        let extractor = Arc::new(extractor);
        let ctx = AppContext::with_extractor(
            config,
            Arc::new(ToolRegistry::default()),
            extractor.clone(),
        );
        Self { ctx, extractor }
    }

    pub fn app(&self) -> Router {
        build_router(self.ctx.clone())
    }

    /// POST a raw body to `/api/download`.
    pub async fn post_download_raw(&self, body: impl Into<Body>) -> Response<Body> {
        self.app()
            .oneshot(
                Request::post("/api/download")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// POST a JSON value to `/api/download`.
    pub async fn post_download(&self, json: serde_json::Value) -> Response<Body> {
        self.post_download_raw(json.to_string()).await
    }
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Header value as a string, empty if absent.
pub fn header(response: &Response<Body>, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
