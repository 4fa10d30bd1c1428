//! `POST /api/download`: validate, extract, locate, stream, release.
//!
//! The request's [`WorkDir`] is owned by the handler until the artifact is
//! found and then moved into the response body, so it is released after the
//! last chunk is written. Every early return drops it, which releases it too.

use std::path::Path;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use mg_core::{DownloadRequest, TargetFormat};
use mg_extract::{locate_artifact, ExtractionJob, WorkDir};
use tokio_util::io::ReaderStream;

use crate::context::AppContext;
use crate::error::AppError;

/// POST /api/download
pub async fn download(
    State(ctx): State<AppContext>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "Rejected download body: {rejection}");
        mg_core::Error::invalid(rejection.body_text())
    })?;
    let request = DownloadRequest::from_body(&body).validate()?;
    let format = request.format;

    let cookies = ctx.config.extraction.resolve_cookies(request.cookies);

    let workdir = WorkDir::acquire(&ctx.config.extraction.temp_prefix)?;
    let cookies_file = cookies
        .map(|blob| workdir.write_cookies(&blob))
        .transpose()?;

    let job = ExtractionJob {
        url: request.url,
        format,
        output_dir: workdir.path().to_path_buf(),
        cookies_file,
        audio_quality_kbps: ctx.config.extraction.audio_quality_kbps,
        timeout: ctx.extraction_timeout(),
    };

    let metadata = ctx.pool.run(ctx.extractor.extract(&job)).await?;
    let artifact = locate_artifact(workdir.path(), format.extension(), &metadata)?;

    let suggested = format!("{}.{}", metadata.display_title(), format.extension());
    stream_artifact(workdir, &artifact, format, &suggested).await
}

/// Build the attachment response. The body stream owns `workdir`.
async fn stream_artifact(
    mut workdir: WorkDir,
    artifact: &Path,
    format: TargetFormat,
    suggested_name: &str,
) -> Result<Response, AppError> {
    let file = tokio::fs::File::open(artifact)
        .await
        .map_err(mg_core::Error::from)?;
    let length = file.metadata().await.map_err(mg_core::Error::from)?.len();

    let disposition = HeaderValue::from_str(&content_disposition(suggested_name))
        .map_err(|e| mg_core::Error::Internal(format!("invalid download name: {e}")))?;

    tracing::info!(
        artifact = %artifact.display(),
        bytes = length,
        "Streaming artifact"
    );

    let stream = async_stream::stream! {
        for await chunk in ReaderStream::new(file) {
            yield chunk;
        }
        workdir.release();
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream))
        .map_err(|e| mg_core::Error::Internal(format!("failed to build response: {e}")))?;

    Ok(response)
}

/// Remove CR and LF so a content-derived name cannot break the header.
pub fn sanitize_filename(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// `Content-Disposition` value for a download named `name`.
///
/// The quoted `filename` parameter is restricted to printable ASCII; when the
/// name needs more than that, the exact name follows as an RFC 5987
/// `filename*` parameter.
pub fn content_disposition(name: &str) -> String {
    let name = sanitize_filename(name);
    let ascii: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if ascii == name {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(&name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_crlf() {
        assert_eq!(sanitize_filename("a\r\nb\nc\r.mp3"), "abc.mp3");
        assert_eq!(sanitize_filename("plain.mp4"), "plain.mp4");
    }

    #[test]
    fn plain_ascii_name() {
        assert_eq!(
            content_disposition("Song.mp3"),
            "attachment; filename=\"Song.mp3\""
        );
    }

    #[test]
    fn crlf_never_reaches_header() {
        let value = content_disposition("Evil\r\nSet-Cookie: x=1.mp3");
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
        assert!(value.contains("filename=\"EvilSet-Cookie: x=1.mp3\""));
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn unicode_name_gets_extended_parameter() {
        let value = content_disposition("Café \"live\".mp3");
        assert!(value.starts_with("attachment; filename=\"Caf_ _live_.mp3\""));
        assert!(value.contains("filename*=UTF-8''Caf%C3%A9%20%22live%22.mp3"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
