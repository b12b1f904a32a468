//! HTTP adapter for the directory browsing endpoint
//!
//! Decodes the sub-path, picks the render mode, runs the synchronous core on
//! the blocking pool and maps its outcome to a response.

use crate::dir::{DirError, DirRequest, DirService, RenderMode};
use crate::handler::router::RequestContext;
use crate::http::{self, uri};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io;
use std::sync::Arc;

/// Sub-path of `path` below `route_prefix`, if the request belongs to the endpoint.
///
/// Both `/dir` and `/dir/` map to the empty sub-path.
pub fn match_prefix<'a>(path: &'a str, route_prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(route_prefix)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

/// Serve one directory endpoint request
pub async fn serve(
    ctx: &RequestContext<'_>,
    service: &Arc<DirService>,
    raw_sub_path: &str,
) -> Response<Full<Bytes>> {
    let Some(sub_path) = uri::percent_decode(raw_sub_path) else {
        logger::log_warning(&format!("Malformed escape in directory path: {raw_sub_path}"));
        return http::build_error_response(
            StatusCode::BAD_REQUEST,
            "400 Bad Request: malformed percent-encoding",
            ctx.is_head,
        );
    };
    let mode = RenderMode::from_hints(uri::query_param(ctx.query, "console"), ctx.user_agent);

    let service = Arc::clone(service);
    let outcome = tokio::task::spawn_blocking(move || {
        service.serve(&DirRequest {
            path: &sub_path,
            mode,
        })
    })
    .await;

    match outcome {
        Ok(Ok(response)) => http::build_text_response(response.body, response.content_type, ctx.is_head),
        Ok(Err(err)) => {
            logger::log_dir_failure(&err);
            http::build_error_response(status_for(&err), &err.user_message(), ctx.is_head)
        }
        Err(join_err) => {
            logger::log_fatal(&format!("Directory worker for '{}' died: {join_err}", ctx.path));
            http::build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
                ctx.is_head,
            )
        }
    }
}

/// HTTP status for a failed request, derived from the OS error where there is one
pub fn status_for(err: &DirError) -> StatusCode {
    if err.is_fatal() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    if matches!(err, DirError::OutsideBase { .. }) {
        return StatusCode::FORBIDDEN;
    }
    match err.os_error().map(io::Error::kind) {
        Some(io::ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(io::ErrorKind::PermissionDenied) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_error(kind: io::ErrorKind) -> DirError {
        DirError::Open {
            path: "/x".to_string(),
            source: kind.into(),
        }
    }

    #[test]
    fn test_match_prefix() {
        assert_eq!(match_prefix("/dir", "/dir"), Some(""));
        assert_eq!(match_prefix("/dir/", "/dir"), Some(""));
        assert_eq!(match_prefix("/dir/var/log", "/dir"), Some("var/log"));
        assert_eq!(match_prefix("/dir//etc", "/dir"), Some("/etc"));
        assert_eq!(match_prefix("/directory", "/dir"), None);
        assert_eq!(match_prefix("/other", "/dir"), None);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&open_error(io::ErrorKind::NotFound)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&open_error(io::ErrorKind::PermissionDenied)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&open_error(io::ErrorKind::InvalidData)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let read = DirError::Read {
            path: "/x".to_string(),
            source: io::Error::from_raw_os_error(5),
        };
        assert_eq!(status_for(&read), StatusCode::INTERNAL_SERVER_ERROR);
        let outside = DirError::OutsideBase {
            path: "/x".to_string(),
        };
        assert_eq!(status_for(&outside), StatusCode::FORBIDDEN);
        let close = DirError::EnumerationClose {
            path: "/x".to_string(),
            source: io::ErrorKind::NotFound.into(),
        };
        assert_eq!(status_for(&close), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
