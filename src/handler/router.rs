//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::AppState;
use crate::handler::dir_endpoint;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{header, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub user_agent: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let uri = &parts.uri;
    let header_str =
        |name: header::HeaderName| parts.headers.get(name).and_then(|v| v.to_str().ok());

    let ctx = RequestContext {
        path: uri.path(),
        query: uri.query(),
        is_head: *method == Method::HEAD,
        user_agent: header_str(header::USER_AGENT),
    };

    let response = match check_http_method(method) {
        Some(resp) => resp,
        None => route_request(&ctx, &state).await,
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            ctx.path.to_string(),
        );
        entry.query = ctx.query.map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_str(header::REFERER).map(ToString::to_string);
        entry.user_agent = ctx.user_agent.map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path and configuration
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let config = &state.config;

    // Health check endpoints (highest priority, always fast)
    if config.health.enabled {
        if ctx.path == config.health.liveness_path {
            return http::build_health_response("ok");
        }
        if ctx.path == config.health.readiness_path {
            // Draining connections still answer, but must not attract new traffic
            if state.shutdown_requested.load(Ordering::SeqCst) {
                return http::build_error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "shutting down",
                    ctx.is_head,
                );
            }
            return http::build_health_response("ok");
        }
    }

    if config.dir.enabled {
        if let Some(sub_path) = dir_endpoint::match_prefix(ctx.path, &config.dir.route_prefix) {
            return dir_endpoint::serve(ctx, &state.dir_service, sub_path).await;
        }
    }

    if ctx.path == "/" {
        return http::build_text_response(index_page(state), "text/plain", ctx.is_head);
    }

    http::build_404_response()
}

/// Plain list of what this port serves
fn index_page(state: &AppState) -> String {
    let config = &state.config;
    let mut page = String::from("dirview\n\n");
    if config.dir.enabled {
        page.push_str(&format!(
            "{}\tbrowse {} (files capped at {} bytes)\n",
            config.dir.route_prefix,
            config.dir.base_dir,
            crate::dir::MAX_READ
        ));
    }
    if config.health.enabled {
        page.push_str(&format!("{}\tliveness\n", config.health.liveness_path));
        page.push_str(&format!("{}\treadiness\n", config.health.readiness_path));
    }
    page
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
