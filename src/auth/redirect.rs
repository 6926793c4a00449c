//! Works out where to send a user after they log in.
//!
//! When a session ends, the auth guard sends the user to the log-in page with a
//! `redirect_url` query parameter naming the page they were on. Only relative,
//! same-site paths are accepted so the parameter cannot be used to send users
//! to another site.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW
}

/// Return the path and query of `raw_url` if it is a safe place to redirect to.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The `HX-Current-URL` header holds an absolute URL, keep only its path and query.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// Build the log-in page URL that returns the user to the page behind `request`.
///
/// Page requests return to their own URL. HTMX requests to `/api` routes return
/// to the page that issued them.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        let path_and_query = request.uri().path_and_query()?.as_str();
        normalize_redirect_url(path_and_query)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
