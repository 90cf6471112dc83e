//! Classification of transport and protocol failures

use railbench_core::{BenchError, Endpoint};
use reqwest::StatusCode;

/// Classify a failed request: timeouts, then connection problems, then
/// everything else as an application error
pub fn classify_transport_error(endpoint: Endpoint, err: &reqwest::Error) -> BenchError {
    let error = if err.is_timeout() {
        BenchError::timeout("request timed out")
    } else if err.is_connect() {
        BenchError::temporary("could not connect to the application")
    } else if err.is_redirect() {
        BenchError::application("redirect detected")
    } else {
        BenchError::application("request to the application failed")
    };

    error.context(endpoint).with_detail(err.to_string())
}

/// An unexpected status code. Redirects are reported as such.
pub fn unexpected_status(endpoint: Endpoint, status: StatusCode, body: &str) -> BenchError {
    let message = if status.is_redirection() {
        "redirect detected".to_string()
    } else {
        format!("unexpected status code {}", status.as_u16())
    };

    BenchError::application(message)
        .context(endpoint)
        .with_detail(format!("status={} body={}", status, truncate(body, 512)))
}

pub fn undecodable_body(endpoint: Endpoint, err: impl std::fmt::Display) -> BenchError {
    BenchError::application("response body could not be decoded")
        .context(endpoint)
        .with_detail(err.to_string())
}

fn truncate(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbench_core::ErrorKind;

    #[test]
    fn test_redirect_status_is_application() {
        let err = unexpected_status(Endpoint::Login, StatusCode::FOUND, "");
        assert_eq!(err.kind, ErrorKind::Application);
        assert_eq!(err.message, "POST /api/auth/login: redirect detected");
    }

    #[test]
    fn test_status_detail_is_truncated() {
        let body = "x".repeat(2000);
        let err = unexpected_status(Endpoint::Reserve, StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.detail.unwrap().len() < 600);
        assert_eq!(err.message, "POST /api/train/reserve: unexpected status code 500");
    }
}
