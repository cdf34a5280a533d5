//! Upload: send the selected file to a conversion service.
//!
//! The request is a `POST <endpoint>?output=<mode>` with a multipart body
//! holding one `file` field. This is the only stage with network I/O; it
//! hands the raw body back to the caller, which picks a parser from the
//! output mode.

use crate::config::OutputMode;
use crate::error::ConvertError;
use crate::state::SelectedFile;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

/// Send `file` to `endpoint` and return the body of a 2xx response.
///
/// Non-2xx statuses become [`ConvertError::Request`]; FastAPI's
/// `{"detail": "..."}` error bodies are carried along as the detail.
pub async fn send(
    client: &reqwest::Client,
    endpoint: &str,
    file: &SelectedFile,
    mode: OutputMode,
) -> Result<Vec<u8>, ConvertError> {
    info!(
        "Uploading '{}' ({} bytes) to {} with output={}",
        file.name, file.size, endpoint, mode
    );

    let part = Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str("application/pdf")
        .map_err(|e| ConvertError::Internal(format!("Invalid MIME type: {e}")))?;
    let form = Form::new().part("file", part);

    let response = client
        .post(endpoint)
        .query(&[("output", mode.as_str())])
        .multipart(form)
        .send()
        .await
        .map_err(|e| transport_error(endpoint, e))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(endpoint, e))?;

    if !status.is_success() {
        let detail = error_detail(&body);
        debug!("Service answered {} with detail {:?}", status, detail);
        return Err(ConvertError::Request {
            status: status.as_u16(),
            detail,
        });
    }

    debug!("Received {} bytes ({})", body.len(), status);
    Ok(body.to_vec())
}

/// `GET health_url`; true when the service answers 2xx.
pub async fn check_health(client: &reqwest::Client, health_url: &str) -> Result<bool, ConvertError> {
    let response = client
        .get(health_url)
        .send()
        .await
        .map_err(|e| transport_error(health_url, e))?;
    debug!("Health check {} → {}", health_url, response.status());
    Ok(response.status().is_success())
}

fn transport_error(url: &str, e: reqwest::Error) -> ConvertError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    ConvertError::Transport {
        url: url.to_string(),
        reason,
    }
}

/// Extract FastAPI's `detail` string from an error body, if present.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_from_fastapi_body() {
        let body = br#"{"detail":"File too large (max 20MB)"}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("File too large (max 20MB)")
        );
    }

    #[test]
    fn structured_detail_is_stringified() {
        let body = br#"{"detail":[{"loc":["query","output"]}]}"#;
        let detail = error_detail(body).unwrap();
        assert!(detail.contains("output"), "got: {detail}");
    }

    #[test]
    fn no_detail_for_plain_bodies() {
        assert_eq!(error_detail(b"Internal Server Error"), None);
        assert_eq!(error_detail(br#"{"error":"x"}"#), None);
        assert_eq!(error_detail(b""), None);
    }
}
