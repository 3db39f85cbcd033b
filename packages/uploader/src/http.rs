//! HTTP create-report client.
//!
//! Posts the incident-mapping API's form payload (`task=report` plus the
//! `incident_*` fields) to `<site-url>/api`, the wire shape the upstream
//! Ushahidi-style deployments expose.

use async_trait::async_trait;
use ttt_relay_report::ReportRequest;

use crate::{ReportSink, SubmitResult, UploadError};

/// Create-report sink posting to an incident-mapping site's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpUploader {
    /// Creates an uploader for the given site URL (the `api` path segment
    /// is appended here).
    #[must_use]
    pub fn new(client: reqwest::Client, site_url: &str) -> Self {
        Self {
            client,
            api_url: api_endpoint(site_url),
            token: None,
        }
    }

    /// Attaches a bearer token sent with every create-report call.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The resolved API endpoint URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ReportSink for HttpUploader {
    async fn submit(&self, request: &ReportRequest) -> Result<SubmitResult, UploadError> {
        let mut builder = self.client.post(&self.api_url).form(&form_fields(request));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::OK {
            return Ok(SubmitResult::Accepted);
        }

        let body = response.text().await.unwrap_or_default();
        log::debug!("create-report call returned {status}: {body}");

        Ok(SubmitResult::Rejected {
            status: status.as_u16(),
            reason: rejection_reason(status, &body),
        })
    }
}

/// Resolves the create-report endpoint from a site URL, tolerating a
/// missing trailing slash.
fn api_endpoint(site_url: &str) -> String {
    let mut url = site_url.to_owned();
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str("api");
    url
}

/// Builds the form payload for one create-report call. Optional media
/// fields are included only when the row carried them.
#[must_use]
pub fn form_fields(request: &ReportRequest) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("task", "report".to_owned()),
        ("incident_title", request.title.clone()),
        ("incident_description", request.description.clone()),
        ("incident_date", request.date.clone()),
        ("incident_hour", request.hour.clone()),
        ("incident_minute", request.minute.clone()),
        ("incident_ampm", request.meridiem.clone()),
        ("incident_category", request.category.clone()),
        ("latitude", request.latitude.clone()),
        ("longitude", request.longitude.clone()),
        ("location_name", request.location_name.clone()),
    ];

    if let Some(photo) = &request.photo {
        fields.push(("incident_photo", photo.clone()));
    }
    if let Some(video) = &request.video {
        fields.push(("incident_video", video.clone()));
    }

    fields
}

/// Derives a human-readable rejection reason from the response, preferring
/// a JSON `error.message` body over the canonical status reason.
fn rejection_reason(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value
            .pointer("/error/message")
            .and_then(serde_json::Value::as_str)
    {
        return message.to_owned();
    }

    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ReportRequest {
        ReportRequest {
            title: "Flooding in Astoria".to_owned(),
            description: "Flooded st TweakTheTweet ID is 5".to_owned(),
            date: "10/29/2012".to_owned(),
            hour: "2".to_owned(),
            minute: "05".to_owned(),
            meridiem: "pm".to_owned(),
            category: "67".to_owned(),
            latitude: "40.77".to_owned(),
            longitude: "-73.92".to_owned(),
            location_name: "Astoria Park".to_owned(),
            photo: None,
            video: None,
        }
    }

    #[test]
    fn appends_api_segment() {
        assert_eq!(api_endpoint("https://sandy.example.org"), "https://sandy.example.org/api");
        assert_eq!(api_endpoint("https://sandy.example.org/"), "https://sandy.example.org/api");
    }

    #[test]
    fn form_carries_required_fields() {
        let fields = form_fields(&request());
        assert_eq!(fields[0], ("task", "report".to_owned()));
        assert!(fields.contains(&("incident_hour", "2".to_owned())));
        assert!(fields.contains(&("incident_ampm", "pm".to_owned())));
        assert!(!fields.iter().any(|(name, _)| *name == "incident_photo"));
    }

    #[test]
    fn form_includes_media_only_when_present() {
        let mut with_photo = request();
        with_photo.photo = Some("http://example.org/p.jpg".to_owned());

        let fields = form_fields(&with_photo);
        assert!(fields.contains(&("incident_photo", "http://example.org/p.jpg".to_owned())));
        assert!(!fields.iter().any(|(name, _)| *name == "incident_video"));
    }

    #[test]
    fn prefers_json_error_message() {
        let reason = rejection_reason(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"missing incident_title"}}"#,
        );
        assert_eq!(reason, "missing incident_title");
    }

    #[test]
    fn falls_back_to_canonical_reason() {
        let reason = rejection_reason(reqwest::StatusCode::FORBIDDEN, "nope");
        assert_eq!(reason, "Forbidden");
    }
}
