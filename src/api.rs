use crate::session::SessionIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CrimeRecord {
    pub crime_id: i64,
    pub crime_type: String,
    pub occurrence_date: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arrested: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CrimeBatch {
    pub count: usize,
    pub crimes: Vec<CrimeRecord>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct Hotspot {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
struct HotspotBatch {
    hotspots: Vec<Hotspot>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SafetyReport {
    pub score: f64,
    pub label: String,
    pub summary: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub role: String,
}

#[derive(Deserialize)]
struct UserBatch {
    users: Vec<AdminUser>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CrimeSubmission {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(default)]
    username: String,
    #[serde(default)]
    role: String,
}

#[derive(Debug)]
pub enum ApiError {
    Transport(String),
    Status(u16),
    Decode(String),
    Rejected(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "could not reach the server ({msg})"),
            ApiError::Status(code) => write!(f, "server responded with HTTP {code}"),
            ApiError::Decode(msg) => write!(f, "unexpected response body ({msg})"),
            ApiError::Rejected(msg) => write!(f, "{msg}"),
        }
    }
}

/// The crimes backend is known to emit bare `NaN` tokens for null numeric
/// columns, which is not valid JSON. Rewrite those tokens to `null` before
/// parsing. This is a required normalization step for every response body,
/// not an optimization; `NaN` inside string values must survive untouched.
pub fn sanitize_nan(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
        } else if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
        } else if chars[i..].starts_with(&['N', 'a', 'N']) {
            out.push_str("null");
            i += 3;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Timestamp format the submission endpoint expects: whole seconds,
/// space-separated date and time.
pub fn compose_occurrence_timestamp(date: &str, time: &str) -> String {
    format!("{} {}:00", date.trim(), time.trim())
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(server_url: &str) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            http,
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let clean = sanitize_nan(&body);
        serde_json::from_str(&clean).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn fetch_crimes(&self) -> Result<CrimeBatch, ApiError> {
        self.get_json("/api/crimes", &[])
    }

    pub fn fetch_hotspots(&self) -> Result<Vec<Hotspot>, ApiError> {
        let batch: HotspotBatch = self.get_json("/api/hotspots", &[])?;
        Ok(batch.hotspots)
    }

    pub fn predict_safety(&self, area: &str) -> Result<SafetyReport, ApiError> {
        self.get_json("/api/predict/safety", &[("area", area)])
    }

    pub fn fetch_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        let batch: UserBatch = self.get_json("/api/admin/users", &[])?;
        Ok(batch.users)
    }

    pub fn submit_crime(&self, report: &CrimeSubmission) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/crimes/submit", self.base_url))
            .json(report)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }

    pub fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/api/admin/users/{}", self.base_url, id))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }

    pub fn reset_database(&self) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/admin/db-reset", self.base_url))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<SessionIdentity, ApiError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Rejected("Invalid username or password".to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let reply: LoginReply = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(SessionIdentity {
            username: if reply.username.is_empty() {
                username.to_string()
            } else {
                reply.username
            },
            role: if reply.role.is_empty() {
                "OFFICER".to_string()
            } else {
                reply.role
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rewrites_bare_nan_tokens() {
        let body = r#"{"count": 2, "crimes": [{"crime_id": 1, "latitude": NaN, "longitude": 77.2}]}"#;
        let clean = sanitize_nan(body);
        assert!(!clean.contains("NaN"));
        assert!(clean.contains("\"latitude\": null"));
    }

    #[test]
    fn sanitize_preserves_nan_inside_strings() {
        let body = r#"{"description": "suspect shouted NaN NaN", "ward": NaN}"#;
        let clean = sanitize_nan(body);
        assert_eq!(
            clean,
            r#"{"description": "suspect shouted NaN NaN", "ward": null}"#
        );
    }

    #[test]
    fn sanitize_handles_escaped_quotes() {
        let body = r#"{"description": "he said \"NaN\"", "lat": NaN}"#;
        let clean = sanitize_nan(body);
        assert_eq!(clean, r#"{"description": "he said \"NaN\"", "lat": null}"#);
    }

    #[test]
    fn sanitized_body_parses_with_null_fields() {
        let body = r#"{"count": 1, "crimes": [{"crime_id": 7, "crime_type": "Theft",
            "occurrence_date": "2024-01-01", "latitude": NaN, "longitude": NaN,
            "description": "x", "arrested": false}]}"#;
        let batch: CrimeBatch = serde_json::from_str(&sanitize_nan(body)).expect("should parse");
        assert_eq!(batch.count, 1);
        assert_eq!(batch.crimes[0].latitude, None);
        assert_eq!(batch.crimes[0].longitude, None);
    }

    #[test]
    fn submission_timestamp_is_whole_seconds() {
        assert_eq!(
            compose_occurrence_timestamp("2024-03-05", "14:30"),
            "2024-03-05 14:30:00"
        );
        assert_eq!(
            compose_occurrence_timestamp(" 2024-03-05 ", " 08:05 "),
            "2024-03-05 08:05:00"
        );
    }
}
