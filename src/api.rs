// API client module: a small blocking HTTP client for the theme service.
// Both calls authenticate with the credentials from the resolved runtime
// context and are made one at a time.

use crate::context::RuntimeContext;
use crate::error::{Result, ThemeError};
use crate::preview::PreviewPayload;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const IMPORTS_PATH: &str = "/api/v2/guide/theming/jobs/themes/imports";
const LOCAL_PREVIEW_PATH: &str = "/hc/api/internal/theming/local_preview";
const ORIGINATOR_HEADER: &str = "X-Zendesk-Request-Originator";
const IMPORT_ORIGINATOR: &str = "zcli themes:import";

/// Blocking client bound to one account origin.
#[derive(Clone)]
pub struct ThemeClient {
    client: Client,
    origin: String,
    username: String,
    password: String,
}

/// Job descriptor returned when an import job is accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PendingJob {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Serialize, Debug)]
struct ImportJobRequest<'a> {
    job: ImportJob<'a>,
}

#[derive(Serialize, Debug)]
struct ImportJob<'a> {
    attributes: ImportAttributes<'a>,
}

#[derive(Serialize, Debug)]
struct ImportAttributes<'a> {
    brand_id: &'a str,
    format: &'a str,
}

#[derive(Deserialize, Debug)]
struct ImportJobResponse {
    job: PendingJob,
}

#[derive(Deserialize, Debug)]
struct ApiErrors {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorEntry {
    code: String,
    title: String,
}

/// A single template validation failure reported by the renderer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    pub line: u32,
    pub column: u32,
    pub description: String,
}

/// Validation failures keyed by template name.
pub type TemplateErrors = BTreeMap<String, Vec<TemplateError>>;

#[derive(Deserialize, Debug)]
struct PreviewErrorBody {
    template_errors: Option<TemplateErrors>,
}

/// Result of a preview upload that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Uploaded,
    ValidationFailed(TemplateErrors),
}

impl PreviewOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, PreviewOutcome::Uploaded)
    }
}

impl ThemeClient {
    /// Create a client for the origin and credentials in `context`.
    pub fn from_context(context: &RuntimeContext) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, context))
    }

    /// Same as `from_context` but with a caller-configured HTTP client.
    pub fn with_client(client: Client, context: &RuntimeContext) -> Self {
        ThemeClient {
            client,
            origin: context.origin.trim_end_matches('/').to_string(),
            username: context.username.clone(),
            password: context.password.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Create an import job for `brand_id`. Only 202 Accepted counts as
    /// success; otherwise the first structured error is returned.
    pub fn create_theme_import_job(&self, brand_id: &str) -> Result<PendingJob> {
        let url = self.url(IMPORTS_PATH);
        let body = ImportJobRequest {
            job: ImportJob {
                attributes: ImportAttributes {
                    brand_id,
                    format: "zip",
                },
            },
        };
        debug!(%url, brand_id, "creating theme import job");

        let res = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ORIGINATOR_HEADER, IMPORT_ORIGINATOR)
            .json(&body)
            .send()?;

        if res.status() != StatusCode::ACCEPTED {
            return Err(api_error(res));
        }
        let ImportJobResponse { job } = res.json()?;
        info!(job_id = %job.id, status = %job.status, "theme import job created");
        Ok(job)
    }

    /// Upload a preview payload. Template validation failures come back as
    /// `PreviewOutcome::ValidationFailed` rather than an error.
    pub fn upload_preview(&self, payload: &PreviewPayload) -> Result<PreviewOutcome> {
        let url = self.url(LOCAL_PREVIEW_PATH);
        debug!(%url, "uploading theme preview");

        let res = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(payload)
            .send()?;

        let status = res.status();
        match status {
            StatusCode::OK => {
                info!("theme preview uploaded");
                Ok(PreviewOutcome::Uploaded)
            }
            StatusCode::FORBIDDEN => Err(ThemeError::InvalidCredentials),
            _ => {
                let txt = res.text().unwrap_or_default();
                match serde_json::from_str::<PreviewErrorBody>(&txt) {
                    Ok(PreviewErrorBody {
                        template_errors: Some(errors),
                    }) => {
                        debug!(%status, templates = errors.len(), "preview rejected by validation");
                        Ok(PreviewOutcome::ValidationFailed(errors))
                    }
                    _ => Err(unexpected_status(status)),
                }
            }
        }
    }
}

fn unexpected_status(status: StatusCode) -> ThemeError {
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    ThemeError::UnexpectedStatus(reason.to_string())
}

fn api_error(res: Response) -> ThemeError {
    let status = res.status();
    let txt = res.text().unwrap_or_default();
    debug!(%status, "theme service returned an error");
    let first = serde_json::from_str::<ApiErrors>(&txt)
        .ok()
        .and_then(|body| body.errors.into_iter().next());
    match first {
        Some(ApiErrorEntry { code, title }) => ThemeError::Api { code, title },
        None => ThemeError::UnexpectedStatus(format!("{status} - {txt}")),
    }
}
