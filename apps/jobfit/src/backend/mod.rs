/// Backend client: the only module that talks to the JobFit backend.
///
/// Endpoints: `POST <register_path>`, `POST /login`, `POST /updateProfile`
/// (multipart, bearer auth), `POST /skills` (bearer auth).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::{ResumeBlob, SkillReport, User};
use crate::session::validation::{LoginForm, RegistrationForm};

/// Token and user returned by a successful register or login.
/// Registration answers with `access_token`, login with `token`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthPayload {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

/// Multipart body for `/updateProfile`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSubmission {
    pub target_role: String,
    pub resume: Option<ResumeBlob>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    msg: Option<String>,
}

/// Remote operations the client relies on. Swappable for test doubles.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn register(&self, form: &RegistrationForm) -> Result<AuthPayload, ClientError>;

    async fn login(&self, form: &LoginForm) -> Result<AuthPayload, ClientError>;

    async fn update_profile(
        &self,
        token: &str,
        submission: &ProfileSubmission,
    ) -> Result<Value, ClientError>;

    async fn fetch_skills(&self, token: &str) -> Result<SkillReport, ClientError>;
}

/// reqwest implementation of [`AuthBackend`].
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    register_path: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, register_path: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            register_path: register_path.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn register(&self, form: &RegistrationForm) -> Result<AuthPayload, ClientError> {
        let response = self
            .client
            .post(self.url(&self.register_path))
            .json(form)
            .send()
            .await?;
        read_json(response, "Registration failed", false).await
    }

    async fn login(&self, form: &LoginForm) -> Result<AuthPayload, ClientError> {
        let response = self.client.post(self.url("/login")).json(form).send().await?;
        read_json(response, "Login failed", false).await
    }

    async fn update_profile(
        &self,
        token: &str,
        submission: &ProfileSubmission,
    ) -> Result<Value, ClientError> {
        let mut form = Form::new().text("targetRole", submission.target_role.clone());
        if let Some(resume) = &submission.resume {
            let part = Part::bytes(resume.bytes.to_vec())
                .file_name(resume.file_name.clone())
                .mime_str(&resume.content_type)?;
            form = form.part("resume", part);
        }

        let response = self
            .client
            .post(self.url("/updateProfile"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        read_json(response, "Failed to update profile", true).await
    }

    async fn fetch_skills(&self, token: &str) -> Result<SkillReport, ClientError> {
        let response = self
            .client
            .post(self.url("/skills"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        read_json(response, "Failed to fetch missing skills. Try again later.", true).await
    }
}

/// Decodes a 2xx body as `T`, or turns the response into a `ClientError`.
///
/// `bearer` marks endpoints where 401 means the stored token is no longer valid.
async fn read_json<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
    bearer: bool,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        debug!("Backend call succeeded with {status}");
        return Ok(serde_json::from_str(&body)?);
    }

    warn!("Backend returned {status}");
    if bearer && status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    Err(ClientError::Server {
        status: status.as_u16(),
        message: error_message(&body, fallback),
    })
}

/// Pulls `error`, then `msg`, out of an error body, falling back to `fallback`.
fn error_message(body: &str, fallback: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error
        .or(parsed.msg)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
