//! Test doubles and an in-process HTTP server shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{AuthBackend, AuthPayload, ProfileSubmission};
use crate::errors::ClientError;
use crate::models::{JobListing, SkillReport};
use crate::session::validation::{LoginForm, RegistrationForm};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// A minimal listing with the given id and RFC 3339 `created` timestamp.
pub fn listing(id: &str, created: &str) -> JobListing {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Job {id}"),
        "created": created,
    }))
    .unwrap()
}

/// Scripted reply for one backend endpoint.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Ok(Value),
    Server(u16, String),
    Network,
}

impl FakeReply {
    fn resolve<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        match self {
            FakeReply::Ok(v) => Ok(serde_json::from_value(v.clone())?),
            FakeReply::Server(status, message) => Err(ClientError::Server {
                status: *status,
                message: message.clone(),
            }),
            FakeReply::Network => Err(ClientError::Network("connection refused".to_string())),
        }
    }
}

/// In-memory [`AuthBackend`] that records every call.
pub struct FakeBackend {
    auth: Mutex<FakeReply>,
    profile: Mutex<FakeReply>,
    skills: Mutex<FakeReply>,
    calls: Mutex<Vec<String>>,
    tokens: Mutex<Vec<String>>,
    submissions: Mutex<Vec<ProfileSubmission>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            auth: Mutex::new(FakeReply::Network),
            profile: Mutex::new(FakeReply::Ok(serde_json::json!({"status": "ok"}))),
            skills: Mutex::new(FakeReply::Ok(serde_json::json!({}))),
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn set_auth(&self, reply: FakeReply) {
        *self.auth.lock().unwrap() = reply;
    }

    pub fn set_profile(&self, reply: FakeReply) {
        *self.profile.lock().unwrap() = reply;
    }

    pub fn set_skills(&self, reply: FakeReply) {
        *self.skills.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<ProfileSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    fn record(&self, call: &str, token: Option<&str>) {
        self.calls.lock().unwrap().push(call.to_string());
        if let Some(t) = token {
            self.tokens.lock().unwrap().push(t.to_string());
        }
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn register(&self, _form: &RegistrationForm) -> Result<AuthPayload, ClientError> {
        self.record("register", None);
        let reply = self.auth.lock().unwrap().clone();
        reply.resolve()
    }

    async fn login(&self, _form: &LoginForm) -> Result<AuthPayload, ClientError> {
        self.record("login", None);
        let reply = self.auth.lock().unwrap().clone();
        reply.resolve()
    }

    async fn update_profile(
        &self,
        token: &str,
        submission: &ProfileSubmission,
    ) -> Result<Value, ClientError> {
        self.record("update_profile", Some(token));
        self.submissions.lock().unwrap().push(submission.clone());
        let reply = self.profile.lock().unwrap().clone();
        reply.resolve()
    }

    async fn fetch_skills(&self, token: &str) -> Result<SkillReport, ClientError> {
        self.record("fetch_skills", Some(token));
        let reply = self.skills.lock().unwrap().clone();
        reply.resolve()
    }
}
