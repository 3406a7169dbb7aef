//! HTTP client for the school-management REST backend.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::core::config::ApiConfig;
use crate::core::{
    decode_records, extract_list, ApiErrorBody, AppError, AppErrorType, EnvelopeShape, ListLookup,
};
use crate::forms::payload::Payload;
use crate::forms::schema::EntityKind;
use crate::models::enums::UserRole;
use crate::models::pagination::PageQuery;
use crate::models::{Branch, School, UserSummary};
use crate::session::SessionContext;

/// Whether a call must carry the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Required,
    IfAvailable,
}

/// A file picked for upload, held in memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionContext,
    allow_insecure_credentials: bool,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionContext) -> Result<Self, AppError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| AppError {
            message: Some(format!("Invalid api base_url: {}", e)),
            cause: Some(e.to_string()),
            error_type: AppErrorType::ConfigError,
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AppError::internal_error)?;

        Ok(Self {
            http,
            base_url,
            session,
            allow_insecure_credentials: config.allow_insecure_credentials,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder, auth: Auth) -> RequestBuilder {
        let request = request.header("x-request-id", Uuid::new_v4().to_string());
        match self.session.bearer_header() {
            Some(header) => request.header(reqwest::header::AUTHORIZATION, header),
            None => {
                if auth == Auth::Required {
                    tracing::warn!("sending authenticated request without a session token");
                }
                request
            }
        }
    }

    fn is_secure_transport(&self) -> bool {
        if self.base_url.scheme() == "https" {
            return true;
        }
        matches!(
            self.base_url.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
        )
    }

    async fn read_json(response: Response) -> Result<Value, AppError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(AppError::decode_error);
        }

        let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
            .ok()
            .and_then(ApiErrorBody::into_message);
        tracing::warn!(status = status.as_u16(), message = ?message, "request rejected by server");
        Err(AppError::api_error(status.as_u16(), message))
    }

    async fn get_json(&self, path: &str, query: Option<PageQuery>, auth: Auth) -> Result<Value, AppError> {
        let mut request = self.http.get(self.url(path));
        if let Some(query) = query {
            request = request.query(&query);
        }
        let response = self.authorize(request, auth).send().await?;
        Self::read_json(response).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<PageQuery>,
        lookup: ListLookup<'_>,
    ) -> Result<Vec<T>, AppError> {
        let body = self.get_json(path, query, Auth::IfAvailable).await?;
        let (items, shape) = extract_list(&body, lookup);
        if shape == EnvelopeShape::Unrecognized {
            tracing::warn!(path, "list response had no recognizable records, using empty list");
        } else if !shape.is_canonical() {
            tracing::warn!(path, shape = ?shape, "list response used a non-canonical envelope");
        }
        Ok(decode_records(items))
    }

    #[tracing::instrument(name = "List schools", skip(self))]
    pub async fn list_schools(&self, page: PageQuery) -> Result<Vec<School>, AppError> {
        self.get_list("/schools", Some(page), School::LOOKUP).await
    }

    #[tracing::instrument(name = "List branches", skip(self))]
    pub async fn list_branches(&self, page: PageQuery) -> Result<Vec<Branch>, AppError> {
        self.get_list("/branches", Some(page), Branch::LOOKUP).await
    }

    #[tracing::instrument(name = "List users of school", skip(self))]
    pub async fn users_by_school(
        &self,
        school_id: &str,
        role: UserRole,
    ) -> Result<Vec<UserSummary>, AppError> {
        let path = format!("/users/school/{}/{}", school_id, role.as_str());
        self.get_list(&path, None, UserSummary::LOOKUP).await
    }

    #[tracing::instrument(name = "Fetch user detail", skip(self))]
    pub async fn user_detail(&self, user_id: &str) -> Result<Value, AppError> {
        self.get_json(&format!("/users/{}", user_id), None, Auth::Required)
            .await
    }

    #[tracing::instrument(name = "Fetch student dashboard", skip(self))]
    pub async fn student_dashboard(&self, student_id: &str) -> Result<Value, AppError> {
        self.get_json(&format!("/students/{}/dashboard", student_id), None, Auth::Required)
            .await
    }

    #[tracing::instrument(name = "Fetch teacher dashboard", skip(self))]
    pub async fn teacher_dashboard(&self, teacher_id: &str) -> Result<Value, AppError> {
        self.get_json(&format!("/teachers/{}/dashboard", teacher_id), None, Auth::Required)
            .await
    }

    #[tracing::instrument(name = "Register entity", skip(self, kind, payload), fields(kind = kind.as_str()))]
    pub async fn register(&self, kind: EntityKind, payload: &Payload) -> Result<Value, AppError> {
        if payload.carries_credentials()
            && !self.is_secure_transport()
            && !self.allow_insecure_credentials
        {
            return Err(AppError {
                message: Some(
                    "Refusing to send credentials over an unencrypted connection".to_string(),
                ),
                cause: Some(format!("base url {} is not https", self.base_url)),
                error_type: AppErrorType::InsecureTransport,
            });
        }

        let request = self.http.post(self.url(kind.endpoint())).json(payload);
        let response = self.authorize(request, Auth::Required).send().await?;
        let body = Self::read_json(response).await?;
        tracing::info!("{} registration accepted", kind.as_str());
        Ok(body)
    }

    /// Posts `file` as multipart form data under `field_name`, plus `extra` text fields.
    #[tracing::instrument(
        name = "Upload file",
        skip(self, file, extra),
        fields(file_name = %file.file_name, size = file.bytes.len())
    )]
    pub async fn upload(
        &self,
        endpoint: &str,
        field_name: &str,
        file: &UploadFile,
        extra: &[(String, String)],
    ) -> Result<Value, AppError> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let mut form = Form::new().part(field_name.to_string(), part);
        for (key, value) in extra {
            form = form.text(key.clone(), value.clone());
        }

        let request = self.http.post(self.url(endpoint)).multipart(form);
        let response = self.authorize(request, Auth::Required).send().await?;
        Self::read_json(response).await
    }
}
