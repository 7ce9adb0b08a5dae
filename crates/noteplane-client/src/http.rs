//! reqwest implementation of the transport traits.

use std::time::Duration;

use noteplane_core::error::TransportError;
use noteplane_core::models::membership::{
    Invitation, MemberCount, MemberRecord, MemberResponse, PlanChange,
};
use noteplane_core::models::note::{DeleteOutcome, Note, NoteAck, NoteDraft, NoteId};
use noteplane_core::models::session::{BearerToken, LoginResponse};
use noteplane_core::models::tenant::{Plan, PlanUpgrade, TenantId, TenantProfile};
use noteplane_core::models::user::{Credential, UserId};
use noteplane_core::transport::{AuthApi, MemberApi, NotesApi, TenantApi, TransportResult};
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::error::ClientError;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_DETAIL_CHARS: usize = 200;

/// Talks to the notes backend over HTTP. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(mut config: HttpConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, token: &BearerToken) -> RequestBuilder {
        req.header(header::AUTHORIZATION, token.header_value())
    }

    /// Send, turning transport failures and non-2xx statuses into
    /// [`TransportError`]s tagged with `operation`.
    async fn execute(
        &self,
        operation: &'static str,
        req: RequestBuilder,
    ) -> TransportResult<Response> {
        let request_id = Uuid::new_v4();
        debug!(operation, %request_id, "Sending request");

        let resp = req
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| TransportError::network(operation, e.to_string()))?;

        let status = resp.status();
        debug!(operation, %request_id, status = status.as_u16(), "Received response");

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::status(
            operation,
            status.as_u16(),
            extract_detail(&body),
        ))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        req: RequestBuilder,
    ) -> TransportResult<T> {
        self.execute(operation, req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| TransportError::decode(operation, e.to_string()))
    }
}

/// Pull a human-readable message out of an error body.
///
/// FastAPI-style backends answer `{"detail": "..."}`, or `{"detail": [...]}`
/// for validation failures; anything else is passed through, truncated.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_owned(),
        },
        _ => body.to_owned(),
    };
    Some(truncate(&detail, MAX_DETAIL_CHARS))
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut out: String = value.chars().take(max_chars).collect();
    if value.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

impl AuthApi for HttpTransport {
    async fn login(&self, credential: &Credential) -> TransportResult<LoginResponse> {
        let req = self.client.post(self.url("/auth/login")).json(credential);
        self.fetch("login", req).await
    }
}

impl NotesApi for HttpTransport {
    async fn list_notes(
        &self,
        token: &BearerToken,
        tenant_id: &TenantId,
    ) -> TransportResult<Vec<Note>> {
        let req = self
            .client
            .get(self.url("/notes"))
            .query(&[("tenant_id", tenant_id.as_str())]);
        self.fetch("list notes", self.authed(req, token)).await
    }

    async fn create_note(&self, token: &BearerToken, draft: &NoteDraft) -> TransportResult<NoteAck> {
        let req = self.client.post(self.url("/notes")).json(draft);
        self.fetch("create note", self.authed(req, token)).await
    }

    async fn update_note(
        &self,
        token: &BearerToken,
        id: NoteId,
        draft: &NoteDraft,
    ) -> TransportResult<NoteAck> {
        let req = self.client.put(self.url(&format!("/notes/{id}"))).json(draft);
        self.fetch("update note", self.authed(req, token)).await
    }

    async fn delete_note(&self, token: &BearerToken, id: NoteId) -> TransportResult<DeleteOutcome> {
        let req = self.client.delete(self.url(&format!("/notes/{id}")));
        match self.execute("delete note", self.authed(req, token)).await {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.is_not_found() => Ok(DeleteOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }
}

impl TenantApi for HttpTransport {
    async fn current_tenant(&self, token: &BearerToken) -> TransportResult<TenantProfile> {
        let req = self.client.get(self.url("/tenants/me"));
        self.fetch("current tenant", self.authed(req, token)).await
    }

    async fn upgrade_plan(&self, token: &BearerToken) -> TransportResult<PlanUpgrade> {
        let req = self.client.post(self.url("/tenants/upgrade"));
        self.fetch("upgrade plan", self.authed(req, token)).await
    }
}

impl MemberApi for HttpTransport {
    async fn count_members(
        &self,
        token: &BearerToken,
        tenant_id: &TenantId,
    ) -> TransportResult<MemberCount> {
        let req = self
            .client
            .get(self.url("/users/count-members"))
            .query(&[("tenant_id", tenant_id.as_str())]);
        self.fetch("count members", self.authed(req, token)).await
    }

    async fn list_members(&self, token: &BearerToken) -> TransportResult<Vec<MemberRecord>> {
        let req = self.client.get(self.url("/users/list-members"));
        self.fetch("list members", self.authed(req, token)).await
    }

    async fn change_member_plan(
        &self,
        token: &BearerToken,
        user_id: UserId,
        new_plan: Plan,
    ) -> TransportResult<MemberResponse> {
        let req = self
            .client
            .post(self.url(&format!("/users/change-plan/{user_id}")))
            .json(&PlanChange { new_plan });
        self.fetch("change member plan", self.authed(req, token)).await
    }

    async fn invite_member(
        &self,
        token: &BearerToken,
        invitation: &Invitation,
    ) -> TransportResult<MemberResponse> {
        let req = self.client.post(self.url("/users/invite")).json(invitation);
        self.fetch("invite member", self.authed(req, token)).await
    }
}
