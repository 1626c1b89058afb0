//! Typed wrappers around the backend's REST endpoints.

use reqwest::{RequestBuilder, Response, StatusCode, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::common::{
    ChatSummary, Credential, MeSnapshot, OutgoingMessage, ProfileImage, PublicProfile, UserEntry,
};
use crate::config::endpoint_url;
use crate::error::{ClientError, Result};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct CountResponse {
    #[serde(default)]
    count: Option<u32>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    profile: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    root: Url,
}

impl ApiClient {
    pub fn new(root: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            root,
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        endpoint_url(&self.root, segments)
    }

    fn authorized(&self, builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        builder.bearer_auth(credential.as_str())
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = check(response).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<Credential> {
        let response = self
            .http
            .post(self.url(&["signin"])?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidCredentials);
        }
        let token: TokenResponse = Self::json(response).await?;
        Ok(Credential::new(token.access_token))
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(&["signup"])?)
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await?;
        check(response).await.map(drop)
    }

    pub async fn me(&self, credential: &Credential) -> Result<MeSnapshot> {
        let request = self.authorized(self.http.get(self.url(&["me"])?), credential);
        Self::json(request.send().await?).await
    }

    pub async fn him(&self, credential: &Credential, name: &str) -> Result<PublicProfile> {
        let request = self
            .authorized(self.http.get(self.url(&["him"])?), credential)
            .query(&[("name", name)]);
        Self::json(request.send().await?).await
    }

    pub async fn users(&self, credential: &Credential) -> Result<Vec<UserEntry>> {
        let request = self.authorized(self.http.get(self.url(&["users"])?), credential);
        Self::json(request.send().await?).await
    }

    pub async fn search_users(&self, credential: &Credential, query: &str) -> Result<Vec<UserEntry>> {
        let request = self
            .authorized(self.http.get(self.url(&["users", "search"])?), credential)
            .query(&[("q", query)]);
        Self::json(request.send().await?).await
    }

    pub async fn chats(&self, credential: &Credential, username: &str) -> Result<Vec<ChatSummary>> {
        let url = self.url(&[username, "chats"])?;
        let request = self.authorized(self.http.get(url), credential);
        Self::json(request.send().await?).await
    }

    pub async fn notification_count(&self, credential: &Credential) -> Result<u32> {
        let url = self.url(&["notifications", "count"])?;
        let request = self.authorized(self.http.get(url), credential);
        let count: CountResponse = Self::json(request.send().await?).await?;
        Ok(count.count.unwrap_or(0))
    }

    pub async fn mark_read(&self, credential: &Credential, friend: &str) -> Result<()> {
        let request = self
            .authorized(self.http.post(self.url(&["chat", "mark_read"])?), credential)
            .json(&json!({ "username": friend }));
        check(request.send().await?).await.map(drop)
    }

    pub async fn send_message(
        &self,
        credential: &Credential,
        friend: &str,
        message: &OutgoingMessage,
    ) -> Result<()> {
        let url = self.url(&["chat", friend, "send"])?;
        let request = self.authorized(self.http.post(url), credential).json(message);
        check(request.send().await?).await.map(drop)
    }

    /// Replaces the profile picture and returns the image now on file.
    pub async fn upload_profile(
        &self,
        credential: &Credential,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ProfileImage> {
        let encoded_locally = base64_encode(&bytes);
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let request = self
            .authorized(self.http.post(self.url(&["profile", "upload"])?), credential)
            .multipart(form);
        let uploaded: UploadResponse = Self::json(request.send().await?).await?;

        // the backend only acknowledges; what it stored is what we sent
        let encoded = uploaded.profile.unwrap_or(encoded_locally);
        Ok(ProfileImage::from_wire(&encoded))
    }

    pub async fn send_request(&self, credential: &Credential, to: &str) -> Result<()> {
        let request = self
            .authorized(self.http.post(self.url(&["requests"])?), credential)
            .json(&json!({ "toUsername": to }));
        check(request.send().await?).await.map(drop)
    }

    pub async fn accept_request(&self, credential: &Credential, requester: &str) -> Result<()> {
        self.resolve_request(&["requests", "accept"], credential, requester).await
    }

    pub async fn reject_request(&self, credential: &Credential, requester: &str) -> Result<()> {
        self.resolve_request(&["requests", "reject"], credential, requester).await
    }

    async fn resolve_request(&self, path: &[&str], credential: &Credential, requester: &str) -> Result<()> {
        let request = self
            .authorized(self.http.post(self.url(path)?), credential)
            .json(&json!({ "requesterUsername": requester }));
        check(request.send().await?).await.map(drop)
    }
}

pub fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Maps non-success statuses onto [`ClientError`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = error_detail(&text);
    if status == StatusCode::BAD_REQUEST {
        return Err(ClientError::Rejected(detail));
    }
    Err(ClientError::Status {
        status: status.as_u16(),
        detail,
    })
}

/// FastAPI puts a human readable reason under `detail`.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_extracted() {
        assert_eq!(
            error_detail(r#"{"detail":"Email or Username already exists"}"#),
            "Email or Username already exists"
        );
        assert_eq!(error_detail("plain failure"), "plain failure");
    }

    #[test]
    fn endpoint_paths_are_joined_under_root() {
        let api = ApiClient::new(Url::parse("http://localhost:8000").unwrap());
        assert_eq!(
            api.url(&["users", "search"]).unwrap().as_str(),
            "http://localhost:8000/users/search"
        );
    }

    #[test]
    fn prefixed_root_applies_to_every_endpoint() {
        for root in ["https://host.example/api", "https://host.example/api/"] {
            let api = ApiClient::new(Url::parse(root).unwrap());
            assert_eq!(
                api.url(&["signin"]).unwrap().as_str(),
                "https://host.example/api/signin"
            );
            assert_eq!(
                api.url(&["alice", "chats"]).unwrap().as_str(),
                "https://host.example/api/alice/chats"
            );
            assert_eq!(
                api.url(&["chat", "bo b", "send"]).unwrap().as_str(),
                "https://host.example/api/chat/bo%20b/send"
            );
        }
    }

    #[test]
    fn base64_matches_standard_alphabet() {
        assert_eq!(base64_encode(b"hi!"), "aGkh");
    }
}
