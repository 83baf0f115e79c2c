use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{ApiGateway, Method};
use crate::entities::{
    Credentials, Post, PostDraft, PostId, PostPatch, Registration, Token, UserProfile,
};
use crate::errors::ClientError;

type Result<T> = ::std::result::Result<T, ClientError>;

/// Everything but RFC 3986 unreserved characters gets escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: UserProfile,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Deserialize)]
struct AuthEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<AuthPayload>,
}

impl ApiGateway {
    pub async fn register(&self, registration: &Registration) -> Result<AuthPayload> {
        let body = json!({
            "username": registration.username,
            "fullName": registration.full_name,
            "email": registration.email,
            "password": registration.password.expose_secret(),
        });

        self.call("/users/register", Method::Post, Some(body), None)
            .await
            .and_then(accept_auth)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });

        self.call("/users/login", Method::Post, Some(body), None)
            .await
            .and_then(accept_auth)
    }

    pub async fn get_all_posts(&self, token: &Token) -> Result<Vec<Post>> {
        self.call("/post/getallpost", Method::Get, None, Some(token))
            .await
            .map(data_of)
            .and_then(decode)
    }

    pub async fn get_post(&self, id: &PostId, token: &Token) -> Result<Post> {
        self.call(
            &post_path("/post/getpostbyID", id),
            Method::Get,
            None,
            Some(token),
        )
        .await
        .map(data_of)
        .and_then(decode)
    }

    /// The created post, if the server echoed one back in a shape we know.
    pub async fn create_post(&self, draft: &PostDraft, token: &Token) -> Result<Option<Post>> {
        let mut body = Map::new();
        body.insert("title".to_string(), json!(draft.title));
        body.insert("content".to_string(), json!(draft.content));
        if let Some(url) = draft.image_url.as_ref().filter(|u| !u.trim().is_empty()) {
            body.insert("imageURL".to_string(), json!(url));
        }

        self.call(
            "/post/createpost",
            Method::Post,
            Some(Value::Object(body)),
            Some(token),
        )
        .await
        .map(|v| serde_json::from_value(data_of(v)).ok())
    }

    pub async fn update_post(
        &self,
        id: &PostId,
        patch: &PostPatch,
        token: &Token,
    ) -> Result<Option<Post>> {
        let body = json!({ "title": patch.title, "content": patch.content });

        self.call(
            &post_path("/post/updatepost", id),
            Method::Put,
            Some(body),
            Some(token),
        )
        .await
        .map(|v| serde_json::from_value(data_of(v)).ok())
    }

    // the server route really is spelled `deletpost`
    pub async fn delete_post(&self, id: &PostId, token: &Token) -> Result<Value> {
        self.call(
            &post_path("/post/deletpost", id),
            Method::Delete,
            None,
            Some(token),
        )
        .await
    }

    pub async fn toggle_like(&self, id: &PostId, token: &Token) -> Result<Value> {
        self.call(
            &post_path("/post/toggle-like", id),
            Method::Patch,
            None,
            Some(token),
        )
        .await
    }
}

fn accept_auth(value: Value) -> Result<AuthPayload> {
    let envelope: AuthEnvelope = decode(value)?;

    match envelope {
        AuthEnvelope {
            success: true,
            data: Some(payload),
            ..
        } => Ok(payload),
        AuthEnvelope { message, .. } => Err(ClientError::Api {
            status: 200,
            message: message.unwrap_or_else(|| "request was not successful".to_string()),
        }),
    }
}

fn post_path(route: &str, id: &PostId) -> String {
    format!("{}/{}", route, utf8_percent_encode(&id.0, SEGMENT))
}

/// Unwraps the `{ data: ... }` envelope when there is one.
pub(crate) fn data_of(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") =>
            map.remove("data").unwrap_or(Value::Null),
        v => v,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}
