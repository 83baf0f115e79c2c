use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

macro_rules! string_id {
    ($n:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $n(pub String);

        impl fmt::Display for $n {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<&str> for $n {
            fn from(s: &str) -> Self { Self(s.to_string()) }
        }

        impl From<String> for $n {
            fn from(s: String) -> Self { Self(s) }
        }
    };
}

string_id!(UserId);
string_id!(PostId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

/// Author of a post, as the server embeds it.
///
/// Depending on the endpoint the author comes populated (an object carrying
/// `_id` and `fullName`) or as a bare id string; both decode to this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAuthor")]
pub struct AuthorRef {
    pub id: UserId,
    #[serde(rename = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAuthor {
    Id(UserId),
    Profile {
        #[serde(alias = "_id")]
        id: UserId,
        #[serde(rename = "fullName", default)]
        full_name: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
}

impl From<RawAuthor> for AuthorRef {
    fn from(raw: RawAuthor) -> Self {
        match raw {
            RawAuthor::Id(id) => AuthorRef {
                id,
                full_name: None,
                username: None,
            },
            RawAuthor::Profile {
                id,
                full_name,
                username,
            } => AuthorRef {
                id,
                full_name,
                username,
            },
        }
    }
}

impl AuthorRef {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.id.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "user", alias = "author")]
    pub author: AuthorRef,
    #[serde(default)]
    pub likes: HashSet<UserId>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn like_count(&self) -> usize { self.likes.len() }

    pub fn is_liked_by(&self, user_id: &UserId) -> bool { self.likes.contains(user_id) }

    pub fn is_owned_by(&self, viewer: &UserProfile) -> bool { self.author.id == viewer.id }

    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Bearer token handed out by the server.
#[derive(Clone)]
pub struct Token(SecretString);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self { Self(SecretString::from(raw.into())) }

    pub fn expose(&self) -> &str { self.0.expose_secret() }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Token([REDACTED])") }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool { self.expose() == other.expose() }
}

impl Eq for Token {}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        require_filled("username", &self.username)?;
        require_filled("password", self.password.expose_secret())
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: SecretString,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ClientError> {
        require_filled("username", &self.username)?;
        require_filled("full name", &self.full_name)?;
        require_filled("email", &self.email)?;
        require_filled("password", self.password.expose_secret())?;

        lazy_static::lazy_static! {
            static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
        }

        if !EMAIL.is_match(self.email.trim()) {
            return Err(ClientError::Validation(format!(
                "`{}` is not a valid email address.",
                self.email
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), ClientError> {
        require_title_and_content(&self.title, &self.content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: String,
    pub content: String,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), ClientError> {
        require_title_and_content(&self.title, &self.content)
    }
}

fn require_title_and_content(title: &str, content: &str) -> Result<(), ClientError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(ClientError::Validation(
            "Title and content cannot be empty.".to_string(),
        ));
    }

    Ok(())
}

fn require_filled(field: &str, value: &str) -> Result<(), ClientError> {
    match value.trim().is_empty() {
        true => Err(ClientError::Validation(format!("{} is required.", field))),
        false => Ok(()),
    }
}
