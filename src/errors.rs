#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No response reached the client.
    Network(String),
    /// Non-2xx response; `message` is the server's, or a generic one.
    Api { status: u16, message: String },
    /// A successful response whose body could not be understood.
    Decode(String),
    /// Client-side check failed; nothing was sent.
    Validation(String),
    Unauthenticated,
    NotOwner,
    /// The user declined a confirmation prompt.
    Cancelled,
    /// A response arrived for a request that was superseded. Never shown.
    Stale,
}

impl ClientError {
    pub fn api(status: u16, message: Option<String>) -> Self {
        ClientError::Api {
            status,
            message: message.unwrap_or_else(|| format!("HTTP error, status {}", status)),
        }
    }

    pub fn is_stale(&self) -> bool { matches!(self, ClientError::Stale) }

    /// Text a view shows inline.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(m) | ClientError::Validation(m) => m.clone(),
            ClientError::Api { message, .. } => message.clone(),
            e => e.to_string(),
        }
    }
}

impl ::std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            ClientError::Network(m) => write!(f, "network error: {}", m),
            ClientError::Api { message, .. } => write!(f, "{}", message),
            ClientError::Decode(m) => write!(f, "malformed response: {}", m),
            ClientError::Validation(m) => write!(f, "{}", m),
            ClientError::Unauthenticated => write!(f, "you must be logged in."),
            ClientError::NotOwner => write!(f, "only the author can modify this post."),
            ClientError::Cancelled => write!(f, "cancelled."),
            ClientError::Stale => write!(f, "response discarded (superseded)."),
        }
    }
}

impl ::std::error::Error for ClientError {}
