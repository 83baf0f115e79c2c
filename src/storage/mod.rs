//! Durable client-side key/value storage.
//!
//! Holds the bearer token under [`TOKEN_KEY`] so a later run can pick the
//! session back up, and the profile that came with it under [`PROFILE_KEY`].

pub mod file;
pub mod mock;

pub use file::FileStorage;
pub use mock::MemoryStorage;

pub const TOKEN_KEY: &str = "token";
pub const PROFILE_KEY: &str = "profile";

type Result<T> = ::std::result::Result<T, StorageError>;

pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug)]
pub enum StorageError {
    Unavailable(String),
    Io(::std::io::Error),
}

impl ::std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            StorageError::Unavailable(m) => write!(f, "storage unavailable: {}", m),
            StorageError::Io(e) => write!(f, "storage io error: {}", e),
        }
    }
}

impl ::std::error::Error for StorageError {}

impl From<::std::io::Error> for StorageError {
    fn from(e: ::std::io::Error) -> Self { StorageError::Io(e) }
}
