use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cmds::Args;

pub const DEFAULT_BASE_URL: &str = "https://blog-4-gzpl.onrender.com/api/v1";
pub const DEFAULT_STATE_DIR: &str = ".blog_pudding";

/// argument, then environment, then the value baked in at build time.
macro_rules! try_get_value {
    ($a:expr; $n:literal $(, $bn:literal)?) => {{
        match $a {
            Some(t) => Some(t),
            None => match ::std::env::var($n) {
                Ok(t) => Some(t.into()),
                Err(e) => {
                    tracing::debug!("cannot get `{}`: {}", $n, e);

                    None $(.or_else(|| {
                        tracing::debug!("fallback to built-in `{}`...", $bn);
                        option_env!($bn).map(Into::into)
                    }))?
                },
            },
        }
    }};
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub state_dir: PathBuf,
}

impl Config {
    pub fn load(args: Args) -> Result<Self> {
        let Args {
            base_url,
            state_dir,
        } = args;

        let base_url: String =
            try_get_value!(base_url; "BLOG_API_BASE_URL", "BUILD_WITH_BLOG_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let state_dir: PathBuf = try_get_value!(state_dir; "BLOG_STATE_DIR")
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        Ok(Config {
            base_url: normalise_base_url(&base_url)?,
            state_dir,
        })
    }
}

pub fn normalise_base_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');

    let host = match url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        Some(h) => h,
        None => bail!("base url must start with `http://` or `https://`: `{}`", raw),
    };

    if host.is_empty() {
        bail!("base url has no host: `{}`", raw);
    }

    Ok(url.to_string())
}
