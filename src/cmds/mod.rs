use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

/// terminal client for the blog.
#[derive(Debug, Clone, Parser)]
#[clap(author, version)]
pub struct Args {
    /// API root, e.g. `https://example.com/api/v1`.
    #[clap(long)]
    pub base_url: Option<String>,

    /// where the session is kept between runs.
    #[clap(long)]
    pub state_dir: Option<PathBuf>,
}

/// one line typed into the shell.
#[derive(Debug, Clone, Parser)]
#[clap(no_binary_name = true)]
pub struct Line {
    #[clap(subcommand)]
    pub cmd: ShellCmd,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ShellCmd {
    /// create an account and log in.
    Register {
        username: String,
        full_name: String,
        email: String,
        password: String,
    },

    Login {
        username: String,
        password: String,
    },

    Logout,

    /// who is logged in.
    Whoami,

    /// open a view by path, e.g. `/PostDetails/<id>`.
    Go { path: String },

    /// list every post, or the most liked ones.
    Posts {
        #[clap(long, min_values = 0, default_missing_value = "5")]
        top: Option<usize>,
    },

    Show { id: String },

    /// toggle your like on a post.
    Like { id: String },

    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        #[clap(long)]
        image: Option<String>,
    },

    Edit {
        id: String,
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
    },

    Delete { id: String },

    #[clap(alias = "exit")]
    Quit,
}

/// Splits `line` like a shell would and parses it; blank lines give `None`.
pub fn parse(line: &str) -> Result<Option<ShellCmd>> {
    let words = shell_words::split(line).map_err(|e| anyhow!("cannot split line: {}", e))?;

    if words.is_empty() {
        return Ok(None);
    }

    Line::try_parse_from(words)
        .map(|Line { cmd }| Some(cmd))
        .map_err(|e| anyhow!("{}", e))
}
