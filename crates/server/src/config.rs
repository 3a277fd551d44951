use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Parser)]
#[clap(author, version, about)]
pub struct ServerConfig {
    /// Where the migration ledger and the schema are kept. Both live in
    /// memory when absent.
    #[clap(long)]
    pub(crate) data_dir: Option<PathBuf>,
    #[clap(long, default_value = "127.0.0.1:3000")]
    pub(crate) bind: String,
    /// A JSON file with the content items to serve.
    #[clap(long)]
    pub(crate) content: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            bind: "127.0.0.1:3000".to_string(),
            content: None,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn data_dir(self, path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(path.into()),
            ..self
        }
    }

    #[must_use]
    pub fn content(self, path: impl Into<PathBuf>) -> Self {
        Self {
            content: Some(path.into()),
            ..self
        }
    }

    #[must_use]
    pub fn bind(self, bind: impl Into<String>) -> Self {
        Self {
            bind: bind.into(),
            ..self
        }
    }

    pub fn parse() -> Self {
        Parser::parse()
    }
}
