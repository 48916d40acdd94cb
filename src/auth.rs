use std::collections::HashSet;
use std::env;

use dotenvy::dotenv;
use tracing::trace;

use crate::error::{Error, Result};

/// Proof that a caller presented a valid api key.
///
/// Every service operation takes a `&Caller`; the only way to obtain
/// one is [`ApiKeys::authenticate`], so an unauthenticated call cannot
/// be expressed.
#[derive(Debug, Clone)]
pub struct Caller {
    key: String,
}

impl Caller {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// The set of api keys accepted at the service boundary.
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn new(keys: HashSet<String>) -> Self {
        Self { keys }
    }

    /// Reads the comma-separated `API_KEYS` variable, `.env` included.
    pub fn from_env() -> Self {
        dotenv().ok();

        trace!("Loading api keys");
        let keys = env::var("API_KEYS")
            .expect("API_KEYS must be set")
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect();

        Self { keys }
    }

    pub fn authenticate(&self, presented: &str) -> Result<Caller> {
        if self.keys.contains(presented) {
            Ok(Caller {
                key: presented.to_owned(),
            })
        } else {
            Err(Error::Auth)
        }
    }
}
