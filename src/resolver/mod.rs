pub mod keyword;
pub mod remote;

use async_trait::async_trait;
use log::info;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use self::keyword::KeywordResolver;
use self::remote::RemoteResolver;

/// Maps one user message to one bot reply.
///
/// Implementations never return an error: failures are turned into a reply
/// text before they reach the session.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, text: &str) -> String;

    fn kind(&self) -> ResolverKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Keyword,
    Remote,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverKind::Keyword => write!(f, "keyword"),
            ResolverKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("Invalid resolver type: '{0}'")]
pub struct ParseResolverKindError(String);

impl FromStr for ResolverKind {
    type Err = ParseResolverKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "local" => Ok(ResolverKind::Keyword),
            "remote" => Ok(ResolverKind::Remote),
            _ => Err(ParseResolverKindError(s.to_string())),
        }
    }
}

/// Why the remote endpoint could not produce an answer.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("inference endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("inference endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("inference endpoint sent an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub kind: ResolverKind,
    pub remote_endpoint: String,
}

pub fn new_resolver(
    config: &ResolverConfig
) -> Result<Arc<dyn Resolver>, Box<dyn StdError + Send + Sync>> {
    let resolver: Arc<dyn Resolver> = match config.kind {
        ResolverKind::Keyword => Arc::new(KeywordResolver::new()),
        ResolverKind::Remote => {
            if config.remote_endpoint.trim().is_empty() {
                return Err("Remote resolver requires an endpoint URL".into());
            }
            Arc::new(RemoteResolver::new(config.remote_endpoint.clone())?)
        }
    };
    info!("Resolver configured: Type={}", resolver.kind());
    Ok(resolver)
}
