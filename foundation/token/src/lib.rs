use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + Debug {
    /// token returns the value to send in the `Authorization` header.
    async fn token(&self) -> Result<String, Box<dyn Error + Send + Sync>>;
}

pub trait TokenSourceProvider: Send + Sync + Debug {
    /// token_source returns the token source implementation
    fn token_source(&self) -> Arc<dyn TokenSource>;
}

/// A token source that always returns the same, already issued token.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

#[async_trait::async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Clone)]
pub struct StaticTokenSourceProvider {
    source: Arc<StaticTokenSource>,
}

impl StaticTokenSourceProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            source: Arc::new(StaticTokenSource { token: token.into() }),
        }
    }
}

impl TokenSourceProvider for StaticTokenSourceProvider {
    fn token_source(&self) -> Arc<dyn TokenSource> {
        self.source.clone()
    }
}
