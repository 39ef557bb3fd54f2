//! Monitor credentials

use super::traits::TokenSource;
use crate::error::TokenError;
use async_trait::async_trait;

/// Token supplied up front through configuration
#[derive(Clone, Default)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("configured", &self.token.is_some())
            .finish()
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, TokenError> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(TokenError::Missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken::new(Some(" abc ".to_string()));
        assert_eq!(source.token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_missing_token() {
        assert!(matches!(
            StaticToken::new(None).token().await,
            Err(TokenError::Missing)
        ));
        assert!(matches!(
            StaticToken::new(Some("  ".to_string())).token().await,
            Err(TokenError::Missing)
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let source = StaticToken::new(Some("secret".to_string()));
        assert!(!format!("{:?}", source).contains("secret"));
    }
}
