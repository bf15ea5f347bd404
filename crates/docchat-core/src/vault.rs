use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Environment variable holding the embedding service API key.
pub const EMBEDDING_API_KEY: &str = "DOCCHAT_EMBEDDING_API_KEY";

/// Sensitive string that never prints its contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

type SecretFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + 'a>>;

/// Where API keys come from.
pub trait SecretProvider: Send + Sync {
    fn get_secret(&self, key: &str) -> SecretFuture<'_>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretProvider for EnvSecrets {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let value = std::env::var(key).ok().filter(|v| !v.is_empty());
        Box::pin(async move { Ok(value) })
    }
}

/// Fixed in-memory secrets, for tests and embedding callers.
#[derive(Default, Clone)]
pub struct StaticSecrets {
    secrets: HashMap<String, String>,
}

impl fmt::Debug for StaticSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecrets")
            .field("secrets", &format_args!("[{} secrets]", self.secrets.len()))
            .finish()
    }
}

impl StaticSecrets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(mut self, key: &str, value: &str) -> Self {
        self.secrets.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl SecretProvider for StaticSecrets {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let value = self.secrets.get(key).cloned();
        Box::pin(async move { Ok(value) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_redacted() {
        let secret = Secret::new("hf_abc123");
        assert_eq!(secret.expose(), "hf_abc123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn env_secrets_reads_variable() {
        let key = "DOCCHAT_TEST_SECRET_SET";
        unsafe { std::env::set_var(key, "value") };
        let result = EnvSecrets.get_secret(key).await.unwrap();
        unsafe { std::env::remove_var(key) };
        assert_eq!(result.as_deref(), Some("value"));
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn env_secrets_treats_empty_as_unset() {
        let key = "DOCCHAT_TEST_SECRET_EMPTY";
        unsafe { std::env::set_var(key, "") };
        let result = EnvSecrets.get_secret(key).await.unwrap();
        unsafe { std::env::remove_var(key) };
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn static_secrets_lookup() {
        let secrets = StaticSecrets::new().with_secret(EMBEDDING_API_KEY, "k");
        assert_eq!(
            secrets.get_secret(EMBEDDING_API_KEY).await.unwrap().as_deref(),
            Some("k")
        );
        assert!(secrets.get_secret("MISSING").await.unwrap().is_none());
        assert_eq!(format!("{secrets:?}"), "StaticSecrets { secrets: [1 secrets] }");
    }
}
