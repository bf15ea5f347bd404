//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Default end-to-end timeout for a single embedding request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an HTTP client for embedding backends.
///
/// Config: 10s connect timeout, `request_timeout` per request, rustls TLS,
/// `docchat/{version}` user-agent, redirect limit 10.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn default_client(request_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(request_timeout)
        .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}
