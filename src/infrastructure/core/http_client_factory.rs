use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Client for idempotent reads: request timeout plus bounded
    /// exponential-backoff retry on transient failures.
    pub fn create_client(timeout: Duration, max_retries: u32) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        ClientBuilder::new(Self::create_plain_client(timeout))
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    /// Client without retries, for calls that must not be repeated
    /// (message delivery) or that manage their own waiting (long polls).
    pub fn create_plain_client(timeout: Duration) -> Client {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}

/// Joins `path` onto `base_url` and appends the encoded query parameters.
/// reqwest-middleware does not expose `.query()`, so the URL is built up front.
pub fn build_url_with_query<K, V>(
    base_url: &str,
    path: &str,
    params: &[(K, V)],
) -> Result<Url, url::ParseError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let base = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse_with_params(
        &base,
        params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
    )
}
