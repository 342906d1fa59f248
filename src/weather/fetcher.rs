use crate::weather::cache::TtlCache;
use crate::weather::error::WeatherError;
use crate::weather::reading::{parse_current, WeatherReading};
use chrono_tz::Tz;
use log::{debug, info, warn};
use reqwest::Client;
use std::time::Duration;

/// Result of one weather fetch. Exactly one of `reading` and `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub reading: Option<WeatherReading>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn success(reading: WeatherReading) -> Self {
        Self {
            reading: Some(reading),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            reading: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.reading.is_some()
    }
}

impl From<Result<WeatherReading, WeatherError>> for FetchOutcome {
    fn from(result: Result<WeatherReading, WeatherError>) -> Self {
        match result {
            Ok(reading) => FetchOutcome::success(reading),
            Err(e) => FetchOutcome::failure(e.to_string()),
        }
    }
}

/// Fetches current conditions over HTTP and caches outcomes per URL.
///
/// One fetcher is shared by all sessions of a [`crate::Dashboard`].
pub struct WeatherFetcher {
    client: Client,
    cache: TtlCache<String, FetchOutcome>,
    timezone: Tz,
    timeout: Duration,
}

impl WeatherFetcher {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration, ttl: Duration, timezone: Tz) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            cache: TtlCache::new(ttl),
            timezone,
            timeout,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns the cached outcome for `url` or performs one request. Never fails;
    /// errors are carried in [`FetchOutcome::error`] and are cached like readings.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let key = url.to_string();
        if let Some(outcome) = self.cache.get(&key).await {
            debug!("Cache hit for {}", url);
            return outcome;
        }

        let outcome = FetchOutcome::from(self.fetch_uncached(url).await);
        if let Some(error) = &outcome.error {
            warn!("Weather fetch failed: {}", error);
        }
        self.cache.insert(key, outcome.clone()).await;
        outcome
    }

    /// Forces the next [`fetch`](Self::fetch) of `url` to hit the network.
    pub async fn invalidate(&self, url: &str) -> bool {
        self.cache.invalidate(&url.to_string()).await
    }

    /// Performs the request without consulting the cache.
    pub async fn fetch_uncached(&self, url: &str) -> Result<WeatherReading, WeatherError> {
        info!("Requesting current weather from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Timeout(url.to_string(), self.timeout)
                } else {
                    WeatherError::NetworkRequest(url.to_string(), e)
                }
            })?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => WeatherError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => WeatherError::NetworkRequest(url.to_string(), e),
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| WeatherError::BodyRead(url.to_string(), e))?;
        parse_current(&body, self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{current_body, serve, silent, UNREACHABLE_URL};
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Denver;
    use std::sync::atomic::Ordering;

    fn fetcher(ttl: Duration) -> Result<WeatherFetcher, reqwest::Error> {
        WeatherFetcher::new(Duration::from_secs(10), ttl, Denver)
    }

    #[tokio::test]
    async fn test_fetch_is_cached_until_invalidated() -> Result<(), Box<dyn std::error::Error>> {
        let (url, hits) = serve(vec![
            (200, current_body("2025-03-01T12:00", 7.5, 14.0)),
            (200, current_body("2025-03-01T12:15", 8.0, 12.5)),
        ])
        .await?;
        let fetcher = fetcher(Duration::from_secs(600))?;

        let first = fetcher.fetch(&url).await;
        let reading = first.reading.clone().ok_or("expected a reading")?;
        assert_eq!(first.error, None);
        assert_eq!(
            reading.time_utc,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(reading.temperature, 7.5);

        let second = fetcher.fetch(&url).await;
        assert_eq!(second, first);
        assert_eq!(hits.load(Ordering::SeqCst), 1, "second fetch is served from cache");

        assert!(fetcher.invalidate(&url).await);
        let third = fetcher.fetch(&url).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(third.reading.map(|r| r.wind_speed), Some(12.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_http_error_becomes_outcome() -> Result<(), Box<dyn std::error::Error>> {
        let (url, _) = serve(vec![(500, "{}".to_string())]).await?;
        let outcome = fetcher(Duration::from_secs(600))?.fetch(&url).await;

        assert!(!outcome.is_success());
        let error = outcome.error.ok_or("expected an error")?;
        assert!(error.contains("500"), "unexpected error text: {error}");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_json_becomes_outcome() -> Result<(), Box<dyn std::error::Error>> {
        let (url, _) = serve(vec![(200, r#"{"current": "nope"}"#.to_string())]).await?;
        let outcome = fetcher(Duration::from_secs(600))?.fetch(&url).await;

        assert_eq!(outcome.reading, None);
        assert!(outcome.error.is_some_and(|e| !e.is_empty()));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_host_becomes_outcome() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = fetcher(Duration::from_secs(600))?;
        let outcome = fetcher.fetch(UNREACHABLE_URL).await;

        assert_eq!(outcome.reading, None);
        assert!(outcome.error.is_some_and(|e| e.contains(UNREACHABLE_URL)));
        // Failures are cached too.
        assert_eq!(fetcher.cache.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_request_timeout_is_honoured() -> Result<(), Box<dyn std::error::Error>> {
        let url = silent().await?;
        let fetcher = WeatherFetcher::new(
            Duration::from_millis(200),
            Duration::from_secs(600),
            Denver,
        )?;

        let started = std::time::Instant::now();
        let outcome = fetcher.fetch(&url).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        assert!(!outcome.is_success());
        let error = outcome.error.ok_or("expected an error")?;
        assert!(error.contains("timed out"), "unexpected error text: {error}");
        Ok(())
    }
}
