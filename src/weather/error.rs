use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network request failed for {0}: {1}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Request to {0} timed out after {1:?}")]
    Timeout(String, std::time::Duration),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}: {1}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Failed to parse weather JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Unrecognised timestamp '{0}' in weather response")]
    TimestampParse(String),
}
