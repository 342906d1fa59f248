use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to build the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to read or answer terminal commands")]
    Terminal(#[source] std::io::Error),
}
