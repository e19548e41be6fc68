use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

pub fn build_client(settings: &HttpSettings) -> Client {
    Client::builder()
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}
