use stagesync_core::protocol::{HistoryEntryWire, HistoryResponse, ValueBody};

/// Request-path access to the append-only change log. Degrades to empty
/// results and dropped writes on failure, like [`crate::DataApi`].
#[derive(Clone)]
pub struct HistoryApi {
    http: reqwest::Client,
    base_url: String,
    connection_id: Option<String>,
}

impl HistoryApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            connection_id: None,
        }
    }

    #[must_use]
    pub fn with_connection_id(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    /// Full log for `key`, newest first; empty on any failure.
    pub async fn get_history(&self, key: &str) -> Vec<HistoryEntryWire> {
        let response = match self.http.get(self.url(key)).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(key, %error, "history read failed, treating as empty");
                return Vec::new();
            }
        };
        match response.json::<HistoryResponse>().await {
            Ok(body) => body.history,
            Err(error) => {
                tracing::warn!(key, %error, "history read returned malformed body");
                Vec::new()
            }
        }
    }

    /// Appends one entry; the gateway persists and notifies other sessions.
    pub async fn write_history(&self, key: &str, value: &str) {
        let mut request = self.http.post(self.url(key)).json(&ValueBody {
            value: value.to_owned(),
        });
        if let Some(connection_id) = &self.connection_id {
            request = request.header(crate::socket::X_CONNECTION_ID, connection_id);
        }
        if let Err(error) = request.send().await {
            tracing::warn!(key, %error, "history write failed and was dropped");
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/api/history/{key}", self.base_url)
    }
}
