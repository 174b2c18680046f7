use stagesync_core::protocol::{ValueBody, ValueResponse};

/// Request-path access to the latest-value table.
///
/// Every call degrades to a safe default instead of returning an error, so
/// transient connectivity loss never takes the caller down; the cost is a
/// silently lost write, reconciled by the next full resync.
#[derive(Clone)]
pub struct DataApi {
    http: reqwest::Client,
    base_url: String,
    connection_id: Option<String>,
}

impl DataApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            connection_id: None,
        }
    }

    /// Names this client's WebSocket session on mutating requests so the
    /// gateway skips it when fanning out the resulting notification.
    #[must_use]
    pub fn with_connection_id(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    /// Latest value of `key`; `None` for absent keys and for any transport
    /// or decode failure.
    pub async fn get(&self, key: &str) -> Option<String> {
        let request = self.http.get(self.url(key));
        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(key, %error, "data read failed, treating as absent");
                return None;
            }
        };
        match response.json::<ValueResponse>().await {
            Ok(body) => body.value,
            Err(error) => {
                tracing::warn!(key, %error, "data read returned malformed body");
                None
            }
        }
    }

    /// Durable write; the gateway persists and notifies every other session.
    pub async fn set(&self, key: &str, value: &str) {
        let mut request = self.http.put(self.url(key)).json(&ValueBody {
            value: value.to_owned(),
        });
        if let Some(connection_id) = &self.connection_id {
            request = request.header(crate::socket::X_CONNECTION_ID, connection_id);
        }
        if let Err(error) = request.send().await {
            tracing::warn!(key, %error, "data write failed and was dropped");
        }
    }

    /// Durable delete, idempotent on the server side.
    pub async fn remove(&self, key: &str) {
        let mut request = self.http.delete(self.url(key));
        if let Some(connection_id) = &self.connection_id {
            request = request.header(crate::socket::X_CONNECTION_ID, connection_id);
        }
        if let Err(error) = request.send().await {
            tracing::warn!(key, %error, "data delete failed and was dropped");
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/api/data/{key}", self.base_url)
    }
}
