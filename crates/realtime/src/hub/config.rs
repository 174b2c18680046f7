#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 256,
        }
    }
}
