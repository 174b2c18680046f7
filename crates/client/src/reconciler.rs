use stagesync_core::protocol::ServerEvent;
use stagesync_core::{
    integrator_name_key, slugify, stage_item_checked_key, stage_progress_key, step_history_key,
    sw_release_name_key,
};

use crate::{DataApi, HistoryApi, Projection, ViewScope};

/// The carline/stage slugs a dashboard is built from. The checklist content
/// itself lives outside this crate; only the key universe matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLayout {
    pub carlines: Vec<String>,
    pub stages: Vec<String>,
}

impl DashboardLayout {
    /// Builds a layout from human-readable names, slugifying each.
    #[must_use]
    pub fn new(carlines: &[&str], stages: &[&str]) -> Self {
        Self {
            carlines: carlines.iter().map(|name| slugify(name)).collect(),
            stages: stages.iter().map(|name| slugify(name)).collect(),
        }
    }
}

/// Per-session view state: a projection of the keys relevant to the
/// rendered page, seeded by a bulk fetch and kept live by applying inbound
/// change notifications. Local edits apply optimistically before the
/// durable write is issued; nothing here retries — a write lost to the
/// network stays lost until the next `resync`.
pub struct Reconciler {
    data: DataApi,
    history: HistoryApi,
    layout: DashboardLayout,
    scope: ViewScope,
    projection: Projection,
}

impl Reconciler {
    #[must_use]
    pub fn new(data: DataApi, history: HistoryApi, layout: DashboardLayout, scope: ViewScope) -> Self {
        Self {
            data,
            history,
            layout,
            scope,
            projection: Projection::default(),
        }
    }

    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.projection.get(key)
    }

    /// Establishes the baseline: point-in-time reads of every key in scope.
    /// Keys that read back absent (or fail to read) stay unloaded.
    pub async fn seed(&mut self) {
        for key in self.keys_in_scope() {
            if let Some(value) = self.data.get(&key).await {
                self.projection.apply(&key, Some(&value));
            }
        }
    }

    /// The reconnect contract: no broadcast replay exists, so catching up
    /// after a disconnect means discarding the projection and re-seeding.
    pub async fn resync(&mut self) {
        self.projection.clear();
        self.seed().await;
    }

    /// Applies one inbound notification. Returns whether the projection
    /// changed; keys outside the current view are ignored without a fetch.
    pub fn apply_event(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::DataChange { key, value } => {
                if !self.scope.is_relevant(key) {
                    return false;
                }
                self.projection.apply(key, value.as_deref());
                true
            }
            ServerEvent::Connected { .. } | ServerEvent::HistoryAdded { .. } => false,
        }
    }

    /// Local edit of a plain field: optimistic apply, then durable commit.
    pub async fn set_field(&mut self, key: &str, value: &str) {
        self.projection.apply(key, Some(value));
        self.data.set(key, value).await;
    }

    pub async fn remove_field(&mut self, key: &str) {
        self.projection.apply(key, None);
        self.data.remove(key).await;
    }

    /// Local edit of one checklist item on the stage this view renders:
    /// updates the checked array and the derived progress percentage,
    /// appends a step history entry, and re-reads that step's history to
    /// return the freshest "last changed" timestamp.
    pub async fn set_item_checked(
        &mut self,
        step_index: usize,
        total_steps: usize,
        checked: bool,
    ) -> Option<String> {
        let ViewScope::Stage { carline, stage } = self.scope.clone() else {
            tracing::debug!("checklist edit outside a stage view is a no-op");
            return None;
        };

        let item_key = stage_item_checked_key(&carline, &stage);
        let mut items = self
            .projection
            .get(&item_key)
            .and_then(|raw| serde_json::from_str::<Vec<bool>>(raw).ok())
            .unwrap_or_default();
        items.resize(total_steps.max(step_index + 1), false);
        items[step_index] = checked;

        let encoded = serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_owned());
        self.set_field(&item_key, &encoded).await;

        let done = items.iter().filter(|item| **item).count();
        let total = total_steps.max(1);
        let percentage = ((done as f64 / total as f64) * 100.0).round() as u32;
        let progress_key = stage_progress_key(&carline, &stage);
        self.set_field(&progress_key, &percentage.to_string()).await;

        let history_key = step_history_key(&carline, &stage, step_index);
        self.history
            .write_history(&history_key, &checked.to_string())
            .await;
        let entries = self.history.get_history(&history_key).await;
        entries.first().map(|entry| entry.updated_at.clone())
    }

    fn keys_in_scope(&self) -> Vec<String> {
        match &self.scope {
            ViewScope::Overview => {
                let mut keys = Vec::new();
                for carline in &self.layout.carlines {
                    keys.push(sw_release_name_key(carline));
                    keys.push(integrator_name_key(carline));
                    for stage in &self.layout.stages {
                        keys.push(stage_progress_key(carline, stage));
                    }
                }
                keys
            }
            ViewScope::Stage { carline, stage } => vec![
                stage_item_checked_key(carline, stage),
                stage_progress_key(carline, stage),
            ],
        }
    }
}
