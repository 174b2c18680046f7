use std::collections::HashMap;

use stagesync_core::{
    split_prefix, stage_item_checked_key, stage_progress_key, KeyPrefix,
};

/// Which keys the currently rendered view cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewScope {
    /// The overview table: names and progress of every carline/stage.
    Overview,
    /// One stage page; `carline` and `stage` are slugs.
    Stage { carline: String, stage: String },
}

impl ViewScope {
    /// Whether a change notification for `key` should touch this view's
    /// projection. Irrelevant keys are ignored without a fetch.
    #[must_use]
    pub fn is_relevant(&self, key: &str) -> bool {
        let Some((prefix, _)) = split_prefix(key) else {
            return false;
        };
        match self {
            ViewScope::Overview => matches!(
                prefix,
                KeyPrefix::IntegratorName | KeyPrefix::SwReleaseName | KeyPrefix::StageProgress
            ),
            ViewScope::Stage { carline, stage } => {
                key == stage_item_checked_key(carline, stage)
                    || key == stage_progress_key(carline, stage)
            }
        }
    }
}

/// Last-known values for the keys in scope. Per key the lifecycle is
/// Unloaded → Loaded(v) → Loaded(v') …; a delete returns the key to
/// Unloaded rather than conflating it with an empty string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Projection {
    entries: HashMap<String, String>,
}

impl Projection {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overwrites (or, for `None`, removes) the local entry.
    pub fn apply(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.entries.insert(key.to_owned(), value.to_owned());
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &HashMap<String, String> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::{Projection, ViewScope};

    #[test]
    fn overview_scope_matches_name_and_progress_keys() {
        let scope = ViewScope::Overview;
        assert!(scope.is_relevant("integratorName:t-line"));
        assert!(scope.is_relevant("swReleaseName:rb-line"));
        assert!(scope.is_relevant("stageProgress:t-line-stage-1"));
        assert!(!scope.is_relevant("stageItemChecked:t-line-stage-1"));
        assert!(!scope.is_relevant("history:t-line:stage-1:step-0"));
        assert!(!scope.is_relevant("foo:bar"));
    }

    #[test]
    fn stage_scope_matches_only_its_own_slugs() {
        let scope = ViewScope::Stage {
            carline: "t-line".to_owned(),
            stage: "stage-1".to_owned(),
        };
        assert!(scope.is_relevant("stageItemChecked:t-line-stage-1"));
        assert!(scope.is_relevant("stageProgress:t-line-stage-1"));
        assert!(!scope.is_relevant("stageItemChecked:t-line-stage-2"));
        assert!(!scope.is_relevant("stageItemChecked:s-line-stage-1"));
        assert!(!scope.is_relevant("integratorName:t-line"));
    }

    #[test]
    fn apply_overwrites_and_delete_unloads() {
        let mut projection = Projection::default();
        assert_eq!(projection.get("stageProgress:t-line-stage-1"), None);

        projection.apply("stageProgress:t-line-stage-1", Some("25"));
        assert_eq!(projection.get("stageProgress:t-line-stage-1"), Some("25"));

        projection.apply("stageProgress:t-line-stage-1", Some("50"));
        assert_eq!(projection.get("stageProgress:t-line-stage-1"), Some("50"));

        projection.apply("stageProgress:t-line-stage-1", None);
        assert_eq!(projection.get("stageProgress:t-line-stage-1"), None);
        assert!(projection.is_empty());
    }

    #[test]
    fn empty_string_stays_loaded() {
        let mut projection = Projection::default();
        projection.apply("integratorName:t-line", Some(""));
        assert_eq!(projection.get("integratorName:t-line"), Some(""));
        assert_eq!(projection.len(), 1);
    }
}
