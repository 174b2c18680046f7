//! The durable key namespace shared by the gateway and clients.
//!
//! Every persisted value lives under one of a fixed set of key prefixes;
//! anything else is rejected at every entry point before it reaches the
//! store.

/// Prefix for the integrator name of a carline (`integratorName:<carline>`).
pub const INTEGRATOR_NAME_PREFIX: &str = "integratorName:";
/// Prefix for the software release name of a carline (`swReleaseName:<carline>`).
pub const SW_RELEASE_NAME_PREFIX: &str = "swReleaseName:";
/// Prefix for a stage's progress percentage (`stageProgress:<carline>-<stage>`).
pub const STAGE_PROGRESS_PREFIX: &str = "stageProgress:";
/// Prefix for a stage's checked-state array (`stageItemChecked:<carline>-<stage>`).
pub const STAGE_ITEM_CHECKED_PREFIX: &str = "stageItemChecked:";
/// Prefix for per-field change history logs (`history:<carline>:<stage>:step-<i>`).
pub const HISTORY_PREFIX: &str = "history:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPrefix {
    IntegratorName,
    SwReleaseName,
    StageProgress,
    StageItemChecked,
    History,
}

impl KeyPrefix {
    pub const ALL: [KeyPrefix; 5] = [
        KeyPrefix::IntegratorName,
        KeyPrefix::SwReleaseName,
        KeyPrefix::StageProgress,
        KeyPrefix::StageItemChecked,
        KeyPrefix::History,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyPrefix::IntegratorName => INTEGRATOR_NAME_PREFIX,
            KeyPrefix::SwReleaseName => SW_RELEASE_NAME_PREFIX,
            KeyPrefix::StageProgress => STAGE_PROGRESS_PREFIX,
            KeyPrefix::StageItemChecked => STAGE_ITEM_CHECKED_PREFIX,
            KeyPrefix::History => HISTORY_PREFIX,
        }
    }
}

/// True iff `key` starts with one of the recognized prefixes.
///
/// Pure; consulted by every read, write, and delete entry point on both the
/// request/response and broadcast paths.
#[must_use]
pub fn allowed(key: &str) -> bool {
    split_prefix(key).is_some()
}

/// Splits a key into its recognized prefix and the remainder after it.
/// Returns `None` for keys outside the namespace.
#[must_use]
pub fn split_prefix(key: &str) -> Option<(KeyPrefix, &str)> {
    KeyPrefix::ALL.iter().find_map(|prefix| {
        key.strip_prefix(prefix.as_str())
            .map(|rest| (*prefix, rest))
    })
}

#[must_use]
pub fn integrator_name_key(carline_slug: &str) -> String {
    format!("{INTEGRATOR_NAME_PREFIX}{carline_slug}")
}

#[must_use]
pub fn sw_release_name_key(carline_slug: &str) -> String {
    format!("{SW_RELEASE_NAME_PREFIX}{carline_slug}")
}

#[must_use]
pub fn stage_progress_key(carline_slug: &str, stage_slug: &str) -> String {
    format!("{STAGE_PROGRESS_PREFIX}{carline_slug}-{stage_slug}")
}

#[must_use]
pub fn stage_item_checked_key(carline_slug: &str, stage_slug: &str) -> String {
    format!("{STAGE_ITEM_CHECKED_PREFIX}{carline_slug}-{stage_slug}")
}

/// History log key for one checklist step of one stage.
#[must_use]
pub fn step_history_key(carline_slug: &str, stage_slug: &str, step_index: usize) -> String {
    format!("{HISTORY_PREFIX}{carline_slug}:{stage_slug}:step-{step_index}")
}
