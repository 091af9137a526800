use serde::Deserialize;
use sse::PresenceRole;
use utoipa::{IntoParams, ToSchema};

/// How the caller watches an auction: `visitor` (just looking) or
/// `subscriber` (following the lot).
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WatchRole {
    #[default]
    Visitor,
    Subscriber,
}

impl From<WatchRole> for PresenceRole {
    fn from(role: WatchRole) -> Self {
        match role {
            WatchRole::Visitor => PresenceRole::Visitor,
            WatchRole::Subscriber => PresenceRole::Subscriber,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct SubscribeParams {
    #[serde(default)]
    pub(crate) role: WatchRole,
}
