use crate::error::client::ClientError;

use models::CloseEvent;

use std::sync::Arc;

use url::Url;

pub type OpenHook = Arc<dyn Fn(&Url) + Send + Sync>;
pub type MessageHook = Arc<dyn Fn(&[u8]) + Send + Sync>;
pub type CloseHook = Arc<dyn Fn(&CloseEvent) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Single-slot lifecycle observers. Registering a hook replaces the previous one.
#[derive(Clone, Default)]
pub(crate) struct LifecycleHooks {
    pub(crate) open: Option<OpenHook>,
    pub(crate) message: Option<MessageHook>,
    pub(crate) close: Option<CloseHook>,
    pub(crate) error: Option<ErrorHook>,
}
