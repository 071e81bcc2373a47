// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: messages.rs
// Role: Control-plane messages (stats, clear, skip-waiting)
// ----------------------------------------------------------------------------

use crate::cache::CacheStorage;
use crate::lifecycle::WorkerHost;
use crate::observability::CacheStats;
use futures::future::join_all;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Optional reply port; absent means fire-and-forget.
pub type ReplyPort = oneshot::Sender<Value>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    GetCacheStats,
    ClearCache,
    SkipWaiting,
    Unknown(String),
}

impl ControlMessage {
    /// Read the `type` field. A missing or falsy `type` (null, false, 0,
    /// "") means the message is not a control message at all; any other
    /// non-string value is an unknown type.
    pub fn parse(data: &Value) -> Option<Self> {
        let ty = match data.get("type")? {
            Value::Null | Value::Bool(false) => return None,
            Value::String(s) if s.is_empty() => return None,
            Value::String(s) => s.as_str(),
            Value::Number(n) if n.as_f64() == Some(0.0) => return None,
            other => return Some(ControlMessage::Unknown(other.to_string())),
        };
        Some(match ty {
            "GET_CACHE_STATS" => ControlMessage::GetCacheStats,
            "CLEAR_CACHE" => ControlMessage::ClearCache,
            "SKIP_WAITING" => ControlMessage::SkipWaiting,
            other => ControlMessage::Unknown(other.to_string()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    Ignored,
    StatsSent,
    Cleared { deleted: usize },
    SkippedWaiting,
}

pub async fn handle(
    msg: ControlMessage,
    reply: Option<ReplyPort>,
    storage: &dyn CacheStorage,
    host: &dyn WorkerHost,
    monitoring_enabled: bool,
) -> MessageOutcome {
    match msg {
        ControlMessage::GetCacheStats => {
            if !monitoring_enabled {
                debug!("cache stats requested while monitoring is disabled");
                return MessageOutcome::Ignored;
            }
            let body = match CacheStats::collect(storage).await {
                Ok(stats) => serde_json::to_value(&stats).unwrap_or(Value::Null),
                Err(e) => {
                    error!(error = %e, "collecting cache stats failed");
                    Value::Null
                }
            };
            match reply {
                Some(port) => {
                    if port.send(body).is_err() {
                        warn!("stats reply port closed before delivery");
                    }
                    MessageOutcome::StatsSent
                }
                None => MessageOutcome::Ignored,
            }
        }
        ControlMessage::ClearCache => {
            let names = match storage.keys().await {
                Ok(n) => n,
                Err(e) => {
                    error!(error = %e, "clear cache: cannot list buckets");
                    return MessageOutcome::Cleared { deleted: 0 };
                }
            };
            let results = join_all(names.iter().map(|n| storage.delete(n))).await;
            let mut deleted = 0;
            for (name, res) in names.iter().zip(results) {
                match res {
                    Ok(_) => deleted += 1,
                    Err(e) => warn!(bucket = %name, error = %e, "clear cache: deletion failed"),
                }
            }
            info!(deleted, "all caches cleared");
            MessageOutcome::Cleared { deleted }
        }
        ControlMessage::SkipWaiting => {
            host.skip_waiting().await;
            MessageOutcome::SkippedWaiting
        }
        ControlMessage::Unknown(ty) => {
            info!(message_type = %ty, "unknown control message type");
            MessageOutcome::Ignored
        }
    }
}
