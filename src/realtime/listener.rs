use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::types::{ChangeEvent, RefreshEvent};
use crate::error::DashboardResult;
use crate::fetcher::{DataFetcher, QueryOptions};
use crate::registry::ModuleKey;

/// Fan-out point for row change notifications.
pub struct ChangeHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Returns how many listeners received the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Publishes a raw JSON change payload as delivered by the store's channel.
    pub fn publish_payload(&self, payload: &str) -> Result<usize, String> {
        let event = serde_json::from_str::<ChangeEvent>(payload).map_err(|e| {
            log::error!("[realtime] Failed to parse change payload: {}", e);
            format!("Invalid change payload: {}", e)
        })?;
        Ok(self.publish(event))
    }
}

/// Re-runs the module's fetch whenever one of its tables changes and pushes
/// the new result to `updates`. No diffing: every relevant notification is a
/// full re-fetch. The task ends when either channel closes.
pub fn spawn_refresh_listener(
    fetcher: DataFetcher,
    key: ModuleKey,
    options: QueryOptions,
    mut changes: broadcast::Receiver<ChangeEvent>,
    updates: mpsc::Sender<RefreshEvent>,
) -> DashboardResult<JoinHandle<()>> {
    options.validate()?;
    let descriptor = fetcher.resolve(key)?.clone();

    Ok(tokio::spawn(async move {
        log::info!("[realtime] Watching {} for {}", descriptor.primary_table, key);
        loop {
            let trigger = match changes.recv().await {
                Ok(event) if descriptor.watches(&event.table) => Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("[realtime] {} missed {} notifications, refreshing", key, missed);
                    None
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let result = match fetcher.fetch(key, &options).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("[realtime] Refresh of {} failed: {}", key, e);
                    break;
                }
            };

            if updates
                .send(RefreshEvent {
                    module: key,
                    trigger,
                    result,
                })
                .await
                .is_err()
            {
                break;
            }
        }
        log::info!("[realtime] Stopped watching {}", key);
    }))
}
