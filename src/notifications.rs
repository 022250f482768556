use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::{Notification, NotificationKind, Priority, Resident};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Random notification for `resident`, stamped now.
pub fn notify(resident: &Resident) -> Notification {
    notify_with(resident, &mut rand::thread_rng(), Utc::now())
}

pub fn notify_with<R: Rng + ?Sized>(
    resident: &Resident,
    rng: &mut R,
    timestamp: DateTime<Utc>,
) -> Notification {
    let kind = NotificationKind::ALL[rng.gen_range(0..NotificationKind::ALL.len())];
    let priority = Priority::ALL[rng.gen_range(0..Priority::ALL.len())];
    let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();

    Notification {
        id: id.to_string(),
        kind,
        message: format!("New {} for {}", kind.as_str(), resident.name),
        timestamp,
        read: false,
        priority,
    }
}

/// In-memory notification list. Newest entries sit at the front.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    notifications: Vec<Notification>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with every resident's static notifications, in catalog order.
    pub fn from_residents(residents: &[Resident]) -> Self {
        Self {
            notifications: residents
                .iter()
                .flat_map(|resident| resident.notifications.iter().cloned())
                .collect(),
        }
    }

    pub fn append(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    /// Returns true only on the unread to read transition.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
        {
            Some(notification) if !notification.read => {
                notification.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn recent(&self, limit: usize) -> &[Notification] {
        &self.notifications[..limit.min(self.notifications.len())]
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TickerConfig {
    pub period: Duration,
    /// Stop on its own after this many notifications.
    pub max_ticks: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_INTERVAL,
            max_ticks: None,
            seed: None,
        }
    }
}

/// Recurring task appending a notification for a random resident each period.
/// Dropping the ticker cancels the task.
pub struct NotificationTicker {
    handle: JoinHandle<()>,
}

impl NotificationTicker {
    pub fn spawn(
        store: Arc<RwLock<NotificationStore>>,
        residents: Vec<Resident>,
        config: TickerConfig,
    ) -> Self {
        info!(
            period_ms = config.period.as_millis() as u64,
            residents = residents.len(),
            "starting notification ticker"
        );

        let handle = tokio::spawn(async move {
            let mut rng = match config.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let mut ticker = tokio::time::interval(config.period.max(Duration::from_millis(1)));
            // The first tick completes immediately.
            ticker.tick().await;
            let mut ticks: u64 = 0;

            loop {
                if config.max_ticks.is_some_and(|max| ticks >= max) {
                    debug!(ticks, "notification ticker reached its limit");
                    break;
                }
                ticker.tick().await;
                ticks += 1;

                if residents.is_empty() {
                    warn!("no residents to notify about");
                    continue;
                }

                let resident = &residents[rng.gen_range(0..residents.len())];
                let notification = notify_with(resident, &mut rng, Utc::now());
                debug!(
                    resident_id = resident.id,
                    kind = notification.kind.as_str(),
                    "appending notification"
                );
                store.write().await.append(notification);
            }
        });

        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Waits for a ticker started with `max_ticks` to finish.
    pub async fn join(mut self) -> anyhow::Result<()> {
        (&mut self.handle).await?;
        Ok(())
    }
}

impl Drop for NotificationTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    fn catalog() -> Vec<Resident> {
        registry::all_residents().unwrap()
    }

    #[test]
    fn generated_notification_is_unread_and_names_resident() {
        let residents = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let notification = notify_with(&residents[0], &mut rng, Utc::now());

        assert!(!notification.read);
        assert_eq!(
            notification.message,
            format!("New {} for Alice Johnson", notification.kind.as_str())
        );
        assert!(uuid::Uuid::parse_str(&notification.id).is_ok());

        let other = notify(&residents[0]);
        assert_ne!(other.id, notification.id);
    }

    #[test]
    fn store_seeds_from_catalog() {
        let residents = catalog();
        let store = NotificationStore::from_residents(&residents);
        assert_eq!(store.len(), 3);
        assert_eq!(store.unread_count(), 2);
        assert_eq!(store.all()[0].id, "1");
    }

    #[test]
    fn append_puts_newest_first() {
        let residents = catalog();
        let mut store = NotificationStore::from_residents(&residents);
        let fresh = notify(&residents[5]);
        let fresh_id = fresh.id.clone();
        store.append(fresh);

        assert_eq!(store.len(), 4);
        assert_eq!(store.recent(1)[0].id, fresh_id);
        assert_eq!(store.recent(10).len(), 4);
    }

    #[test]
    fn mark_read_transitions_once() {
        let residents = catalog();
        let mut store = NotificationStore::from_residents(&residents);

        assert!(store.mark_read("1"));
        assert!(!store.mark_read("1"));
        assert!(!store.mark_read("2"));
        assert!(!store.mark_read("missing"));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn clear_empties_store() {
        let residents = catalog();
        let mut store = NotificationStore::from_residents(&residents);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
        assert!(store.recent(5).is_empty());
    }

    #[tokio::test]
    async fn ticker_appends_until_limit() {
        let residents = catalog();
        let store = Arc::new(RwLock::new(NotificationStore::from_residents(&residents)));
        let config = TickerConfig {
            period: Duration::from_millis(5),
            max_ticks: Some(3),
            seed: Some(1),
        };

        NotificationTicker::spawn(Arc::clone(&store), residents, config)
            .join()
            .await
            .unwrap();

        let store = store.read().await;
        assert_eq!(store.len(), 6);
        assert_eq!(store.unread_count(), 5);
    }

    #[tokio::test]
    async fn cancelled_ticker_stops_appending() {
        let residents = catalog();
        let store = Arc::new(RwLock::new(NotificationStore::new()));
        let config = TickerConfig {
            period: Duration::from_millis(5),
            max_ticks: None,
            seed: None,
        };

        let ticker = NotificationTicker::spawn(Arc::clone(&store), residents, config);
        tokio::time::sleep(Duration::from_millis(40)).await;
        ticker.cancel();
        let count = store.read().await.len();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.read().await.len(), count);
    }
}
