use sqlx::SqlitePool;
use tokio::sync::mpsc;

/// One successful resolve, forwarded to the analytics writer. Produced on the
/// read path, never read back by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvent {
    pub token: String,
    pub url: String,
    pub count: u32,
}

/// Fire-and-forget side channel for usage events.
///
/// `record` never blocks and never fails the caller: the event goes onto a
/// bounded channel and a background task owns the actual write. If the
/// channel is full or the writer is gone the event is dropped with a warning.
#[derive(Clone)]
pub struct AnalyticsSink {
    tx: mpsc::Sender<UsageEvent>,
}

impl AnalyticsSink {
    /// Wrap an existing sender. Used by tests to observe emitted events.
    pub fn new(tx: mpsc::Sender<UsageEvent>) -> Self {
        Self { tx }
    }

    /// Spawn the background writer task and return a sink feeding it. The
    /// task drains the channel for the life of the process, appending one
    /// row per event to `usage_events`.
    pub fn spawn_writer(pool: SqlitePool) -> Self {
        let (tx, mut rx) = mpsc::channel::<UsageEvent>(1024);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let result = sqlx::query(
                    "INSERT INTO usage_events (token, url, count) VALUES (?1, ?2, ?3)",
                )
                .bind(&event.token)
                .bind(&event.url)
                .bind(event.count)
                .execute(&pool)
                .await;

                if let Err(e) = result {
                    tracing::error!("usage event write failed for '{}': {:?}", event.token, e);
                }
            }
        });

        Self { tx }
    }

    pub fn record(&self, event: UsageEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!("usage event dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sink = AnalyticsSink::new(tx);

        sink.record(UsageEvent {
            token: "abcd1234".into(),
            url: "https://example.com/page".into(),
            count: 1,
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.token, "abcd1234");
        assert_eq!(event.count, 1);
    }

    #[tokio::test]
    async fn record_survives_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sink = AnalyticsSink::new(tx);

        // Must not panic or error back to the caller.
        sink.record(UsageEvent {
            token: "abcd1234".into(),
            url: "https://example.com/page".into(),
            count: 1,
        });
    }
}
