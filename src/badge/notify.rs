use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

/// Payload broadcast to live dashboards after each accepted badge.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BadgeNotification {
    /// Full name, "Prenom Nom".
    pub employe: String,
    pub matricule: String,
    /// Action type string, e.g. `arrivee_matin`.
    #[serde(rename = "type")]
    pub action: String,
    /// Event time of day, "HH:MM".
    pub heure: String,
    /// Event timestamp, ISO 8601.
    pub timestamp: String,
}

/// Fan-out channel for badge events.
///
/// Delivery is at-most-once and unordered between subscribers; nobody
/// listening is not an error. Registered in app data as
/// `Option<NotifyHub>` so routes degrade cleanly when the hub is
/// disabled by configuration.
#[derive(Clone)]
pub struct NotifyHub {
    tx: broadcast::Sender<BadgeNotification>,
}

impl NotifyHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Best-effort publish. Returns the number of subscribers reached.
    pub fn publish(&self, event: BadgeNotification) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            // No active receiver; the event is dropped.
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BadgeNotification> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> BadgeNotification {
        BadgeNotification {
            employe: "Jean Dupont".into(),
            matricule: "EMP001".into(),
            action: "arrivee_matin".into(),
            heure: "08:05".into(),
            timestamp: "2025-06-02T08:05:00".into(),
        }
    }

    #[actix_web::test]
    async fn subscriber_receives_published_event() {
        let hub = NotifyHub::new(16);
        let mut rx = hub.subscribe();

        assert_eq!(hub.publish(event()), 1);

        let got = rx.recv().await.unwrap();
        assert_eq!(got.matricule, "EMP001");
        assert_eq!(got.action, "arrivee_matin");
    }

    #[actix_web::test]
    async fn publish_without_subscribers_is_dropped_silently() {
        let hub = NotifyHub::new(16);
        assert_eq!(hub.publish(event()), 0);
    }

    #[test]
    fn wire_payload_uses_type_key() {
        let json = serde_json::to_value(event()).unwrap();
        assert_eq!(json["type"], "arrivee_matin");
        assert_eq!(json["heure"], "08:05");
        assert!(json.get("action").is_none());
    }
}
