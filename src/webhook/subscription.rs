//! Graph change-notification subscription management.
//!
//! Transcript subscriptions expire after at most three days; startup reuses
//! a live subscription, renews one that is about to lapse, or creates a
//! fresh one.

use chrono::{Duration, Utc};
use serde_json::json;

use crate::graph::{GraphClient, Subscription};

const TRANSCRIPT_RESOURCE: &str = "/communications/onlineMeetings/getAllTranscripts";
const SUBSCRIPTION_TTL_DAYS: i64 = 3;
const RENEWAL_THRESHOLD_HOURS: i64 = 12;

impl GraphClient {
    /// Subscribe to new-transcript notifications.
    pub async fn create_transcript_subscription(
        &self,
        notification_url: &str,
        client_state: &str,
    ) -> anyhow::Result<Subscription> {
        let expiration = Utc::now() + Duration::days(SUBSCRIPTION_TTL_DAYS);
        let body = json!({
            "changeType": "created",
            "notificationUrl": notification_url,
            "resource": TRANSCRIPT_RESOURCE,
            "expirationDateTime": expiration.to_rfc3339(),
            "clientState": client_state,
        });

        let created = self.post("/subscriptions", &body).await?;
        let subscription: Subscription = serde_json::from_value(created)?;
        tracing::info!(
            expires = %subscription.expiration_date_time,
            "transcript subscription created"
        );
        Ok(subscription)
    }

    /// Push a subscription's expiry out by the full TTL.
    pub async fn renew_subscription(&self, subscription_id: &str) -> anyhow::Result<Subscription> {
        let expiration = Utc::now() + Duration::days(SUBSCRIPTION_TTL_DAYS);
        let body = json!({ "expirationDateTime": expiration.to_rfc3339() });

        let renewed = self
            .patch(&format!("/subscriptions/{}", subscription_id), &body)
            .await?;
        let subscription: Subscription = serde_json::from_value(renewed)?;
        tracing::info!(
            expires = %subscription.expiration_date_time,
            "subscription renewed"
        );
        Ok(subscription)
    }

    pub async fn delete_subscription(&self, subscription_id: &str) -> anyhow::Result<()> {
        self.delete(&format!("/subscriptions/{}", subscription_id))
            .await?;
        tracing::info!(subscription_id, "subscription deleted");
        Ok(())
    }

    pub async fn list_subscriptions(&self) -> anyhow::Result<Vec<Subscription>> {
        let result = self.get("/subscriptions").await?;
        let subscriptions = result
            .pointer("/value")
            .and_then(serde_json::Value::as_array)
            .map(|subs| {
                subs.iter()
                    .filter_map(|s| serde_json::from_value(s.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(subscriptions)
    }
}

/// Whether a subscription expires within `hours` from now.
pub fn is_expiring_soon(subscription: &Subscription, hours: i64) -> bool {
    subscription.expiration_date_time <= Utc::now() + Duration::hours(hours)
}

/// Make sure a live transcript subscription points at our webhook:
/// reuse, renew, or create as needed.
pub async fn ensure_transcript_subscription(
    client: &GraphClient,
    base_url: &str,
    client_state: &str,
) -> anyhow::Result<()> {
    let notification_url = format!("{}/webhook", base_url.trim_end_matches('/'));

    let existing = client.list_subscriptions().await?;
    match existing
        .iter()
        .find(|s| s.resource.contains("getAllTranscripts"))
    {
        Some(subscription) if is_expiring_soon(subscription, RENEWAL_THRESHOLD_HOURS) => {
            tracing::info!("renewing expiring transcript subscription");
            client.renew_subscription(&subscription.id).await?;
        }
        Some(_) => {
            tracing::info!("using existing transcript subscription");
        }
        None => {
            tracing::info!("creating new transcript subscription");
            client
                .create_transcript_subscription(&notification_url, client_state)
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription_expiring_in(hours: i64) -> Subscription {
        Subscription {
            id: "sub-1".to_string(),
            resource: TRANSCRIPT_RESOURCE.to_string(),
            change_type: "created".to_string(),
            notification_url: "https://example.com/webhook".to_string(),
            expiration_date_time: Utc::now() + Duration::hours(hours),
            client_state: "secret".to_string(),
        }
    }

    #[test]
    fn subscription_inside_threshold_is_expiring() {
        assert!(is_expiring_soon(&subscription_expiring_in(6), 12));
    }

    #[test]
    fn subscription_outside_threshold_is_not_expiring() {
        assert!(!is_expiring_soon(&subscription_expiring_in(48), 12));
    }

    #[test]
    fn already_expired_subscription_is_expiring() {
        assert!(is_expiring_soon(&subscription_expiring_in(-1), 12));
    }

    #[test]
    fn subscription_deserializes_from_graph_payload() {
        let payload = json!({
            "id": "sub-1",
            "resource": TRANSCRIPT_RESOURCE,
            "changeType": "created",
            "notificationUrl": "https://example.com/webhook",
            "expirationDateTime": "2026-09-01T00:00:00Z",
            "clientState": "secret"
        });
        let subscription: Subscription = serde_json::from_value(payload).unwrap();
        assert_eq!(subscription.id, "sub-1");
        assert_eq!(subscription.client_state, "secret");
    }
}
