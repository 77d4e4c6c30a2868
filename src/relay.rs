//! Relay orchestrator.
//!
//! One inbound event flows through a single synchronous path: normalize,
//! then per message execute the workflow and dispatch the reply. Messages
//! are independent; a failure in one pipeline never aborts its siblings.
//! There is no shared mutable state between events.

use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::ReplyDispatcher;
use crate::webhook::InboundEvent;
use crate::workflow::WorkflowExecutor;

pub struct Relay {
    executor: Arc<dyn WorkflowExecutor>,
    dispatcher: Arc<dyn ReplyDispatcher>,
}

impl Relay {
    pub fn new(executor: Arc<dyn WorkflowExecutor>, dispatcher: Arc<dyn ReplyDispatcher>) -> Self {
        Self {
            executor,
            dispatcher,
        }
    }

    /// Process one inbound webhook payload. Returns the number of messages
    /// that went through the pipeline, delivery failures included (those are
    /// logged, not retried, and never surfaced to the webhook caller).
    pub async fn handle_event(&self, payload: &Value) -> usize {
        let messages = InboundEvent::classify(payload).normalize();
        let mut processed = 0;

        for msg in messages {
            tracing::info!(
                sender = %msg.sender_id,
                origin = msg.origin.as_str(),
                text = %msg.text,
                "Processing message"
            );

            let reply = self.executor.execute(&msg.sender_id, &msg.text).await;

            if let Err(e) = self
                .dispatcher
                .deliver(&msg.sender_id, &reply, msg.origin)
                .await
            {
                tracing::error!(recipient = %msg.sender_id, error = %e, "Failed to deliver reply");
            }

            processed += 1;
        }

        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    use crate::error::DispatchError;
    use crate::webhook::Origin;

    struct EchoExecutor;

    #[async_trait]
    impl WorkflowExecutor for EchoExecutor {
        async fn execute(&self, _sender_id: &str, text: &str) -> String {
            format!("re: {text}")
        }
    }

    /// Records deliveries; fails any recipient named in `fail_for`.
    #[derive(Default)]
    struct RecordingDispatcher {
        delivered: Mutex<Vec<(String, String, Origin)>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl ReplyDispatcher for RecordingDispatcher {
        async fn deliver(
            &self,
            recipient_id: &str,
            text: &str,
            origin: Origin,
        ) -> Result<(), DispatchError> {
            if self.fail_for.as_deref() == Some(recipient_id) {
                return Err(DispatchError::SendFailed {
                    platform: origin.as_str().into(),
                    reason: "forced failure".into(),
                });
            }
            self.delivered
                .lock()
                .await
                .push((recipient_id.into(), text.into(), origin));
            Ok(())
        }
    }

    fn relay_with(dispatcher: Arc<RecordingDispatcher>) -> Relay {
        Relay::new(Arc::new(EchoExecutor), dispatcher)
    }

    #[tokio::test]
    async fn page_message_is_executed_and_dispatched() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let relay = relay_with(Arc::clone(&dispatcher));

        let payload = json!({
            "object": "page",
            "entry": [{"messaging": [{"sender": {"id": "U1"}, "message": {"text": "hi"}}]}]
        });

        let processed = relay.handle_event(&payload).await;
        assert_eq!(processed, 1);

        let delivered = dispatcher.delivered.lock().await;
        assert_eq!(
            *delivered,
            vec![("U1".to_string(), "re: hi".to_string(), Origin::Messenger)]
        );
    }

    #[tokio::test]
    async fn unrecognized_payload_is_a_noop() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let relay = relay_with(Arc::clone(&dispatcher));

        let processed = relay.handle_event(&json!({"object": "mystery"})).await;
        assert_eq!(processed, 0);
        assert!(dispatcher.delivered.lock().await.is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_does_not_abort_siblings() {
        let dispatcher = Arc::new(RecordingDispatcher {
            fail_for: Some("U1".into()),
            ..Default::default()
        });
        let relay = relay_with(Arc::clone(&dispatcher));

        let payload = json!({
            "object": "page",
            "entry": [{"messaging": [
                {"sender": {"id": "U1"}, "message": {"text": "first"}},
                {"sender": {"id": "U2"}, "message": {"text": "second"}}
            ]}]
        });

        let processed = relay.handle_event(&payload).await;
        assert_eq!(processed, 2);

        let delivered = dispatcher.delivered.lock().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "U2");
    }

    #[tokio::test]
    async fn malformed_sub_event_still_processes_sibling() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let relay = relay_with(Arc::clone(&dispatcher));

        let payload = json!({
            "object": "page",
            "entry": [{"messaging": [
                {"message": {"text": "sender missing"}},
                {"sender": {"id": "U2"}, "message": {"text": "fine"}}
            ]}]
        });

        let processed = relay.handle_event(&payload).await;
        assert_eq!(processed, 1);
        assert_eq!(dispatcher.delivered.lock().await[0].0, "U2");
    }

    #[tokio::test]
    async fn instagram_message_keeps_its_origin() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let relay = relay_with(Arc::clone(&dispatcher));

        let payload = json!({
            "object": "instagram",
            "entry": [{"changes": [
                {"field": "messages", "value": {"from": {"id": "IG1"}, "message": "hey"}}
            ]}]
        });

        relay.handle_event(&payload).await;

        let delivered = dispatcher.delivered.lock().await;
        assert_eq!(delivered[0].2, Origin::Instagram);
    }
}
