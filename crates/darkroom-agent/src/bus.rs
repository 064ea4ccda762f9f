use tokio::sync::broadcast;

use crate::event::AgentEvent;

#[derive(Clone)]
pub struct Bus {
    sender: broadcast::Sender<AgentEvent>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        event: AgentEvent,
    ) -> Result<usize, broadcast::error::SendError<AgentEvent>> {
        self.sender.send(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ToolExecutedPayload;
    use tokio::time::{timeout, Duration};

    fn test_event() -> AgentEvent {
        AgentEvent::ToolExecuted(ToolExecutedPayload {
            session_id: "sess-1".to_string(),
            audit_id: "audit-1".to_string(),
            tool: "clients.lookup".to_string(),
            ok: true,
            simulated: false,
            error: None,
        })
    }

    #[tokio::test]
    async fn publish_and_receive_event() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let _ = bus.publish(test_event());

        let received = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout")
            .expect("recv");
        assert!(matches!(received, AgentEvent::ToolExecuted(ref e) if e.tool == "clients.lookup"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_event() {
        let bus = Bus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let _ = bus.publish(test_event());

        let event1 = rx1.recv().await.expect("recv1");
        let event2 = rx2.recv().await.expect("recv2");

        assert!(matches!(event1, AgentEvent::ToolExecuted(ref e) if e.ok));
        assert!(matches!(event2, AgentEvent::ToolExecuted(ref e) if e.ok));
    }
}
