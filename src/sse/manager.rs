// ABOUTME: SSE session registry for the MCP push channel
// ABOUTME: Each session owns a bounded outbound queue; the registry forgets sessions on disconnect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use uuid::Uuid;

use crate::constants::defaults;
use crate::jsonrpc::JsonRpcResponse;

/// Why a message could not be queued on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// No session with that id
    UnknownSession,
    /// The client disconnected
    Disconnected,
    /// The queue stayed full for the whole delivery timeout
    Stalled,
}

/// Registry of live SSE sessions
#[derive(Clone)]
pub struct SseManager {
    sessions: Arc<DashMap<String, mpsc::Sender<JsonRpcResponse>>>,
    capacity: usize,
    delivery_timeout: Duration,
}

impl SseManager {
    /// Registry whose sessions buffer up to `capacity` outbound messages
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_delivery_timeout(
            capacity,
            Duration::from_secs(defaults::SSE_DELIVERY_TIMEOUT_SECS),
        )
    }

    /// Registry whose deliveries give up after `delivery_timeout` on a full queue
    #[must_use]
    pub fn with_delivery_timeout(capacity: usize, delivery_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            delivery_timeout,
        }
    }

    /// Open a session; the guard removes it when dropped with the stream
    #[must_use]
    pub fn register(&self, principal: &str) -> (SessionGuard, mpsc::Receiver<JsonRpcResponse>) {
        let session_id = Uuid::new_v4().simple().to_string();
        let (sender, receiver) = mpsc::channel(self.capacity);

        self.sessions.insert(session_id.clone(), sender); // Safe: key and guard both need the id
        tracing::info!(session_id = %session_id, principal = %principal, "Registered SSE session");

        (
            SessionGuard {
                manager: self.clone(),
                session_id,
            },
            receiver,
        )
    }

    /// Queue a response on a session, in call order
    ///
    /// # Errors
    /// `UnknownSession` if the id is not registered, `Disconnected` if the
    /// stream has gone away (the session is then removed), `Stalled` if the
    /// queue stayed full for the delivery timeout (the session stays open)
    pub async fn deliver(
        &self,
        session_id: &str,
        message: JsonRpcResponse,
    ) -> Result<(), DeliveryError> {
        let sender = self
            .sessions
            .get(session_id)
            .map(|sender| sender.value().clone())
            .ok_or(DeliveryError::UnknownSession)?;

        match sender.send_timeout(message, self.delivery_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(session_id = %session_id, "SSE client is not draining its stream");
                Err(DeliveryError::Stalled)
            }
            Err(SendTimeoutError::Closed(_)) => {
                self.unregister(session_id);
                Err(DeliveryError::Disconnected)
            }
        }
    }

    /// Whether a session is live
    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Forget a session
    pub fn unregister(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_some() {
            tracing::info!(session_id = %session_id, "Unregistered SSE session");
        }
    }

    /// Get count of active sessions
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

/// Removes its session from the registry when dropped
pub struct SessionGuard {
    manager: SseManager,
    session_id: String,
}

impl SessionGuard {
    /// Id of the guarded session
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.unregister(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_deliver_in_order_and_unregister_on_drop() {
        let manager = SseManager::new(4);
        let (guard, mut receiver) = manager.register("static");
        let id = guard.session_id().to_owned();

        for n in 0..3 {
            manager
                .deliver(&id, JsonRpcResponse::success(Some(json!(n)), json!({})))
                .await
                .unwrap();
        }
        for n in 0..3 {
            assert_eq!(receiver.recv().await.unwrap().id, Some(json!(n)));
        }

        drop(guard);
        assert!(!manager.contains(&id));
        assert_eq!(
            manager
                .deliver(&id, JsonRpcResponse::success(None, json!({})))
                .await,
            Err(DeliveryError::UnknownSession)
        );
    }

    #[tokio::test]
    async fn test_closed_receiver_reports_disconnect() {
        let manager = SseManager::new(1);
        let (guard, receiver) = manager.register("static");
        drop(receiver);
        let result = manager
            .deliver(guard.session_id(), JsonRpcResponse::success(None, json!({})))
            .await;
        assert_eq!(result, Err(DeliveryError::Disconnected));
        assert_eq!(manager.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_times_out_instead_of_blocking() {
        let manager = SseManager::with_delivery_timeout(1, Duration::from_millis(20));
        let (guard, mut receiver) = manager.register("static");
        let id = guard.session_id().to_owned();

        manager
            .deliver(&id, JsonRpcResponse::success(Some(json!(1)), json!({})))
            .await
            .unwrap();
        let stalled = manager
            .deliver(&id, JsonRpcResponse::success(Some(json!(2)), json!({})))
            .await;
        assert_eq!(stalled, Err(DeliveryError::Stalled));
        assert!(manager.contains(&id));

        assert_eq!(receiver.recv().await.unwrap().id, Some(json!(1)));
        assert!(manager
            .deliver(&id, JsonRpcResponse::success(Some(json!(3)), json!({})))
            .await
            .is_ok());
    }
}
