use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bus::Bus;
use crate::runtime::handle::{spawn_session_runtime, SessionRuntimeHandle};
use crate::session::store::SessionStore;
use crate::tools::executor::ToolExecutor;

/// Lazily spawns one runtime actor per session and hands out handles.
/// A handle whose actor has stopped is reaped and replaced on the next
/// lookup.
#[derive(Clone)]
pub struct SessionRuntimeRegistry {
    runtimes: Arc<Mutex<HashMap<String, SessionRuntimeHandle>>>,
    executor: Arc<ToolExecutor>,
    store: Arc<SessionStore>,
    bus: Bus,
}

impl SessionRuntimeRegistry {
    pub fn new(executor: Arc<ToolExecutor>, store: Arc<SessionStore>, bus: Bus) -> Self {
        Self {
            runtimes: Arc::new(Mutex::new(HashMap::new())),
            executor,
            store,
            bus,
        }
    }

    pub async fn get_or_create(&self, session_id: &str) -> SessionRuntimeHandle {
        let mut runtimes = self.runtimes.lock().await;
        if let Some(existing) = runtimes.get(session_id) {
            if !existing.is_closed() {
                return existing.clone();
            }
            runtimes.remove(session_id);
        }

        let handle = spawn_session_runtime(
            session_id.to_string(),
            self.executor.clone(),
            self.store.clone(),
            self.bus.clone(),
        );
        runtimes.insert(session_id.to_string(), handle.clone());
        handle
    }
}
