//! Primary facade for the execution core.
//!
//! All orchestration flows are accessed through this struct.

use std::sync::Arc;

use darkroom_studio::SharedDirectory;
use tokio::sync::Semaphore;
use tokio_stream::wrappers::BroadcastStream;

use crate::audit::log::{AuditLog, AuditQuery};
use crate::audit::record::AuditRecord;
use crate::bus::Bus;
use crate::config::ExecutionPreferences;
use crate::error::AgentResult;
use crate::event::{AgentEvent, SessionEscalatedPayload, SessionLifecyclePayload};
use crate::permissions::scopes::{ScopeSet, SessionMode};
use crate::planner::plan::{FailurePolicy, Plan};
use crate::planner::types::{PlanRequest, ToolSpec};
use crate::runtime::protocol::PlanReport;
use crate::runtime::registry::SessionRuntimeRegistry;
use crate::session::message::{Message, MessageRole};
use crate::session::store::{Session, SessionOwner, SessionStore};
use crate::shadow::comparator::ShadowComparator;
use crate::storage::SharedStorage;
use crate::tools::builtins::register_builtin_tools;
use crate::tools::executor::{ExecutionMode, ToolExecutor};
use crate::tools::registry::ToolRegistry;

const DEFAULT_EVENT_CAPACITY: usize = 64;

pub struct Agent {
    registry: Arc<ToolRegistry>,
    executor: Arc<ToolExecutor>,
    store: Arc<SessionStore>,
    audit: Arc<AuditLog>,
    runtimes: SessionRuntimeRegistry,
    storage: SharedStorage,
    bus: Bus,
}

impl Agent {
    /// Wire the core around an already-populated registry.
    pub fn new(
        storage: SharedStorage,
        registry: ToolRegistry,
        preferences: &ExecutionPreferences,
    ) -> Self {
        let registry = Arc::new(registry);
        let audit = Arc::new(AuditLog::new(storage.clone()));
        let store = Arc::new(SessionStore::new(storage.clone()));
        let bus = Bus::new(DEFAULT_EVENT_CAPACITY);
        let executor = Arc::new(ToolExecutor::new(
            registry.clone(),
            audit.clone(),
            Arc::new(Semaphore::new(preferences.max_concurrent_tools)),
            preferences.default_timeout_ms,
        ));
        let runtimes = SessionRuntimeRegistry::new(executor.clone(), store.clone(), bus.clone());
        Self {
            registry,
            executor,
            store,
            audit,
            runtimes,
            storage,
            bus,
        }
    }

    /// Wire the core with the builtin studio catalog over `directory`.
    pub fn with_studio(
        storage: SharedStorage,
        directory: &SharedDirectory,
        preferences: &ExecutionPreferences,
    ) -> AgentResult<Self> {
        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry, directory)?;
        Ok(Self::new(storage, registry, preferences))
    }

    pub async fn create_session(
        &self,
        owner: SessionOwner,
        mode: SessionMode,
        scopes: ScopeSet,
    ) -> AgentResult<Session> {
        let session = self.store.create(owner, mode, scopes).await?;
        let _ = self
            .bus
            .publish(AgentEvent::SessionCreated(SessionLifecyclePayload {
                session_id: session.id.clone(),
            }));
        Ok(session)
    }

    pub async fn session(&self, session_id: &str) -> AgentResult<Session> {
        self.store.get(session_id).await
    }

    /// Append a user turn and mark the session active.
    pub async fn post_user_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> AgentResult<Message> {
        let message = self
            .store
            .append(session_id, Message::new(session_id, MessageRole::User, content))
            .await?;
        self.store.touch(session_id).await?;
        Ok(message)
    }

    /// Run a plan on the session's runtime. Plans submitted while one is
    /// in flight queue behind it; sessions never interleave their own
    /// steps.
    pub async fn execute_plan(
        &self,
        session_id: &str,
        plan: Plan,
        policy: FailurePolicy,
        mode: ExecutionMode,
    ) -> AgentResult<PlanReport> {
        let session = self.store.get(session_id).await?;
        let handle = self.runtimes.get_or_create(&session.id).await;
        handle.run_plan(plan, policy, mode).await
    }

    pub async fn transcript(&self, session_id: &str) -> AgentResult<Vec<Message>> {
        self.store.transcript(session_id).await
    }

    pub async fn audit_trail(
        &self,
        session_id: &str,
        filter: &AuditQuery,
    ) -> AgentResult<Vec<AuditRecord>> {
        let session = self.store.get(session_id).await?;
        self.audit.query(&session.id, filter).await
    }

    pub async fn escalate_session(
        &self,
        session_id: &str,
        new_scopes: ScopeSet,
    ) -> AgentResult<Session> {
        let session = self.store.escalate(session_id, new_scopes).await?;
        let _ = self
            .bus
            .publish(AgentEvent::SessionEscalated(SessionEscalatedPayload {
                session_id: session.id.clone(),
                scopes: session.scopes.clone(),
            }));
        Ok(session)
    }

    /// Cancel the session's pending work. A step already executing is
    /// left to finish so its audit record lands; everything queued
    /// behind it is dropped.
    pub async fn abort_session(&self, session_id: &str) -> AgentResult<()> {
        let session = self.store.get(session_id).await?;
        let handle = self.runtimes.get_or_create(&session.id).await;
        handle.abort().await?;
        let _ = self
            .bus
            .publish(AgentEvent::SessionAborted(SessionLifecyclePayload {
                session_id: session.id,
            }));
        Ok(())
    }

    /// Typed event stream over everything the core announces.
    pub fn subscribe(&self) -> BroadcastStream<AgentEvent> {
        BroadcastStream::new(self.bus.subscribe())
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Planner-facing view of the catalog.
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.registry
            .list()
            .filter_map(|name| self.registry.find(name))
            .map(ToolSpec::from)
            .collect()
    }

    pub fn plan_request(&self, goal: &str) -> PlanRequest {
        PlanRequest {
            goal: goal.to_string(),
            tools: self.tool_specs(),
        }
    }

    /// Comparison harness sharing this core's executor, sessions, and
    /// audit trail.
    pub fn shadow_comparator(&self) -> ShadowComparator {
        ShadowComparator::new(
            self.executor.clone(),
            self.store.clone(),
            self.storage.clone(),
            self.bus.clone(),
        )
    }
}
