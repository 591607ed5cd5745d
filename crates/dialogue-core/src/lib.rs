pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;
pub mod mocks;
pub mod policy;
pub mod ports;
pub mod prompts;
pub mod session;
pub mod store;

pub use classifier::ClassifierAdapter;
pub use config::PolicyConfig;
pub use error::{DialogueError, DialogueResult};
pub use executor::{Action, ActionExecutor, ActionOutcome, NotificationRequest};
pub use policy::{Decision, DialoguePolicy, RetryUpdate, SubjectUpdate};
pub use prompts::{PromptCatalog, PromptKey};
pub use session::{DialogueState, Session, Topic};
pub use store::{spawn_idle_sweeper, InMemorySessionStore};

use parking_lot::Mutex;
use ports::{ClassifierPort, NotifierPort, SessionStore, TransferPort};
use protocol::{Intent, TurnInput, TurnReply};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Headless dialogue engine: consumes one transcribed turn, returns what to
/// say and what the platform should do next.
///
/// Turns for different calls run concurrently. Turns for the same call are
/// serialised by a per-call lock so a read-modify-write on the session is
/// never interleaved.
pub struct DialogueEngine<C, N, T, S = InMemorySessionStore>
where
    C: ClassifierPort,
    N: NotifierPort,
    T: TransferPort,
    S: SessionStore,
{
    store: Arc<S>,
    classifier: ClassifierAdapter<C>,
    executor: ActionExecutor<N, T>,
    policy: DialoguePolicy,
    turn_locks: TurnLocks,
}

impl<C, N, T> DialogueEngine<C, N, T, InMemorySessionStore>
where
    C: ClassifierPort,
    N: NotifierPort,
    T: TransferPort,
{
    /// Engine backed by a fresh in-memory store.
    pub fn in_memory(config: PolicyConfig, classifier: C, notifier: N, transfer: T) -> Self {
        let store = Arc::new(InMemorySessionStore::new(config.history_capacity));
        Self::new(config, store, classifier, notifier, transfer)
    }
}

impl<C, N, T, S> DialogueEngine<C, N, T, S>
where
    C: ClassifierPort,
    N: NotifierPort,
    T: TransferPort,
    S: SessionStore,
{
    pub fn new(config: PolicyConfig, store: Arc<S>, classifier: C, notifier: N, transfer: T) -> Self {
        Self {
            store,
            classifier: ClassifierAdapter::new(classifier, config.classifier_timeout()),
            executor: ActionExecutor::new(notifier, transfer, config.action_timeout()),
            policy: DialoguePolicy::new(config),
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &PolicyConfig {
        self.policy.config()
    }

    fn render(&self, key: PromptKey) -> String {
        self.config().prompts.render(key)
    }

    /// First hit of a call, before the caller has said anything: greet and
    /// listen. Creates the session if needed; an existing one is left as is.
    pub async fn start_call(&self, call_id: &str) -> DialogueResult<TurnReply> {
        let session = {
            let turn = self.turn_lock(call_id);
            let _held = turn.lock.lock().await;
            self.store.create_if_absent(call_id).await.map_err(store_error)?
        };
        info!(call_id, state = %session.state, "call started");
        Ok(TurnReply::listen(self.render(PromptKey::Greeting)))
    }

    /// Processes one turn. Errors are infrastructure failures (the store);
    /// everything the caller can cause is recovered into a spoken prompt.
    pub async fn handle_turn(&self, input: TurnInput) -> DialogueResult<TurnReply> {
        if input.call_id.trim().is_empty() {
            return Err(DialogueError::InvalidInput("empty call id".into()));
        }
        let result = {
            let turn = self.turn_lock(&input.call_id);
            let _held = turn.lock.lock().await;
            self.run_turn(&input.call_id, &input.utterance).await
        };

        if let Err(e) = &result {
            warn!(call_id = %input.call_id, error = %e, "turn failed");
        }
        result
    }

    async fn run_turn(&self, call_id: &str, utterance: &str) -> DialogueResult<TurnReply> {
        let mut session = self.store.create_if_absent(call_id).await.map_err(store_error)?;
        if session.state.is_terminal() {
            session.reset_flow();
        }

        let text = utterance.trim();
        let usable = self.policy.is_usable(text);
        let intent = if !usable {
            debug!(call_id, error = %DialogueError::InputUnusable(text.to_string()), "skipping classification");
            Intent::Other
        } else if self.policy.is_end_call(text) {
            Intent::EndCall
        } else if session.state.captures_free_text() {
            // Captured verbatim as data; the label only feeds diagnostics.
            Intent::Other
        } else {
            let window = self.config().context_window;
            let recent = session.history.recent(window);
            self.classifier.classify(call_id, text, &recent).await
        };

        let decision = self.policy.decide(&session, text, intent);
        let outcome = match &decision.action {
            Some(action) => Some(self.executor.execute(call_id, action).await),
            None if decision.is_terminal() => Some(self.executor.terminate(call_id)),
            None => None,
        };
        let failed = outcome.as_ref().is_some_and(ActionOutcome::is_failure);
        let prompt_key = if failed { decision.failure_prompt() } else { decision.prompt };
        let prompt = self.render(prompt_key);

        info!(
            call_id,
            from = %session.state,
            to = %decision.next_state,
            intent = %intent,
            prompt = ?prompt_key,
            turn = session.turns + 1,
            "turn decided"
        );

        let previous = session.state;
        apply(&mut session, &decision, text, usable, intent);

        if decision.is_terminal() {
            self.store.delete(call_id).await.map_err(store_error)?;
            debug!(call_id, from = %previous, turns = session.turns, "session closed");
        } else {
            self.store.put(session).await.map_err(store_error)?;
        }

        Ok(match outcome {
            Some(ActionOutcome::TransferRequested { destination }) => TurnReply::transfer(prompt, destination),
            _ if decision.is_terminal() => TurnReply::end(prompt),
            _ => TurnReply::listen(prompt),
        })
    }

    fn turn_lock(&self, call_id: &str) -> TurnLock<'_> {
        let lock = self.turn_locks.lock().entry(call_id.to_string()).or_default().clone();
        TurnLock { locks: &self.turn_locks, call_id: call_id.to_string(), lock }
    }
}

type TurnLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// A reference to one call's turn lock. Dropping it, including when the turn
/// future is cancelled mid-await, removes the map entry once no other turn for
/// the call holds or awaits it.
struct TurnLock<'a> {
    locks: &'a TurnLocks,
    call_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for TurnLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        // One reference in the map, one here.
        if Arc::strong_count(&self.lock) <= 2 {
            locks.remove(&self.call_id);
        }
    }
}

/// Commits a decision to the session. Runs after the action resolved.
fn apply(session: &mut Session, decision: &Decision, text: &str, usable: bool, intent: Intent) {
    if usable {
        session.history.push(text);
        session.last_intent = Some(intent);
    }
    match decision.retry {
        RetryUpdate::Increment => session.retry_count = session.retry_count.saturating_add(1),
        RetryUpdate::Reset => session.retry_count = 0,
    }
    match &decision.subject {
        SubjectUpdate::Keep => {}
        SubjectUpdate::Set(subject) => session.set_pending_subject(subject.clone()),
        SubjectUpdate::Clear => session.clear_pending_subject(),
    }
    session.state = decision.next_state;
    session.turns += 1;
    session.touch();
}

fn store_error(e: anyhow::Error) -> DialogueError {
    DialogueError::Store(format!("{:#}", e))
}
