use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{CandidateId, CatalogSource};
use crate::config::EngineConfig;
use crate::decisions::{Decision, DecisionLog, Direction, SubjectId};
use crate::error::EngineError;
use crate::kernel::event::{Event, SideEffect};
use crate::kernel::filter::{FilterCriteria, RawFilter};
use crate::kernel::reactor::Reactor;
use crate::kernel::recorder::{CommitOutcome, PersistRequest};

const CHANNEL_CAPACITY: usize = 100;
const NOTICE_CAPACITY: usize = 256;
const SETTLE_POLL: Duration = Duration::from_millis(10);

/// Result of a direct `commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitReceipt {
    Recorded(Decision),
    /// Duplicate; resolves to the decision already taken or in flight.
    AlreadyDecided(Direction),
}

/// Async shell around the reactor: runs collaborator I/O, feeds results back
/// as events and broadcasts every non-I/O side effect to subscribers.
pub struct SessionDriver {
    reactor: Reactor,
    log: Arc<dyn DecisionLog>,
    catalog: Arc<dyn CatalogSource>,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    persist_tasks: HashMap<Uuid, JoinHandle<()>>,
    notices: broadcast::Sender<SideEffect>,
}

impl SessionDriver {
    pub fn new(
        subject: SubjectId,
        config: EngineConfig,
        log: Arc<dyn DecisionLog>,
        catalog: Arc<dyn CatalogSource>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            reactor: Reactor::new(subject, config),
            log,
            catalog,
            tx,
            rx,
            persist_tasks: HashMap::new(),
            notices,
        }
    }

    /// Host-side handle for gesture, button and filter events.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    /// Stream of hints, card moves, stack changes, accepted candidates and
    /// failures. `Persist` effects are executed here and never broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<SideEffect> {
        self.notices.subscribe()
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    pub fn pending_writes(&self) -> usize {
        self.persist_tasks.len()
    }

    /// Fetches the catalog and the subject's decision history.
    pub async fn load(&mut self) -> Result<(), EngineError> {
        let subject = self.reactor.recorder.subject().clone();
        let (candidates, history) = tokio::join!(
            self.catalog.fetch_candidates(),
            self.log.list_decisions(&subject)
        );
        let candidates = candidates.map_err(|e| EngineError::Load(format!("catalog: {}", e)))?;
        let history =
            history.map_err(|e| EngineError::Load(format!("decision history: {}", e)))?;

        self.dispatch(vec![Event::CatalogLoaded(candidates), Event::HistoryLoaded(history)]);
        Ok(())
    }

    /// Validates and applies new criteria. On error nothing changes.
    pub fn set_filter(&mut self, raw: &RawFilter) -> Result<(), EngineError> {
        let criteria = FilterCriteria::from_raw(raw, &self.reactor.config.filter)?;
        self.dispatch(vec![Event::FilterChanged(criteria)]);
        Ok(())
    }

    pub fn dispatch(&mut self, events: Vec<Event>) {
        for event in &events {
            self.track_completion(event);
        }
        let effects = self.reactor.tick_step(events);
        self.execute(effects);
    }

    /// Applies whatever is queued on the channel without waiting.
    pub fn pump(&mut self) -> usize {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        let count = events.len();
        if count > 0 {
            self.dispatch(events);
        }
        count
    }

    /// Waits until every outstanding write has reported back.
    pub async fn settle(&mut self) {
        loop {
            self.pump();
            self.persist_tasks.retain(|_, task| !task.is_finished());
            if self.persist_tasks.is_empty() {
                // Finished tasks may have left their completion in the channel.
                self.pump();
                return;
            }

            let next = tokio::select! {
                event = self.rx.recv() => event,
                _ = tokio::time::sleep(SETTLE_POLL) => None,
            };
            if let Some(event) = next {
                self.dispatch(vec![event]);
            }
        }
    }

    /// Decision recorder contract: writes the decision and waits for the
    /// log. Duplicates resolve successfully without a write.
    pub async fn commit(
        &mut self,
        candidate: CandidateId,
        direction: Direction,
    ) -> Result<CommitReceipt, EngineError> {
        let (outcome, effects) = self.reactor.commit_decision(candidate, direction)?;
        self.execute(
            effects
                .into_iter()
                .filter(|e| !matches!(e, SideEffect::Persist(_)))
                .collect(),
        );

        let request = match outcome {
            CommitOutcome::Suppressed(prior) => {
                return Ok(CommitReceipt::AlreadyDecided(prior.direction()))
            }
            CommitOutcome::Issued(request) => request,
        };

        let result = self
            .log
            .record_decision(&request.subject, &request.candidate, request.direction)
            .await
            .map_err(|e| e.to_string());

        self.dispatch(vec![Event::PersistCompleted {
            request: request.clone(),
            result: result.clone(),
        }]);

        result.map(CommitReceipt::Recorded).map_err(|reason| EngineError::Persistence {
            candidate: request.candidate,
            reason,
        })
    }

    /// Event loop. Batches everything queued at wake-up into one step.
    pub async fn run(mut self) {
        info!("Session driver started");
        while let Some(event) = self.rx.recv().await {
            let mut events = vec![event];
            while let Ok(next) = self.rx.try_recv() {
                events.push(next);
            }
            self.dispatch(events);
        }
    }

    fn execute(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Persist(request) => self.spawn_persist(request),
                other => {
                    // No subscribers is fine.
                    let _ = self.notices.send(other);
                }
            }
        }
    }

    fn spawn_persist(&mut self, request: PersistRequest) {
        let log = Arc::clone(&self.log);
        let tx = self.tx.clone();
        let request_id = request.request_id;

        let task = tokio::spawn(async move {
            let result = log
                .record_decision(&request.subject, &request.candidate, request.direction)
                .await
                .map_err(|e| e.to_string());
            if let Err(reason) = &result {
                warn!("Decision write for {} failed: {}", request.candidate, reason);
            }
            let _ = tx.send(Event::PersistCompleted { request, result }).await;
        });

        self.persist_tasks.insert(request_id, task);
    }

    fn track_completion(&mut self, event: &Event) {
        if let Event::PersistCompleted { request, .. } = event {
            self.persist_tasks.remove(&request.request_id);
        }
    }
}
