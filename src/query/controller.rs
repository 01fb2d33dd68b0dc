use super::descriptor::Query;
use crate::api::{ApiError, ContentApiClient, ErrorKind};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Published state of a query. Exactly one variant holds at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState<T> {
    /// Nothing requested, or the descriptor needs no request.
    #[default]
    Idle,
    Loading,
    Success(T),
    /// The request failed. Data from earlier requests is gone, not kept alongside.
    Error(ErrorInfo),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            QueryState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            QueryState::Error(info) => Some(info),
            _ => None,
        }
    }
}

/// What a caller gets to see of a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Generation bookkeeping shared between the controller and its request tasks.
///
/// A result is committed only while holding this lock and only if its
/// generation is still the newest one and the controller is not disposed.
#[derive(Debug, Default)]
struct CommitGuard {
    generation: u64,
    disposed: bool,
}

struct Shared<T> {
    guard: Mutex<CommitGuard>,
    state: watch::Sender<QueryState<T>>,
}

impl<T: Clone + fmt::Debug> Shared<T> {
    fn new() -> Self {
        Self {
            guard: Mutex::new(CommitGuard::default()),
            state: watch::Sender::new(QueryState::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CommitGuard> {
        self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn commit(&self, generation: u64, token: &CancellationToken, result: Result<T, ApiError>) {
        let guard = self.lock();
        if guard.disposed || guard.generation != generation || token.is_cancelled() {
            tracing::debug!(
                expected = guard.generation,
                got = generation,
                disposed = guard.disposed,
                "Ignoring stale query result"
            );
            return;
        }

        match result {
            Ok(value) => {
                tracing::debug!(generation, "Query succeeded");
                self.state.send_replace(QueryState::Success(value));
            }
            Err(e) if e.is_cancelled() => {
                // Whoever cancelled owns the next transition
                tracing::debug!(generation, "Query cancelled");
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "Query failed");
                self.state.send_replace(QueryState::Error(ErrorInfo::from(&e)));
            }
        }
    }
}

/// Drives one page's query: re-issues on descriptor change, cancels what it
/// supersedes, and publishes only the newest request's outcome.
///
/// The controller is owned by the page that uses it. Dropping it (or calling
/// [`dispose`](Self::dispose)) cancels the request in flight and freezes the
/// published state.
///
/// A superseded request is cancelled through its token. A client that answers
/// anyway still reaches the commit step, where its stale generation (or the
/// disposed flag) keeps the answer from being published.
///
/// Requests run on spawned tokio tasks, so [`resolve`](Self::resolve) and
/// [`reload`](Self::reload) must be called from within a runtime.
pub struct QueryController<Q: Query> {
    client: Arc<dyn ContentApiClient>,
    shared: Arc<Shared<Q::Output>>,
    current: Option<Q>,
    in_flight: Option<CancellationToken>,
}

impl<Q: Query> QueryController<Q> {
    pub fn new(client: Arc<dyn ContentApiClient>) -> Self {
        Self {
            client,
            shared: Arc::new(Shared::new()),
            current: None,
            in_flight: None,
        }
    }

    /// Points the controller at `descriptor`.
    ///
    /// An unchanged descriptor is a no-op; use [`reload`](Self::reload) to retry.
    pub fn resolve(&mut self, descriptor: Q) {
        if self.current.as_ref() == Some(&descriptor) {
            tracing::trace!(?descriptor, "Descriptor unchanged, keeping current request");
            return;
        }
        self.current = Some(descriptor);
        self.issue();
    }

    /// Re-issues the current descriptor, e.g. after an error.
    pub fn reload(&mut self) {
        if self.current.is_some() {
            self.issue();
        }
    }

    pub fn descriptor(&self) -> Option<&Q> {
        self.current.as_ref()
    }

    pub fn state(&self) -> QueryState<Q::Output> {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Q::Output>> {
        self.shared.state.subscribe()
    }

    /// Waits until the published state is no longer `Loading`.
    ///
    /// After [`dispose`](Self::dispose) this returns the frozen state immediately.
    pub async fn settled(&self) -> QueryState<Q::Output> {
        if self.shared.lock().disposed {
            return self.state();
        }
        let mut rx = self.shared.state.subscribe();
        let settled = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    /// Cancels any request in flight. No state is published afterwards.
    pub fn dispose(&mut self) {
        {
            let mut guard = self.shared.lock();
            if guard.disposed {
                return;
            }
            guard.disposed = true;
        }
        self.cancel_in_flight();
        tracing::debug!("Query controller disposed");
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            tracing::debug!("Cancelled in-flight query");
        }
    }

    fn issue(&mut self) {
        self.cancel_in_flight();

        let Some(descriptor) = self.current.clone() else {
            return;
        };

        let generation = {
            let mut guard = self.shared.lock();
            if guard.disposed {
                tracing::debug!(?descriptor, "Ignoring request on disposed controller");
                return;
            }
            guard.generation += 1;

            if descriptor.is_idle() {
                tracing::debug!(?descriptor, "Idle descriptor, no request issued");
                self.shared.state.send_replace(QueryState::Idle);
                return;
            }

            self.shared.state.send_replace(QueryState::Loading);
            guard.generation
        };

        tracing::debug!(generation, ?descriptor, "Issuing query");

        let token = CancellationToken::new();
        let task_token = token.clone();
        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let result = descriptor.fetch(client.as_ref(), &task_token).await;
            shared.commit(generation, &task_token, result);
        });

        self.in_flight = Some(token);
    }
}

impl<Q: Query> Drop for QueryController<Q> {
    fn drop(&mut self) {
        self.dispose();
    }
}
