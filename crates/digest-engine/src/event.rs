use tokio::sync::broadcast;

/// User-facing engine events, broadcast so a CLI, a log sink, or a test can
/// each observe the same stream independently. Distinct from the internal
/// `tracing` diagnostics: these are the events a host application's own UI
/// or status line would want to show a person.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A feed or digest step hit a sustained run of `BackendProgress::Retry`
    /// (see `feed::RETRY_WARNING_STREAK`) — the backend isn't erroring, but
    /// isn't making progress either.
    Warning(String),
    /// The backend returned a persistent error. Non-fatal — the engine
    /// retries regardless — but worth surfacing.
    Error(String),
}

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub(crate) struct EventChannel {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventChannel {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// No subscriber is not an error: a stream with nobody watching its
    /// event feed is a normal, supported mode of operation.
    pub(crate) fn send(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }
}
