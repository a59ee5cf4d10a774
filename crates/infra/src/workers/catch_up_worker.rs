use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread;

use tracing::{debug, info, warn};

use cqrskit_events::Event;

use crate::config::WorkerConfig;
use crate::projections::{CatchUpReport, ProjectionError, StreamProjector};

/// Handle to control and join a background worker.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also stops
/// the worker after its current pass, but does not wait for it.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    ///
    /// Returns `false` if the worker thread had panicked.
    pub fn shutdown(mut self) -> bool {
        let _ = self.shutdown.send(());
        match self.join.take().map(thread::JoinHandle::join) {
            Some(Err(_)) => {
                warn!(worker = %self.name, "catch-up worker panicked");
                false
            }
            _ => true,
        }
    }
}

/// Result of one worker tick.
#[derive(Debug)]
pub enum Tick {
    Ran(CatchUpReport),
    /// Another pass held the projector; nothing was done.
    Skipped,
    Failed(ProjectionError),
}

/// Periodic catch-up on a shared projector.
///
/// - Runs `catch_up` every `interval`
/// - Skips a tick while someone else holds the projector (`try_lock`)
/// - Logs failed passes and keeps going; the next tick replays from the stored cursor
/// - Supports graceful shutdown
#[derive(Debug)]
pub struct CatchUpWorker;

impl CatchUpWorker {
    /// Spawn the worker on a thread named after `config.name`.
    pub fn spawn<E>(config: WorkerConfig, projector: Arc<Mutex<StreamProjector<E>>>) -> std::io::Result<WorkerHandle>
    where
        E: Event + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let name = config.name.clone();

        let join = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(&config, &projector, shutdown_rx))?;

        Ok(WorkerHandle {
            name,
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }

    /// Run one tick on the calling thread.
    pub fn tick<E: Event>(name: &str, projector: &Mutex<StreamProjector<E>>) -> Tick {
        let mut guard = match projector.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                debug!(worker = name, "catch-up already in progress, skipping tick");
                return Tick::Skipped;
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                // The cursor only ever records fully applied pages, so the
                // projector is still safe to drive after a handler panic.
                warn!(worker = name, "projector lock poisoned by a previous pass, recovering");
                poisoned.into_inner()
            }
        };

        match guard.catch_up() {
            Ok(report) => {
                if report.cursor_moved() {
                    debug!(
                        worker = name,
                        stream = %guard.stream(),
                        events = report.events_applied,
                        position = report.final_position,
                        "catch-up pass applied events"
                    );
                }
                Tick::Ran(report)
            }
            Err(err) => {
                warn!(worker = name, stream = %guard.stream(), error = %err, "catch-up pass failed");
                Tick::Failed(err)
            }
        }
    }
}

fn worker_loop<E: Event>(config: &WorkerConfig, projector: &Mutex<StreamProjector<E>>, shutdown_rx: mpsc::Receiver<()>) {
    let name = config.name.as_str();
    info!(worker = name, interval_ms = config.interval.as_millis() as u64, "catch-up worker started");

    loop {
        CatchUpWorker::tick(name, projector);

        match shutdown_rx.recv_timeout(config.interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(worker = name, "catch-up worker stopped");
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use serde::{Deserialize, Serialize};

    use cqrskit_core::{KindId, StreamName};
    use cqrskit_events::{EventRouter, FnEventHandler, SharedHandler};

    use super::*;
    use crate::config::ProjectorConfig;
    use crate::decoder::JsonEventDecoder;
    use crate::event_store::InMemoryEventStore;
    use crate::projections::InMemoryPositionStore;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Pinged {
        n: u32,
    }

    impl Event for Pinged {
        fn kind(&self) -> KindId {
            KindId::from_static("Pinged")
        }
    }

    fn stream() -> StreamName {
        StreamName::from_static("pings")
    }

    fn setup(seen: &Arc<Mutex<Vec<u32>>>) -> (Arc<InMemoryEventStore>, Arc<Mutex<StreamProjector<Pinged>>>) {
        let store = Arc::new(InMemoryEventStore::new());
        store.append(&stream(), &Pinged { n: 1 }).unwrap();

        let mut decoder = JsonEventDecoder::<Pinged>::new();
        decoder.register::<Pinged>(KindId::from_static("Pinged")).unwrap();

        let seen = seen.clone();
        let handler: SharedHandler<Pinged> = Arc::new(FnEventHandler::<Pinged, _>::new(
            KindId::from_static("Pinged"),
            move |e: &Pinged| {
                seen.lock().unwrap().push(e.n);
                Ok(())
            },
        ));

        let projector = StreamProjector::new(
            ProjectorConfig::new(stream()),
            store.clone(),
            Arc::new(InMemoryPositionStore::new()),
            Arc::new(decoder),
            EventRouter::new(vec![handler]).unwrap(),
        )
        .unwrap();

        (store, Arc::new(Mutex::new(projector)))
    }

    #[test]
    fn tick_skips_while_projector_is_busy() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (_store, projector) = setup(&seen);

        let held = projector.lock().unwrap();
        assert!(matches!(CatchUpWorker::tick("t", &projector), Tick::Skipped));
        drop(held);

        assert!(matches!(CatchUpWorker::tick("t", &projector), Tick::Ran(r) if r.events_applied == 1));
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn tick_reports_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (store, projector) = setup(&seen);
        store.delete_stream(&stream()).unwrap();

        assert!(matches!(
            CatchUpWorker::tick("t", &projector),
            Tick::Failed(ProjectionError::StreamUnavailable { .. })
        ));
    }

    #[test]
    fn worker_picks_up_new_events_and_stops() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (store, projector) = setup(&seen);

        let handle = CatchUpWorker::spawn(WorkerConfig::new("pings-worker", Duration::from_millis(10)), projector)
            .unwrap();
        store.append(&stream(), &Pinged { n: 2 }).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while seen.lock().unwrap().len() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.shutdown());

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn shutdown_reports_a_panicked_worker() {
        let store = Arc::new(InMemoryEventStore::new());
        store.append(&stream(), &Pinged { n: 1 }).unwrap();

        let mut decoder = JsonEventDecoder::<Pinged>::new();
        decoder.register::<Pinged>(KindId::from_static("Pinged")).unwrap();
        let handler: SharedHandler<Pinged> = Arc::new(FnEventHandler::<Pinged, _>::new(
            KindId::from_static("Pinged"),
            |_e: &Pinged| -> Result<(), cqrskit_core::HandlerError> { panic!("view exploded") },
        ));
        let projector = StreamProjector::new(
            ProjectorConfig::new(stream()),
            store,
            Arc::new(InMemoryPositionStore::new()),
            Arc::new(decoder),
            EventRouter::new(vec![handler]).unwrap(),
        )
        .unwrap();

        let handle = CatchUpWorker::spawn(
            WorkerConfig::new("doomed-worker", Duration::from_millis(10)),
            Arc::new(Mutex::new(projector)),
        )
        .unwrap();

        assert!(!handle.shutdown());
    }
}
