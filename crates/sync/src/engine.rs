use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use cloud::{RemoteAdapter, ResultRemote};
use model::{RecordKind, Records};
use store::LocalStore;
use tokio::{
    sync::{Mutex, watch},
    task::{JoinHandle, JoinSet},
    time::{Instant, MissedTickBehavior},
};

use crate::{CycleReport, DEFAULT_INTERVAL, InitialSync, ResultSync, SyncError, SyncState};

/// Sync orchestrator for a single local store.
///
/// At most one owner session is active at a time and at most one cycle
/// (initial sync, timer tick or forced push) runs at a time. A tick that
/// fires while a cycle is in flight is skipped; [`SyncEngine::force_sync_now`]
/// waits for it instead.
pub struct SyncEngine {
    inner: Arc<Inner>,
    interval: Duration,
    session: Mutex<Option<Session>>,
}

struct Inner {
    local: Arc<dyn LocalStore>,
    remote: RemoteAdapter,
    cycle: Mutex<()>,
    state: watch::Sender<SyncState>,
    /// Owner of the running session, cleared as soon as the session starts
    /// stopping.
    owner: watch::Sender<Option<String>>,
    skipped_ticks: AtomicU64,
}

struct Session {
    owner_id: String,
    initial: InitialSync,
    stop: watch::Sender<bool>,
    timer: JoinHandle<()>,
}

impl SyncEngine {
    pub fn new(local: Arc<dyn LocalStore>, remote: RemoteAdapter) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        let (owner, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                local,
                remote,
                cycle: Mutex::new(()),
                state,
                owner,
                skipped_ticks: AtomicU64::new(0),
            }),
            interval: DEFAULT_INTERVAL,
            session: Mutex::new(None),
        }
    }

    /// Period of the background push. A zero period falls back to the
    /// default.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval
        };
        self
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        *self.inner.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Owner of the running session, if any.
    #[must_use]
    pub fn owner(&self) -> Option<String> {
        self.inner.owner.borrow().clone()
    }

    /// Timer ticks dropped because another cycle held the guard.
    #[must_use]
    pub fn skipped_ticks(&self) -> u64 {
        self.inner.skipped_ticks.load(Ordering::Relaxed)
    }

    /// Start syncing for `owner_id`.
    ///
    /// Runs the initial sync and starts the background push. Calling it again
    /// for the active owner returns the outcome of that session's initial
    /// sync without touching anything. A different owner ends the current
    /// session first.
    ///
    /// Remote failures degrade to [`InitialSync::LocalOnly`]. A local store
    /// failure aborts the session and is returned.
    pub async fn start_session(&self, owner_id: &str) -> ResultSync<InitialSync> {
        let mut session = self.session.lock().await;
        if let Some(active) = session.as_ref()
            && active.owner_id == owner_id
        {
            tracing::debug!(owner = %owner_id, "sync session already active");
            return Ok(active.initial);
        }
        if let Some(previous) = session.take() {
            self.stop(previous).await;
        }

        self.inner.set_state(SyncState::InitialSyncing);
        let initial = {
            let _cycle = self.inner.cycle.lock().await;
            self.inner.initial_sync(owner_id).await
        };
        let initial = match initial {
            Ok(initial) => initial,
            Err(err) => {
                tracing::error!(owner = %owner_id, "initial sync failed: {err}");
                self.inner.set_state(SyncState::Idle);
                return Err(err);
            }
        };

        let (stop, stop_rx) = watch::channel(false);
        let timer = tokio::spawn(run_timer(
            self.inner.clone(),
            owner_id.to_string(),
            self.interval,
            stop_rx,
        ));
        *session = Some(Session {
            owner_id: owner_id.to_string(),
            initial,
            stop,
            timer,
        });
        self.inner.owner.send_replace(Some(owner_id.to_string()));
        self.inner.set_state(SyncState::Running);
        Ok(initial)
    }

    /// Stop the background push and forget the owner. A cycle in flight,
    /// timer or forced, runs to completion first. No-op without a session.
    pub async fn end_session(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            self.stop(session).await;
        }
    }

    /// Run one background cycle now, after any cycle already in flight.
    ///
    /// Remote failures are reported per kind in the [`CycleReport`]; only a
    /// local store failure is returned as an error.
    pub async fn force_sync_now(&self) -> ResultSync<CycleReport> {
        let owner_id = self.owner().ok_or(SyncError::NoSession)?;
        let _cycle = self.inner.cycle.lock().await;
        // The session may have ended or changed owner while waiting.
        if self.owner().as_deref() != Some(owner_id.as_str()) {
            return Err(SyncError::NoSession);
        }
        let report = self.inner.run_cycle(&owner_id).await?;
        log_report(&owner_id, &report);
        Ok(report)
    }

    async fn stop(&self, session: Session) {
        self.inner.owner.send_replace(None);
        self.inner.set_state(SyncState::Stopped);
        session.stop.send_replace(true);
        if let Err(err) = session.timer.await {
            tracing::error!(owner = %session.owner_id, "sync timer failed: {err}");
        }
        drop(self.inner.cycle.lock().await);
        tracing::info!(owner = %session.owner_id, "sync session ended");
        self.inner.set_state(SyncState::Idle);
    }
}

impl Inner {
    fn set_state(&self, state: SyncState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::info!(from = %previous, to = %state, "sync state changed");
        }
    }

    async fn initial_sync(&self, owner_id: &str) -> ResultSync<InitialSync> {
        let has_data = match self.remote.owner_has_any_data(owner_id).await {
            Ok(has_data) => has_data,
            Err(err) => {
                tracing::warn!(owner = %owner_id, "remote unavailable, continuing locally: {err}");
                return Ok(InitialSync::LocalOnly);
            }
        };

        let outcome = if has_data {
            self.download(owner_id).await?
        } else {
            self.upload(owner_id).await?
        };
        tracing::info!(owner = %owner_id, ?outcome, "initial sync finished");
        Ok(outcome)
    }

    /// Replace every local table with the owner's remote rows. Nothing local
    /// is touched unless every kind was fetched.
    async fn download(&self, owner_id: &str) -> ResultSync<InitialSync> {
        let mut batches = Vec::with_capacity(RecordKind::ALL.len());
        for kind in RecordKind::ALL {
            match self.remote.fetch_all(owner_id, kind).await {
                Ok(records) => batches.push(records),
                Err(err) => {
                    tracing::warn!(owner = %owner_id, %kind, "download failed, continuing locally: {err}");
                    return Ok(InitialSync::LocalOnly);
                }
            }
        }

        let mut records = 0;
        for batch in batches {
            records += batch.len();
            self.local.replace_all(batch).await?;
        }
        Ok(InitialSync::Downloaded { records })
    }

    async fn upload(&self, owner_id: &str) -> ResultSync<InitialSync> {
        let snapshot = self.local.snapshot().await?;
        let mut records = 0;
        let mut failed = false;
        for batch in snapshot.into_batches() {
            match self.remote.upsert_all(owner_id, &batch).await {
                Ok(count) => records += count,
                Err(err) => {
                    tracing::warn!(owner = %owner_id, kind = %batch.kind(), "upload failed: {err}");
                    failed = true;
                }
            }
        }
        if failed {
            return Ok(InitialSync::LocalOnly);
        }
        Ok(InitialSync::Uploaded { records })
    }

    /// Push the full local state of every kind, then delete remote rows that
    /// are gone locally. Kinds run concurrently and fail independently.
    ///
    /// The caller holds the cycle guard.
    async fn run_cycle(&self, owner_id: &str) -> ResultSync<CycleReport> {
        let snapshot = self.local.snapshot().await?;

        let mut tasks = JoinSet::new();
        for records in snapshot.into_batches() {
            let remote = self.remote.clone();
            let owner_id = owner_id.to_string();
            tasks.spawn(async move {
                let kind = records.kind();
                (kind, push_kind(&remote, &owner_id, &records).await)
            });
        }

        let mut report = CycleReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, Ok((upserted, deleted)))) => report.pushed(kind, upserted, deleted),
                Ok((kind, Err(err))) => {
                    tracing::warn!(owner = %owner_id, %kind, "push failed: {err}");
                    report.failed(kind, err.to_string());
                }
                Err(err) => tracing::error!(owner = %owner_id, "push task failed: {err}"),
            }
        }
        Ok(report)
    }
}

async fn push_kind(
    remote: &RemoteAdapter,
    owner_id: &str,
    records: &Records,
) -> ResultRemote<(usize, usize)> {
    let upserted = remote.upsert_all(owner_id, records).await?;
    let deleted = remote
        .delete_except(owner_id, records.kind(), &records.ids())
        .await?;
    Ok((upserted, deleted))
}

fn log_report(owner_id: &str, report: &CycleReport) {
    if report.is_clean() {
        tracing::debug!(
            owner = %owner_id,
            upserted = report.upserted(),
            deleted = report.deleted(),
            "sync cycle finished"
        );
    } else {
        tracing::warn!(
            owner = %owner_id,
            failed = report.failures().count(),
            "sync cycle finished with failures"
        );
    }
}

async fn run_timer(
    inner: Arc<Inner>,
    owner_id: String,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticks.tick() => {
                let Ok(_cycle) = inner.cycle.try_lock() else {
                    inner.skipped_ticks.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(owner = %owner_id, "sync cycle in flight, skipping tick");
                    continue;
                };
                if *stop.borrow() {
                    break;
                }
                match inner.run_cycle(&owner_id).await {
                    Ok(report) => log_report(&owner_id, &report),
                    Err(err) => tracing::error!(owner = %owner_id, "sync cycle failed: {err}"),
                }
            }
        }
    }
    tracing::debug!(owner = %owner_id, "sync timer stopped");
}
