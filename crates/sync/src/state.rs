#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    /// No session, no network activity.
    #[default]
    Idle,
    InitialSyncing,
    /// Background push active.
    Running,
    /// Session ending, timer shutting down.
    Stopped,
}

impl core::fmt::Display for SyncState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::InitialSyncing => "initial-syncing",
            SyncState::Running => "running",
            SyncState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
