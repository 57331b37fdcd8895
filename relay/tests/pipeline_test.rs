//! Integration tests for cmdrelay
//!
//! These drive the fetch, dispatch and acknowledge pipeline end to end with
//! in-memory collaborators standing in for the remote API and the game host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;

use cmdrelay::config::PollConfig;
use cmdrelay::host::StaticAddress;
use cmdrelay::{
    ApiError, CommandEntry, CommandSink, CredentialStore, Dispatcher, FileCredentialStore, Handshake, Player,
    PlayerLookup, Poller, RemoteApi, TickOutcome,
};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct FakeApi {
    queue: Mutex<Vec<CommandEntry>>,
    fetch_status: Mutex<Option<u16>>,
    verify_status: Mutex<Option<u16>>,
    fetches: Mutex<usize>,
    acks: Mutex<Vec<Vec<i64>>>,
    verified: Mutex<Vec<String>>,
}

impl FakeApi {
    fn with_queue(entries: Vec<CommandEntry>) -> Self {
        let api = Self::default();
        *api.queue.lock().unwrap() = entries;
        api
    }

    fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    fn acks(&self) -> Vec<Vec<i64>> {
        self.acks.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn fetch_queue(&self) -> Result<Vec<CommandEntry>, ApiError> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(status) = *self.fetch_status.lock().unwrap() {
            return Err(ApiError::Status { status });
        }
        Ok(self.queue.lock().unwrap().clone())
    }

    async fn verify_server(&self, candidate: &str, _address: &str, _port: u16) -> Result<(), ApiError> {
        self.verified.lock().unwrap().push(candidate.to_string());
        match *self.verify_status.lock().unwrap() {
            Some(status) => Err(ApiError::Rejected {
                status,
                message: Some("Invalid server token".to_string()),
            }),
            None => Ok(()),
        }
    }

    /// Behaves like the remote queue: acknowledged ids stop being offered
    async fn acknowledge(&self, ids: &[i64]) -> Result<(), ApiError> {
        self.acks.lock().unwrap().push(ids.to_vec());
        self.queue.lock().unwrap().retain(|e| !ids.contains(&e.id));
        Ok(())
    }
}

#[derive(Default)]
struct FakeHost {
    players: Mutex<HashMap<String, bool>>,
    executed: Mutex<Vec<String>>,
}

impl FakeHost {
    fn with_player(self, id: &str, online: bool) -> Self {
        self.players.lock().unwrap().insert(id.to_string(), online);
        self
    }

    fn set_online(&self, id: &str, online: bool) {
        self.players.lock().unwrap().insert(id.to_string(), online);
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlayerLookup for FakeHost {
    async fn find_player(&self, id: &str) -> eyre::Result<Option<Player>> {
        Ok(self.players.lock().unwrap().get(id).map(|online| Player {
            id: id.to_string(),
            name: String::new(),
            connected: *online,
        }))
    }
}

#[async_trait]
impl CommandSink for FakeHost {
    async fn execute(&self, command: &str) -> eyre::Result<()> {
        self.executed.lock().unwrap().push(command.to_string());
        Ok(())
    }
}

fn entry(id: i64, steam_id: &str, must_be_online: bool, commands: &[&str]) -> CommandEntry {
    CommandEntry {
        id,
        username: format!("user{}", id),
        must_be_online,
        steam_id: steam_id.to_string(),
        commands: commands.iter().map(|c| c.to_string()).collect(),
    }
}

fn poller(api: Arc<FakeApi>, host: Arc<FakeHost>) -> Poller {
    let dispatcher = Dispatcher::new(api.clone(), host.clone(), host);
    Poller::new(api, dispatcher, PollConfig::default())
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_end_to_end_unknown_player_left_in_queue() {
    let api = Arc::new(FakeApi::with_queue(vec![
        entry(1, "76561111", false, &["say hi"]),
        entry(2, "unknown", false, &["say bye"]),
    ]));
    let host = Arc::new(FakeHost::default().with_player("76561111", false));
    let poller = poller(api.clone(), host.clone());

    let report = poller.force().await.expect("force should succeed");

    assert_eq!(report.executed, vec![1]);
    assert_eq!(host.executed(), vec!["say hi"]);
    assert_eq!(api.acks(), vec![vec![1]]);

    // Entry 2 is still pending remotely.
    let pending: Vec<i64> = api.queue.lock().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(pending, vec![2]);
}

#[tokio::test]
async fn test_acknowledged_set_matches_eligible_entries() {
    let api = Arc::new(FakeApi::with_queue(vec![
        entry(1, "on", true, &["a"]),
        entry(2, "off", true, &["b"]),
        entry(3, "off", false, &["c"]),
        entry(4, "nobody", false, &["d"]),
        entry(5, "nobody", true, &["e"]),
        entry(6, "on", false, &["f", "g"]),
    ]));
    let host = Arc::new(FakeHost::default().with_player("on", true).with_player("off", false));
    let poller = poller(api.clone(), host.clone());

    let report = poller.force().await.unwrap();

    assert_eq!(report.executed, vec![1, 3, 6]);
    assert_eq!(report.skipped_offline, 1);
    assert_eq!(report.skipped_unknown, 2);
    assert_eq!(host.executed(), vec!["a", "c", "f", "g"]);
    assert_eq!(api.acks(), vec![vec![1, 3, 6]]);
}

#[tokio::test]
async fn test_offline_entry_runs_once_player_connects() {
    let api = Arc::new(FakeApi::with_queue(vec![entry(7, "p", true, &["give p rifle 1"])]));
    let host = Arc::new(FakeHost::default().with_player("p", false));
    let poller = poller(api.clone(), host.clone());
    let start = Instant::now();

    let first = poller.tick_at(start + Duration::from_secs(60)).await;
    assert!(matches!(first, TickOutcome::Ran(Ok(ref r)) if r.executed.is_empty()));
    assert!(api.acks().is_empty());

    host.set_online("p", true);
    let second = poller.tick_at(start + Duration::from_secs(120)).await;
    assert!(matches!(second, TickOutcome::Ran(Ok(ref r)) if r.executed == vec![7]));
    assert_eq!(host.executed(), vec!["give p rifle 1"]);

    // Queue drained; a later tick finds nothing to do.
    let third = poller.tick_at(start + Duration::from_secs(180)).await;
    assert!(matches!(third, TickOutcome::Ran(Ok(ref r)) if r.executed.is_empty()));
    assert_eq!(api.fetches(), 3);
    assert_eq!(api.acks(), vec![vec![7]]);
}

#[tokio::test]
async fn test_timer_guard_and_force() {
    let api = Arc::new(FakeApi::default());
    let host = Arc::new(FakeHost::default());
    let poller = poller(api.clone(), host);
    let start = Instant::now();

    assert!(!poller.tick_at(start + Duration::from_secs(30)).await.ran());
    assert_eq!(api.fetches(), 0);

    poller.force().await.unwrap();
    assert_eq!(api.fetches(), 1);

    assert!(poller.tick_at(Instant::now() + Duration::from_secs(60)).await.ran());
    assert_eq!(api.fetches(), 2);
}

#[tokio::test]
async fn test_fetch_failure_executes_nothing() {
    let api = Arc::new(FakeApi::with_queue(vec![entry(1, "p", false, &["say hi"])]));
    *api.fetch_status.lock().unwrap() = Some(503);
    let host = Arc::new(FakeHost::default().with_player("p", true));
    let poller = poller(api.clone(), host.clone());

    let err = poller.force().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(host.executed().is_empty());
    assert!(api.acks().is_empty());
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[tokio::test]
async fn test_handshake_persists_verified_token() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("credentials.yml");
    let store = Arc::new(FileCredentialStore::open(&path).unwrap());
    let api = Arc::new(FakeApi::default());
    let handshake = Handshake::new(
        api.clone(),
        store.clone(),
        Arc::new(StaticAddress("203.0.113.7".to_string())),
        28015,
    );

    handshake.verify_and_store("ABC").await.unwrap();

    assert_eq!(store.token(), "ABC");
    assert_eq!(FileCredentialStore::open(&path).unwrap().token(), "ABC");
}

#[tokio::test]
async fn test_handshake_rejection_keeps_stored_token() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("credentials.yml");
    let store = Arc::new(FileCredentialStore::open(&path).unwrap());
    store.set_token("GOOD").unwrap();

    let api = Arc::new(FakeApi::default());
    *api.verify_status.lock().unwrap() = Some(401);
    let handshake = Handshake::new(
        api.clone(),
        store.clone(),
        Arc::new(StaticAddress("203.0.113.7".to_string())),
        28015,
    );

    let err = handshake.verify_and_store("BAD").await.unwrap_err();

    assert_eq!(err.reason(), "Invalid server token");
    assert_eq!(store.token(), "GOOD");
    assert_eq!(FileCredentialStore::open(&path).unwrap().token(), "GOOD");
    assert_eq!(*api.verified.lock().unwrap(), vec!["BAD"]);
}
