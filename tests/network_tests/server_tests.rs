//! Tests for the TCP Server
//!
//! Spins up a real server on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use iothouse::house::{Field, House};
use iothouse::network::{Server, ShutdownHandle};
use iothouse::protocol::Assignment;
use iothouse::{Client, Config, HouseError, PollOutcome, Watcher};

// =============================================================================
// Helper Functions
// =============================================================================

const TIMEOUT: Duration = Duration::from_secs(5);

fn start_server(config: Config) -> (SocketAddr, ShutdownHandle, JoinHandle<()>, Arc<House>) {
    let house = Arc::new(House::from_config(&config));
    let server = Server::bind(config, Arc::clone(&house)).unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();

    let handle = thread::spawn(move || {
        server.run().unwrap();
    });

    (addr, shutdown, handle, house)
}

fn test_config() -> Config {
    Config::builder()
        .listen_addr("127.0.0.1:0")
        .max_connections(4)
        .build()
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_bind_rejects_invalid_config() {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .max_connections(0)
        .build();
    assert!(matches!(
        Server::bind(config, Arc::new(House::new())),
        Err(HouseError::Config(_))
    ));
}

#[test]
fn test_bind_rejects_small_frame_bound() {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .max_frame_size(10)
        .build();
    assert!(matches!(
        Server::bind(config, Arc::new(House::new())),
        Err(HouseError::Config(_))
    ));
}

#[test]
fn test_shutdown_stops_idle_server() {
    let (_addr, shutdown, handle, _) = start_server(test_config());
    shutdown.shutdown();
    assert!(shutdown.is_shutdown());
    handle.join().unwrap();
}

#[test]
fn test_shutdown_closes_open_connections() {
    let (addr, shutdown, handle, _) = start_server(
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .read_timeout_ms(0)
            .build(),
    );

    let mut client = Client::connect(addr, TIMEOUT).unwrap();
    client.get_state().unwrap();

    shutdown.shutdown();
    handle.join().unwrap();
}

// =============================================================================
// Client/Server Tests
// =============================================================================

#[test]
fn test_client_get_and_set() {
    let (addr, shutdown, handle, house) = start_server(
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .initial_temperature(70)
            .build(),
    );

    let mut client = Client::connect(addr, TIMEOUT).unwrap();
    let state = client.get_state().unwrap();
    assert_eq!(state.temperature, 70);
    assert!(!state.light_on);

    assert!(client
        .set_state(&[
            Assignment::new(Field::Light, true),
            Assignment::new(Field::Alarm, true),
        ])
        .unwrap());

    let state = client.get_state().unwrap();
    assert!(state.light_on);
    assert!(state.alarm_on);
    assert_eq!(house.snapshot(), state);

    drop(client);
    shutdown.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_clients_share_state() {
    let (addr, shutdown, handle, _) = start_server(test_config());

    let mut first = Client::connect(addr, TIMEOUT).unwrap();
    let mut second = Client::connect(addr, TIMEOUT).unwrap();

    assert!(first.set_state(&[Assignment::new(Field::Door, true)]).unwrap());
    assert!(second.get_state().unwrap().door_open);

    drop(first);
    drop(second);
    shutdown.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_concurrent_clients() {
    let (addr, shutdown, handle, house) = start_server(test_config());

    let workers: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let mut client = Client::connect(addr, TIMEOUT).unwrap();
                for _ in 0..50 {
                    let value = i % 2 == 0;
                    assert!(client
                        .set_state(&[
                            Assignment::new(Field::Door, value),
                            Assignment::new(Field::Light, value),
                        ])
                        .unwrap());
                    let state = client.get_state().unwrap();
                    assert_eq!(state.door_open, state.light_on);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    let state = house.snapshot();
    assert_eq!(state.door_open, state.light_on);

    shutdown.shutdown();
    handle.join().unwrap();
}

// =============================================================================
// Watcher Tests
// =============================================================================

fn watcher_for(addr: SocketAddr, max_missed: u32) -> Watcher {
    Watcher::new(addr.to_string(), TIMEOUT)
        .interval(Duration::from_millis(10))
        .max_missed(max_missed)
}

#[test]
fn test_watcher_reports_state_changes() {
    let (addr, shutdown, handle, house) = start_server(test_config());
    let mut watcher = watcher_for(addr, 6);

    match watcher.poll() {
        PollOutcome::Changed(state) => assert_eq!(state, house.snapshot()),
        other => panic!("Expected first state, got {:?}", other),
    }
    assert!(matches!(watcher.poll(), PollOutcome::Unchanged(_)));

    house.set_field(Field::Alarm, true);
    match watcher.poll() {
        PollOutcome::Changed(state) => assert!(state.alarm_on),
        other => panic!("Expected changed state, got {:?}", other),
    }
    assert_eq!(watcher.missed(), 0);

    drop(watcher);
    shutdown.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_watcher_counts_missed_updates_after_server_stops() {
    let (addr, shutdown, handle, house) = start_server(test_config());
    house.set_field(Field::Door, true);

    let mut watcher = watcher_for(addr, 2);
    let last_good = match watcher.poll() {
        PollOutcome::Changed(state) => state,
        other => panic!("Expected first state, got {:?}", other),
    };

    shutdown.shutdown();
    handle.join().unwrap();

    assert_eq!(watcher.poll(), PollOutcome::Missed { missed: 1, lost_contact: false });
    assert_eq!(watcher.poll(), PollOutcome::Missed { missed: 2, lost_contact: false });
    assert!(!watcher.is_lost());

    // Limit exceeded: reported once
    assert_eq!(watcher.poll(), PollOutcome::Missed { missed: 3, lost_contact: true });
    assert!(watcher.is_lost());
    assert_eq!(watcher.poll(), PollOutcome::Missed { missed: 4, lost_contact: false });

    // Last good state is kept as the fallback
    assert_eq!(watcher.last_state(), Some(last_good));
    assert!(last_good.door_open);
}

#[test]
fn test_watcher_run_polls_until_stopped() {
    let (addr, shutdown, handle, _) = start_server(test_config());
    let mut watcher = watcher_for(addr, 6);

    let mut outcomes = Vec::new();
    let mut polls = 0;
    watcher.run(
        || {
            polls += 1;
            polls > 3
        },
        |outcome| outcomes.push(*outcome),
    );

    assert!(!outcomes.is_empty());
    assert!(matches!(outcomes[0], PollOutcome::Changed(_)));
    assert!(outcomes[1..]
        .iter()
        .all(|o| matches!(o, PollOutcome::Unchanged(_))));

    drop(watcher);
    shutdown.shutdown();
    handle.join().unwrap();
}
