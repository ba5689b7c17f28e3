//! End-to-end tests for the session engine over real stores.
//!
//! Flights are driven tick by tick against an on-disk SQLite store, then the
//! engine is rebuilt from the same file to check what survived.

use chrono::{Duration, TimeZone, Utc};
use flightfocus_core::messages::{HttpMessageSource, LocalMessageSource, MessageKind};
use flightfocus_core::storage::keys;
use flightfocus_core::{
    Coordinates, CoreError, EngineSettings, Endpoint, Event, FlightClass, ManualClock, SessionDescriptor,
    SessionEngine, SessionPhase, SessionStore, SqliteStore,
};
use mockito::Matcher;

// ============================================================================
// Helpers
// ============================================================================

fn tokyo() -> Endpoint {
    Endpoint::new("NRT", "Tokyo", Coordinates::new(35.772, 140.3929))
}

fn sydney() -> Endpoint {
    Endpoint::new("SYD", "Sydney", Coordinates::new(-33.9399, 151.1753))
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())
}

fn open(path: &std::path::Path, clock: ManualClock) -> SessionEngine<SqliteStore, ManualClock> {
    let store = SqliteStore::open_at(path).unwrap();
    SessionEngine::new(
        store,
        clock,
        Box::new(LocalMessageSource::seeded(11)),
        EngineSettings::default(),
    )
}

fn fly_to_completion<S: SessionStore>(
    engine: &mut SessionEngine<S, ManualClock>,
    descriptor: SessionDescriptor,
) -> Vec<Event> {
    engine.create_session(descriptor).unwrap();
    engine.start().unwrap();
    let mut events = Vec::new();
    while engine.phase() == Some(SessionPhase::Running) {
        engine.clock().advance(Duration::seconds(1));
        events.extend(engine.on_tick().unwrap());
    }
    events
}

// ============================================================================
// Persistence across restarts
// ============================================================================

#[test]
fn completed_flights_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flightfocus.db");
    let clock = clock();

    {
        let mut engine = open(&path, clock.clone());
        let descriptor = SessionDescriptor::from_minutes(50, tokyo(), sydney(), FlightClass::Economy, "3C");
        let events = fly_to_completion(&mut engine, descriptor);
        assert!(events.iter().any(|e| matches!(e, Event::MessageShown { .. })));
        assert!(matches!(events.last(), Some(Event::SessionCompleted { .. })));
    }

    let engine = open(&path, clock);
    assert_eq!(engine.history().len(), 1);
    let record = &engine.history()[0];
    assert_eq!(record.departure_label, "Tokyo");
    assert_eq!(record.arrival_label, "Sydney");
    assert_eq!(record.duration_minutes, 50);
    assert_eq!(record.seat, "3C");
    assert_eq!(engine.counters().total_focus_minutes, 50);
    assert_eq!(engine.counters().business_credits, 6);
}

#[test]
fn business_debit_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flightfocus.db");

    {
        let mut engine = open(&path, clock());
        for _ in 0..5 {
            engine.select_class(FlightClass::Business).unwrap();
        }
        assert!(matches!(
            engine.select_class(FlightClass::Business),
            Err(CoreError::InsufficientCredits { available: 0 })
        ));
    }

    let mut engine = open(&path, clock());
    assert_eq!(engine.counters().business_credits, 0);
    assert!(engine.select_class(FlightClass::Business).is_err());
}

#[test]
fn history_written_by_mobile_app_is_extended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flightfocus.db");
    {
        let mut store = SqliteStore::open_at(&path).unwrap();
        store
            .set(
                keys::FLIGHT_HISTORY,
                r#"[{"id":"1717200000000","departure":"Paris","arrival":"Rome","duration":30,"class":"economy","seat":"A1","completedAt":"2024-05-31T12:00:00.000Z"}]"#,
            )
            .unwrap();
        store.set(keys::TOTAL_FOCUS_TIME, "30").unwrap();
    }

    let mut engine = open(&path, clock());
    let descriptor = SessionDescriptor::from_minutes(25, tokyo(), sydney(), FlightClass::Economy, "A1");
    fly_to_completion(&mut engine, descriptor);

    let stats = engine.stats_in(&Utc);
    assert_eq!(stats.total_flights, 2);
    assert_eq!(stats.total_focus_minutes, 55);
    assert_eq!(stats.average_session_minutes, 28);
    assert_eq!(stats.longest_session_minutes, 30);
    assert_eq!(stats.current_streak_days, 2);
    assert_eq!(engine.history()[1].arrival_label, "Rome");
}

// ============================================================================
// Remote message source
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn remote_messages_reach_the_engine() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/flight-attendant-message")
        .match_query(Matcher::UrlEncoded("class".into(), "economy".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Passing over the Pacific","type":"scenery","timestamp":"2024-06-01T08:00:30Z","flightProgress":0.5}"#)
        .expect(1)
        .create_async()
        .await;

    let source = HttpMessageSource::new(&format!("{}/api/flight-attendant-message", server.url())).unwrap();
    let mut engine = SessionEngine::new(
        SqliteStore::open_memory().unwrap(),
        clock(),
        Box::new(source),
        EngineSettings::default(),
    );
    let descriptor = SessionDescriptor::new(60, tokyo(), sydney(), FlightClass::Economy, "A1");
    let events = fly_to_completion(&mut engine, descriptor);

    mock.assert_async().await;
    let shown: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::MessageShown { message } => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].kind, MessageKind::Scenery);
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_failure_shows_fallback() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/msg")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let source = HttpMessageSource::new(&format!("{}/msg", server.url())).unwrap();
    let mut engine = SessionEngine::new(
        SqliteStore::open_memory().unwrap(),
        clock(),
        Box::new(source),
        EngineSettings::default(),
    );
    let descriptor = SessionDescriptor::new(40, tokyo(), sydney(), FlightClass::Economy, "A1");
    let events = fly_to_completion(&mut engine, descriptor);

    let fallback = events.iter().find_map(|e| match e {
        Event::MessageShown { message } => Some(message),
        _ => None,
    });
    let fallback = fallback.unwrap();
    assert_eq!(fallback.message, "Keep up the great work! Stay focused!");
    assert_eq!(fallback.kind, MessageKind::Encouragement);
    assert_eq!(engine.history().len(), 1);
}
