//! Tap round registration against a mocked scoreboard server.

use std::time::Duration;

use mockito::Matcher;
use tabletick_core::tap::{RoundStatus, TAP_TICK_MS};
use tabletick_core::{
    Event, ManualClock, RankingBoard, RemoteRankingStore, Signals, TapController, TapDuration,
    TapPhase,
};

fn finished_round(
    server: &mockito::Server,
    clock: &ManualClock,
    taps: u32,
) -> TapController<ManualClock, RemoteRankingStore> {
    let store = RemoteRankingStore::new(
        &format!("{}/rank", server.url()),
        Duration::from_secs(5),
        Duration::from_millis(10),
    )
    .unwrap();
    let mut ctl = TapController::new(
        clock.clone(),
        RankingBoard::new(store),
        Signals::silent(),
        TapDuration::Five,
    );
    ctl.start(TapDuration::Five);
    for _ in 0..3 {
        clock.advance(TAP_TICK_MS);
        ctl.poll();
    }
    for _ in 0..taps {
        ctl.tap();
    }
    clock.advance(5 * TAP_TICK_MS);
    ctl.poll();
    ctl
}

#[test]
fn failed_registration_keeps_round_for_retry() {
    let mut server = mockito::Server::new();
    let empty_board = server
        .mock("GET", "/rank")
        .match_query(Matcher::UrlEncoded("duration".into(), "5".into()))
        .with_status(200)
        .with_body("[]")
        .create();

    let clock = ManualClock::new(1_717_236_000_000);
    let mut ctl = finished_round(&server, &clock, 17);
    assert_eq!(ctl.status(), RoundStatus::Qualified);
    empty_board.remove();

    let failing = server
        .mock("POST", "/rank")
        .with_status(502)
        .expect(1)
        .create();
    let result = ctl.register("ann");
    failing.assert();
    assert!(result.is_err());
    match ctl.registration_event(&result) {
        Event::RankingRegistrationFailed { duration_secs, message } => {
            assert_eq!(duration_secs, 5);
            assert!(message.contains("try again"), "message was {message}");
        }
        other => panic!("Expected RankingRegistrationFailed, got {other:?}"),
    }
    assert_eq!(ctl.session().phase(), TapPhase::Finished);
    assert_eq!(ctl.session().tap_count(), 17);
    assert_eq!(ctl.status(), RoundStatus::Qualified);
    failing.remove();

    let accepting = server
        .mock("POST", "/rank")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "duration": 5,
            "name": "ann",
            "score": 17
        })))
        .with_status(201)
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create();
    let reloaded = server
        .mock("GET", "/rank")
        .match_query(Matcher::UrlEncoded("duration".into(), "5".into()))
        .with_status(200)
        .with_body(r#"[{"name":"ann","score":17,"date":"2024-06-01T10:00:08.000Z"}]"#)
        .create();

    let registration = ctl.register("ann").unwrap();
    accepting.assert();
    reloaded.assert();
    assert_eq!(registration.rank, Some(1));
    assert_eq!(ctl.status(), RoundStatus::Registered { rank: Some(1) });
}

#[test]
fn unreachable_board_still_finishes_round() {
    let server = mockito::Server::new();
    let clock = ManualClock::new(0);
    let ctl = finished_round(&server, &clock, 3);
    assert_eq!(ctl.session().phase(), TapPhase::Finished);
    assert_eq!(ctl.status(), RoundStatus::Qualified);
}
