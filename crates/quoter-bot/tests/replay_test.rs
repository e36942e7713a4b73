//! Journal replay integration tests.
//!
//! Runs the application end to end over small journals written to the
//! temp directory and checks the emitted order actions.

use std::path::PathBuf;

use quoter_bot::{AppConfig, AppError, Application};
use quoter_core::{OrderAction, Price, Side, Volume};

const BOOK_AT_START: &str = r#"{"at_ms":0,"event":{"type":"order_book_update","instrument":"future","sequence_number":1,"ask_prices":[10000,10100,0,0,0],"ask_volumes":[20,5,0,0,0],"bid_prices":[9900,9800,0,0,0],"bid_volumes":[20,5,0,0,0]}}"#;
const HEDGE_BOOK: &str = r#"{"at_ms":1000,"event":{"type":"order_book_update","instrument":"etf","sequence_number":1,"ask_prices":[10050,0,0,0,0],"ask_volumes":[50,0,0,0,0],"bid_prices":[9950,0,0,0,0],"bid_volumes":[50,0,0,0,0]}}"#;
const BID_FILL: &str = r#"{"at_ms":2000,"event":{"type":"order_filled","order_id":2,"price":9900,"volume":25}}"#;
const BOOK_AFTER_WINDOW: &str = r#"{"at_ms":60000,"event":{"type":"order_book_update","instrument":"future","sequence_number":2,"ask_prices":[10000,0,0,0,0],"ask_volumes":[20,0,0,0,0],"bid_prices":[9900,0,0,0,0],"bid_volumes":[20,0,0,0,0]}}"#;
const HEDGE_FILL: &str = r#"{"at_ms":60100,"event":{"type":"hedge_filled","order_id":3,"price":9950,"volume":15}}"#;
const DISCONNECT: &str = r#"{"at_ms":61000,"event":{"type":"disconnect"}}"#;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("quoter-replay-{}-{name}", std::process::id()))
}

fn config_for(name: &str, lines: &[&str]) -> AppConfig {
    let events = temp_path(&format!("{name}-events.jsonl"));
    std::fs::write(&events, lines.join("\n")).unwrap();

    let mut config = AppConfig::default();
    config.replay.events_path = events.to_string_lossy().into_owned();
    config.replay.actions_path = temp_path(&format!("{name}-actions.jsonl"))
        .to_string_lossy()
        .into_owned();
    config
}

fn read_actions(config: &AppConfig) -> Vec<OrderAction> {
    std::fs::read_to_string(&config.replay.actions_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_replay_quotes_and_hedges() {
    let mut config = config_for(
        "full",
        &[
            BOOK_AT_START,
            HEDGE_BOOK,
            BID_FILL,
            "",
            BOOK_AFTER_WINDOW,
            HEDGE_FILL,
            DISCONNECT,
        ],
    );
    let metrics_path = temp_path("full-metrics.prom");
    config.telemetry.metrics_path = Some(metrics_path.to_string_lossy().into_owned());

    let mut app = Application::new(config.clone()).unwrap();
    let summary = app.run().await.unwrap();

    assert_eq!(summary.events, 6);
    assert_eq!(summary.actions, 3);
    assert!(!summary.interrupted);
    assert_eq!(summary.snapshot.net_position, 25);
    assert_eq!(summary.snapshot.hedge_position, -15);
    assert_eq!(summary.snapshot.live_hedge_orders, 0);
    assert!(!summary.snapshot.connected);

    let actions = read_actions(&config);
    assert_eq!(actions.len(), 3);
    assert!(matches!(
        actions[0],
        OrderAction::Insert {
            side: Side::Sell,
            price: Price(10_000),
            volume: Volume(10),
            ..
        }
    ));
    assert!(matches!(
        actions[1],
        OrderAction::Insert {
            side: Side::Buy,
            price: Price(9_900),
            volume: Volume(10),
            ..
        }
    ));
    assert!(matches!(
        actions[2],
        OrderAction::Hedge {
            side: Side::Sell,
            price: Price(100),
            volume: Volume(15),
            ..
        }
    ));

    let metrics = std::fs::read_to_string(&metrics_path).unwrap();
    assert!(metrics.contains("quoter_quote_inserts_total"));
    assert!(metrics.contains("quoter_hedges_total"));
}

#[tokio::test]
async fn test_malformed_line_reports_line_number() {
    let config = config_for("malformed", &[BOOK_AT_START, "{not json"]);

    let mut app = Application::new(config).unwrap();
    let err = app.run().await.unwrap_err();
    match err {
        AppError::Journal(quoter_core::CoreError::Journal { line, .. }) => assert_eq!(line, 2),
        other => panic!("Expected journal error, got {other:?}"),
    }
}

#[test]
fn test_missing_journal_is_io_error() {
    let mut config = AppConfig::default();
    config.replay.events_path = temp_path("does-not-exist.jsonl")
        .to_string_lossy()
        .into_owned();

    let mut app = Application::new(config).unwrap();
    let result = tokio_test::block_on(app.run());
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[test]
fn test_invalid_trader_config_is_rejected() {
    let mut config = AppConfig::default();
    config.trader.position_limit = 0;
    assert!(Application::new(config).is_err());
}
