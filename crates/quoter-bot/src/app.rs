//! Journal replay application.
//!
//! Reads connector events from a JSON-lines journal, dispatches each one to
//! the trader at its journal time, and writes every order action the trader
//! requests as one JSON line.

use std::time::{Duration, Instant};

use quoter_core::{OrderAction, TimedEvent};
use quoter_mm::{AutoTrader, RecordingGateway, TraderSnapshot};
use quoter_telemetry::{Metrics, SessionReporter};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Outcome of one replay.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub events: u64,
    pub actions: u64,
    /// Stopped by a shutdown signal before the end of the journal.
    pub interrupted: bool,
    pub snapshot: TraderSnapshot,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    trader: AutoTrader,
    gateway: RecordingGateway,
    session_start: Instant,
    reporter: SessionReporter,
}

impl Application {
    /// Create a new application. The session clock starts here.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let session_start = Instant::now();
        let trader = AutoTrader::new(config.trader.clone(), session_start)?;
        Metrics::connected(true);

        Ok(Self {
            config,
            trader,
            gateway: RecordingGateway::new(),
            session_start,
            reporter: SessionReporter::new(),
        })
    }

    pub fn trader(&self) -> &AutoTrader {
        &self.trader
    }

    /// Replay the configured journal until it ends or Ctrl-C is pressed.
    pub async fn run(&mut self) -> AppResult<ReplaySummary> {
        let events_path = self.config.replay.events_path.clone();
        let actions_path = self.config.replay.actions_path.clone();
        info!(
            events_path = %events_path,
            actions_path = %actions_path,
            realtime = self.config.replay.realtime,
            "Starting journal replay"
        );

        let input = File::open(&events_path).await?;
        let mut lines = BufReader::new(input).lines();
        let mut output = BufWriter::new(File::create(&actions_path).await?);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut line_no = 0usize;
        let mut events = 0u64;
        let mut actions = 0u64;
        let mut interrupted = false;

        loop {
            let next = tokio::select! {
                line = lines.next_line() => line?,
                _ = &mut shutdown => {
                    warn!("Shutdown signal received, stopping replay");
                    interrupted = true;
                    break;
                }
            };
            let Some(text) = next else {
                break;
            };
            line_no += 1;
            if text.trim().is_empty() {
                continue;
            }

            let timed = TimedEvent::parse_line(&text, line_no).map_err(AppError::Journal)?;
            let at = self.session_start + Duration::from_millis(timed.at_ms);

            if self.config.replay.realtime {
                tokio::select! {
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(at)) => {}
                    _ = &mut shutdown => {
                        warn!("Shutdown signal received, stopping replay");
                        interrupted = true;
                        break;
                    }
                }
            }

            let emitted = self.dispatch(at, &timed);
            events += 1;
            for action in &emitted {
                let mut line = serde_json::to_string(action)?;
                line.push('\n');
                output.write_all(line.as_bytes()).await?;
            }
            actions += emitted.len() as u64;
        }

        output.flush().await?;
        let summary = ReplaySummary {
            events,
            actions,
            interrupted,
            snapshot: self.trader.snapshot(),
        };
        self.finish(&summary).await?;
        Ok(summary)
    }

    /// Hand one event to the trader and collect the actions it requested.
    fn dispatch(&mut self, at: Instant, timed: &TimedEvent) -> Vec<OrderAction> {
        let kind = timed.event.kind();
        let started = Instant::now();
        self.trader.handle_event(&mut self.gateway, at, &timed.event);
        let latency_us = started.elapsed().as_secs_f64() * 1_000_000.0;

        let emitted = self.gateway.take_actions();
        for action in &emitted {
            self.record_action(action);
        }
        self.record_state();
        Metrics::event_handled(kind, latency_us);
        debug!(
            at_ms = timed.at_ms,
            event = kind,
            actions = emitted.len(),
            "Event dispatched"
        );
        emitted
    }

    fn record_action(&self, action: &OrderAction) {
        match action {
            OrderAction::Insert { side, .. } => Metrics::quote_inserted(*side),
            OrderAction::Cancel { order_id } => {
                // Cancelled quotes stay in the ledger until confirmed
                if let Some(side) = self.trader.ledger().quote_side(*order_id) {
                    Metrics::quote_cancelled(side);
                }
            }
            OrderAction::Hedge { side, volume, .. } => Metrics::hedge_sent(*side, volume.lots()),
        }
    }

    fn record_state(&self) {
        let snapshot = self.trader.snapshot();
        Metrics::positions(snapshot.net_position, snapshot.hedge_position);
        Metrics::live_orders(
            snapshot.live_ask_orders,
            snapshot.live_bid_orders,
            snapshot.live_hedge_orders,
        );
        Metrics::stale_books(snapshot.stale_books_dropped);
        Metrics::connected(snapshot.connected);
    }

    async fn finish(&self, summary: &ReplaySummary) -> AppResult<()> {
        info!(
            events = summary.events,
            actions = summary.actions,
            interrupted = summary.interrupted,
            snapshot = %serde_json::to_string(&summary.snapshot)?,
            "Replay finished"
        );
        self.reporter.log_summary();

        if let Some(path) = &self.config.telemetry.metrics_path {
            tokio::fs::write(path, Metrics::render()?).await?;
            info!(path = %path, "Metrics written");
        }
        Ok(())
    }
}
