//! Dashboard runtime: refresh timer, input loop and the redraw lock.
//!
//! A [`DashboardController`] owns the interactive state, the last snapshot and
//! the frame sink behind one mutex. Every refresh-then-draw and every redraw
//! holds that mutex for its whole duration, so frames never interleave. The
//! periodic timer runs on its own thread and sends `Tick` through the same
//! controller as keyboard input.

#![allow(missing_docs)]

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError};
use crossterm::event;
use parking_lot::Mutex;

use super::input::map_event;
use super::model::{DashboardCmd, DashboardMsg, DashboardState};
use super::render::{Canvas, Composer, FrameInput, FrameSink, compose_frame, draw_retrieving};
use super::signals::SignalHandler;
use super::sink::CrosstermSink;
use super::terminal_guard::TerminalGuard;
use super::update::update;
use crate::collector::{Aggregator, ClusterSnapshot, GroupSet};
use crate::core::config::Config;
use crate::core::errors::{MonError, Result};
use crate::fetcher::Fetcher;
use crate::format::RenderOptions;
use crate::logger::ActivityLog;
use crate::logger::jsonl::{EventType, LogEntry, Severity};
use crate::panels::layout::Layout;
use crate::panels::registry::PanelRegistry;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Session parameters fixed at dashboard start.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Name or spec the layout was resolved from, for the activity log.
    pub layout_name: String,
    pub layout: Layout,
    pub refresh: Duration,
    /// End the session on any fetch failure instead of degrading.
    pub strict: bool,
    pub padding: bool,
    pub height_adjust: usize,
    pub slow_threshold: Duration,
    pub options: RenderOptions,
}

impl DashboardSettings {
    pub fn from_config(config: &Config, layout_name: &str, layout: Layout) -> Self {
        Self {
            layout_name: layout_name.to_string(),
            layout,
            refresh: config.dashboard.refresh_interval(),
            strict: config.dashboard.strict,
            padding: config.dashboard.padding,
            height_adjust: config.dashboard.height_adjust,
            slow_threshold: config.dashboard.slow_refresh_threshold(),
            options: RenderOptions::from_config(&config.output),
        }
    }
}

/// State guarded by the redraw lock.
struct Screen<S> {
    state: DashboardState,
    snapshot: Option<ClusterSnapshot>,
    unavailable: Option<String>,
    /// Identity time of the newest snapshot; survives unreachable refreshes.
    last_success: Option<DateTime<Local>>,
    last_frame: Option<Canvas>,
    last_warnings: Vec<String>,
    sink: S,
}

// ──────────────────── controller ────────────────────

pub struct DashboardController<F, S> {
    aggregator: Aggregator<F>,
    registry: PanelRegistry,
    settings: DashboardSettings,
    required: GroupSet,
    screen: Mutex<Screen<S>>,
    compose: Composer,
    log: ActivityLog,
}

impl<F: Fetcher, S: FrameSink> DashboardController<F, S> {
    pub fn new(
        aggregator: Aggregator<F>,
        registry: PanelRegistry,
        settings: DashboardSettings,
        sink: S,
        log: ActivityLog,
    ) -> Self {
        let required = registry.required_data_groups(&settings.layout);
        let state = DashboardState::new(
            settings.layout.panel_count(),
            settings.padding,
            settings.height_adjust,
        );
        Self {
            aggregator,
            registry,
            settings,
            required,
            screen: Mutex::new(Screen {
                state,
                snapshot: None,
                unavailable: None,
                last_success: None,
                last_frame: None,
                last_warnings: Vec::new(),
                sink,
            }),
            compose: compose_frame,
            log,
        }
    }

    /// Replace the frame composer.
    #[must_use]
    pub fn with_composer(mut self, compose: Composer) -> Self {
        self.compose = compose;
        self
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn aggregator(&self) -> &Aggregator<F> {
        &self.aggregator
    }

    /// Data groups fetched on every refresh.
    pub fn required_groups(&self) -> &GroupSet {
        &self.required
    }

    pub fn state(&self) -> DashboardState {
        self.screen.lock().state.clone()
    }

    /// Whether the last refresh produced a snapshot.
    pub fn has_snapshot(&self) -> bool {
        self.screen.lock().snapshot.is_some()
    }

    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.screen.lock().sink)
    }

    /// Apply one message and run the command it produces, all under the redraw lock.
    pub fn handle(&self, msg: DashboardMsg) -> Result<DashboardCmd> {
        let mut screen = self.screen.lock();
        let cmd = update(&mut screen.state, msg);
        match cmd {
            DashboardCmd::Refresh => self.refresh_locked(&mut screen)?,
            DashboardCmd::Redraw => self.draw_locked(&mut screen)?,
            DashboardCmd::None | DashboardCmd::Quit => {}
        }
        Ok(cmd)
    }

    /// Collect a fresh snapshot and draw it.
    pub fn refresh(&self) -> Result<()> {
        let mut screen = self.screen.lock();
        self.refresh_locked(&mut screen)
    }

    /// Draw again from the last snapshot.
    pub fn redraw(&self) -> Result<()> {
        let mut screen = self.screen.lock();
        self.draw_locked(&mut screen)
    }

    fn refresh_locked(&self, screen: &mut Screen<S>) -> Result<()> {
        if screen.state.show_retrieving {
            let mut frame = match screen.last_frame.take() {
                Some(frame) => frame,
                None => {
                    let (width, height) = screen.sink.size()?;
                    Canvas::new(width, height)
                }
            };
            draw_retrieving(&mut frame);
            screen.sink.present(&frame)?;
            screen.last_frame = Some(frame);
        }

        let started = Instant::now();
        match self.aggregator.collect(&self.required) {
            Ok((snapshot, errors)) => {
                for err in &errors {
                    self.log
                        .record(&LogEntry::new(EventType::FetchError, Severity::Warning).with_error(err));
                }
                if !errors.is_empty() && self.settings.strict {
                    return Err(MonError::partial(&errors));
                }
                let mut entry = LogEntry::new(EventType::RefreshComplete, Severity::Info);
                entry.cluster = Some(snapshot.cluster.cluster_name.clone());
                entry.duration_ms = Some(duration_ms(started.elapsed()));
                if !errors.is_empty() {
                    entry.details = Some(format!("{} group(s) failed", errors.len()));
                }
                self.log.record(&entry);
                screen.last_success = snapshot.retrieved_at.or(screen.last_success);
                screen.snapshot = Some(snapshot);
                screen.unavailable = None;
            }
            Err(err) => {
                self.log
                    .record(&LogEntry::new(EventType::FetchError, Severity::Critical).with_error(&err));
                if self.settings.strict {
                    return Err(err);
                }
                screen.snapshot = None;
                screen.unavailable = Some(err.to_string());
            }
        }
        screen
            .state
            .record_refresh(started.elapsed(), self.settings.slow_threshold);
        self.draw_locked(screen)
    }

    fn draw_locked(&self, screen: &mut Screen<S>) -> Result<()> {
        let (width, height) = screen.sink.size()?;
        let selection = &self.aggregator.options().selection;
        let input = FrameInput {
            registry: &self.registry,
            layout: &self.settings.layout,
            snapshot: screen.snapshot.as_ref(),
            unavailable: screen.unavailable.as_deref(),
            state: &screen.state,
            options: &self.settings.options,
            selection,
            last_success: screen.last_success,
            refresh: self.settings.refresh,
            width,
            height,
        };
        let frame = match panic::catch_unwind(AssertUnwindSafe(|| (self.compose)(&input))) {
            Ok(frame) => frame,
            Err(payload) => {
                let err = MonError::Rendering {
                    details: panic_message(payload.as_ref()),
                };
                self.log
                    .record(&LogEntry::new(EventType::RenderFailure, Severity::Critical).with_error(&err));
                return Err(err);
            }
        };

        if frame.warnings != screen.last_warnings {
            for warning in &frame.warnings {
                self.log.record(
                    &LogEntry::new(EventType::RefreshComplete, Severity::Warning)
                        .with_details(warning.clone()),
                );
            }
            screen.last_warnings.clone_from(&frame.warnings);
        }

        screen.sink.present(&frame.canvas)?;
        screen.last_frame = Some(frame.canvas);
        Ok(())
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic while composing frame".to_string())
}

// ──────────────────── session loop ────────────────────

/// Run an interactive dashboard on the controlling terminal until the user
/// quits, a signal arrives, or a fatal error occurs. The terminal is
/// restored on every exit path.
pub fn run_dashboard<F: Fetcher>(
    aggregator: Aggregator<F>,
    registry: PanelRegistry,
    settings: DashboardSettings,
    log: &ActivityLog,
) -> Result<()> {
    // Connection failures surface on a normal terminal.
    let cluster = aggregator.identity()?;

    let mut start = LogEntry::new(EventType::SessionStart, Severity::Info);
    start.cluster = Some(cluster.cluster_name.clone());
    start.layout = Some(settings.layout_name.clone());
    log.record(&start);

    let signals = SignalHandler::new();
    let guard = TerminalGuard::new().map_err(|e| MonError::Rendering {
        details: format!("terminal setup: {e}"),
    })?;
    log.silence_stderr();

    let controller =
        DashboardController::new(aggregator, registry, settings, CrosstermSink::new(), log.clone());
    let result = drive(&controller, &signals);
    drop(guard);

    let mut stop = LogEntry::new(EventType::SessionStop, Severity::Info);
    stop.cluster = Some(cluster.cluster_name);
    if let Err(err) = &result {
        stop = stop.with_error(err);
        stop.severity = Severity::Critical;
    }
    log.record(&stop);
    result
}

/// Initial refresh, then the timer thread and input loop until either ends the session.
pub fn drive<F: Fetcher, S: FrameSink>(
    controller: &DashboardController<F, S>,
    signals: &SignalHandler,
) -> Result<()> {
    controller.refresh()?;

    let failure: Mutex<Option<MonError>> = Mutex::new(None);
    let failure_slot = &failure;

    let outcome = thread::scope(|scope| {
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let timer = scope.spawn(move || tick_loop(controller, &stop_rx, failure_slot));
        let outcome = input_loop(controller, signals, failure_slot);
        // Disconnecting the channel wakes the timer and stops it.
        drop(stop_tx);
        if timer.join().is_err() {
            return Err(MonError::Runtime {
                details: "refresh timer thread panicked".to_string(),
            });
        }
        outcome
    });

    if let Some(err) = failure.lock().take() {
        return Err(err);
    }
    outcome
}

/// Send `Tick` every refresh interval until told to stop or a refresh fails.
pub fn tick_loop<F: Fetcher, S: FrameSink>(
    controller: &DashboardController<F, S>,
    stop: &Receiver<()>,
    failure: &Mutex<Option<MonError>>,
) {
    loop {
        match stop.recv_timeout(controller.settings().refresh) {
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = controller.handle(DashboardMsg::Tick) {
                    *failure.lock() = Some(err);
                    return;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn input_loop<F: Fetcher, S: FrameSink>(
    controller: &DashboardController<F, S>,
    signals: &SignalHandler,
    failure: &Mutex<Option<MonError>>,
) -> Result<()> {
    loop {
        if signals.should_shutdown() {
            controller.handle(DashboardMsg::Interrupt)?;
            return Ok(());
        }
        if failure.lock().is_some() {
            return Ok(());
        }
        if !event::poll(INPUT_POLL).map_err(input_error)? {
            continue;
        }
        let ev = event::read().map_err(input_error)?;
        if let Some(msg) = map_event(&ev)
            && controller.handle(msg)? == DashboardCmd::Quit
        {
            return Ok(());
        }
    }
}

fn input_error(e: std::io::Error) -> MonError {
    MonError::Rendering {
        details: format!("terminal input: {e}"),
    }
}
