//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces
//! effects; this module executes them.
//!
//! Events come from three places each frame:
//! - the session watcher (phase and profile changes)
//! - the inbox (task lifecycle, results, the authorization URL)
//! - the terminal (keys, resize)

mod handlers;
pub mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio_util::sync::CancellationToken;
use twd_core::auth::{AuthSession, InteractiveSession, SessionWatcher};
use twd_core::interrupt;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::locale::Strings;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Frame cadence while something is in flight (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Full-screen sign-in view.
///
/// Terminal state is restored on drop, panic or interrupt.
pub struct TuiRuntime<S> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    session: Arc<AuthSession<S>>,
    watcher: SessionWatcher,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl<S: InteractiveSession + 'static> TuiRuntime<S> {
    /// Enters the alternate screen and builds the runtime around `session`.
    ///
    /// `inbox` is passed in so the browser session's URL hook can share the
    /// sender.
    pub fn new(
        session: Arc<AuthSession<S>>,
        strings: &'static Strings,
        inbox: (UiEventSender, UiEventReceiver),
    ) -> Result<Self> {
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let mut state = AppState::new(strings);
        state.tui.session = session.snapshot();
        let watcher = session.subscribe();
        let (inbox_tx, inbox_rx) = inbox;

        Ok(Self {
            terminal,
            state,
            session,
            watcher,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs the event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            // An interrupt cancels a running sign-in and quits otherwise.
            if interrupt::is_interrupted() {
                interrupt::reset();
                if !self.state.tui.tasks.sign_in.is_running() {
                    self.state.tui.should_quit = true;
                    break;
                }
                let effects = update::cancel_sign_in(&self.state.tui);
                self.execute_effects(effects);
            }

            for event in self.collect_events()? {
                // Only Tick triggers a redraw, which caps the frame rate.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.state.tui.is_busy() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        if self.watcher.has_changed() {
            events.push(UiEvent::Session(self.watcher.snapshot()));
        }

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick unless there is already work to do.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval || !events.is_empty() {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::SignIn { task } => {
                let session = Arc::clone(&self.session);
                self.spawn_task(TaskKind::SignIn, task, true, move |cancel| {
                    handlers::sign_in(session, cancel)
                });
            }
            UiEffect::SignOut { task } => {
                let session = Arc::clone(&self.session);
                self.spawn_task(TaskKind::SignOut, task, false, move |_| {
                    handlers::sign_out(session)
                });
            }
            UiEffect::CancelTask { token } => {
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(e) = open::that(&url) {
                    tracing::warn!(error = %e, "Failed to open {url}");
                }
            }
        }
    }
}

impl<S> Drop for TuiRuntime<S> {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
