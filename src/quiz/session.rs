//! Session: the one aggregate that owns a quiz run.
//!
//! Profile, result cache, current step and the active gate lease all live
//! here and are only touched from the session's own control flow. Gate
//! completions arrive as `SessionEvent`s on an unbounded FIFO channel and
//! are applied by `handle_event`; an event whose lease is no longer the
//! active one is dropped.

use std::future::Ready;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::error::GenerationError;
use crate::oracle::{ReadingOracle, chart_with_fallback, palm_with_fallback};

use super::gate::{Lease, TaskGate, spawn_gated};
use super::model::{Goal, Profile, ProfileUpdate};
use super::reading::{ChartReading, PalmReading, ResultCache};
use super::screen::{Affordance, Field, ScreenView, resolve};
use super::step::{self, Step};

/// A request from the front end. Each maps onto one screen affordance and
/// is ignored when the current screen does not offer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write a field without moving.
    Set(ProfileUpdate),
    /// Write a field and advance.
    Choose(ProfileUpdate),
    ToggleGoal(Goal),
    Continue,
    Back,
    /// Store a palm photo (data URL) and advance.
    UploadPalm(String),
    StartOver,
}

/// What a gate run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Chart(Option<ChartReading>),
    Palm(Option<PalmReading>),
    /// Delay-only screen finished.
    Paced,
}

/// Completion of a gate run, posted back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    lease_id: u64,
    outcome: GateOutcome,
}

impl SessionEvent {
    pub fn lease_id(&self) -> u64 {
        self.lease_id
    }

    pub fn outcome(&self) -> &GateOutcome {
        &self.outcome
    }
}

type NoTask = Ready<Result<(), GenerationError>>;

pub struct Session {
    id: Uuid,
    config: QuizConfig,
    oracle: Arc<dyn ReadingOracle>,
    profile: Profile,
    results: ResultCache,
    step: Step,
    lease_counter: u64,
    active_lease: Option<Lease>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Session {
    pub fn new(config: QuizConfig, oracle: Arc<dyn ReadingOracle>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        info!(session = %id, "Quiz session started");
        Self {
            id,
            config,
            oracle,
            profile: Profile::default(),
            results: ResultCache::new(),
            step: Step::Landing,
            lease_counter: 0,
            active_lease: None,
            events_tx,
            events_rx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn results(&self) -> &ResultCache {
        &self.results
    }

    /// Whether a processing screen is waiting on its gate.
    pub fn gate_in_flight(&self) -> bool {
        self.active_lease.is_some()
    }

    /// The screen for the current step.
    pub fn view(&self) -> ScreenView<'_> {
        resolve(self.step, &self.profile, &self.results)
    }

    /// Apply a front-end action. Returns `false` when the current screen
    /// does not offer it.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let Some(required) = required_affordance(&action) else {
            debug!(?action, "Action has no matching affordance");
            return false;
        };
        if !self.view().offers(required) {
            debug!(step = %self.step, ?action, "Action not offered on this screen");
            return false;
        }

        match action {
            Action::Set(update) => self.profile.apply(update),
            Action::Choose(update) => {
                self.profile.apply(update);
                self.advance();
            }
            Action::ToggleGoal(goal) => {
                if !self.profile.toggle_goal(goal) {
                    debug!(%goal, "Goal limit reached, selection unchanged");
                }
            }
            Action::Continue => self.advance(),
            Action::Back => self.transition(step::back(self.step)),
            Action::UploadPalm(image) => {
                self.profile.apply(ProfileUpdate::PalmImage(image));
                self.advance();
            }
            Action::StartOver => self.reset(),
        }
        true
    }

    /// Move forward if the current step's guard allows it.
    pub fn advance(&mut self) {
        let next = step::advance(self.step, &self.profile);
        if next == self.step {
            debug!(step = %self.step, "Advance blocked by step guard");
            return;
        }
        self.transition(next);
    }

    /// Back to Landing with both reading slots empty.
    pub fn reset(&mut self) {
        self.cancel_active_lease();
        self.results.clear();
        if self.config.reset_clears_profile {
            self.profile = Profile::default();
        }
        info!(
            session = %self.id,
            cleared_profile = self.config.reset_clears_profile,
            "Session reset"
        );
        self.step = step::reset();
    }

    /// Wait for the next gate completion.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply a gate completion. Returns whether it was applied; events from
    /// cancelled or superseded leases are dropped.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        let current = match &self.active_lease {
            Some(lease) if lease.id() == event.lease_id && !lease.is_cancelled() => lease.id(),
            _ => {
                debug!(lease = event.lease_id, "Dropping stale gate completion");
                return false;
            }
        };
        self.active_lease = None;

        match event.outcome {
            GateOutcome::Chart(Some(reading)) => {
                let reading = reading.with_sun_sign_from(&self.profile.birth_date);
                if self.results.store_chart(reading) {
                    info!(lease = current, "Chart reading stored");
                }
            }
            GateOutcome::Chart(None) if !self.results.has_chart() => {
                warn!(lease = current, "No chart reading, slot stays pending");
            }
            GateOutcome::Palm(Some(reading)) => {
                if self.results.store_palm(reading) {
                    info!(lease = current, "Palm reading stored");
                }
            }
            GateOutcome::Palm(None) if !self.results.has_palm() => {
                warn!(lease = current, "No palm reading, slot stays pending");
            }
            GateOutcome::Chart(None) | GateOutcome::Palm(None) | GateOutcome::Paced => {}
        }

        self.advance();
        true
    }

    /// Apply every completion already queued, without waiting.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until no gate is in flight, applying completions as they come.
    pub async fn settle(&mut self) {
        while self.gate_in_flight() {
            match self.next_event().await {
                Some(event) => {
                    self.handle_event(event);
                }
                None => break,
            }
        }
    }

    fn transition(&mut self, to: Step) {
        if to == self.step {
            return;
        }
        self.cancel_active_lease();
        info!(session = %self.id, from = %self.step, to = %to, "Step transition");
        self.step = to;
        if to.is_processing() {
            self.start_gate(to);
        }
    }

    fn cancel_active_lease(&mut self) {
        if let Some(lease) = self.active_lease.take() {
            debug!(lease = lease.id(), "Cancelling gate lease");
            lease.cancel();
        }
    }

    fn start_gate(&mut self, step: Step) {
        self.lease_counter += 1;
        let lease = Lease::new(self.lease_counter);
        let lease_id = lease.id();
        self.active_lease = Some(lease.clone());

        let timeout = self.config.generation_timeout;
        let substitute = self.config.substitute_fallback;
        let tx = self.events_tx.clone();
        let post = move |outcome: GateOutcome| {
            // The receiver lives as long as the session.
            let _ = tx.send(SessionEvent { lease_id, outcome });
        };

        match step {
            Step::ProcessingChart => {
                let gate = TaskGate::new(self.config.chart_dwell).with_timeout(timeout);
                let task = (!self.results.has_chart()).then(|| {
                    chart_with_fallback(self.oracle.clone(), self.profile.clone(), substitute)
                });
                info!(lease = lease_id, generating = task.is_some(), "Chart gate started");
                spawn_gated(gate, lease, task, move |r| post(GateOutcome::Chart(r)));
            }
            Step::ProcessingAccuracy => {
                let gate = TaskGate::new(self.config.accuracy_dwell);
                debug!(lease = lease_id, "Accuracy gate started");
                spawn_gated(gate, lease, None::<NoTask>, move |_| post(GateOutcome::Paced));
            }
            Step::ProcessingPalm => {
                let gate = TaskGate::new(self.config.palm_dwell).with_timeout(timeout);
                let image = self
                    .profile
                    .palm_image
                    .clone()
                    .filter(|img| !img.is_empty() && !self.results.has_palm());
                let task = image
                    .map(|img| palm_with_fallback(self.oracle.clone(), img, substitute));
                info!(lease = lease_id, generating = task.is_some(), "Palm gate started");
                spawn_gated(gate, lease, task, move |r| post(GateOutcome::Palm(r)));
            }
            other => {
                warn!(step = %other, "No gate for non-processing step");
                self.active_lease = None;
            }
        }
    }
}

fn required_affordance(action: &Action) -> Option<Affordance> {
    Some(match action {
        Action::Set(update) => Affordance::SetField(Field::of(update)?),
        Action::Choose(update) => Affordance::Choose(Field::of(update)?),
        Action::ToggleGoal(_) => Affordance::ToggleGoal,
        Action::Continue => Affordance::Continue { enabled: true },
        Action::Back => Affordance::Back,
        Action::UploadPalm(_) => Affordance::UploadPalm,
        Action::StartOver => Affordance::StartOver,
    })
}
