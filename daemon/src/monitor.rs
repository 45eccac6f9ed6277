//! Monitoring loop: sample, account, decide, act

use crate::collector::ProcessCollector;
use crate::config::Settings;
use crate::controller::{ActionReport, ProcessController};
use crate::error::Result;
use crate::executor::ProcessExecutor;
use crate::notifier::{NotificationDispatcher, Notifier};
use crate::policy::{DecisionState, Edge, ThresholdPolicy};
use crate::sampler::{Sampler, TrafficSource};
use crate::units::format_size;
use crate::window::{RollingWindow, UsageReading};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Debug)]
pub enum TickOutcome {
    /// The traffic source failed; nothing changed.
    Skipped,
    Evaluated {
        reading: UsageReading,
        state: DecisionState,
        edge: Option<Edge>,
        report: ActionReport,
    },
}

impl TickOutcome {
    pub fn edge(&self) -> Option<&Edge> {
        match self {
            TickOutcome::Evaluated { edge, .. } => edge.as_ref(),
            TickOutcome::Skipped => None,
        }
    }

    pub fn report(&self) -> Option<&ActionReport> {
        match self {
            TickOutcome::Evaluated { report, .. } => Some(report),
            TickOutcome::Skipped => None,
        }
    }
}

pub struct Monitor<S, P> {
    sampler: Sampler<S>,
    window: RollingWindow,
    policy: ThresholdPolicy,
    controller: ProcessController<P>,
    dispatcher: NotificationDispatcher,
    state: DecisionState,
    interval: Duration,
}

impl<S, P> Monitor<S, P>
where
    S: TrafficSource,
    P: ProcessCollector + ProcessExecutor,
{
    pub fn new(source: S, host: P, notifier: Box<dyn Notifier>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            sampler: Sampler::new(source),
            window: RollingWindow::new(settings.window)?,
            policy: ThresholdPolicy::new(settings.limit, settings.approach_ratio)?,
            controller: ProcessController::new(host, settings.processes.iter().cloned()),
            dispatcher: NotificationDispatcher::new(
                notifier,
                settings.notification_cooldown,
                settings.notify_on_resume,
            ),
            state: DecisionState::Normal,
            interval: settings.sample_interval,
        })
    }

    pub fn state(&self) -> DecisionState {
        self.state
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    pub fn controller(&self) -> &ProcessController<P> {
        &self.controller
    }

    pub fn sampler(&self) -> &Sampler<S> {
        &self.sampler
    }

    /// Run one tick to completion.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(sample) = self.sampler.sample() else {
            return TickOutcome::Skipped;
        };
        let reading = self.window.ingest(sample);
        let state = self.policy.evaluate(reading.bytes);
        let edge = self.policy.transition(self.state, state, &reading);
        self.state = state;
        debug!(
            "Window usage {} ({} samples), state {}",
            format_size(reading.bytes),
            self.window.len(),
            state
        );

        self.controller.reconcile();

        let report = match &edge {
            Some(edge) => {
                info!(
                    "Usage {} of {}: {} -> {}",
                    format_size(edge.usage),
                    format_size(self.policy.limit()),
                    edge.from,
                    edge.to
                );
                let report = self.controller.apply(edge);
                self.dispatcher.dispatch(edge, &report, self.policy.limit());
                report
            }
            None => ActionReport::default(),
        };

        TickOutcome::Evaluated {
            reading,
            state,
            edge,
            report,
        }
    }

    /// Tick at the configured interval until `shutdown` completes, then
    /// resume everything still suspended. Shutdown is only observed
    /// between ticks.
    pub async fn run<F>(&mut self, shutdown: F) -> ActionReport
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }
        self.release()
    }

    /// Resume every process still flagged as suspended by this governor.
    pub fn release(&mut self) -> ActionReport {
        if !self.controller.any_suspended() {
            return ActionReport::default();
        }
        info!("Resuming suspended processes before exit");
        self.controller.resume_all()
    }
}
