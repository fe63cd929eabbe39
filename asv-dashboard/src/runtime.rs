//! Effect runtime
//!
//! Owns the `Dashboard` and is the only place `update` runs. Network effects
//! are spawned as tasks and report back over a channel, so a slow request
//! never holds up the ticker or command handling. Completions are applied in
//! arrival order.

use crate::api::DashboardApi;
use crate::app::{Command, Completion, Dashboard, Effect, Msg, TelemetryTick};
use crate::map::MapCanvas;
use crate::prefs::{PreferenceStore, Preferences};
use crate::telemetry::{timestamp_label, TelemetryTicker};
use asv_core::model::Theme;
use asv_core::sensor::SensorSource;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Renders the dashboard after every update
pub trait Presenter<C> {
    fn present(&mut self, dashboard: &mut Dashboard<C>);
}

enum Wake {
    Cancelled,
    Command(Option<Command>),
    Completed(Completion),
    Tick,
}

pub struct Runtime<A, C> {
    dashboard: Dashboard<C>,
    api: Arc<A>,
    sensor: Box<dyn SensorSource>,
    prefs: PreferenceStore,
    ticker: TelemetryTicker,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<A, C> Runtime<A, C>
where
    A: DashboardApi + 'static,
    C: MapCanvas,
{
    pub fn new(
        dashboard: Dashboard<C>,
        api: Arc<A>,
        sensor: Box<dyn SensorSource>,
        prefs: PreferenceStore,
        ticker: TelemetryTicker,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            dashboard,
            api,
            sensor,
            prefs,
            ticker,
            completions_tx,
            completions_rx,
        }
    }

    /// Run until cancelled or the command channel closes. Returns the final
    /// dashboard state.
    pub async fn run<P: Presenter<C>>(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        presenter: &mut P,
        cancel: CancellationToken,
    ) -> Dashboard<C> {
        info!(sensor = self.sensor.name(), "dashboard runtime started");
        self.dispatch(Msg::Start);
        presenter.present(&mut self.dashboard);

        loop {
            let wake = tokio::select! {
                _ = cancel.cancelled() => Wake::Cancelled,
                command = commands.recv() => Wake::Command(command),
                Some(done) = self.completions_rx.recv() => Wake::Completed(done),
                _ = self.ticker.tick() => Wake::Tick,
            };

            let msg = match wake {
                Wake::Cancelled | Wake::Command(None) => break,
                Wake::Command(Some(command)) => Msg::Command(command),
                Wake::Completed(done) => Msg::Completed(done),
                Wake::Tick => Msg::Tick(self.read_sensor()),
            };
            self.dispatch(msg);
            presenter.present(&mut self.dashboard);
        }

        self.ticker.stop();
        if let Err(e) = self.sensor.stop() {
            warn!("Error stopping sensor {}: {}", self.sensor.name(), e);
        }
        info!("dashboard runtime stopped");
        self.dashboard
    }

    fn dispatch(&mut self, msg: Msg) {
        for effect in self.dashboard.update(msg) {
            if let Effect::SaveTheme(theme) = effect {
                save_theme(&self.prefs, theme);
                continue;
            }
            let api = Arc::clone(&self.api);
            let tx = self.completions_tx.clone();
            tokio::spawn(async move {
                if let Some(done) = execute(api.as_ref(), effect).await {
                    // Receiver only goes away when the runtime has stopped
                    let _ = tx.send(done);
                }
            });
        }
        self.sync_ticker();
    }

    /// Run the ticker and sensor only while telemetry is visible
    fn sync_ticker(&mut self) {
        let visible = self.dashboard.telemetry_visible();
        if visible && !self.ticker.is_running() {
            if let Err(e) = self.sensor.start() {
                warn!("Failed to start sensor {}: {}", self.sensor.name(), e);
            }
            self.ticker.start();
            debug!("telemetry ticker started");
        } else if !visible && self.ticker.is_running() {
            self.ticker.stop();
            if let Err(e) = self.sensor.stop() {
                warn!("Error stopping sensor {}: {}", self.sensor.name(), e);
            }
            debug!("telemetry ticker stopped");
        }
    }

    fn read_sensor(&mut self) -> TelemetryTick {
        let readout = match self.sensor.read_sample() {
            Ok(readout) => readout,
            Err(e) => {
                warn!("Error reading sample from {}: {}", self.sensor.name(), e);
                None
            }
        };
        TelemetryTick {
            label: timestamp_label(),
            readout,
        }
    }
}

fn save_theme(prefs: &PreferenceStore, theme: Theme) {
    if let Err(e) = prefs.save(&Preferences { theme }) {
        warn!("Failed to save preferences: {:#}", e);
    }
}

/// Perform one network effect. Local effects yield no completion.
pub async fn execute<A: DashboardApi + ?Sized>(api: &A, effect: Effect) -> Option<Completion> {
    let done = match effect {
        Effect::FetchRoute(track) => Completion::Route {
            track,
            result: api.fetch_route(track).await,
        },
        Effect::FetchConfig => Completion::ConfigFetched(api.fetch_config().await),
        Effect::PushConfig { grant, patch } => Completion::ConfigPushed {
            session: grant.session,
            result: api.push_config(&grant.token, &patch).await,
        },
        Effect::Login(credentials) => Completion::Login(api.login(&credentials).await),
        Effect::Logout(token) => Completion::LoggedOut(api.logout(&token).await),
        Effect::ListImages => Completion::Gallery(api.list_images().await),
        Effect::DeleteImage { grant, filename } => Completion::ImageDeleted {
            session: grant.session,
            result: api
                .delete_image(&grant.token, &filename)
                .await
                .map(|()| filename),
        },
        Effect::ClearImages { grant } => Completion::GalleryCleared {
            session: grant.session,
            result: api.clear_images(&grant.token).await,
        },
        Effect::Upload { grant, upload } => Completion::Uploaded {
            session: grant.session,
            kind: upload.kind,
            result: api.upload(&grant.token, &upload).await,
        },
        Effect::SaveTheme(_) => return None,
    };
    Some(done)
}

/// Apply `msg` and every follow-up effect to completion, one at a time.
///
/// Deterministic counterpart of `Runtime::run` for scripted sessions.
pub async fn drive<A, C>(
    dashboard: &mut Dashboard<C>,
    api: &A,
    prefs: &PreferenceStore,
    msg: Msg,
) where
    A: DashboardApi + ?Sized,
    C: MapCanvas,
{
    let mut queue = VecDeque::from([msg]);
    while let Some(msg) = queue.pop_front() {
        for effect in dashboard.update(msg) {
            if let Effect::SaveTheme(theme) = effect {
                save_theme(prefs, theme);
                continue;
            }
            if let Some(done) = execute(api, effect).await {
                queue.push_back(Msg::Completed(done));
            }
        }
    }
}
