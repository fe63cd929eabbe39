//! Headless ASV dashboard
//!
//! Reads line commands from stdin and prints notifications, sensor readouts
//! and map changes to stdout. Type `help` for the command list.

use anyhow::Result;
use asv_dashboard::app::{Command, Dashboard};
use asv_dashboard::commands::{parse_input, Input};
use asv_dashboard::config::DashboardConfig;
use asv_dashboard::map::MapScene;
use asv_dashboard::prefs::PreferenceStore;
use asv_dashboard::runtime::{Presenter, Runtime};
use asv_dashboard::telemetry::TelemetryTicker;
use asv_dashboard::{HttpApi, Upload};
use asv_sensors::SimulatedSensor;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const HELP: &str = "\
commands:
  view monitoring|gallery|admin   switch view (admin asks for login)
  login <user> <password>         answer the login prompt
  cancel | logout                 close the prompt / end the session
  track <letter>                  load a track onto the map
  theme                           toggle light/dark
  config | reset                  refresh / reset admin settings
  save theme=dark track=B counts=1,2,3
  gallery | delete <file> | clear
  upload csv|image <path>
  quit";

/// Prints what changed since the last update
#[derive(Default)]
struct ConsolePresenter {
    ticks: u64,
    layers: usize,
}

impl Presenter<MapScene> for ConsolePresenter {
    fn present(&mut self, dashboard: &mut Dashboard<MapScene>) {
        for note in dashboard.take_notifications() {
            println!("{note}");
        }
        if dashboard.ticks() != self.ticks {
            self.ticks = dashboard.ticks();
            if let Some(r) = dashboard.readout() {
                println!(
                    "heading {}  speed {}  temp {}  humidity {}  pos {:.6},{:.6}",
                    r.heading, r.speed, r.temperature, r.humidity, r.latitude, r.longitude
                );
            }
        }
        let layers = dashboard.overlay().canvas().layer_count();
        if layers != self.layers {
            self.layers = layers;
            println!(
                "map: track {} with {} waypoints",
                dashboard.selected_track(),
                dashboard.overlay().marker_count()
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::from_env();
    info!("Starting ASV dashboard against {}", config.api_url);

    let prefs = PreferenceStore::default_location();
    let dashboard = Dashboard::new(MapScene::new(), prefs.load());
    let runtime = Runtime::new(
        dashboard,
        Arc::new(HttpApi::new(config.api_url.clone())),
        Box::new(SimulatedSensor::new()),
        prefs,
        TelemetryTicker::new(config.update_interval),
    );

    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(read_commands(tx, cancel.clone()));

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut presenter = ConsolePresenter::default();
    runtime.run(rx, &mut presenter, cancel).await;
    Ok(())
}

/// Forward parsed stdin lines to the runtime
async fn read_commands(tx: mpsc::Sender<Command>, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Error reading stdin: {}", e);
                break;
            }
        };
        if line.trim() == "help" {
            println!("{HELP}");
            continue;
        }
        let command = match parse_input(&line) {
            Ok(None) => continue,
            Ok(Some(Input::Quit)) => break,
            Ok(Some(Input::Command(command))) => command,
            Ok(Some(Input::Upload { kind, path })) => match tokio::fs::read(&path).await {
                Ok(bytes) => Command::Upload(Upload {
                    kind,
                    filename: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    bytes,
                }),
                Err(e) => {
                    println!("cannot read {}: {}", path.display(), e);
                    continue;
                }
            },
            Err(e) => {
                println!("{e} (type `help`)");
                continue;
            }
        };
        if tx.send(command).await.is_err() {
            break;
        }
    }
    cancel.cancel();
}
