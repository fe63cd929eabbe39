//! Dashboard application state
//!
//! `Dashboard::update` is the only mutator. User commands, telemetry ticks
//! and network completions come in as `Msg`; the network calls and file
//! writes they require go out as `Effect`s, which the runtime executes and
//! feeds back as `Msg::Completed`.

use crate::api::Upload;
use crate::config_sync::{ConfigSync, ConnectionStatus, MSG_UPDATED, MSG_UPDATE_FAILED};
use crate::error::DashboardError;
use crate::map::{MapCanvas, MapOverlay};
use crate::notify::{Notification, Notifications};
use crate::prefs::Preferences;
use crate::secret::Secret;
use crate::session::{
    AdminAccess, Credentials, Grant, LoginOutcome, SessionController, SessionId, SessionState,
};
use crate::track_loader::{TrackLoader, MSG_LOAD_FAILED};
use asv_core::model::{
    AdminConfig, ConfigPatch, CvCounts, SensorReadout, TelemetrySample, Theme, TrackId,
};
use asv_core::series::{ChartFrame, TelemetryBuffer};
use asv_core::wire::UploadKind;
use tracing::{debug, warn};

pub const MSG_LOGIN_SUCCESS: &str = "Login successful. Welcome, Admin.";
pub const MSG_LOGGED_OUT: &str = "Logged out successfully";
pub const MSG_SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const MSG_LOGIN_REQUIRED: &str = "Admin login required";
pub const MSG_IMAGE_DELETED: &str = "Image deleted successfully";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Monitoring,
    Gallery,
    Admin,
}

/// User intents
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectView(View),
    SubmitLogin { username: String, password: Secret },
    CancelLogin,
    Logout,
    SelectTrack(TrackId),
    ToggleTheme,
    RefreshConfig,
    SaveConfig(ConfigPatch),
    /// Push the default configuration
    ResetConfig,
    RefreshGallery,
    DeleteImage(String),
    ClearGallery,
    Upload(Upload),
}

/// Results of effects, fed back into `update`
///
/// Privileged results carry the session their request was sent under.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Login(Result<Secret, DashboardError>),
    Route {
        track: TrackId,
        result: Result<String, DashboardError>,
    },
    ConfigFetched(Result<AdminConfig, DashboardError>),
    ConfigPushed {
        session: SessionId,
        result: Result<(), DashboardError>,
    },
    Gallery(Result<Vec<String>, DashboardError>),
    /// Carries the deleted file name
    ImageDeleted {
        session: SessionId,
        result: Result<String, DashboardError>,
    },
    GalleryCleared {
        session: SessionId,
        result: Result<u32, DashboardError>,
    },
    Uploaded {
        session: SessionId,
        kind: UploadKind,
        result: Result<String, DashboardError>,
    },
    LoggedOut(Result<(), DashboardError>),
}

/// One telemetry timer tick with whatever the sensor produced
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryTick {
    pub label: String,
    pub readout: Option<SensorReadout>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Initial load: config and the selected track
    Start,
    Command(Command),
    Tick(TelemetryTick),
    Completed(Completion),
}

impl From<Command> for Msg {
    fn from(command: Command) -> Self {
        Msg::Command(command)
    }
}

impl From<Completion> for Msg {
    fn from(completion: Completion) -> Self {
        Msg::Completed(completion)
    }
}

/// Work for the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchRoute(TrackId),
    FetchConfig,
    PushConfig { grant: Grant, patch: ConfigPatch },
    Login(Credentials),
    /// Revoke the token server-side
    Logout(Secret),
    ListImages,
    DeleteImage { grant: Grant, filename: String },
    ClearImages { grant: Grant },
    Upload { grant: Grant, upload: Upload },
    SaveTheme(Theme),
}

pub struct Dashboard<C> {
    view: View,
    theme: Theme,
    session: SessionController,
    config: ConfigSync,
    tracks: TrackLoader,
    overlay: MapOverlay<C>,
    telemetry: TelemetryBuffer,
    frame: Option<ChartFrame>,
    readout: Option<SensorReadout>,
    ticks: u64,
    gallery: Vec<String>,
    notifications: Notifications,
}

impl<C: MapCanvas> Dashboard<C> {
    pub fn new(canvas: C, prefs: Preferences) -> Self {
        Self {
            view: View::default(),
            theme: prefs.theme,
            session: SessionController::new(),
            config: ConfigSync::new(),
            tracks: TrackLoader::default(),
            overlay: MapOverlay::new(canvas),
            telemetry: TelemetryBuffer::default(),
            frame: None,
            readout: None,
            ticks: 0,
            gallery: Vec::new(),
            notifications: Notifications::default(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Whether the admin indicator is shown
    pub fn is_admin(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.config.status()
    }

    pub fn admin_config(&self) -> Option<&AdminConfig> {
        self.config.cached()
    }

    pub fn cv_counts(&self) -> CvCounts {
        self.config.cached().map(|c| c.cv_counts).unwrap_or_default()
    }

    pub fn selected_track(&self) -> TrackId {
        self.tracks.selected()
    }

    pub fn tracks(&self) -> &TrackLoader {
        &self.tracks
    }

    pub fn overlay(&self) -> &MapOverlay<C> {
        &self.overlay
    }

    pub fn frame(&self) -> Option<&ChartFrame> {
        self.frame.as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryBuffer {
        &self.telemetry
    }

    pub fn readout(&self) -> Option<&SensorReadout> {
        self.readout.as_ref()
    }

    /// Telemetry samples applied so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The telemetry ticker should run only while this is true
    pub fn telemetry_visible(&self) -> bool {
        self.view == View::Monitoring
    }

    pub fn gallery(&self) -> &[String] {
        &self.gallery
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Start => vec![
                Effect::FetchConfig,
                Effect::FetchRoute(self.tracks.selected()),
            ],
            Msg::Command(command) => self.handle_command(command),
            Msg::Tick(tick) => {
                self.handle_tick(tick);
                Vec::new()
            }
            Msg::Completed(completion) => self.handle_completion(completion),
        }
    }

    fn handle_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::SelectView(View::Admin) => {
                if self.session.request_admin() == AdminAccess::Granted {
                    self.view = View::Admin;
                }
                Vec::new()
            }
            Command::SelectView(View::Gallery) => {
                self.view = View::Gallery;
                vec![Effect::ListImages]
            }
            Command::SelectView(View::Monitoring) => {
                self.view = View::Monitoring;
                Vec::new()
            }
            Command::SubmitLogin { username, password } => {
                match self.session.submit(&username, password) {
                    Ok(credentials) => vec![Effect::Login(credentials)],
                    Err(err) => {
                        debug!(error = %err, "login not submitted");
                        Vec::new()
                    }
                }
            }
            Command::CancelLogin => {
                self.session.cancel();
                Vec::new()
            }
            Command::Logout => match self.session.logout() {
                Some(token) => {
                    self.view = View::Monitoring;
                    self.notifications.info(MSG_LOGGED_OUT);
                    vec![Effect::Logout(token)]
                }
                None => Vec::new(),
            },
            Command::SelectTrack(track) => {
                self.tracks.select(track);
                vec![Effect::FetchRoute(track)]
            }
            Command::ToggleTheme => {
                self.theme = self.theme.toggled();
                let mut effects = vec![Effect::SaveTheme(self.theme)];
                if let Some(grant) = self.session.grant() {
                    effects.push(Effect::PushConfig {
                        grant,
                        patch: ConfigPatch::theme(self.theme),
                    });
                }
                effects
            }
            Command::RefreshConfig => vec![Effect::FetchConfig],
            Command::SaveConfig(patch) => self.push_config(patch),
            Command::ResetConfig => self.push_config(AdminConfig::default().into()),
            Command::RefreshGallery => vec![Effect::ListImages],
            Command::DeleteImage(filename) => match self.privileged() {
                Some(grant) => vec![Effect::DeleteImage { grant, filename }],
                None => Vec::new(),
            },
            Command::ClearGallery => match self.privileged() {
                Some(grant) => vec![Effect::ClearImages { grant }],
                None => Vec::new(),
            },
            Command::Upload(upload) => {
                let Some(grant) = self.privileged() else {
                    return Vec::new();
                };
                if !upload.kind.accepts(&upload.filename) {
                    self.notifications.error(format!(
                        "{} is not a valid {} file",
                        upload.filename,
                        upload.kind.as_str()
                    ));
                    return Vec::new();
                }
                vec![Effect::Upload { grant, upload }]
            }
        }
    }

    fn push_config(&mut self, patch: ConfigPatch) -> Vec<Effect> {
        match self.privileged() {
            Some(grant) => vec![Effect::PushConfig { grant, patch }],
            None => Vec::new(),
        }
    }

    fn handle_tick(&mut self, tick: TelemetryTick) {
        if !self.telemetry_visible() {
            return;
        }
        let Some(readout) = tick.readout else {
            return;
        };
        let sample = TelemetrySample::from_readout(tick.label, &readout);
        self.frame = Some(self.telemetry.push(&sample));
        self.readout = Some(readout);
        self.ticks += 1;
    }

    fn handle_completion(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Login(result) => match self.session.complete(result) {
                LoginOutcome::Authenticated => {
                    self.view = View::Admin;
                    self.notifications.success(MSG_LOGIN_SUCCESS);
                    vec![Effect::FetchConfig]
                }
                LoginOutcome::Rejected(_) | LoginOutcome::Stale => Vec::new(),
            },
            Completion::LoggedOut(result) => {
                if let Err(err) = result {
                    debug!(error = %err, "token revoke failed");
                }
                Vec::new()
            }
            Completion::Route { track, result } => {
                match self.tracks.complete(track, result) {
                    Ok(loaded) => self.overlay.show(loaded),
                    Err(_) => self.notifications.error(MSG_LOAD_FAILED),
                }
                Vec::new()
            }
            Completion::ConfigFetched(result) => self.apply_config(result),
            Completion::ConfigPushed { session, result } => match self.authorize(session, result) {
                Some(Ok(())) => {
                    self.notifications.success(MSG_UPDATED);
                    vec![Effect::FetchConfig]
                }
                Some(Err(err)) => {
                    self.notifications.error(err.user_message(MSG_UPDATE_FAILED));
                    Vec::new()
                }
                None => Vec::new(),
            },
            Completion::Gallery(result) => {
                match result {
                    Ok(images) => self.gallery = images,
                    Err(err) => {
                        self.notifications
                            .error(err.user_message("Failed to load gallery"));
                    }
                }
                Vec::new()
            }
            Completion::ImageDeleted { session, result } => match self.authorize(session, result) {
                Some(Ok(filename)) => {
                    self.gallery.retain(|name| *name != filename);
                    self.notifications.success(MSG_IMAGE_DELETED);
                    vec![Effect::ListImages]
                }
                Some(Err(err)) => {
                    self.notifications.error(err.user_message("Failed to delete image"));
                    Vec::new()
                }
                None => Vec::new(),
            },
            Completion::GalleryCleared { session, result } => {
                match self.authorize(session, result) {
                    Some(Ok(count)) => {
                        self.gallery.clear();
                        self.notifications.success(format!("{count} images deleted"));
                        Vec::new()
                    }
                    Some(Err(err)) => {
                        self.notifications.error(err.user_message("Failed to clear gallery"));
                        Vec::new()
                    }
                    None => Vec::new(),
                }
            }
            Completion::Uploaded {
                session,
                kind,
                result,
            } => match self.authorize(session, result) {
                Some(Ok(filename)) => {
                    self.notifications
                        .success(format!("File {filename} uploaded successfully"));
                    match kind {
                        UploadKind::Csv => vec![Effect::FetchRoute(self.tracks.selected())],
                        UploadKind::Image => vec![Effect::ListImages],
                    }
                }
                Some(Err(err)) => {
                    self.notifications.error(err.user_message("Upload failed"));
                    Vec::new()
                }
                None => Vec::new(),
            },
        }
    }

    fn apply_config(&mut self, result: Result<AdminConfig, DashboardError>) -> Vec<Effect> {
        let Some(change) = self.config.apply_fetched(result) else {
            return Vec::new();
        };
        let Some(config) = self.config.cached() else {
            return Vec::new();
        };
        let (theme, default_track) = (config.theme, config.default_track);

        let mut effects = Vec::new();
        if change.theme && theme != self.theme {
            self.theme = theme;
            effects.push(Effect::SaveTheme(theme));
        }
        if change.default_track && self.tracks.select(default_track) {
            effects.push(Effect::FetchRoute(default_track));
        }
        effects
    }

    /// Grant for a privileged request, or a warning when not logged in
    fn privileged(&mut self) -> Option<Grant> {
        match self.session.grant() {
            Some(grant) => Some(grant),
            None => {
                self.notifications.warning(MSG_LOGIN_REQUIRED);
                None
            }
        }
    }

    /// Central guard for privileged results. `Unauthorized` ends the session
    /// it was issued under and is consumed; everything else is passed through.
    fn authorize<T>(
        &mut self,
        session: SessionId,
        result: Result<T, DashboardError>,
    ) -> Option<Result<T, DashboardError>> {
        match result {
            Err(DashboardError::Unauthorized) => {
                if self.session.force_logout(session) {
                    self.view = View::Monitoring;
                    self.notifications.warning(MSG_SESSION_EXPIRED);
                } else {
                    warn!("late unauthorized response ignored");
                }
                None
            }
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapScene;
    use crate::notify::Level;

    fn dashboard() -> Dashboard<MapScene> {
        Dashboard::new(MapScene::new(), Preferences::default())
    }

    fn logged_in() -> Dashboard<MapScene> {
        let mut d = dashboard();
        d.update(Command::SelectView(View::Admin).into());
        let effects = d.update(
            Command::SubmitLogin {
                username: "admin".into(),
                password: Secret::new("asv2025"),
            }
            .into(),
        );
        assert!(matches!(effects.as_slice(), [Effect::Login(_)]));
        d.update(Completion::Login(Ok(Secret::new("tok"))).into());
        d.take_notifications();
        d
    }

    #[test]
    fn test_start_fetches_config_and_default_track() {
        let mut d = dashboard();
        assert_eq!(
            d.update(Msg::Start),
            vec![Effect::FetchConfig, Effect::FetchRoute(TrackId::default())]
        );
    }

    #[test]
    fn test_admin_request_keeps_view_until_login() {
        let mut d = dashboard();
        d.update(Command::SelectView(View::Admin).into());
        assert_eq!(d.view(), View::Monitoring);
        assert_eq!(d.session_state(), SessionState::AwaitingCredentials);
    }

    #[test]
    fn test_privileged_command_without_login_warns() {
        let mut d = dashboard();
        assert!(d.update(Command::ClearGallery.into()).is_empty());
        let notes = d.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, Level::Warning);
        assert_eq!(notes[0].message, MSG_LOGIN_REQUIRED);
    }

    #[test]
    fn test_ticks_ignored_outside_monitoring() {
        let mut d = dashboard();
        d.update(Command::SelectView(View::Gallery).into());
        assert!(!d.telemetry_visible());
        d.update(Msg::Tick(TelemetryTick {
            label: "12:00:00".into(),
            readout: None,
        }));
        assert_eq!(d.ticks(), 0);
        assert!(d.frame().is_none());
    }

    #[test]
    fn test_theme_toggle_pushes_only_when_authenticated() {
        let mut d = dashboard();
        assert_eq!(
            d.update(Command::ToggleTheme.into()),
            vec![Effect::SaveTheme(Theme::Dark)]
        );

        let mut d = logged_in();
        let effects = d.update(Command::ToggleTheme.into());
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            &effects[1],
            Effect::PushConfig { patch, .. } if patch.theme == Some(Theme::Dark)
        ));
    }

    #[test]
    fn test_upload_rejects_wrong_extension_without_request() {
        let mut d = logged_in();
        let effects = d.update(
            Command::Upload(Upload {
                kind: UploadKind::Image,
                filename: "notes.txt".into(),
                bytes: vec![1, 2, 3],
            })
            .into(),
        );
        assert!(effects.is_empty());
        assert_eq!(d.take_notifications()[0].level, Level::Error);
    }

    #[test]
    fn test_late_unauthorized_is_ignored() {
        let mut d = logged_in();
        let session = d.session().session_id().unwrap();
        d.update(
            Completion::ConfigPushed {
                session,
                result: Err(DashboardError::Unauthorized),
            }
            .into(),
        );
        d.update(
            Completion::GalleryCleared {
                session,
                result: Err(DashboardError::Unauthorized),
            }
            .into(),
        );
        let notes = d.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, MSG_SESSION_EXPIRED);
    }

    #[test]
    fn test_reset_pushes_defaults() {
        let mut d = logged_in();
        let effects = d.update(Command::ResetConfig.into());
        assert!(matches!(
            &effects[..],
            [Effect::PushConfig { patch, .. }]
                if *patch == ConfigPatch::from(AdminConfig::default())
        ));
    }
}
