//! Line commands for the headless dashboard
//!
//! ```text
//! view monitoring|gallery|admin    login <user> <password>    cancel
//! logout    track <letter>    theme    config    save <key>=<value>...
//! reset    gallery    delete <file>    clear    upload csv|image <path>
//! quit
//! ```

use crate::app::{Command, View};
use crate::secret::Secret;
use asv_core::model::{ConfigPatch, CvCounts, Theme, TrackId};
use asv_core::wire::UploadKind;
use std::path::PathBuf;
use thiserror::Error;

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    /// File contents are read by the caller
    Upload { kind: UploadKind, path: PathBuf },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_input(line: &str) -> Result<Option<Input>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("quit" | "exit", _) => return Ok(Some(Input::Quit)),
        ("view", [name]) => Command::SelectView(parse_view(name)?),
        ("view", _) => return Err(ParseError::Usage("view monitoring|gallery|admin")),
        ("admin", []) => Command::SelectView(View::Admin),
        ("login", [username, password]) => Command::SubmitLogin {
            username: username.to_string(),
            password: Secret::new(*password),
        },
        ("login", _) => return Err(ParseError::Usage("login <user> <password>")),
        ("cancel", []) => Command::CancelLogin,
        ("logout", []) => Command::Logout,
        ("track", [letter]) => Command::SelectTrack(
            letter
                .parse::<TrackId>()
                .map_err(|e| ParseError::Invalid(e.to_string()))?,
        ),
        ("track", _) => return Err(ParseError::Usage("track <letter>")),
        ("theme", []) => Command::ToggleTheme,
        ("config", []) => Command::RefreshConfig,
        ("save", pairs) if !pairs.is_empty() => Command::SaveConfig(parse_patch(pairs)?),
        ("save", _) => return Err(ParseError::Usage("save theme=dark track=B counts=1,2,3")),
        ("reset", []) => Command::ResetConfig,
        ("gallery", []) => Command::RefreshGallery,
        ("delete", [file]) => Command::DeleteImage(file.to_string()),
        ("delete", _) => return Err(ParseError::Usage("delete <file>")),
        ("clear", []) => Command::ClearGallery,
        ("upload", [kind, path]) => {
            let kind = kind.parse::<UploadKind>().map_err(ParseError::Invalid)?;
            return Ok(Some(Input::Upload {
                kind,
                path: PathBuf::from(path),
            }));
        }
        ("upload", _) => return Err(ParseError::Usage("upload csv|image <path>")),
        (other, _) => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(Input::Command(command)))
}

fn parse_view(name: &str) -> Result<View, ParseError> {
    match name.to_lowercase().as_str() {
        "monitoring" | "monitor" => Ok(View::Monitoring),
        "gallery" => Ok(View::Gallery),
        "admin" => Ok(View::Admin),
        other => Err(ParseError::Invalid(format!("unknown view {other:?}"))),
    }
}

fn parse_patch(pairs: &[&str]) -> Result<ConfigPatch, ParseError> {
    let mut patch = ConfigPatch::default();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ParseError::Invalid(format!("expected key=value, got {pair:?}")))?;
        match key {
            "theme" => patch.theme = Some(value.parse::<Theme>().map_err(ParseError::Invalid)?),
            "track" => {
                patch.default_track = Some(
                    value
                        .parse::<TrackId>()
                        .map_err(|e| ParseError::Invalid(e.to_string()))?,
                )
            }
            "counts" => patch.cv_counts = Some(parse_counts(value)?),
            other => return Err(ParseError::Invalid(format!("unknown setting {other:?}"))),
        }
    }
    Ok(patch)
}

/// `red,green,track`
fn parse_counts(value: &str) -> Result<CvCounts, ParseError> {
    let numbers = value
        .split(',')
        .map(|n| n.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ParseError::Invalid(format!("bad count: {e}")))?;
    match numbers.as_slice() {
        [red, green, track] => Ok(CvCounts {
            red: *red,
            green: *green,
            track: *track,
        }),
        _ => Err(ParseError::Invalid("counts needs red,green,track".to_string())),
    }
}
