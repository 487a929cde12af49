//! Timeline events produced by history reconstruction.
//!
//! Events are derived on demand and never stored. The serialized shape
//! (`event_date_time`, `description`) is what the CSV export writes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One human-readable entry of a user's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEvent {
    #[serde(rename = "event_date_time")]
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl TimelineEvent {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, kind: &EventKind) -> Self {
        Self {
            timestamp,
            description: kind.to_string(),
        }
    }
}

/// Inclusive `[from, to]` bound on audit record timestamps. Either end may be
/// open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if both ends are set and `from > to`.
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<Self, CoreError> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(CoreError::Validation(format!(
                    "window start {f} is after window end {t}"
                )));
            }
        }
        Ok(Self { from, to })
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self { from: None, to: None }
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// `"Title - Artist A, Artist B"` as shown in event descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongLabel {
    pub title: String,
    pub artists: Vec<String>,
}

impl fmt::Display for SongLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artists.join(", "))
    }
}

/// Every kind of event the reconstruction engine can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    SignedUp,
    UploadedSong { song: SongLabel },
    DeletedSong { song: SongLabel },
    CreatedPlaylist { playlist: String },
    DeletedPlaylist { playlist: String },
    AddedSongToPlaylist { song: SongLabel, playlist: String },
    RemovedSongFromPlaylist { song: SongLabel, playlist: String },
    RatedSong { song: SongLabel, mark: String },
    ChangedRating { song: SongLabel, from: String, to: String },
    WroteComment { song: SongLabel, message: String },
    ChangedComment { song: SongLabel, from: String, to: String },
    DeletedComment { song: SongLabel, message: String },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignedUp => f.write_str("Signed up"),
            Self::UploadedSong { song } => write!(f, "Uploaded song '{song}'"),
            Self::DeletedSong { song } => write!(f, "Deleted song '{song}'"),
            Self::CreatedPlaylist { playlist } => write!(f, "Created playlist '{playlist}'"),
            Self::DeletedPlaylist { playlist } => write!(f, "Deleted playlist '{playlist}'"),
            Self::AddedSongToPlaylist { song, playlist } => {
                write!(f, "Added song '{song}' to playlist '{playlist}'")
            }
            Self::RemovedSongFromPlaylist { song, playlist } => {
                write!(f, "Deleted song '{song}' from playlist '{playlist}'")
            }
            Self::RatedSong { song, mark } => {
                write!(f, "Rated song '{song}' with a rating {mark}")
            }
            Self::ChangedRating { song, from, to } => {
                write!(f, "Changed rating for song '{song}' from {from} to {to}")
            }
            Self::WroteComment { song, message } => {
                write!(f, "Wrote comment for song '{song}' with message '{message}'")
            }
            Self::ChangedComment { song, from, to } => {
                write!(f, "Changed comment for song '{song}' from '{from}' to '{to}'")
            }
            Self::DeletedComment { song, message } => {
                write!(f, "Deleted comment for song '{song}' with message '{message}'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::*;

    fn alpha() -> SongLabel {
        SongLabel {
            title: "Alpha".into(),
            artists: vec!["Zed".into()],
        }
    }

    #[rstest]
    #[case(EventKind::SignedUp, "Signed up")]
    #[case(EventKind::UploadedSong { song: alpha() }, "Uploaded song 'Alpha - Zed'")]
    #[case(
        EventKind::AddedSongToPlaylist { song: alpha(), playlist: "Favs".into() },
        "Added song 'Alpha - Zed' to playlist 'Favs'"
    )]
    #[case(
        EventKind::RemovedSongFromPlaylist { song: alpha(), playlist: "Favs".into() },
        "Deleted song 'Alpha - Zed' from playlist 'Favs'"
    )]
    #[case(
        EventKind::RatedSong { song: alpha(), mark: "4".into() },
        "Rated song 'Alpha - Zed' with a rating 4"
    )]
    #[case(
        EventKind::ChangedRating { song: alpha(), from: "4".into(), to: "5".into() },
        "Changed rating for song 'Alpha - Zed' from 4 to 5"
    )]
    #[case(
        EventKind::DeletedComment { song: alpha(), message: "meh".into() },
        "Deleted comment for song 'Alpha - Zed' with message 'meh'"
    )]
    fn descriptions(#[case] kind: EventKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn multiple_artists_are_comma_joined() {
        let label = SongLabel {
            title: "Duet".into(),
            artists: vec!["Ann".into(), "Bo".into()],
        };
        assert_eq!(label.to_string(), "Duet - Ann, Bo");
    }

    #[test]
    fn missing_attributes_degrade_to_empty() {
        assert_eq!(SongLabel::default().to_string(), " - ");
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let t = Utc::now();
        let window = TimeWindow::new(Some(t), Some(t + Duration::seconds(10))).unwrap();
        assert!(window.contains(t));
        assert!(window.contains(t + Duration::seconds(10)));
        assert!(!window.contains(t - Duration::seconds(1)));
        assert!(!window.contains(t + Duration::seconds(11)));
        assert!(TimeWindow::unbounded().contains(t));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let t = Utc::now();
        assert!(TimeWindow::new(Some(t), Some(t - Duration::seconds(1))).is_err());
    }

    #[test]
    fn serializes_with_export_column_name() {
        let event = TimelineEvent::new(Utc::now(), &EventKind::SignedUp);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("event_date_time").is_some());
        assert_eq!(json["description"], "Signed up");
    }
}
