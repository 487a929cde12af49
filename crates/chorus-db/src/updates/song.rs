//! Song update builder.

use chrono::NaiveDate;
use serde::Serialize;

use chorus_core::entities::Song;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SongUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Replaces the full artist list when set, in credit order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_ids: Option<Vec<i64>>,
}

impl SongUpdate {
    /// Apply the scalar fields on top of `song`. Artists are synced separately.
    #[must_use]
    pub fn apply(&self, song: &Song) -> Song {
        Song {
            id: song.id,
            title: self.title.clone().unwrap_or_else(|| song.title.clone()),
            year: self.year.unwrap_or(song.year),
            location: self.location.clone().unwrap_or_else(|| song.location.clone()),
            user_id: song.user_id,
        }
    }
}

pub struct SongUpdateBuilder(SongUpdate);

impl SongUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(SongUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn year(mut self, year: NaiveDate) -> Self {
        self.0.year = Some(year);
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.0.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn artist_ids(mut self, artist_ids: Vec<i64>) -> Self {
        self.0.artist_ids = Some(artist_ids);
        self
    }

    #[must_use]
    pub fn build(self) -> SongUpdate {
        self.0
    }
}

impl Default for SongUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
