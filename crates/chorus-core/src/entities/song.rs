use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tracked::{Association, Field, Tracked};

/// Song -> artist links, stored in `artist_song`.
pub const SONG_ARTISTS: Association = Association {
    name: "artists",
    table: "artist_song",
    owner_column: "song_id",
    related_column: "artist_id",
};

/// An uploaded song. `user_id` is the uploader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    /// Release date.
    pub year: NaiveDate,
    /// Storage key of the audio file.
    pub location: String,
    pub user_id: i64,
}

impl Tracked for Song {
    const TABLE: &'static str = "song";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            column: "id",
            read: |s| s.id.to_string(),
        },
        Field {
            column: "title",
            read: |s| s.title.clone(),
        },
        Field {
            column: "year",
            read: |s| s.year.format("%Y-%m-%d").to_string(),
        },
        Field {
            column: "location",
            read: |s| s.location.clone(),
        },
        Field {
            column: "user_id",
            read: |s| s.user_id.to_string(),
        },
    ];
    const ASSOCIATIONS: &'static [Association] = &[SONG_ARTISTS];

    fn id(&self) -> i64 {
        self.id
    }
}
