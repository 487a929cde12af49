use serde::{Deserialize, Serialize};

use crate::tracked::{Association, Field, Tracked};

/// Playlist -> song links, stored in `playlist_song`.
pub const PLAYLIST_SONGS: Association = Association {
    name: "songs",
    table: "playlist_song",
    owner_column: "playlist_id",
    related_column: "song_id",
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
}

impl Tracked for Playlist {
    const TABLE: &'static str = "playlist";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            column: "id",
            read: |p| p.id.to_string(),
        },
        Field {
            column: "title",
            read: |p| p.title.clone(),
        },
        Field {
            column: "user_id",
            read: |p| p.user_id.to_string(),
        },
    ];
    const ASSOCIATIONS: &'static [Association] = &[PLAYLIST_SONGS];

    fn id(&self) -> i64 {
        self.id
    }
}
