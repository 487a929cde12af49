//! Tracked catalog entities.
//!
//! Each struct mirrors one catalog table and declares its audit manifest via
//! `Tracked`. Association tables (`artist_song`, `playlist_song`) have no
//! struct of their own; they are described by `Association` descriptors on
//! the owning entity.

mod artist;
mod comment;
mod playlist;
mod rating;
mod song;
mod user;

pub use artist::Artist;
pub use comment::Comment;
pub use playlist::{PLAYLIST_SONGS, Playlist};
pub use rating::{MARK_RANGE, Rating};
pub use song::{SONG_ARTISTS, Song};
pub use user::User;
