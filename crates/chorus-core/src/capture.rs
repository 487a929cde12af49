//! Change capture: turn a lifecycle transition into audit mutations.
//!
//! The persistence layer calls [`mutations`] at three points, passing explicit
//! snapshots rather than relying on hidden instance state:
//!
//! | Transition | Scalar fields                  | Associations                         |
//! |------------|--------------------------------|--------------------------------------|
//! | `Created`  | every field, `old` absent      | not captured                         |
//! | `Updated`  | changed fields, old and new    | added links / removed links          |
//! | `Deleted`  | every field, `new` absent      | every still-linked row removed       |
//!
//! A link row is audited under the association table with two columns, owner
//! foreign key first. Additions have `old` absent, removals have `new` absent.

use crate::audit::{FieldDiff, Mutation};
use crate::errors::CoreError;
use crate::tracked::{Association, LinkSet, Snapshot, Tracked};

/// A tracked entity crossing a lifecycle boundary.
#[derive(Debug)]
pub enum Transition<'a, T> {
    /// Post-create. Links are never captured here; a freshly created entity
    /// has none.
    Created(&'a T),
    /// Post-update, with both the load-time and the current snapshot.
    Updated {
        before: &'a Snapshot<T>,
        after: &'a Snapshot<T>,
    },
    /// Pre-delete, with the snapshot of everything still linked.
    Deleted(&'a Snapshot<T>),
}

/// Compute the audit mutations for one transition, in manifest order.
///
/// # Errors
///
/// Returns `CoreError::Validation` if an update's snapshots belong to
/// different records.
pub fn mutations<T: Tracked>(transition: &Transition<'_, T>) -> Result<Vec<Mutation>, CoreError> {
    match transition {
        Transition::Created(entity) => Ok(vec![creation(*entity)]),
        Transition::Updated { before, after } => update(before, after),
        Transition::Deleted(snapshot) => Ok(deletion(snapshot)),
    }
}

fn creation<T: Tracked>(entity: &T) -> Mutation {
    Mutation {
        table: T::TABLE.to_string(),
        record_id: entity.id(),
        diffs: T::FIELDS
            .iter()
            .map(|field| FieldDiff::created(field.column, field.value(entity)))
            .collect(),
    }
}

fn update<T: Tracked>(
    before: &Snapshot<T>,
    after: &Snapshot<T>,
) -> Result<Vec<Mutation>, CoreError> {
    let id = after.entity.id();
    if before.entity.id() != id {
        return Err(CoreError::Validation(format!(
            "{} update snapshots disagree on record id ({} vs {id})",
            T::TABLE,
            before.entity.id()
        )));
    }

    let mut out = Vec::new();

    let diffs: Vec<FieldDiff> = T::FIELDS
        .iter()
        .filter_map(|field| {
            let old = field.value(&before.entity);
            let new = field.value(&after.entity);
            (old != new).then(|| FieldDiff::changed(field.column, old, new))
        })
        .collect();
    if !diffs.is_empty() {
        out.push(Mutation {
            table: T::TABLE.to_string(),
            record_id: id,
            diffs,
        });
    }

    for assoc in T::ASSOCIATIONS {
        // Either side unloaded: that side is the baseline, nothing to diff.
        let (Some(old_links), Some(new_links)) =
            (before.linked(assoc.name), after.linked(assoc.name))
        else {
            continue;
        };

        for (related, row) in by_row_order(old_links) {
            if !new_links.contains_key(&related) {
                out.push(link_removed(assoc, row, id, related));
            }
        }
        for (related, row) in by_row_order(new_links) {
            if !old_links.contains_key(&related) {
                out.push(link_added(assoc, row, id, related));
            }
        }
    }

    Ok(out)
}

fn deletion<T: Tracked>(snapshot: &Snapshot<T>) -> Vec<Mutation> {
    let id = snapshot.entity.id();
    let mut out = vec![Mutation {
        table: T::TABLE.to_string(),
        record_id: id,
        diffs: T::FIELDS
            .iter()
            .map(|field| FieldDiff::deleted(field.column, field.value(&snapshot.entity)))
            .collect(),
    }];

    for assoc in T::ASSOCIATIONS {
        if let Some(links) = snapshot.linked(assoc.name) {
            for (related, row) in by_row_order(links) {
                out.push(link_removed(assoc, row, id, related));
            }
        }
    }

    out
}

/// Addition of one link row.
#[must_use]
pub fn link_added(assoc: &Association, row_id: i64, owner_id: i64, related_id: i64) -> Mutation {
    Mutation {
        table: assoc.table.to_string(),
        record_id: row_id,
        diffs: vec![
            FieldDiff::created(assoc.owner_column, owner_id.to_string()),
            FieldDiff::created(assoc.related_column, related_id.to_string()),
        ],
    }
}

/// Removal of one link row.
#[must_use]
pub fn link_removed(assoc: &Association, row_id: i64, owner_id: i64, related_id: i64) -> Mutation {
    Mutation {
        table: assoc.table.to_string(),
        record_id: row_id,
        diffs: vec![
            FieldDiff::deleted(assoc.owner_column, owner_id.to_string()),
            FieldDiff::deleted(assoc.related_column, related_id.to_string()),
        ],
    }
}

/// `(related_id, row_id)` pairs ordered by link row id.
fn by_row_order(links: &LinkSet) -> Vec<(i64, i64)> {
    let mut pairs: Vec<(i64, i64)> = links.iter().map(|(related, row)| (*related, *row)).collect();
    pairs.sort_unstable_by_key(|(_, row)| *row);
    pairs
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::entities::{Rating, SONG_ARTISTS, Song};

    fn song() -> Song {
        Song {
            id: 10,
            title: "Alpha".into(),
            year: NaiveDate::from_ymd_opt(2020, 5, 17).unwrap(),
            location: "songs/alpha.mp3".into(),
            user_id: 1,
        }
    }

    fn with_artists(song: Song, links: &[(i64, i64)]) -> Snapshot<Song> {
        Snapshot::unlinked(song).with_links(SONG_ARTISTS.name, links.iter().copied().collect())
    }

    #[test]
    fn creation_emits_every_field_in_manifest_order() {
        let out = mutations(&Transition::Created(&song())).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].table, "song");
        assert_eq!(out[0].record_id, 10);
        assert_eq!(
            out[0].diffs,
            vec![
                FieldDiff::created("id", "10"),
                FieldDiff::created("title", "Alpha"),
                FieldDiff::created("year", "2020-05-17"),
                FieldDiff::created("location", "songs/alpha.mp3"),
                FieldDiff::created("user_id", "1"),
            ]
        );
    }

    #[test]
    fn update_emits_only_changed_fields() {
        let before = Snapshot::scalar_only(Rating {
            id: 4,
            mark: 4,
            song_id: 10,
            user_id: 1,
        });
        let mut after = before.clone();
        after.entity.mark = 5;

        let out = mutations(&Transition::Updated {
            before: &before,
            after: &after,
        })
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].diffs, vec![FieldDiff::changed("mark", "4", "5")]);
    }

    #[test]
    fn unchanged_update_emits_nothing() {
        let snap = with_artists(song(), &[(7, 100)]);
        let out = mutations(&Transition::Updated {
            before: &snap,
            after: &snap,
        })
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn link_changes_become_association_rows() {
        let before = with_artists(song(), &[(7, 100), (8, 101)]);
        let after = with_artists(song(), &[(7, 100), (9, 102)]);

        let out = mutations(&Transition::Updated {
            before: &before,
            after: &after,
        })
        .unwrap();

        assert_eq!(
            out,
            vec![
                link_removed(&SONG_ARTISTS, 101, 10, 8),
                link_added(&SONG_ARTISTS, 102, 10, 9),
            ]
        );
        assert_eq!(out[1].diffs[0], FieldDiff::created("song_id", "10"));
        assert_eq!(out[1].diffs[1], FieldDiff::created("artist_id", "9"));
    }

    #[test]
    fn unloaded_links_are_a_baseline_not_a_diff() {
        let before = Snapshot::scalar_only(song());
        let after = with_artists(song(), &[(7, 100)]);
        let out = mutations(&Transition::Updated {
            before: &before,
            after: &after,
        })
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn deletion_removes_fields_then_links() {
        let snap = with_artists(song(), &[(8, 101), (7, 100)]);
        let out = mutations(&Transition::Deleted(&snap)).unwrap();

        assert_eq!(out.len(), 3);
        assert!(out[0].diffs.iter().all(|d| d.new_value.is_none()));
        assert_eq!(out[0].diffs[1], FieldDiff::deleted("title", "Alpha"));
        assert_eq!(out[1], link_removed(&SONG_ARTISTS, 100, 10, 7));
        assert_eq!(out[2], link_removed(&SONG_ARTISTS, 101, 10, 8));
    }

    #[test]
    fn mismatched_snapshots_are_rejected() {
        let before = Snapshot::scalar_only(song());
        let mut other = song();
        other.id = 11;
        let after = Snapshot::scalar_only(other);
        let result = mutations(&Transition::Updated {
            before: &before,
            after: &after,
        });
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
