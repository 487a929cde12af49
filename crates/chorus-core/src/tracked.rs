//! Static field manifests for tracked entities.
//!
//! Each tracked entity type declares the columns it persists as a fixed list
//! of `(column, accessor)` pairs, plus the many-to-many associations it owns.
//! Change capture iterates these lists in declaration order, so the order of
//! audit rows within one mutation is deterministic per entity type.

use std::collections::BTreeMap;

/// One persisted scalar column and how to render its current value as text.
pub struct Field<T> {
    pub column: &'static str,
    pub read: fn(&T) -> String,
}

impl<T> Field<T> {
    #[must_use]
    pub fn value(&self, entity: &T) -> String {
        (self.read)(entity)
    }
}

/// A many-to-many relationship owned by a tracked entity.
///
/// Each link is a row of `table` with its own id and the two foreign keys
/// `owner_column` and `related_column`. Links are audited as rows of `table`
/// with the link row id as `record_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    /// Field name on the owning entity, e.g. `artists`.
    pub name: &'static str,
    /// Association table, e.g. `artist_song`.
    pub table: &'static str,
    pub owner_column: &'static str,
    pub related_column: &'static str,
}

/// A domain type whose lifecycle is captured in the audit log.
pub trait Tracked: Sized + 'static {
    /// Logical audit table name.
    const TABLE: &'static str;

    /// Persisted scalar fields in capture order.
    const FIELDS: &'static [Field<Self>];

    /// Owned many-to-many associations in capture order.
    const ASSOCIATIONS: &'static [Association] = &[];

    fn id(&self) -> i64;
}

/// Currently linked rows of one association: related id -> link row id.
pub type LinkSet = BTreeMap<i64, i64>;

/// An entity together with its association link sets as read at load time.
///
/// A missing entry in `links` means the association was never loaded; change
/// capture then takes the other side as the baseline and emits no link diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub entity: T,
    pub links: BTreeMap<&'static str, LinkSet>,
}

impl<T: Tracked> Snapshot<T> {
    /// Snapshot with every association loaded and empty.
    #[must_use]
    pub fn unlinked(entity: T) -> Self {
        let links = T::ASSOCIATIONS
            .iter()
            .map(|assoc| (assoc.name, LinkSet::new()))
            .collect();
        Self { entity, links }
    }

    /// Snapshot with no associations loaded.
    #[must_use]
    pub const fn scalar_only(entity: T) -> Self {
        Self {
            entity,
            links: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_links(mut self, association: &'static str, links: LinkSet) -> Self {
        self.links.insert(association, links);
        self
    }

    #[must_use]
    pub fn linked(&self, association: &str) -> Option<&LinkSet> {
        self.links.get(association)
    }

    /// Related ids of one association, ordered by link row id (creation order).
    #[must_use]
    pub fn related_ids(&self, association: &str) -> Vec<i64> {
        let Some(set) = self.links.get(association) else {
            return Vec::new();
        };
        let mut pairs: Vec<(i64, i64)> = set.iter().map(|(related, row)| (*row, *related)).collect();
        pairs.sort_unstable();
        pairs.into_iter().map(|(_, related)| related).collect()
    }
}
