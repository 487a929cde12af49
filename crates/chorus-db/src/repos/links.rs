//! Association table access shared by every entity with many-to-many links.
//!
//! Table and column names come from the static `Association` descriptors, so
//! they are interpolated; ids are always bound.

use chorus_core::tracked::{Association, LinkSet, Snapshot, Tracked};

use crate::error::DatabaseError;

/// Currently linked rows of one association for one owner.
pub(crate) async fn load_links(
    conn: &libsql::Connection,
    assoc: &Association,
    owner_id: i64,
) -> Result<LinkSet, DatabaseError> {
    let sql = format!(
        "SELECT {related}, id FROM {table} WHERE {owner} = ?1",
        related = assoc.related_column,
        table = assoc.table,
        owner = assoc.owner_column,
    );
    let mut rows = conn.query(&sql, [owner_id]).await?;
    let mut links = LinkSet::new();
    while let Some(row) = rows.next().await? {
        links.insert(row.get::<i64>(0)?, row.get::<i64>(1)?);
    }
    Ok(links)
}

/// `(row_id, owner_id)` of every link pointing at `related_id`, oldest first.
pub(crate) async fn links_to(
    conn: &libsql::Connection,
    assoc: &Association,
    related_id: i64,
) -> Result<Vec<(i64, i64)>, DatabaseError> {
    let sql = format!(
        "SELECT id, {owner} FROM {table} WHERE {related} = ?1 ORDER BY id",
        owner = assoc.owner_column,
        table = assoc.table,
        related = assoc.related_column,
    );
    let mut rows = conn.query(&sql, [related_id]).await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push((row.get::<i64>(0)?, row.get::<i64>(1)?));
    }
    Ok(out)
}

/// Insert one link row and return its id.
pub(crate) async fn insert_link(
    conn: &libsql::Connection,
    assoc: &Association,
    owner_id: i64,
    related_id: i64,
) -> Result<i64, DatabaseError> {
    let sql = format!(
        "INSERT INTO {table} ({owner}, {related}) VALUES (?1, ?2)",
        table = assoc.table,
        owner = assoc.owner_column,
        related = assoc.related_column,
    );
    conn.execute(&sql, [owner_id, related_id]).await?;
    Ok(conn.last_insert_rowid())
}

pub(crate) async fn delete_link(
    conn: &libsql::Connection,
    assoc: &Association,
    row_id: i64,
) -> Result<(), DatabaseError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", assoc.table);
    conn.execute(&sql, [row_id]).await?;
    Ok(())
}

/// Snapshot an entity with every association it declares, as linked right now.
pub(crate) async fn load_snapshot<T: Tracked>(
    conn: &libsql::Connection,
    entity: T,
) -> Result<Snapshot<T>, DatabaseError> {
    let id = entity.id();
    let mut snapshot = Snapshot::scalar_only(entity);
    for assoc in T::ASSOCIATIONS {
        let links = load_links(conn, assoc, id).await?;
        snapshot = snapshot.with_links(assoc.name, links);
    }
    Ok(snapshot)
}

/// Make an owner's links equal `wanted`, keeping existing rows. Removals
/// happen first, additions follow in `wanted` order.
pub(crate) async fn sync_links(
    conn: &libsql::Connection,
    assoc: &Association,
    owner_id: i64,
    wanted: &[i64],
) -> Result<(), DatabaseError> {
    let current = load_links(conn, assoc, owner_id).await?;
    for (related, row) in &current {
        if !wanted.contains(related) {
            delete_link(conn, assoc, *row).await?;
        }
    }
    let mut seen = Vec::with_capacity(wanted.len());
    for related in wanted {
        if seen.contains(related) {
            continue;
        }
        seen.push(*related);
        if !current.contains_key(related) {
            insert_link(conn, assoc, owner_id, *related).await?;
        }
    }
    Ok(())
}
