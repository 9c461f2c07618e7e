//! [`SqliteStore`], the SQLite implementation of [`LoadStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::{Transaction, params_from_iter, types::Value};

use painel_core::{
  dimension::{
    Dimension, DimensionKey, DimensionMode, Member, RefreshCount, Resolution, SpellingConflict,
    dedup_members,
  },
  fact::{FactRow, FactTable, WriteMode},
  store::LoadStore,
};

use crate::{
  Error, Result,
  encode::{encode_cells, insert_sql, quote, update_extras_sql, upsert_sql},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A painel store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the underlying connection. Clones of this store become unusable.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Resolve `members`, inserting the unknown ones when `insert_missing`.
  async fn resolve_members(
    &self,
    dimension: Dimension,
    members: Vec<Member>,
    insert_missing: bool,
  ) -> Result<Resolution> {
    let (prepared, batch_conflicts) = prepare_members(dimension, members)?;
    if prepared.is_empty() {
      return Ok(Resolution { conflicts: batch_conflicts, ..Resolution::default() });
    }

    let mut resolution = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing = existing_members(&tx, dimension)?;
        let mut resolution = Resolution::default();

        for member in &prepared {
          if let Some((id, stored)) = existing.get(&member.key) {
            if *stored != member.display {
              resolution.conflicts.push(SpellingConflict {
                key:       member.key.clone(),
                canonical: stored.clone(),
                observed:  member.display.clone(),
              });
            }
            resolution.keys.insert(member.key.clone(), *id);
          } else if insert_missing {
            let id = insert_member(&tx, dimension, member)?;
            resolution.keys.insert(member.key.clone(), id);
            resolution.inserted += 1;
          } else {
            resolution.unresolved.insert(member.display.clone());
          }
        }

        tx.commit()?;
        Ok(resolution)
      })
      .await?;

    resolution.conflicts.splice(0..0, batch_conflicts);

    tracing::debug!(
      table = dimension.table,
      resolved = resolution.keys.len(),
      inserted = resolution.inserted,
      unresolved = resolution.unresolved.len(),
      "resolved dimension members"
    );
    Ok(resolution)
  }

  #[cfg(test)]
  pub(crate) async fn scalar_i64(&self, sql: &'static str) -> Result<i64> {
    let value = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
      .await?;
    Ok(value)
  }

  #[cfg(test)]
  pub(crate) async fn scalar_text(&self, sql: &'static str) -> Result<String> {
    let value = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
      .await?;
    Ok(value)
  }
}

// ─── Dimension helpers ───────────────────────────────────────────────────────

/// A deduplicated member with its descriptive values already encoded.
struct PreparedMember {
  display: String,
  key:     String,
  extras:  Vec<Value>,
}

fn prepare_members(
  dimension: Dimension,
  members: Vec<Member>,
) -> Result<(Vec<PreparedMember>, Vec<SpellingConflict>)> {
  let (unique, conflicts) = dedup_members(members);
  let prepared = unique
    .into_iter()
    .map(|m| {
      if m.extras.len() != dimension.extra_columns.len() {
        return Err(Error::MemberArity {
          table:    dimension.table,
          name:     m.name.display().to_owned(),
          expected: dimension.extra_columns.len(),
          found:    m.extras.len(),
        });
      }
      Ok(PreparedMember {
        display: m.name.display().to_owned(),
        key:     m.name.key().to_owned(),
        extras:  encode_cells(&m.extras),
      })
    })
    .collect::<Result<Vec<_>>>()?;
  Ok((prepared, conflicts))
}

/// Folded key → (surrogate key, stored display name).
fn existing_members(
  tx: &Transaction<'_>,
  dimension: Dimension,
) -> rusqlite::Result<HashMap<String, (DimensionKey, String)>> {
  let sql = format!(
    "SELECT {}, {}, {} FROM {}",
    quote(dimension.id_column),
    quote(dimension.name_column),
    quote(dimension.key_column),
    quote(dimension.table),
  );
  let mut stmt = tx.prepare(&sql)?;
  let rows = stmt
    .query_map([], |row| Ok((row.get::<_, String>(2)?, (row.get(0)?, row.get(1)?))))?
    .collect::<rusqlite::Result<HashMap<_, _>>>()?;
  Ok(rows)
}

fn insert_member(
  tx: &Transaction<'_>,
  dimension: Dimension,
  member: &PreparedMember,
) -> rusqlite::Result<DimensionKey> {
  let mut columns = vec![dimension.name_column, dimension.key_column];
  columns.extend_from_slice(dimension.extra_columns);

  let mut values = vec![Value::Text(member.display.clone()), Value::Text(member.key.clone())];
  values.extend(member.extras.iter().cloned());

  tx.execute(&insert_sql(dimension.table, &columns), params_from_iter(values))?;
  Ok(tx.last_insert_rowid())
}

// ─── LoadStore impl ──────────────────────────────────────────────────────────

impl LoadStore for SqliteStore {
  type Error = Error;

  // ── Dimensions ────────────────────────────────────────────────────────────

  async fn resolve(
    &self,
    dimension: Dimension,
    members: Vec<Member>,
    mode: DimensionMode,
  ) -> Result<Resolution> {
    self
      .resolve_members(dimension, members, mode == DimensionMode::Open)
      .await
  }

  async fn seed(&self, dimension: Dimension, members: Vec<Member>) -> Result<Resolution> {
    self.resolve_members(dimension, members, true).await
  }

  async fn refresh(&self, dimension: Dimension, members: Vec<Member>) -> Result<RefreshCount> {
    let (prepared, batch_conflicts) = prepare_members(dimension, members)?;
    if prepared.is_empty() {
      return Ok(RefreshCount { conflicts: batch_conflicts, ..RefreshCount::default() });
    }

    let mut count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing = existing_members(&tx, dimension)?;
        let update = update_extras_sql(dimension.table, dimension.extra_columns, dimension.key_column);
        let mut count = RefreshCount::default();

        for member in &prepared {
          if let Some((_, stored)) = existing.get(&member.key) {
            if *stored != member.display {
              count.conflicts.push(SpellingConflict {
                key:       member.key.clone(),
                canonical: stored.clone(),
                observed:  member.display.clone(),
              });
            }
            if !dimension.extra_columns.is_empty() {
              let mut values = member.extras.clone();
              values.push(Value::Text(member.key.clone()));
              tx.execute(&update, params_from_iter(values))?;
            }
            count.updated += 1;
          } else {
            insert_member(&tx, dimension, member)?;
            count.inserted += 1;
          }
        }

        tx.commit()?;
        Ok(count)
      })
      .await?;

    count.conflicts.splice(0..0, batch_conflicts);

    tracing::debug!(
      table = dimension.table,
      inserted = count.inserted,
      updated = count.updated,
      conflicts = count.conflicts.len(),
      "refreshed dimension"
    );
    Ok(count)
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn upsert(&self, table: FactTable, rows: Vec<FactRow>) -> Result<usize> {
    if rows.is_empty() {
      return Ok(0);
    }

    table.validate()?;
    for row in &rows {
      table.check_row(row)?;
    }

    let columns = table.columns();
    let sql = match table.mode {
      WriteMode::Append => insert_sql(table.table, &columns),
      WriteMode::Upsert { conflict } => upsert_sql(table.table, &columns, conflict),
    };
    let batch: Vec<Vec<Value>> = rows.iter().map(|r| encode_cells(&r.cells())).collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0usize;
        {
          let mut stmt = tx.prepare(&sql)?;
          for values in batch {
            stmt.execute(params_from_iter(values))?;
            written += 1;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::debug!(table = table.table, rows = written, mode = ?table.mode, "wrote fact rows");
    Ok(written)
  }
}
