//! Generic SQLite repository.
//!
//! # Responsibility
//! - Implement `Repository<E>` once for every kind that knows its row shape
//!   (`SqliteRecord`).
//! - Provide the narrow cross-kind lookups the integrity layer needs
//!   (existence, unique-column owner, dependent counts).
//!
//! # Invariants
//! - Listing order is numeric by identifier suffix (`length(id), id`).
//! - Table and column names only ever come from static schema constants.

use super::records::SqliteRecord;
use super::{RepoError, RepoResult, Repository};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::{EntityId, EntityKind, ForeignKeyField};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::marker::PhantomData;

const ORDER_BY_ID: &str = "ORDER BY length(id) ASC, id ASC";

/// SQLite-backed repository for entity kind `E`.
pub struct SqliteRepository<'conn, E> {
    conn: &'conn Connection,
    _kind: PhantomData<fn() -> E>,
}

impl<'conn, E: SqliteRecord> SqliteRepository<'conn, E> {
    /// Creates a repository after checking the connection is migrated and
    /// carries this kind's table.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table_ready(conn, E::KIND.table(), E::COLUMNS)?;
        Ok(Self::new(conn))
    }

    /// Creates a repository on a connection already checked by
    /// `ensure_connection_ready`.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _kind: PhantomData,
        }
    }

    fn select_sql(&self) -> String {
        format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::KIND.table())
    }

    fn query_list(&self, sql: &str, params: &[&str]) -> RepoResult<Vec<E>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(E::from_row(row)?);
        }
        Ok(items)
    }
}

impl<E: SqliteRecord> Repository<E> for SqliteRepository<'_, E> {
    fn get(&self, id: &E::Id) -> RepoResult<Option<E>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1;", self.select_sql()))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }
        Ok(None)
    }

    fn put(&self, entity: &E) -> RepoResult<()> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments = E::COLUMNS
            .iter()
            .filter(|column| **column != "id")
            .map(|column| format!("{column} = excluded.{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {table} ({columns}) VALUES ({placeholders})
             ON CONFLICT(id) DO UPDATE SET {assignments};",
            table = E::KIND.table(),
            columns = E::COLUMNS.join(", "),
        );
        self.conn
            .execute(&sql, params_from_iter(entity.to_values()))?;
        Ok(())
    }

    fn delete(&self, id: &E::Id) -> RepoResult<bool> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", E::KIND.table()),
            [id.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn list_all(&self) -> RepoResult<Vec<E>> {
        self.query_list(&format!("{} {ORDER_BY_ID};", self.select_sql()), &[])
    }

    fn list_by_foreign_key(&self, field: E::ForeignKey, value: &str) -> RepoResult<Vec<E>> {
        let sql = format!(
            "{} WHERE {} = ?1 {ORDER_BY_ID};",
            self.select_sql(),
            field.column()
        );
        self.query_list(&sql, &[value])
    }
}

/// Returns whether an entity of `kind` with `id` exists.
pub fn record_exists(conn: &Connection, kind: EntityKind, id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            kind.table()
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns the id of another `kind` row already holding `value` in `column`.
pub fn unique_value_owner(
    conn: &Connection,
    kind: EntityKind,
    column: &str,
    value: &str,
    exclude_id: &str,
) -> RepoResult<Option<String>> {
    let owner = conn
        .query_row(
            &format!(
                "SELECT id FROM {} WHERE {column} = ?1 AND id <> ?2 LIMIT 1;",
                kind.table()
            ),
            [value, exclude_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

/// Counts `kind` rows whose foreign key `field` equals `value`.
pub fn count_by_foreign_key<F: ForeignKeyField>(
    conn: &Connection,
    kind: EntityKind,
    field: F,
    value: &str,
) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1;",
            kind.table(),
            field.column()
        ),
        [value],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
}

/// Counts every row of `kind`.
pub fn count_all(conn: &Connection, kind: EntityKind) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", kind.table()),
        [],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
}

/// Largest numeric id suffix in use for `kind`, `0` when the table is empty.
pub fn max_sequence(conn: &Connection, kind: EntityKind) -> RepoResult<u64> {
    let prefix = kind.id_prefix();
    let mut stmt = conn.prepare(&format!("SELECT id FROM {};", kind.table()))?;
    let mut rows = stmt.query([])?;
    let mut max = 0_u64;
    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let sequence = id
            .strip_prefix(prefix)
            .and_then(|digits| digits.parse::<u64>().ok())
            .ok_or_else(|| {
                RepoError::InvalidData(format!("{kind} id `{id}` has no numeric suffix"))
            })?;
        max = max.max(sequence);
    }
    Ok(max)
}

/// Checks that the connection is migrated and every kind's table is present
/// with the expected columns.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    use crate::model::{Admin, Blood, BloodBank, Donor, EmployeeTeam, Hospital, Patient};
    SqliteRepository::<Admin>::try_new(conn)?;
    SqliteRepository::<BloodBank>::try_new(conn)?;
    SqliteRepository::<Blood>::try_new(conn)?;
    SqliteRepository::<Donor>::try_new(conn)?;
    SqliteRepository::<Patient>::try_new(conn)?;
    SqliteRepository::<EmployeeTeam>::try_new(conn)?;
    SqliteRepository::<Hospital>::try_new(conn)?;
    Ok(())
}

fn ensure_schema_version(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &'static [&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
