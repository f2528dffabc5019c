//! Item repository with client-assigned identifiers.
//!
//! # Invariants
//! - `save` inserts when `Item::is_new()` and merges otherwise; it never
//!   decides newness from the presence of an id.
//! - Merging an item whose row has disappeared re-inserts it with the
//!   timestamps it already carries.

use crate::audit::Auditing;
use crate::model::base::TimeAudit;
use crate::model::item::Item;
use crate::model::Persistable;
use crate::repo::{CrudRepository, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT item_id, created_date, last_modified_date FROM item";

pub trait ItemRepository: CrudRepository<Item> {}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    auditing: Auditing,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_auditing(conn, Auditing::default())
    }

    pub fn with_auditing(conn: &'conn Connection, auditing: Auditing) -> Self {
        Self { conn, auditing }
    }

    fn insert(&self, id: &str, audit: &TimeAudit) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO item (item_id, created_date, last_modified_date) VALUES (?1, ?2, ?3);",
            params![id, audit.created_date, audit.last_modified_date],
        )?;
        Ok(())
    }

    fn query_items(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

impl CrudRepository<Item> for SqliteItemRepository<'_> {
    fn save(&self, item: &mut Item) -> RepoResult<String> {
        item.validate()?;
        let mut audit = item.audit.clone();

        if item.is_new() {
            self.auditing.on_create_time(&mut audit);
            self.insert(&item.id, &audit)?;
            debug!("event=item_save module=repo status=ok op=insert");
        } else {
            self.auditing.on_update_time(&mut audit);
            let changed = self.conn.execute(
                "UPDATE item SET last_modified_date = ?1 WHERE item_id = ?2;",
                params![audit.last_modified_date, item.id.as_str()],
            )?;
            if changed == 0 {
                self.insert(&item.id, &audit)?;
                debug!("event=item_save module=repo status=ok op=merge_insert");
            } else {
                debug!("event=item_save module=repo status=ok op=merge_update");
            }
        }

        item.audit = audit;
        Ok(item.id.clone())
    }

    fn find_by_id(&self, id: &String) -> RepoResult<Option<Item>> {
        let mut items = self.query_items(
            &format!("{ITEM_SELECT_SQL} WHERE item_id = ?1;"),
            [id.as_str()],
        )?;
        Ok(items.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Item>> {
        self.query_items(&format!("{ITEM_SELECT_SQL} ORDER BY item_id ASC;"), [])
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM item;", [], |row| row.get::<_, i64>(0))?;
        Ok(count.unsigned_abs())
    }

    fn delete_by_id(&self, id: &String) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM item WHERE item_id = ?1;", [id.as_str()])?;
        Ok(changed > 0)
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let changed = self.conn.execute("DELETE FROM item;", [])?;
        Ok(changed as u64)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    Ok(Item {
        id: row.get("item_id")?,
        audit: TimeAudit {
            created_date: Some(row.get("created_date")?),
            last_modified_date: Some(row.get("last_modified_date")?),
        },
    })
}
