use roster_core::db::open_db_in_memory;
use roster_core::{
    Auditing, CrudRepository, FixedAuditor, FixedClock, Item, Persistable, SqliteItemRepository,
};

#[test]
fn assigned_id_item_is_new_until_first_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let mut item = Item::new("A");
    assert!(item.is_new());

    let id = repo.save(&mut item).unwrap();
    assert_eq!(id, "A");
    assert!(!item.is_new());

    let loaded = repo.find_by_id(&"A".to_string()).unwrap().unwrap();
    assert_eq!(loaded, item);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn saving_existing_item_merges_and_keeps_created_date() {
    let conn = open_db_in_memory().unwrap();
    let first = SqliteItemRepository::with_auditing(
        &conn,
        Auditing::new(FixedAuditor::new("tester"), FixedClock(1_000)),
    );
    let mut item = Item::new("B");
    first.save(&mut item).unwrap();

    let later = SqliteItemRepository::with_auditing(
        &conn,
        Auditing::new(FixedAuditor::new("tester"), FixedClock(5_000)),
    );
    later.save(&mut item).unwrap();

    let loaded = later.find_by_id(&"B".to_string()).unwrap().unwrap();
    assert_eq!(loaded.audit.created_date, Some(1_000));
    assert_eq!(loaded.audit.last_modified_date, Some(5_000));
    assert_eq!(later.count().unwrap(), 1);
}

#[test]
fn merging_a_deleted_item_reinserts_it() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);
    let mut item = Item::new("C");
    repo.save(&mut item).unwrap();
    assert!(repo.delete(&item).unwrap());
    assert_eq!(repo.count().unwrap(), 0);

    repo.save(&mut item).unwrap();
    assert!(repo.exists_by_id(&"C".to_string()).unwrap());
}

#[test]
fn inserting_a_new_item_twice_fails_on_primary_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);
    repo.save(&mut Item::new("D")).unwrap();

    let err = repo.save(&mut Item::new("D")).unwrap_err();
    assert!(err.to_string().contains("UNIQUE"));
}

#[test]
fn blank_item_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);
    assert!(repo.save(&mut Item::new(" ")).is_err());
}
