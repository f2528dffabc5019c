//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQL details from service orchestration and HTTP handlers.
//!
//! # Invariants
//! - Write paths validate entities before SQL mutations.
//! - Audit metadata is stamped inside `save`, never by callers.
//! - Single-result queries fail with `IncorrectResultSize` instead of
//!   silently picking one row.

use crate::db::DbError;
use crate::model::{ModelError, Persistable};
use crate::paging::PagingError;
use crate::query_by_example::Example;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

#[macro_use]
mod sql;
pub mod item_repo;
pub mod member_repo;
pub mod projection;
pub mod team_repo;

pub use sql::named_query;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelError),
    Db(DbError),
    NotFound { entity: &'static str, id: String },
    IncorrectResultSize { expected: usize, actual: usize },
    InvalidData(String),
    InvalidSort(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::IncorrectResultSize { expected, actual } => write!(
                f,
                "incorrect result size: expected {expected}, actual {actual}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::InvalidSort(property) => write!(f, "unknown sort property `{property}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<PagingError> for RepoError {
    fn from(value: PagingError) -> Self {
        match value {
            PagingError::UnknownSortProperty(property) => Self::InvalidSort(property),
            PagingError::InvalidSize(_) => Self::InvalidData(value.to_string()),
        }
    }
}

/// Basic CRUD contract shared by every entity repository.
pub trait CrudRepository<T: Persistable> {
    /// Inserts when `entity.is_new()`, otherwise updates. On success the
    /// entity carries its id and fresh audit metadata.
    fn save(&self, entity: &mut T) -> RepoResult<T::Id>;
    fn find_by_id(&self, id: &T::Id) -> RepoResult<Option<T>>;
    fn find_all(&self) -> RepoResult<Vec<T>>;
    fn count(&self) -> RepoResult<u64>;
    /// Returns whether a row was removed. Missing ids are not an error.
    fn delete_by_id(&self, id: &T::Id) -> RepoResult<bool>;
    fn delete_all(&self) -> RepoResult<u64>;

    fn exists_by_id(&self, id: &T::Id) -> RepoResult<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }

    fn delete(&self, entity: &T) -> RepoResult<bool> {
        match entity.id() {
            Some(id) => self.delete_by_id(&id),
            None => Ok(false),
        }
    }
}

/// Query-by-Example operations.
pub trait QueryByExampleExecutor<T> {
    fn find_all_by_example(&self, example: &Example<T>) -> RepoResult<Vec<T>>;
    fn find_one_by_example(&self, example: &Example<T>) -> RepoResult<Option<T>>;
    fn count_by_example(&self, example: &Example<T>) -> RepoResult<u64>;

    fn exists_by_example(&self, example: &Example<T>) -> RepoResult<bool> {
        Ok(self.count_by_example(example)? > 0)
    }
}

/// Which associations a member query fetches together with the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Team stays a `TeamRef::Reference`.
    Lazy,
    /// Team is joined and returned as `TeamRef::Loaded`.
    WithTeam,
}

impl FetchPlan {
    /// Looks up a named entity graph.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "Member.all" => Some(Self::WithTeam),
            _ => None,
        }
    }
}

/// Result of a read-only query.
///
/// The wrapped entity can be inspected but not handed to `save`; take an
/// owned copy with `into_detached` to write it back deliberately.
///
/// ```compile_fail
/// use roster_core::db::open_db_in_memory;
/// use roster_core::{CrudRepository, MemberRepository, SqliteMemberRepository};
///
/// let conn = open_db_in_memory().unwrap();
/// let repo = SqliteMemberRepository::new(&conn);
/// let mut member = repo.find_read_only_by_username("m1").unwrap().unwrap();
/// repo.save(&mut member).unwrap();
/// ```
///
/// ```
/// use roster_core::db::open_db_in_memory;
/// use roster_core::{CrudRepository, Member, MemberRepository, SqliteMemberRepository};
///
/// let conn = open_db_in_memory().unwrap();
/// let repo = SqliteMemberRepository::new(&conn);
/// repo.save(&mut Member::with_age("m1", 10)).unwrap();
///
/// let read_only = repo.find_read_only_by_username("m1").unwrap().unwrap();
/// let mut member = read_only.into_detached();
/// member.age = 11;
/// repo.save(&mut member).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnly<T>(T);

impl<T> ReadOnly<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_detached(self) -> T {
        self.0
    }
}

impl<T> Deref for ReadOnly<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Collapses rows of a single-result query.
pub(crate) fn single_result<T>(mut rows: Vec<T>) -> RepoResult<Option<T>> {
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        actual => Err(RepoError::IncorrectResultSize {
            expected: 1,
            actual,
        }),
    }
}

pub(crate) fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
