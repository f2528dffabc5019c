//! Core persistence layer for the roster service.
//!
//! Members, teams and items stored in SQLite, with repository-style query
//! methods, paging, projections, Query-by-Example and write auditing.

pub mod audit;
pub mod db;
pub mod logging;
pub mod model;
pub mod paging;
pub mod query_by_example;
pub mod repo;
pub mod service;

pub use audit::{
    Auditing, AuditorAware, Clock, FixedAuditor, FixedClock, RandomUuidAuditor, SystemClock,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::dto::MemberDto;
pub use model::item::Item;
pub use model::member::{Member, MemberId, TeamRef};
pub use model::team::{Team, TeamId};
pub use model::{ModelError, Persistable};
pub use paging::{Direction, Order, Page, PageRequest, PagingError, Slice, Sort};
pub use query_by_example::{Example, ExampleMatcher, StringMatcher};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::member_repo::{MemberRepository, MemberRepositoryCustom, SqliteMemberRepository};
pub use repo::projection::{
    MemberProjection, NestedClosedProjection, Projection, TeamInfo, UsernameOnly,
    UsernameOnlyDto,
};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{CrudRepository, FetchPlan, QueryByExampleExecutor, ReadOnly, RepoError, RepoResult};
pub use service::member_service::MemberService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
