//! Request extractors for paging parameters and member path ids.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use log::debug;
use roster_core::paging::MAX_PAGE_SIZE;
use roster_core::{CrudRepository, Member, MemberId, PageRequest, Sort};
use url::form_urlencoded;

/// Page size used when the request does not carry `size`.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// `page`, `size` and repeated `sort=prop[,prop...][,asc|desc]` query
/// parameters, resolved into a [`PageRequest`].
///
/// `size` above the global maximum is capped. Unknown sort properties are
/// only detected when the query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable(pub PageRequest);

impl Pageable {
    pub fn from_query(query: &str) -> Result<Self, ApiError> {
        let mut page = 0;
        let mut size = DEFAULT_PAGE_SIZE;
        let mut sort = Sort::unsorted();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "page" => page = parse_u32("page", &value)?,
                "size" => size = parse_u32("size", &value)?.min(MAX_PAGE_SIZE),
                "sort" => sort = sort.and(Sort::from_param(&value)),
                _ => {}
            }
        }

        Ok(Self(PageRequest::of_sorted(page, size, sort)?))
    }
}

fn parse_u32(name: &str, value: &str) -> Result<u32, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::bad_request(format!(
            "query parameter `{name}` must be a non-negative integer, got `{value}`"
        ))
    })
}

impl<S: Send + Sync> FromRequestParts<S> for Pageable {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_query(parts.uri.query().unwrap_or_default())
    }
}

/// Member loaded from the `{id}` path segment.
///
/// Missing members reject the request with 404 before the handler runs.
#[derive(Debug, Clone)]
pub struct MemberPath(pub Member);

impl FromRequestParts<AppState> for MemberPath {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<MemberId>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        debug!("event=member_path_resolve module=web member_id={id}");
        let member = state
            .with_members(|repo| repo.find_by_id(&id))?
            .ok_or_else(|| ApiError::not_found(format!("member not found: {id}")))?;
        Ok(Self(member))
    }
}
