//! Member read endpoints.

use crate::error::ApiError;
use crate::extract::{MemberPath, Pageable};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use log::info;
use roster_core::{MemberDto, MemberId, MemberService, Page};

/// `GET /members/{id}`: username as plain text.
pub async fn find_member(
    State(state): State<AppState>,
    Path(id): Path<MemberId>,
) -> Result<String, ApiError> {
    state
        .with_members(|repo| MemberService::new(repo).username_of(id))?
        .ok_or_else(|| ApiError::not_found(format!("member not found: {id}")))
}

/// `GET /members2/{id}`: same response, member resolved by the extractor.
pub async fn find_member_by_path(MemberPath(member): MemberPath) -> String {
    member.username
}

/// `GET /members`: one page of members with their team names.
pub async fn list_members(
    State(state): State<AppState>,
    Pageable(request): Pageable,
) -> Result<Json<Page<MemberDto>>, ApiError> {
    let page = state.with_members(|repo| MemberService::new(repo).list_members(&request))?;
    info!(
        "event=member_list module=web status=ok page={} size={} returned={}",
        page.number(),
        page.size(),
        page.number_of_elements()
    );
    Ok(Json(page))
}
