//! Member use-case service backing the HTTP endpoints and CLI seeding.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Listing always maps entities to `MemberDto` before leaving the core.

use crate::model::dto::MemberDto;
use crate::model::member::{Member, MemberId};
use crate::paging::{Page, PageRequest};
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoResult;
use log::info;

pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn find_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.repo.find_by_id(&id)
    }

    /// Returns the username of the member with `id`, if it exists.
    pub fn username_of(&self, id: MemberId) -> RepoResult<Option<String>> {
        Ok(self.repo.find_by_id(&id)?.map(|member| member.username))
    }

    /// Lists one page of members as DTOs, team names included.
    pub fn list_members(&self, request: &PageRequest) -> RepoResult<Page<MemberDto>> {
        Ok(self.repo.find_all_paged(request)?.map(MemberDto::from))
    }

    /// Inserts `user0..user{count-1}` with age equal to the index.
    ///
    /// Returns the number of members inserted.
    pub fn seed_members(&self, count: u32) -> RepoResult<u32> {
        for index in 0..count {
            let age = i32::try_from(index).unwrap_or(i32::MAX);
            let mut member = Member::with_age(format!("user{index}"), age);
            self.repo.save(&mut member)?;
        }
        info!("event=member_seed module=service status=ok count={count}");
        Ok(count)
    }
}
