//! Explicit query builder for reviews.
//!
//! Every listing of reviews (public cafe pages and the moderation screens)
//! goes through [`ReviewFilter`], so the supported filter combinations live
//! in one place instead of being spread over many finder methods.

use crate::entities::{review, user};
use crate::search::{contains_pattern, normalize_keyword};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};
use tracing::trace;

/// Filter over the `reviews` table. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub cafe_id: Option<i32>,
    pub status: Option<review::ReviewStatus>,
    pub star: Option<i32>,
    /// Matched against the review content and the author's name.
    pub keyword: Option<String>,
}

impl ReviewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reviews of a cafe that may be shown to the public.
    pub fn visible_for_cafe(cafe_id: i32) -> Self {
        Self::new()
            .cafe(cafe_id)
            .status(review::ReviewStatus::Approved)
    }

    pub fn cafe(mut self, cafe_id: i32) -> Self {
        self.cafe_id = Some(cafe_id);
        self
    }

    pub fn status(mut self, status: review::ReviewStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn star(mut self, star: Option<i32>) -> Self {
        self.star = star;
        self
    }

    /// Blank keywords are ignored.
    pub fn keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = normalize_keyword(keyword);
        self
    }

    /// Builds the `WHERE` condition for this filter.
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(cafe_id) = self.cafe_id {
            condition = condition.add(review::Column::CafeId.eq(cafe_id));
        }
        if let Some(status) = self.status {
            condition = condition.add(review::Column::Status.eq(status));
        }
        if let Some(star) = self.star {
            condition = condition.add(review::Column::Star.eq(star));
        }
        if let Some(keyword) = &self.keyword {
            let authors = Query::select()
                .column(user::Column::Id)
                .from(user::Entity)
                .and_where(user::Column::Name.like(contains_pattern(keyword)))
                .to_owned();
            condition = condition.add(
                Condition::any()
                    .add(review::Column::Content.like(contains_pattern(keyword)))
                    .add(review::Column::UserId.in_subquery(authors)),
            );
        }

        condition
    }

    /// Select statement in display order: newest first, ties broken by id so
    /// that consecutive pages never overlap.
    pub fn select(&self) -> Select<review::Entity> {
        trace!("Building review query for filter: {:?}", self);
        review::Entity::find()
            .filter(self.condition())
            .order_by_desc(review::Column::CreatedOn)
            .order_by_desc(review::Column::Id)
    }
}
