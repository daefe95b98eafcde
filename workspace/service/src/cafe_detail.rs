//! Data behind the public pages: the cafe listing, the cafe itself with its
//! menu and approved reviews, plus submission of new reviews.

use std::collections::HashMap;

use chrono::Utc;
use common::{CafeSummary, DishSummary, Page, ReviewSummary};
use model::entities::cafe::{self, CafeStatus};
use model::entities::{dish, review, user};
use model::review_query::ReviewFilter;
use model::search::{contains_pattern, normalize_keyword};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, instrument, trace};
use validator::Validate;

use crate::clamp_page_size;
use crate::error::{Result, ServiceError};

/// Name shown for reviews whose author row is missing.
const UNKNOWN_AUTHOR: &str = "Unknown";

/// A review as submitted, before it is persisted.
#[derive(Debug, Validate)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5, message = "star must be between 1 and 5"))]
    pub star: i32,
    #[validate(length(min = 1, max = 2000, message = "content must be 1 to 2000 characters"))]
    pub content: String,
}

impl NewReview {
    /// Surrounding whitespace is not part of the review.
    pub fn new(star: i32, content: &str) -> Self {
        Self {
            star,
            content: content.trim().to_string(),
        }
    }
}

/// Filter over the `cafes` table. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CafeFilter {
    pub status: Option<CafeStatus>,
    /// Matched against the cafe name and address.
    pub keyword: Option<String>,
}

impl CafeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Option<CafeStatus>) -> Self {
        self.status = status;
        self
    }

    /// Blank keywords are ignored.
    pub fn keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = normalize_keyword(keyword);
        self
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = self.status {
            condition = condition.add(cafe::Column::Status.eq(status));
        }
        if let Some(keyword) = &self.keyword {
            condition = condition.add(
                Condition::any()
                    .add(cafe::Column::Name.like(contains_pattern(keyword)))
                    .add(cafe::Column::Address.like(contains_pattern(keyword))),
            );
        }
        condition
    }
}

/// Approved review count and star total of one cafe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ReviewStats {
    pub count: u64,
    pub star_total: i64,
}

impl ReviewStats {
    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.star_total as f64 / self.count as f64)
    }
}

/// Review statistics for the given cafes in a single grouped query.
/// Cafes without approved reviews are absent from the map.
pub(crate) async fn approved_review_stats<C: ConnectionTrait>(
    db: &C,
    cafe_ids: Vec<i32>,
) -> Result<HashMap<i32, ReviewStats>> {
    if cafe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i64, Option<i64>)> = review::Entity::find()
        .select_only()
        .column(review::Column::CafeId)
        .column_as(review::Column::Id.count(), "review_count")
        .column_as(review::Column::Star.sum(), "star_total")
        .filter(review::Column::Status.eq(review::ReviewStatus::Approved))
        .filter(review::Column::CafeId.is_in(cafe_ids))
        .group_by(review::Column::CafeId)
        .into_tuple()
        .all(db)
        .await?;
    trace!("Review stats for {} cafes", rows.len());

    Ok(rows
        .into_iter()
        .map(|(cafe_id, count, star_total)| {
            let stats = ReviewStats {
                count: u64::try_from(count).unwrap_or_default(),
                star_total: star_total.unwrap_or_default(),
            };
            (cafe_id, stats)
        })
        .collect())
}

pub(crate) fn cafe_summary(cafe: cafe::Model, stats: &HashMap<i32, ReviewStats>) -> CafeSummary {
    let stats = stats.get(&cafe.id).copied().unwrap_or_default();
    CafeSummary {
        id: cafe.id,
        name: cafe.name,
        address: cafe.address,
        description: cafe.description,
        image: cafe.image,
        opening_hours: cafe.opening_hours,
        status: cafe.status.as_str().to_string(),
        review_count: stats.count,
        average_star: stats.average(),
    }
}

/// One page of cafes matching `filter`, ordered by name.
pub(crate) async fn list_cafe_page<C: ConnectionTrait>(
    db: &C,
    filter: &CafeFilter,
    page_index: u64,
    page_size: u64,
) -> Result<Page<CafeSummary>> {
    let page_size = clamp_page_size(page_size);
    let paginator = cafe::Entity::find()
        .filter(filter.condition())
        .order_by_asc(cafe::Column::Name)
        .order_by_asc(cafe::Column::Id)
        .paginate(db, page_size);

    let total_count = paginator.num_items().await?;
    let cafes = paginator.fetch_page(page_index).await?;
    debug!("Cafe listing returned {} of {} cafes", cafes.len(), total_count);

    let stats = approved_review_stats(db, cafes.iter().map(|c| c.id).collect()).await?;
    let items = cafes.into_iter().map(|c| cafe_summary(c, &stats)).collect();
    Ok(Page::new(items, page_index, page_size, total_count))
}

pub(crate) fn dish_summary(model: dish::Model) -> DishSummary {
    DishSummary {
        id: model.id,
        name: model.name,
        price: model.price,
        description: model.description,
        image: model.image,
        updated_on: model.updated_on,
    }
}

fn review_summary((review, author): (review::Model, Option<user::Model>)) -> ReviewSummary {
    ReviewSummary {
        id: review.id,
        author_name: author
            .map(|u| u.name)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        star: review.star,
        content: review.content,
        created_on: review.created_on,
    }
}

/// Read model and review submission for a single cafe.
#[derive(Clone, Debug)]
pub struct CafeDetailService {
    db: DatabaseConnection,
}

impl CafeDetailService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns `None` when no cafe has this id.
    #[instrument(skip(self))]
    pub async fn get_cafe_detail(&self, cafe_id: i32) -> Result<Option<CafeSummary>> {
        let Some(cafe) = cafe::Entity::find_by_id(cafe_id).one(&self.db).await? else {
            debug!("Cafe {} not found", cafe_id);
            return Ok(None);
        };

        let stats = approved_review_stats(&self.db, vec![cafe_id]).await?;
        Ok(Some(cafe_summary(cafe, &stats)))
    }

    /// Open cafes for the public listing, by name, optionally narrowed to
    /// names or addresses containing `keyword`.
    #[instrument(skip(self))]
    pub async fn list_cafes(
        &self,
        keyword: Option<String>,
        page_index: u64,
        page_size: u64,
    ) -> Result<Page<CafeSummary>> {
        let filter = CafeFilter::new()
            .status(Some(CafeStatus::Opening))
            .keyword(keyword);
        list_cafe_page(&self.db, &filter, page_index, page_size).await
    }

    /// Menu of a cafe ordered by dish name. Empty for unknown cafes.
    #[instrument(skip(self))]
    pub async fn get_dishes(&self, cafe_id: i32) -> Result<Vec<DishSummary>> {
        let dishes = dish::Entity::find()
            .filter(dish::Column::CafeId.eq(cafe_id))
            .order_by_asc(dish::Column::Name)
            .order_by_asc(dish::Column::Id)
            .all(&self.db)
            .await?;

        debug!("Fetched {} dishes for cafe {}", dishes.len(), cafe_id);
        Ok(dishes.into_iter().map(dish_summary).collect())
    }

    /// One page of the approved reviews of a cafe, newest first.
    ///
    /// With `star` set only reviews with exactly that rating are returned and
    /// `total_count` counts only those.
    #[instrument(skip(self))]
    pub async fn get_reviews(
        &self,
        cafe_id: i32,
        star: Option<i32>,
        page_index: u64,
        page_size: u64,
    ) -> Result<Page<ReviewSummary>> {
        let page_size = clamp_page_size(page_size);

        let paginator = ReviewFilter::visible_for_cafe(cafe_id)
            .star(star)
            .select()
            .find_also_related(user::Entity)
            .paginate(&self.db, page_size);

        let total_count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page_index).await?;

        debug!(
            "Fetched {} of {} reviews for cafe {} (page {}, size {})",
            rows.len(),
            total_count,
            cafe_id,
            page_index,
            page_size
        );

        let items = rows.into_iter().map(review_summary).collect();
        Ok(Page::new(items, page_index, page_size, total_count))
    }

    /// Stores a new review by `user` for the cafe. The review starts out
    /// pending and is hidden until a moderator approves it.
    #[instrument(skip(self, user, content), fields(user_id = user.id))]
    pub async fn save_review(
        &self,
        cafe_id: i32,
        user: &user::Model,
        star: i32,
        content: &str,
    ) -> Result<review::Model> {
        let new_review = NewReview::new(star, content);
        new_review.validate()?;

        if cafe::Entity::find_by_id(cafe_id).one(&self.db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Cafe {} not found", cafe_id)));
        }

        let saved = review::ActiveModel {
            cafe_id: Set(cafe_id),
            user_id: Set(user.id),
            star: Set(new_review.star),
            content: Set(new_review.content),
            status: Set(review::ReviewStatus::Pending),
            created_on: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Review {} saved for cafe {} by user {}", saved.id, cafe_id, user.id);
        Ok(saved)
    }
}
