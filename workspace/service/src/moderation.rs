//! Review moderation for administrators.

use common::{AdminReviewSummary, Page, ReviewStatusCounts};
use model::entities::review::{self, ReviewStatus};
use model::entities::user;
use model::review_query::ReviewFilter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use tracing::{debug, info, instrument, warn};

use crate::clamp_page_size;
use crate::error::{Result, ServiceError};

fn admin_summary((review, author): (review::Model, Option<user::Model>)) -> AdminReviewSummary {
    let (author_name, author_email) = author
        .map(|u| (u.name, u.email))
        .unwrap_or_default();
    AdminReviewSummary {
        id: review.id,
        cafe_id: review.cafe_id,
        user_id: review.user_id,
        author_name,
        author_email,
        star: review.star,
        content: review.content,
        status: review.status.as_str().to_string(),
        created_on: review.created_on,
    }
}

#[derive(Clone, Debug)]
pub struct ModerationService {
    db: DatabaseConnection,
}

impl ModerationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists reviews of any status matching `filter`, newest first.
    #[instrument(skip(self))]
    pub async fn list_reviews(
        &self,
        filter: ReviewFilter,
        page_index: u64,
        page_size: u64,
    ) -> Result<Page<AdminReviewSummary>> {
        let page_size = clamp_page_size(page_size);
        let paginator = filter
            .select()
            .find_also_related(user::Entity)
            .paginate(&self.db, page_size);

        let total_count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page_index).await?;
        debug!("Moderation listing returned {} of {} reviews", rows.len(), total_count);

        let items = rows.into_iter().map(admin_summary).collect();
        Ok(Page::new(items, page_index, page_size, total_count))
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, review_id: i32) -> Result<AdminReviewSummary> {
        review::Entity::find_by_id(review_id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .map(admin_summary)
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", review_id)))
    }

    /// Moves a review to `status`. Setting the current status again is a no-op.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        review_id: i32,
        status: ReviewStatus,
    ) -> Result<AdminReviewSummary> {
        let Some(existing) = review::Entity::find_by_id(review_id).one(&self.db).await? else {
            warn!("Review {} not found for status update", review_id);
            return Err(ServiceError::NotFound(format!("Review {} not found", review_id)));
        };

        if existing.status != status {
            let previous = existing.status;
            let mut active: review::ActiveModel = existing.into();
            active.status = Set(status);
            active.update(&self.db).await?;
            info!(
                "Review {} moved from {} to {}",
                review_id,
                previous.as_str(),
                status.as_str()
            );
        }

        self.get_review(review_id).await
    }

    /// Approves every pending review and returns how many were changed.
    #[instrument(skip(self))]
    pub async fn approve_all_pending(&self) -> Result<u64> {
        let result = review::Entity::update_many()
            .col_expr(review::Column::Status, Expr::value(ReviewStatus::Approved))
            .filter(review::Column::Status.eq(ReviewStatus::Pending))
            .exec(&self.db)
            .await?;

        info!("Approved {} pending reviews", result.rows_affected);
        Ok(result.rows_affected)
    }

    #[instrument(skip(self))]
    pub async fn delete_review(&self, review_id: i32) -> Result<()> {
        let result = review::Entity::delete_by_id(review_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            warn!("Review {} not found for deletion", review_id);
            return Err(ServiceError::NotFound(format!("Review {} not found", review_id)));
        }
        info!("Review {} deleted", review_id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn count_by_status(&self) -> Result<ReviewStatusCounts> {
        let count = |status: ReviewStatus| {
            ReviewFilter::new().status(status).select().count(&self.db)
        };

        Ok(ReviewStatusCounts {
            pending: count(ReviewStatus::Pending).await?,
            approved: count(ReviewStatus::Approved).await?,
            rejected: count(ReviewStatus::Rejected).await?,
        })
    }
}
