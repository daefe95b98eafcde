//! Account administration: listing users and banning or unbanning them.

use common::{Page, UserSummary};
use model::entities::user::{self, UserRole, UserStatus};
use model::search::{contains_pattern, normalize_keyword};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::accounts::user_summary;
use crate::clamp_page_size;
use crate::error::{Result, ServiceError};

/// Filter over the `users` table. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Matched against name and email.
    pub keyword: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = normalize_keyword(keyword);
        self
    }

    pub fn role(mut self, role: Option<UserRole>) -> Self {
        self.role = role;
        self
    }

    pub fn status(mut self, status: Option<UserStatus>) -> Self {
        self.status = status;
        self
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(keyword) = &self.keyword {
            condition = condition.add(
                Condition::any()
                    .add(user::Column::Name.like(contains_pattern(keyword)))
                    .add(user::Column::Email.like(contains_pattern(keyword))),
            );
        }
        if let Some(role) = self.role {
            condition = condition.add(user::Column::Role.eq(role));
        }
        if let Some(status) = self.status {
            condition = condition.add(user::Column::Status.eq(status));
        }
        condition
    }
}

#[derive(Clone, Debug)]
pub struct UserAdminService {
    db: DatabaseConnection,
}

impl UserAdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Users matching `filter`, newest accounts first.
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        filter: UserFilter,
        page_index: u64,
        page_size: u64,
    ) -> Result<Page<UserSummary>> {
        let page_size = clamp_page_size(page_size);
        let paginator = user::Entity::find()
            .filter(filter.condition())
            .order_by_desc(user::Column::CreatedOn)
            .order_by_desc(user::Column::Id)
            .paginate(&self.db, page_size);

        let total_count = paginator.num_items().await?;
        let users = paginator.fetch_page(page_index).await?;
        debug!("User listing returned {} of {} users", users.len(), total_count);

        let items = users.into_iter().map(user_summary).collect();
        Ok(Page::new(items, page_index, page_size, total_count))
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i32) -> Result<UserSummary> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .map(user_summary)
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    /// Bans or unbans `user_id` on behalf of `admin`. Administrators cannot
    /// change their own status.
    #[instrument(skip(self, admin), fields(admin_id = admin.id))]
    pub async fn update_status(
        &self,
        admin: &user::Model,
        user_id: i32,
        status: UserStatus,
    ) -> Result<UserSummary> {
        if admin.id == user_id {
            warn!("Admin {} tried to change their own status", admin.id);
            return Err(ServiceError::Validation(
                "administrators cannot change their own status".to_string(),
            ));
        }

        let Some(existing) = user::Entity::find_by_id(user_id).one(&self.db).await? else {
            warn!("User {} not found for status update", user_id);
            return Err(ServiceError::NotFound(format!("User {} not found", user_id)));
        };

        if existing.status == status {
            return Ok(user_summary(existing));
        }

        let mut active: user::ActiveModel = existing.into();
        active.status = Set(status);
        let saved = active.update(&self.db).await?;

        info!("User {} is now {}", user_id, status.as_str());
        Ok(user_summary(saved))
    }
}
