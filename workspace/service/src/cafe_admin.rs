//! Cafe and menu maintenance for administrators.

use chrono::Utc;
use common::{CafeDetail, CafeInput, DishInput, DishSummary, Page};
use model::entities::cafe::{self, CafeStatus};
use model::entities::{dish, review};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::cafe_detail::{approved_review_stats, cafe_summary, dish_summary, list_cafe_page, CafeFilter};
use crate::error::{Result, ServiceError};

/// `None` when no status was given.
fn parse_cafe_status(raw: Option<&str>) -> Result<Option<CafeStatus>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => CafeStatus::parse(value)
            .map(Some)
            .ok_or_else(|| ServiceError::Validation(format!("Unknown cafe status '{}'", value))),
    }
}

/// Blank optional text is stored as `NULL`.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found(cafe_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Cafe {} not found", cafe_id))
}

fn apply_dish(active: &mut dish::ActiveModel, input: DishInput) {
    active.name = Set(input.name.trim().to_string());
    active.price = Set(input.price);
    active.description = Set(optional_text(input.description));
    active.image = Set(optional_text(input.image));
    active.updated_on = Set(Utc::now().naive_utc());
}

#[derive(Clone, Debug)]
pub struct CafeAdminService {
    db: DatabaseConnection,
}

impl CafeAdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cafes of any status matching `filter`, by name.
    #[instrument(skip(self))]
    pub async fn list_cafes(
        &self,
        filter: CafeFilter,
        page_index: u64,
        page_size: u64,
    ) -> Result<Page<common::CafeSummary>> {
        list_cafe_page(&self.db, &filter, page_index, page_size).await
    }

    #[instrument(skip(self))]
    pub async fn get_cafe(&self, cafe_id: i32) -> Result<CafeDetail> {
        let cafe = cafe::Entity::find_by_id(cafe_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(cafe_id))?;
        let dishes = dish::Entity::find()
            .filter(dish::Column::CafeId.eq(cafe_id))
            .order_by_asc(dish::Column::Name)
            .order_by_asc(dish::Column::Id)
            .all(&self.db)
            .await?;
        let stats = approved_review_stats(&self.db, vec![cafe_id]).await?;

        Ok(CafeDetail {
            cafe: cafe_summary(cafe, &stats),
            dishes: dishes.into_iter().map(dish_summary).collect(),
        })
    }

    /// Creates a cafe together with its initial menu.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_cafe(&self, input: CafeInput) -> Result<CafeDetail> {
        input.validate()?;
        let status = parse_cafe_status(input.status.as_deref())?.unwrap_or(CafeStatus::Opening);

        let txn = self.db.begin().await?;
        let cafe = cafe::ActiveModel {
            name: Set(input.name.trim().to_string()),
            address: Set(input.address.trim().to_string()),
            description: Set(optional_text(input.description)),
            image: Set(optional_text(input.image)),
            opening_hours: Set(optional_text(input.opening_hours)),
            status: Set(status),
            created_on: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(dishes) = input.dishes {
            replace_menu(&txn, cafe.id, dishes).await?;
        }
        txn.commit().await?;

        info!("Cafe {} created", cafe.id);
        self.get_cafe(cafe.id).await
    }

    /// Overwrites the cafe fields. The status and the menu change only when
    /// the input carries them.
    #[instrument(skip(self, input))]
    pub async fn update_cafe(&self, cafe_id: i32, input: CafeInput) -> Result<CafeDetail> {
        input.validate()?;
        let status = parse_cafe_status(input.status.as_deref())?;

        let txn = self.db.begin().await?;
        let Some(existing) = cafe::Entity::find_by_id(cafe_id).one(&txn).await? else {
            warn!("Cafe {} not found for update", cafe_id);
            return Err(not_found(cafe_id));
        };

        let mut active: cafe::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.address = Set(input.address.trim().to_string());
        active.description = Set(optional_text(input.description));
        active.image = Set(optional_text(input.image));
        active.opening_hours = Set(optional_text(input.opening_hours));
        if let Some(status) = status {
            active.status = Set(status);
        }
        active.update(&txn).await?;

        if let Some(dishes) = input.dishes {
            replace_menu(&txn, cafe_id, dishes).await?;
        }
        txn.commit().await?;

        info!("Cafe {} updated", cafe_id);
        self.get_cafe(cafe_id).await
    }

    /// Deletes a cafe with its dishes and reviews.
    #[instrument(skip(self))]
    pub async fn delete_cafe(&self, cafe_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;
        let dishes = dish::Entity::delete_many()
            .filter(dish::Column::CafeId.eq(cafe_id))
            .exec(&txn)
            .await?;
        let reviews = review::Entity::delete_many()
            .filter(review::Column::CafeId.eq(cafe_id))
            .exec(&txn)
            .await?;
        let result = cafe::Entity::delete_by_id(cafe_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            warn!("Cafe {} not found for deletion", cafe_id);
            return Err(not_found(cafe_id));
        }
        txn.commit().await?;

        info!(
            "Cafe {} deleted with {} dishes and {} reviews",
            cafe_id, dishes.rows_affected, reviews.rows_affected
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_dish(&self, dish_id: i32) -> Result<DishSummary> {
        dish::Entity::find_by_id(dish_id)
            .one(&self.db)
            .await?
            .map(dish_summary)
            .ok_or_else(|| ServiceError::NotFound(format!("Dish {} not found", dish_id)))
    }

    /// Edits one dish in place. Its cafe cannot change and `input.id` is ignored.
    #[instrument(skip(self, input))]
    pub async fn update_dish(&self, dish_id: i32, input: DishInput) -> Result<DishSummary> {
        input.validate()?;

        let Some(existing) = dish::Entity::find_by_id(dish_id).one(&self.db).await? else {
            warn!("Dish {} not found for update", dish_id);
            return Err(ServiceError::NotFound(format!("Dish {} not found", dish_id)));
        };

        let mut active: dish::ActiveModel = existing.into();
        apply_dish(&mut active, input);
        let saved = active.update(&self.db).await?;

        info!("Dish {} of cafe {} updated", saved.id, saved.cafe_id);
        Ok(dish_summary(saved))
    }
}

/// Makes the menu of `cafe_id` equal to `dishes`: listed ids are updated,
/// entries without an id are inserted and everything else is removed.
async fn replace_menu(txn: &DatabaseTransaction, cafe_id: i32, dishes: Vec<DishInput>) -> Result<()> {
    let existing = dish::Entity::find()
        .filter(dish::Column::CafeId.eq(cafe_id))
        .all(txn)
        .await?;

    let kept: Vec<i32> = dishes.iter().filter_map(|d| d.id).collect();
    if let Some(unknown) = kept.iter().find(|id| !existing.iter().any(|d| d.id == **id)) {
        return Err(ServiceError::Validation(format!(
            "Dish {} does not belong to cafe {}",
            unknown, cafe_id
        )));
    }

    let removed = dish::Entity::delete_many()
        .filter(dish::Column::CafeId.eq(cafe_id))
        .filter(dish::Column::Id.is_not_in(kept))
        .exec(txn)
        .await?;

    for input in dishes {
        match input.id.and_then(|id| existing.iter().find(|d| d.id == id)) {
            Some(current) => {
                let mut active: dish::ActiveModel = current.clone().into();
                apply_dish(&mut active, input);
                active.update(txn).await?;
            }
            None => {
                let mut active = dish::ActiveModel {
                    cafe_id: Set(cafe_id),
                    ..Default::default()
                };
                apply_dish(&mut active, input);
                active.insert(txn).await?;
            }
        }
    }

    debug!("Menu of cafe {} replaced, {} dishes removed", cafe_id, removed.rows_affected);
    Ok(())
}
