use crate::database::dao::services::ServicesDao;
use crate::database::entities::{SubscriptionRecord, services, subscriptions};
use crate::database::{DatabaseError, DatabaseResult};
use crate::subscriptions::period;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

/// A subscription joined with its service display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i32,
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Fields accepted when creating or replacing a subscription
#[derive(Debug, Clone, Default)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Optional filters for list and aggregation queries
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Subscriptions DAO for database operations
#[derive(Clone)]
pub struct SubscriptionsDao {
    db: DatabaseConnection,
    services: ServicesDao,
}

impl SubscriptionsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        let services = ServicesDao::new(db.clone());
        Self { db, services }
    }

    /// Insert a new subscription, lazily creating its service row
    pub async fn create(&self, sub: &NewSubscription) -> DatabaseResult<i32> {
        let service_id = self.services.ensure(&sub.service_name).await?;

        let active_model = subscriptions::ActiveModel {
            id: ActiveValue::NotSet,
            service_id: Set(service_id),
            price: Set(sub.price),
            user_id: Set(sub.user_id.clone()),
            start_date: Set(sub.start_date.unwrap_or_else(Utc::now)),
            end_date: Set(sub.end_date),
            updated_at: Set(None),
        };

        let result = subscriptions::Entity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(result.last_insert_id)
    }

    /// Get a subscription by id, joined with its service name
    pub async fn get_by_id(&self, id: i32) -> DatabaseResult<Subscription> {
        let row = subscriptions::Entity::find_by_id(id)
            .find_also_related(services::Entity)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        match row {
            Some((sub, Some(service))) => Ok(to_subscription(sub, service.name)),
            _ => Err(DatabaseError::NotFound),
        }
    }

    /// Replace price, user, service reference and dates of an existing row.
    ///
    /// Zero rows affected is reported as NotFound; the query cannot tell a
    /// missing id from a no-op write, and both get the same answer.
    pub async fn update(&self, id: i32, sub: &NewSubscription) -> DatabaseResult<()> {
        let service_id = self.services.ensure(&sub.service_name).await?;

        let mut active_model = subscriptions::ActiveModel {
            service_id: Set(service_id),
            price: Set(sub.price),
            user_id: Set(sub.user_id.clone()),
            end_date: Set(sub.end_date),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        // The boundary requires a start date on update; an absent value
        // leaves the stored one in place rather than inventing a new one.
        if let Some(start) = sub.start_date {
            active_model.start_date = Set(start);
        }

        let result = subscriptions::Entity::update_many()
            .set(active_model)
            .filter(subscriptions::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    /// Delete a subscription. The service row is left in place.
    pub async fn delete(&self, id: i32) -> DatabaseResult<()> {
        let result = subscriptions::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    /// List subscriptions matching the filters; absent filters match all.
    /// Ordering is unspecified.
    pub async fn list(&self, filter: &SubscriptionFilter) -> DatabaseResult<Vec<Subscription>> {
        let rows = self
            .find_filtered(filter)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(sub, service)| service.map(|s| to_subscription(sub, s.name)))
            .collect())
    }

    /// Total spend across the inclusive month range `[from..to]`.
    ///
    /// Expands the range into calendar-month buckets and adds `price` for
    /// every subscription active in each bucket, so a subscription spanning
    /// three buckets contributes three times its price. Bounds arrive
    /// month-normalized from the service layer; the reversed-range guard is
    /// kept here as well so the query is a defined no-op on its own.
    pub async fn sum_total(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        filter: &SubscriptionFilter,
    ) -> DatabaseResult<i64> {
        if to < from {
            return Ok(0);
        }

        let rows = self
            .find_filtered(filter)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let mut total: i64 = 0;
        for month in period::month_span(from.date_naive(), to.date_naive()) {
            for (sub, _) in &rows {
                let start = sub.start_date.date_naive();
                let end = sub.end_date.map(|e| e.date_naive());
                if period::active_in_month(start, end, month) {
                    total += sub.price;
                }
            }
        }

        Ok(total)
    }

    fn find_filtered(
        &self,
        filter: &SubscriptionFilter,
    ) -> sea_orm::SelectTwo<subscriptions::Entity, services::Entity> {
        let mut select = subscriptions::Entity::find().find_also_related(services::Entity);

        if let Some(ref user_id) = filter.user_id {
            select = select.filter(subscriptions::Column::UserId.eq(user_id));
        }
        if let Some(ref name) = filter.service_name {
            select = select.filter(services::Column::Name.eq(name));
        }

        select
    }
}

fn to_subscription(row: SubscriptionRecord, service_name: String) -> Subscription {
    Subscription {
        id: row.id,
        service_name,
        price: row.price,
        user_id: row.user_id,
        start_date: row.start_date,
        end_date: row.end_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{month, test_connection};

    fn new_sub(service: &str, price: i64, user: &str, start: &str) -> NewSubscription {
        NewSubscription {
            service_name: service.to_string(),
            price,
            user_id: user.to_string(),
            start_date: Some(month(start)),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let id = dao
            .create(&new_sub("Netflix", 999, "user-1", "2025-01"))
            .await
            .unwrap();

        let sub = dao.get_by_id(id).await.unwrap();
        assert_eq!(sub.id, id);
        assert_eq!(sub.service_name, "Netflix");
        assert_eq!(sub.price, 999);
        assert_eq!(sub.user_id, "user-1");
        assert_eq!(sub.start_date, month("2025-01"));
        assert!(sub.end_date.is_none());
    }

    #[tokio::test]
    async fn test_create_reuses_existing_service() {
        let dao = SubscriptionsDao::new(test_connection().await);
        let services = dao.services.clone();

        dao.create(&new_sub("Netflix", 999, "user-1", "2025-01"))
            .await
            .unwrap();
        dao.create(&new_sub("Netflix", 799, "user-2", "2025-02"))
            .await
            .unwrap();

        assert_eq!(services.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_not_found() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let err = dao.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound));
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_stamps_updated_at() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let id = dao
            .create(&new_sub("Netflix", 999, "user-1", "2025-01"))
            .await
            .unwrap();

        let mut replacement = new_sub("Spotify", 199, "user-1", "2025-02");
        replacement.end_date = Some(month("2025-06"));
        dao.update(id, &replacement).await.unwrap();

        let sub = dao.get_by_id(id).await.unwrap();
        assert_eq!(sub.service_name, "Spotify");
        assert_eq!(sub.price, 199);
        assert_eq!(sub.start_date, month("2025-02"));
        assert_eq!(sub.end_date, Some(month("2025-06")));

        let row = subscriptions::Entity::find_by_id(id)
            .one(&dao.db)
            .await
            .unwrap()
            .unwrap();
        assert!(row.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_without_start_date_keeps_stored_date() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let id = dao
            .create(&new_sub("Netflix", 999, "user-1", "2025-01"))
            .await
            .unwrap();

        let mut replacement = new_sub("Netflix", 799, "user-1", "2025-03");
        replacement.start_date = None;
        dao.update(id, &replacement).await.unwrap();

        let sub = dao.get_by_id(id).await.unwrap();
        assert_eq!(sub.price, 799);
        assert_eq!(sub.start_date, month("2025-01"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let err = dao
            .update(42, &new_sub("Netflix", 999, "user-1", "2025-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_keeps_service_row() {
        let dao = SubscriptionsDao::new(test_connection().await);
        let services = dao.services.clone();

        let id = dao
            .create(&new_sub("Netflix", 999, "user-1", "2025-01"))
            .await
            .unwrap();
        dao.delete(id).await.unwrap();

        let err = dao.get_by_id(id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound));
        assert_eq!(services.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let err = dao.delete(42).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound));
    }

    #[tokio::test]
    async fn test_list_filter_combinations() {
        let dao = SubscriptionsDao::new(test_connection().await);

        dao.create(&new_sub("Netflix", 999, "U1", "2025-01"))
            .await
            .unwrap();
        dao.create(&new_sub("Netflix", 999, "U2", "2025-01"))
            .await
            .unwrap();
        dao.create(&new_sub("Spotify", 199, "U1", "2025-01"))
            .await
            .unwrap();

        let all = dao.list(&SubscriptionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_user = dao
            .list(&SubscriptionFilter {
                user_id: Some("U1".to_string()),
                service_name: None,
            })
            .await
            .unwrap();
        assert_eq!(by_user.len(), 2);

        let by_service = dao
            .list(&SubscriptionFilter {
                user_id: None,
                service_name: Some("Netflix".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_service.len(), 2);

        let by_both = dao
            .list(&SubscriptionFilter {
                user_id: Some("U1".to_string()),
                service_name: Some("Netflix".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].user_id, "U1");
        assert_eq!(by_both[0].service_name, "Netflix");
    }

    #[tokio::test]
    async fn test_list_no_match_is_empty_not_error() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let items = dao
            .list(&SubscriptionFilter {
                user_id: Some("nobody".to_string()),
                service_name: None,
            })
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_sum_total_counts_each_active_bucket() {
        let dao = SubscriptionsDao::new(test_connection().await);

        let mut sub = new_sub("Netflix", 10, "U1", "2025-03");
        sub.end_date = Some(month("2025-05"));
        dao.create(&sub).await.unwrap();

        // Active March through May: three buckets
        let total = dao
            .sum_total(
                month("2025-01"),
                month("2025-12"),
                &SubscriptionFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 30);
    }

    #[tokio::test]
    async fn test_sum_total_open_ended_counts_far_future() {
        let dao = SubscriptionsDao::new(test_connection().await);

        dao.create(&new_sub("Netflix", 10, "U1", "2025-01"))
            .await
            .unwrap();

        let total = dao
            .sum_total(
                month("2030-01"),
                month("2030-03"),
                &SubscriptionFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 30);
    }

    #[tokio::test]
    async fn test_sum_total_reversed_range_is_zero() {
        let dao = SubscriptionsDao::new(test_connection().await);

        dao.create(&new_sub("Netflix", 999, "U1", "2025-01"))
            .await
            .unwrap();

        let total = dao
            .sum_total(
                month("2025-06"),
                month("2025-01"),
                &SubscriptionFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_sum_total_applies_filters() {
        let dao = SubscriptionsDao::new(test_connection().await);

        dao.create(&new_sub("Netflix", 999, "U1", "2025-01"))
            .await
            .unwrap();
        dao.create(&new_sub("Spotify", 199, "U1", "2025-01"))
            .await
            .unwrap();
        dao.create(&new_sub("Netflix", 999, "U2", "2025-01"))
            .await
            .unwrap();

        let total = dao
            .sum_total(
                month("2025-01"),
                month("2025-01"),
                &SubscriptionFilter {
                    user_id: Some("U1".to_string()),
                    service_name: Some("Netflix".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(total, 999);
    }
}
