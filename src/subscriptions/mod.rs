//! Subscription business rules on top of the store.
//!
//! Defaults an unset start date to the current UTC instant and normalizes
//! aggregation bounds to the first day of the month before delegating.
//! Everything else passes through to the DAO unchanged.

pub mod period;

use crate::database::{
    DatabaseResult, NewSubscription, Subscription, SubscriptionFilter, SubscriptionsDao,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn create(&self, sub: NewSubscription) -> DatabaseResult<i32>;

    async fn get_by_id(&self, id: i32) -> DatabaseResult<Subscription>;

    async fn update(&self, id: i32, sub: NewSubscription) -> DatabaseResult<()>;

    async fn delete(&self, id: i32) -> DatabaseResult<()>;

    async fn list(&self, filter: SubscriptionFilter) -> DatabaseResult<Vec<Subscription>>;

    /// Total spend across the month range `[from..to]`, optionally filtered.
    async fn sum_total(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        filter: SubscriptionFilter,
    ) -> DatabaseResult<i64>;
}

pub struct SubscriptionServiceImpl {
    store: SubscriptionsDao,
}

impl SubscriptionServiceImpl {
    pub fn new(store: SubscriptionsDao) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SubscriptionService for SubscriptionServiceImpl {
    async fn create(&self, mut sub: NewSubscription) -> DatabaseResult<i32> {
        if sub.start_date.is_none() {
            sub.start_date = Some(Utc::now());
        }
        self.store.create(&sub).await
    }

    async fn get_by_id(&self, id: i32) -> DatabaseResult<Subscription> {
        self.store.get_by_id(id).await
    }

    async fn update(&self, id: i32, sub: NewSubscription) -> DatabaseResult<()> {
        self.store.update(id, &sub).await
    }

    async fn delete(&self, id: i32) -> DatabaseResult<()> {
        self.store.delete(id).await
    }

    async fn list(&self, filter: SubscriptionFilter) -> DatabaseResult<Vec<Subscription>> {
        self.store.list(&filter).await
    }

    async fn sum_total(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        filter: SubscriptionFilter,
    ) -> DatabaseResult<i64> {
        if to < from {
            return Ok(0);
        }

        let from = period::month_start(from);
        let to = period::month_start(to);
        self.store.sum_total(from, to, &filter).await
    }
}
