pub mod services;
pub mod subscriptions;

pub use services::ServicesDao;
pub use subscriptions::{NewSubscription, Subscription, SubscriptionFilter, SubscriptionsDao};
