pub mod services;
pub mod subscriptions;

pub use services::Entity as Services;
pub use subscriptions::Entity as Subscriptions;

// Type aliases
pub type ServiceRecord = services::Model;
pub type SubscriptionRecord = subscriptions::Model;
