use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::subscriptions::{
    EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionEntity,
};

/// Persistence port for subscriptions, keyed by user id.
///
/// Implementations must back the one-row-per-user rule with a unique
/// constraint in storage, so that concurrent creators cannot both insert.
#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<SubscriptionEntity>>;

    /// Inserts the row unless the user already has one. Returns `None` when
    /// the unique constraint rejected the insert.
    async fn insert(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Guarded-path write: applies the changeset to an existing row only.
    /// Returns `None` when the user has no row.
    async fn update_by_user_id(
        &self,
        user_id: &str,
        edit_subscription_entity: EditSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Unconditional set keyed by user id. Inserts when absent, otherwise
    /// overwrites plan, status, start date and expiry while keeping the
    /// row id and created timestamp.
    async fn upsert_by_user_id(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity>;

    async fn delete_by_user_id(&self, user_id: &str) -> Result<bool>;
}
