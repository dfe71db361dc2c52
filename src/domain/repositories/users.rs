use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::users::{RegisterUserEntity, UserEntity};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>>;

    /// Returns `None` when the username is already taken.
    async fn register(&self, register_user_entity: RegisterUserEntity)
    -> Result<Option<UserEntity>>;
}
