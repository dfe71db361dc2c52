use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    auth,
    config::config_model::Auth,
    domain::{
        clock::Clock,
        entities::users::RegisterUserEntity,
        repositories::users::UserRepository,
        value_objects::users::{LoginModel, LoginResponse, RegisterUserModel, UserModel},
    },
};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("username already exists")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::UsernameTaken => StatusCode::CONFLICT,
            UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UserResult<T> = std::result::Result<T, UserError>;

pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    auth: Arc<Auth>,
    clock: Arc<dyn Clock>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, auth: Arc<Auth>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            auth,
            clock,
        }
    }

    pub async fn register(&self, register_model: RegisterUserModel) -> UserResult<UserModel> {
        let username = register_model.username.trim().to_string();
        let name = register_model.name.trim().to_string();

        if username.chars().count() < 3 {
            return Err(Self::reject("username must be at least 3 characters"));
        }
        if name.is_empty() {
            return Err(Self::reject("name is required"));
        }
        if register_model.password.chars().count() < 6 {
            return Err(Self::reject("password must be at least 6 characters"));
        }

        let password_hash = auth::hash_password(&register_model.password).map_err(|err| {
            error!(error = ?err, "users: failed to hash password");
            UserError::Internal(err)
        })?;

        let registered = self
            .user_repo
            .register(RegisterUserEntity {
                username: username.clone(),
                name,
                password_hash,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| {
                error!(%username, db_error = ?err, "users: failed to register user");
                UserError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%username, "users: username already taken");
                UserError::UsernameTaken
            })?;

        info!(user_id = %registered.id, %username, "users: user registered");
        Ok(registered.into())
    }

    pub async fn login(&self, login_model: LoginModel) -> UserResult<LoginResponse> {
        let username = login_model.username.trim();

        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(|err| {
                error!(%username, db_error = ?err, "users: failed to load user");
                UserError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%username, "users: login for unknown username");
                UserError::InvalidCredentials
            })?;

        let matches =
            auth::verify_password(&login_model.password, &user.password_hash).map_err(|err| {
                error!(user_id = %user.id, error = ?err, "users: stored hash unreadable");
                UserError::Internal(err)
            })?;
        if !matches {
            warn!(user_id = %user.id, "users: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let token = auth::issue_token(&self.auth, user.id, &user.username, self.clock.now())
            .map_err(|err| {
                error!(user_id = %user.id, error = ?err, "users: failed to issue token");
                UserError::Internal(err)
            })?;

        info!(user_id = %user.id, "users: login succeeded");
        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    fn reject(message: &str) -> UserError {
        warn!(reason = %message, "users: rejected registration payload");
        UserError::Validation(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        clock::SystemClock, entities::users::UserEntity, repositories::users::MockUserRepository,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn auth_config() -> Arc<Auth> {
        Arc::new(Auth {
            jwt_secret: "supersecretjwtsecretforunittesting123".to_string(),
            jwt_ttl_seconds: 3600,
            admin_username: "admin".to_string(),
        })
    }

    fn usecase(user_repo: MockUserRepository) -> UserUseCase<MockUserRepository> {
        UserUseCase::new(Arc::new(user_repo), auth_config(), Arc::new(SystemClock))
    }

    fn stored_user(password: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            name: "Alice".to_string(),
            password_hash: auth::hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn registration(username: &str, password: &str) -> RegisterUserModel {
        RegisterUserModel {
            username: username.to_string(),
            name: "Alice".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_hashes_password() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_register()
            .withf(|entity| entity.username == "alice" && entity.password_hash != "secret1")
            .times(1)
            .returning(|entity| {
                Ok(Some(UserEntity {
                    id: Uuid::new_v4(),
                    username: entity.username,
                    name: entity.name,
                    password_hash: entity.password_hash,
                    created_at: entity.created_at,
                }))
            });

        let user = usecase(user_repo)
            .register(registration(" alice ", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn register_rejects_short_fields() {
        let usecase = usecase(MockUserRepository::new());

        for payload in [registration("al", "secret1"), registration("alice", "12345")] {
            let err = usecase.register(payload).await.unwrap_err();
            assert!(matches!(err, UserError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn register_duplicate_username_conflicts() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_register().returning(|_| Ok(None));

        let err = usecase(user_repo)
            .register(registration("alice", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::UsernameTaken));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn login_issues_token_for_caller() {
        let user = stored_user("secret1");
        let user_id = user.id;
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .returning(move |_| Ok(Some(user.clone())));

        let response = usecase(user_repo)
            .login(LoginModel {
                username: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let claims =
            auth::validate_token(&response.token, "supersecretjwtsecretforunittesting123").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(response.user.id, user_id);
    }

    #[tokio::test]
    async fn login_wrong_password_is_invalid_credentials() {
        let user = stored_user("secret1");
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let err = usecase(user_repo)
            .login(LoginModel {
                username: "alice".to_string(),
                password: "secret2".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_unknown_user_is_invalid_credentials() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_username().returning(|_| Ok(None));

        let err = usecase(user_repo)
            .login(LoginModel {
                username: "ghost".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::InvalidCredentials));
    }
}
