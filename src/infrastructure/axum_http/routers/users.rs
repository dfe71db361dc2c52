use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};

use crate::{
    application::usecases::users::UserUseCase,
    config::config_model::Auth,
    domain::{
        clock::SystemClock,
        repositories::users::UserRepository,
        value_objects::users::{LoginModel, RegisterUserModel},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, auth: Arc<Auth>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let user_usecase = UserUseCase::new(Arc::new(user_repository), auth, Arc::new(SystemClock));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(Arc::new(user_usecase))
}

pub async fn register<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    Json(register_model): Json<RegisterUserModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let user = user_usecase.register(register_model).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    Json(login_model): Json<LoginModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let response = user_usecase.login(login_model).await?;

    Ok(Json(response))
}
