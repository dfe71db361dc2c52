use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::{
    application::usecases::subscriptions::SubscriptionUseCase,
    auth::{AdminUser, AuthUser},
    domain::{
        clock::SystemClock,
        repositories::{plans::PlanCatalog, subscriptions::SubscriptionRepository},
        value_objects::subscriptions::{CreateSubscriptionRequest, UpdateSubscriptionRequest},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{plans::PlanPostgres, subscriptions::SubscriptionPostgres},
        },
    },
};

fn usecase(db_pool: Arc<PgPoolSquad>) -> SubscriptionUseCase<PlanPostgres, SubscriptionPostgres> {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));

    SubscriptionUseCase::new(
        Arc::new(plan_repository),
        Arc::new(subscription_repository),
        Arc::new(SystemClock),
    )
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    Router::new()
        .route("/", post(create_subscription))
        .route(
            "/:user_id",
            get(get_subscription)
                .put(update_subscription)
                .delete(cancel_subscription),
        )
        .route("/:user_id/renew", post(renew_subscription))
        .with_state(Arc::new(usecase(db_pool)))
}

pub fn admin_routes(db_pool: Arc<PgPoolSquad>) -> Router {
    Router::new()
        .route("/:user_id", delete(delete_subscription))
        .with_state(Arc::new(usecase(db_pool)))
}

pub async fn create_subscription<P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    _auth: AuthUser,
    Json(create_request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase
        .create_subscription(create_request)
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn get_subscription<P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase.get_subscription(&user_id).await?;

    Ok(Json(subscription))
}

pub async fn update_subscription<P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
    Json(update_request): Json<UpdateSubscriptionRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase
        .update_subscription(&user_id, update_request)
        .await?;

    Ok(Json(subscription))
}

pub async fn cancel_subscription<P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase.cancel_subscription(&user_id).await?;

    Ok(Json(subscription))
}

pub async fn renew_subscription<P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase.renew_subscription(&user_id).await?;

    Ok(Json(subscription))
}

pub async fn delete_subscription<P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_usecase.delete_subscription(&user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
