use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    application::usecases::plans::PlanUseCase,
    auth::AdminUser,
    domain::{repositories::plans::PlanRepository, value_objects::plans::PlanModel},
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let plan_usecase = PlanUseCase::new(Arc::new(plan_repository));

    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/:plan_id", put(update_plan).delete(delete_plan))
        .with_state(Arc::new(plan_usecase))
}

pub async fn list_plans<R>(
    State(plan_usecase): State<Arc<PlanUseCase<R>>>,
) -> Result<impl IntoResponse, AppError>
where
    R: PlanRepository + Send + Sync + 'static,
{
    let plans = plan_usecase.list_plans().await?;

    Ok(Json(plans))
}

pub async fn create_plan<R>(
    State(plan_usecase): State<Arc<PlanUseCase<R>>>,
    _admin: AdminUser,
    Json(plan_model): Json<PlanModel>,
) -> Result<impl IntoResponse, AppError>
where
    R: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.create_plan(plan_model).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_plan<R>(
    State(plan_usecase): State<Arc<PlanUseCase<R>>>,
    _admin: AdminUser,
    Path(plan_id): Path<Uuid>,
    Json(plan_model): Json<PlanModel>,
) -> Result<impl IntoResponse, AppError>
where
    R: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.update_plan(plan_id, plan_model).await?;

    Ok(Json(plan))
}

pub async fn delete_plan<R>(
    State(plan_usecase): State<Arc<PlanUseCase<R>>>,
    _admin: AdminUser,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    R: PlanRepository + Send + Sync + 'static,
{
    plan_usecase.delete_plan(plan_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
