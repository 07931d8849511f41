use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::ActionResponse,
        team::{CreateTeamRequest, TeamSummary},
    },
    error::AppError,
    routes::admin::admin_only,
    services::team_service,
    state::SharedState,
};

/// Team listing for everyone, registration and removal for the admin.
pub fn router(state: SharedState) -> Router<SharedState> {
    let public = Router::new()
        .route("/api/teams", get(list_teams))
        .route("/api/teams/{name}", get(get_team));
    let admin = admin_only(
        state,
        Router::new()
            .route("/api/teams", post(create_team))
            .route("/api/teams/{name}", delete(delete_team)),
    );

    public.merge(admin)
}

/// Teams ordered by points, highest first.
#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "teams",
    responses((status = 200, description = "Sorted teams", body = [TeamSummary]))
)]
pub async fn list_teams(State(state): State<SharedState>) -> Json<Vec<TeamSummary>> {
    Json(team_service::list_teams(&state).await)
}

#[utoipa::path(
    get,
    path = "/api/teams/{name}",
    tag = "teams",
    params(("name" = String, Path, description = "Team name (case-sensitive)")),
    responses(
        (status = 200, description = "Team", body = TeamSummary),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn get_team(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<TeamSummary>, AppError> {
    Ok(Json(team_service::get_team(&state, &name).await?))
}

/// Register a new team with no points and no cards.
#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "teams",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamSummary),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<(StatusCode, Json<TeamSummary>), AppError> {
    let team = team_service::create_team(&state, payload.team_name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    delete,
    path = "/api/teams/{name}",
    tag = "teams",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login"),
        ("name" = String, Path, description = "Team name (case-sensitive)")
    ),
    responses(
        (status = 200, description = "Team deleted", body = ActionResponse),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn delete_team(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    team_service::delete_team(&state, &name).await?;
    Ok(Json(ActionResponse::new("Team deleted successfully")))
}
