//! Player routes

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::Utc;
use common::{
    envelope::Envelope,
    http::{ApiResult, EntityId, JsonBody},
    pagination::{Page, PageQuery},
    principal::{Principal, permissions},
};

use crate::{
    models::{
        SearchQuery,
        evaluation::Evaluation,
        expense::Expense,
        player::{CreatePlayerRequest, Player, PlayerDetail, TopPlayer, TopPlayersQuery, UpdatePlayerRequest},
        report::PlayerReport,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route("/players/search", get(search_players))
        .route("/players/top", get(top_players))
        .route(
            "/players/:id",
            get(get_player).put(update_player).delete(delete_player),
        )
        .route("/players/:id/status", put(toggle_active))
        .route("/players/:id/prospect", put(toggle_prospect))
        .route("/players/:id/evaluations", get(player_evaluations))
        .route("/players/:id/expenses", get(player_expenses))
        .route("/players/:id/report", get(player_report))
}

pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Player>>> {
    Ok(Json(state.players.list(query.resolve()).await?))
}

pub async fn create_player(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreatePlayerRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Player>>)> {
    principal.require_permission(permissions::MANAGE_PLAYERS)?;
    let player = body.validated()?.into_new_player()?;

    let player = state.players.create(&player, principal.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Player registered successfully", player)),
    ))
}

/// Blank queries match nothing
pub async fn search_players(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Player>>> {
    let Some(term) = query.term() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.players.search(term).await?))
}

pub async fn top_players(
    State(state): State<AppState>,
    Query(query): Query<TopPlayersQuery>,
) -> ApiResult<Json<Page<TopPlayer>>> {
    let page = state
        .players
        .top_by_parameter(&query.parameter(), query.page_query().resolve())
        .await?;
    Ok(Json(page))
}

pub async fn get_player(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<PlayerDetail>> {
    Ok(Json(state.players.get(id).await?))
}

pub async fn update_player(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdatePlayerRequest>,
) -> ApiResult<Json<Envelope<Player>>> {
    principal.require_permission(permissions::MANAGE_PLAYERS)?;
    let changes = body.validated()?.into_changes()?;

    let player = state.players.update(id, &changes).await?;
    Ok(Json(Envelope::with_data("Player updated successfully", player)))
}

pub async fn delete_player(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_permission(permissions::MANAGE_PLAYERS)?;

    state.players.delete(id).await?;
    Ok(Json(Envelope::message("Player deleted successfully")))
}

pub async fn toggle_active(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<Player>>> {
    principal.require_permission(permissions::MANAGE_PLAYERS)?;

    let player = state.players.toggle_active(id).await?;
    let message = if player.active {
        "Player activated"
    } else {
        "Player deactivated"
    };
    Ok(Json(Envelope::with_data(message, player)))
}

pub async fn toggle_prospect(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<Player>>> {
    principal.require_permission(permissions::MANAGE_PLAYERS)?;

    let player = state.players.toggle_prospect(id).await?;
    let message = if player.prospect {
        "Player marked as prospect"
    } else {
        "Player is no longer a prospect"
    };
    Ok(Json(Envelope::with_data(message, player)))
}

pub async fn player_evaluations(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Evaluation>>> {
    state.players.ensure_exists(id).await?;
    Ok(Json(state.evaluations.list_for_player(id, query.resolve()).await?))
}

pub async fn player_expenses(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Expense>>> {
    state.players.ensure_exists(id).await?;
    Ok(Json(state.expenses.list_for_player(id, query.resolve()).await?))
}

pub async fn player_report(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<PlayerReport>> {
    principal.require_permission(permissions::REPORTS)?;
    Ok(Json(state.reports.player_report(id, Utc::now()).await?))
}
