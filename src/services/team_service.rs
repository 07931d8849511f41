//! Team registration and lookup.

use tracing::info;

use crate::{
    dto::{display::sorted_teams, team::TeamSummary},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Teams ordered by points descending, ties by registration order.
pub async fn list_teams(state: &SharedState) -> Vec<TeamSummary> {
    state.read_house(sorted_teams).await
}

pub async fn get_team(state: &SharedState, name: &str) -> Result<TeamSummary, ServiceError> {
    state
        .read_house(|house| house.ledger.get(name).map(TeamSummary::from))
        .await
        .map_err(Into::into)
}

/// Register a team with zero points and no cards.
pub async fn create_team(state: &SharedState, name: String) -> Result<TeamSummary, ServiceError> {
    let team = state
        .run_command_then(
            |house| house.ledger.create_team(&name).map(TeamSummary::from),
            |house, _| sse_events::broadcast_display(state, house),
        )
        .await?;
    info!(team = %team.team_name, "team created");
    Ok(team)
}

/// Remove a team. Products it already won keep their winner.
pub async fn delete_team(state: &SharedState, name: &str) -> Result<(), ServiceError> {
    state
        .run_command_then(
            |house| house.ledger.delete_team(name).map(|_| ()),
            |house, _| sse_events::broadcast_display(state, house),
        )
        .await?;
    info!(team = %name, "team deleted");
    Ok(())
}
