use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_team_name},
    state::ledger::Team,
};

/// Team projection shared by REST responses and push events.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_name: String,
    pub points: u32,
    pub mystery_cards: u32,
    pub products_won: Vec<Uuid>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            team_name: team.name.clone(),
            points: team.points,
            mystery_cards: team.mystery_cards,
            products_won: team.won_products.clone(),
            created_at: format_system_time(team.created_at),
        }
    }
}

/// Payload registering a new team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    #[validate(custom(function = "validate_team_name"))]
    pub team_name: String,
}
