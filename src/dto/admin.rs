//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{team::TeamSummary, validation::validate_team_name},
    state::mystery::{EffectKind, EffectOutcome},
};

/// Longest countdown accepted, in seconds.
pub const MAX_COUNTDOWN_SECS: u32 = 3_600;

/// Credentials posted to `/admin/login`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Token to send back in the `x-admin-token` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Request closing the sale of a product.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkSoldRequest {
    #[validate(custom(function = "validate_team_name"))]
    pub winner_team: String,
}

/// Request starting a showcase or preview countdown.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CountdownRequest {
    /// Duration in seconds.
    #[validate(range(min = 1, max = 3600))]
    pub duration: u32,
}

/// Legacy steal request kept for the existing admin console.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StealPowerRequest {
    #[validate(custom(function = "validate_team_name"))]
    pub stealing_team: String,
    #[validate(custom(function = "validate_team_name"))]
    pub target_team: String,
    #[validate(range(min = 1))]
    pub points_to_steal: u32,
}

/// Request spending one mystery card on an effect.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MysteryEffectRequest {
    #[validate(custom(function = "validate_team_name"))]
    pub owner_team: String,
    pub effect: EffectKind,
    /// Required for `steal` and `deduct`, ignored for `double`.
    pub target_team: Option<String>,
    #[validate(range(min = 1))]
    pub points: u32,
}

/// Balances after a resolved mystery effect.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MysteryEffectResponse {
    pub owner_team: String,
    pub effect: EffectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_team: Option<String>,
    /// Points actually moved, deducted or credited.
    pub points: u32,
    pub owner_points: u32,
    pub owner_mystery_cards: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_points: Option<u32>,
}

impl From<EffectOutcome> for MysteryEffectResponse {
    fn from(outcome: EffectOutcome) -> Self {
        Self {
            owner_team: outcome.owner,
            effect: outcome.kind,
            target_team: outcome.target,
            points: outcome.points,
            owner_points: outcome.owner_points,
            owner_mystery_cards: outcome.owner_cards,
            target_points: outcome.target_points,
        }
    }
}

/// Final standings returned and broadcast when the event ends.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventEndResponse {
    /// Highest-scoring team; `null` when no team is registered.
    pub winner: Option<TeamSummary>,
    pub teams: Vec<TeamSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_duration_must_be_positive_and_bounded() {
        assert!(CountdownRequest { duration: 0 }.validate().is_err());
        assert!(CountdownRequest { duration: 1 }.validate().is_ok());
        assert!(CountdownRequest { duration: MAX_COUNTDOWN_SECS }.validate().is_ok());
        assert!(CountdownRequest { duration: MAX_COUNTDOWN_SECS + 1 }.validate().is_err());
    }

    #[test]
    fn mystery_effect_request_parses_camel_case() {
        let request: MysteryEffectRequest = serde_json::from_str(
            r#"{"ownerTeam":"Beta","effect":"steal","targetTeam":"Alpha","points":30}"#,
        )
        .unwrap();
        assert_eq!(request.effect, EffectKind::Steal);
        assert_eq!(request.target_team.as_deref(), Some("Alpha"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn steal_power_rejects_zero_points() {
        let request = StealPowerRequest {
            stealing_team: "Beta".into(),
            target_team: "Alpha".into(),
            points_to_steal: 0,
        };
        assert!(request.validate().is_err());
    }
}
