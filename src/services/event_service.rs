//! End-of-event standings and the leaderboard overlay.

use tracing::info;

use crate::{
    dto::{admin::EventEndResponse, display::sorted_teams, team::TeamSummary},
    services::sse_events,
    state::SharedState,
};

/// Compute the final standings and announce them.
///
/// The winner is the team with the most points, earliest registration on a
/// tie, or `None` without teams.
pub async fn end_event(state: &SharedState) -> EventEndResponse {
    let standings = state
        .announce(|house| {
            let standings = EventEndResponse {
                winner: house.ledger.leader().map(TeamSummary::from),
                teams: sorted_teams(house),
            };
            sse_events::broadcast_event_ended(state, &standings);
            standings
        })
        .await;
    info!(
        winner = ?standings.winner.as_ref().map(|team| &team.team_name),
        "event ended"
    );
    standings
}

/// Show or hide the leaderboard overlay on the display.
pub async fn toggle_leaderboard(state: &SharedState, show: bool) {
    state
        .announce(|house| {
            state.set_leaderboard_visible(show);
            sse_events::broadcast_leaderboard_toggle(state, show, sorted_teams(house));
            sse_events::broadcast_display(state, house);
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{recv_named, running_state, seed_team};

    #[tokio::test]
    async fn winner_is_highest_score_then_first_registered() {
        let (state, _store) = running_state().await;
        seed_team(&state, "Alpha", 40, 0).await;
        seed_team(&state, "Beta", 40, 0).await;
        seed_team(&state, "Gamma", 10, 0).await;
        let mut rx = state.public_sse().subscribe();

        let standings = end_event(&state).await;

        assert_eq!(standings.winner.unwrap().team_name, "Alpha");
        let order: Vec<&str> = standings.teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Beta", "Gamma"]);
        let event = recv_named(&mut rx, "eventEnded").await;
        assert_eq!(event["winner"]["teamName"], "Alpha");
    }

    #[tokio::test]
    async fn no_teams_means_no_winner() {
        let (state, _store) = running_state().await;
        let standings = end_event(&state).await;
        assert!(standings.winner.is_none());
        assert!(standings.teams.is_empty());
    }

    #[tokio::test]
    async fn leaderboard_flag_reaches_the_snapshot() {
        let (state, _store) = running_state().await;
        let mut rx = state.public_sse().subscribe();

        toggle_leaderboard(&state, true).await;

        let toggle = recv_named(&mut rx, "leaderboardToggle").await;
        assert_eq!(toggle["show"], true);
        let display = recv_named(&mut rx, "displayUpdate").await;
        assert_eq!(display["leaderboardVisible"], true);
    }
}
