//! Team ledger: point balances, mystery cards and the won-products audit trail.

use std::time::SystemTime;

use indexmap::IndexMap;
use uuid::Uuid;

use super::error::AuctionError;

/// Runtime representation of a participating team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Unique, case-sensitive team name (primary key).
    pub name: String,
    /// Accumulated points.
    pub points: u32,
    /// Spendable mystery cards.
    pub mystery_cards: u32,
    /// Products won by the team, in the order they were sold.
    pub won_products: Vec<Uuid>,
    /// Creation timestamp; also decides the insertion order after a reload.
    pub created_at: SystemTime,
}

impl Team {
    /// Build a fresh team with an empty balance.
    pub fn new(name: String) -> Self {
        Self {
            name,
            points: 0,
            mystery_cards: 0,
            won_products: Vec::new(),
            created_at: SystemTime::now(),
        }
    }
}

/// Teams keyed by name, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamLedger {
    teams: IndexMap<String, Team>,
}

impl TeamLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted teams, ordering them by creation time.
    pub fn from_teams(mut teams: Vec<Team>) -> Self {
        teams.sort_by_key(|team| team.created_at);
        Self {
            teams: teams
                .into_iter()
                .map(|team| (team.name.clone(), team))
                .collect(),
        }
    }

    /// Register a new team with zero points and zero cards.
    pub fn create_team(&mut self, name: &str) -> Result<&Team, AuctionError> {
        if self.teams.contains_key(name) {
            return Err(AuctionError::DuplicateName(name.to_owned()));
        }

        let entry = self
            .teams
            .entry(name.to_owned())
            .or_insert_with(|| Team::new(name.to_owned()));
        Ok(&*entry)
    }

    /// Remove a team. Products it already won are left untouched.
    pub fn delete_team(&mut self, name: &str) -> Result<Team, AuctionError> {
        self.teams
            .shift_remove(name)
            .ok_or_else(|| AuctionError::TeamNotFound(name.to_owned()))
    }

    /// Look up a team by name.
    pub fn get(&self, name: &str) -> Result<&Team, AuctionError> {
        self.teams
            .get(name)
            .ok_or_else(|| AuctionError::TeamNotFound(name.to_owned()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Team, AuctionError> {
        self.teams
            .get_mut(name)
            .ok_or_else(|| AuctionError::TeamNotFound(name.to_owned()))
    }

    /// Whether a team with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains_key(name)
    }

    /// Number of registered teams.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether the ledger holds no team at all.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Iterate over teams in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Teams ordered by points descending; ties keep insertion order.
    pub fn sorted(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.values().collect();
        // `sort_by` is stable, so equal balances keep their creation order.
        teams.sort_by(|a, b| b.points.cmp(&a.points));
        teams
    }

    /// Team holding the most points, if any.
    pub fn leader(&self) -> Option<&Team> {
        self.sorted().into_iter().next()
    }

    /// Add points to a team and return its new balance.
    pub fn credit(&mut self, name: &str, amount: u32) -> Result<u32, AuctionError> {
        let team = self.get_mut(name)?;
        let next = team.points.checked_add(amount).ok_or_else(|| {
            AuctionError::InvalidAmount(format!("crediting {amount} overflows `{name}` balance"))
        })?;
        team.points = next;
        Ok(next)
    }

    /// Remove points from a team, failing when the balance is too low.
    pub fn debit(&mut self, name: &str, amount: u32) -> Result<u32, AuctionError> {
        let team = self.get_mut(name)?;
        if team.points < amount {
            return Err(AuctionError::InsufficientBalance {
                team: name.to_owned(),
                available: team.points,
                requested: amount,
            });
        }
        team.points -= amount;
        Ok(team.points)
    }

    /// Remove up to `amount` points, flooring the balance at zero.
    ///
    /// Returns the number of points actually removed.
    pub fn debit_clamped(&mut self, name: &str, amount: u32) -> Result<u32, AuctionError> {
        let team = self.get_mut(name)?;
        let removed = team.points.min(amount);
        team.points -= removed;
        Ok(removed)
    }

    /// Give one mystery card to a team and return its new card count.
    pub fn grant_mystery_card(&mut self, name: &str) -> Result<u32, AuctionError> {
        let team = self.get_mut(name)?;
        team.mystery_cards = team.mystery_cards.saturating_add(1);
        Ok(team.mystery_cards)
    }

    /// Spend one mystery card, failing when the team holds none.
    pub fn spend_mystery_card(&mut self, name: &str) -> Result<u32, AuctionError> {
        let team = self.get_mut(name)?;
        if team.mystery_cards == 0 {
            return Err(AuctionError::NoCardsAvailable(name.to_owned()));
        }
        team.mystery_cards -= 1;
        Ok(team.mystery_cards)
    }

    /// Append a product to the team's won list.
    pub fn record_win(&mut self, name: &str, product_id: Uuid) -> Result<(), AuctionError> {
        self.get_mut(name)?.won_products.push(product_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(teams: &[(&str, u32)]) -> TeamLedger {
        let mut ledger = TeamLedger::new();
        for (name, points) in teams {
            ledger.create_team(name).unwrap();
            ledger.credit(name, *points).unwrap();
        }
        ledger
    }

    #[test]
    fn create_team_starts_empty() {
        let mut ledger = TeamLedger::new();
        let team = ledger.create_team("Alpha").unwrap();
        assert_eq!(team.points, 0);
        assert_eq!(team.mystery_cards, 0);
        assert!(team.won_products.is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected_and_count_unchanged() {
        let mut ledger = ledger_with(&[("Alpha", 0)]);
        let err = ledger.create_team("Alpha").unwrap_err();
        assert_eq!(err, AuctionError::DuplicateName("Alpha".into()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut ledger = ledger_with(&[("Alpha", 0)]);
        assert!(ledger.create_team("alpha").is_ok());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn delete_missing_team_fails() {
        let mut ledger = TeamLedger::new();
        assert_eq!(
            ledger.delete_team("Ghost").unwrap_err(),
            AuctionError::TeamNotFound("Ghost".into())
        );
    }

    #[test]
    fn debit_rejects_insufficient_balance_without_change() {
        let mut ledger = ledger_with(&[("Alpha", 10)]);
        let err = ledger.debit("Alpha", 11).unwrap_err();
        assert!(matches!(
            err,
            AuctionError::InsufficientBalance {
                available: 10,
                requested: 11,
                ..
            }
        ));
        assert_eq!(ledger.get("Alpha").unwrap().points, 10);
    }

    #[test]
    fn debit_clamped_floors_at_zero() {
        let mut ledger = ledger_with(&[("Alpha", 10)]);
        assert_eq!(ledger.debit_clamped("Alpha", 25).unwrap(), 10);
        assert_eq!(ledger.get("Alpha").unwrap().points, 0);
    }

    #[test]
    fn spend_without_cards_fails() {
        let mut ledger = ledger_with(&[("Beta", 0)]);
        assert_eq!(
            ledger.spend_mystery_card("Beta").unwrap_err(),
            AuctionError::NoCardsAvailable("Beta".into())
        );
        ledger.grant_mystery_card("Beta").unwrap();
        assert_eq!(ledger.spend_mystery_card("Beta").unwrap(), 0);
    }

    #[test]
    fn sorted_breaks_ties_by_insertion_order() {
        let ledger = ledger_with(&[("Alpha", 10), ("Beta", 30), ("Gamma", 10), ("Delta", 30)]);
        let names: Vec<&str> = ledger.sorted().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Delta", "Alpha", "Gamma"]);
    }

    #[test]
    fn delete_keeps_remaining_order() {
        let mut ledger = ledger_with(&[("Alpha", 0), ("Beta", 0), ("Gamma", 0)]);
        ledger.delete_team("Beta").unwrap();
        let names: Vec<&str> = ledger.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }
}
