//! Auction state machine: product lifecycle transitions and sale settlement.

use uuid::Uuid;

use super::{
    catalog::{Catalog, Product, ProductStatus, ProductType},
    error::AuctionError,
    ledger::{Team, TeamLedger},
};

/// Reward routed to the winning team when a product is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    /// Points credited to the winner.
    Points(u32),
    /// One mystery card granted to the winner.
    MysteryCard,
}

/// Result of a successful sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOutcome {
    /// The product as stored after the sale (fully disclosed).
    pub product: Product,
    /// Winning team after settlement.
    pub winner: Team,
    /// Reward granted to the winner.
    pub reward: Reward,
    /// Whether the sale reveals a mystery product.
    pub revealed: bool,
}

/// Owned auction model: the team ledger and the product catalog.
///
/// Commands mutate a cloned draft of this value and only commit it once the
/// changed records are persisted; see [`AuctionHouse::changes_since`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuctionHouse {
    /// Team balances.
    pub ledger: TeamLedger,
    /// Products and their lifecycle status.
    pub catalog: Catalog,
}

/// Records touched by a command, as computed by [`AuctionHouse::changes_since`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Teams created or modified.
    pub upserted_teams: Vec<Team>,
    /// Names of deleted teams.
    pub deleted_teams: Vec<String>,
    /// Products created or modified.
    pub upserted_products: Vec<Product>,
    /// Identifiers of deleted products.
    pub deleted_products: Vec<Uuid>,
}

impl ChangeSet {
    /// Whether the command touched nothing.
    pub fn is_empty(&self) -> bool {
        self.upserted_teams.is_empty()
            && self.deleted_teams.is_empty()
            && self.upserted_products.is_empty()
            && self.deleted_products.is_empty()
    }
}

impl AuctionHouse {
    /// Create an empty auction house.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the auction house from persisted records.
    pub fn from_records(teams: Vec<Team>, products: Vec<Product>) -> Self {
        Self {
            ledger: TeamLedger::from_teams(teams),
            catalog: Catalog::from_products(products),
        }
    }

    /// Open a product for bidding.
    ///
    /// Every product is first reset to pending (clearing any winner), then the
    /// target becomes current, so at most one product is ever current.
    pub fn set_current(&mut self, product_id: Uuid) -> Result<&Product, AuctionError> {
        self.catalog.get(product_id)?;

        for product in self.catalog.iter_mut() {
            product.status = ProductStatus::Pending;
            product.winner_team = None;
        }

        let product = self.catalog.get_mut(product_id)?;
        product.status = ProductStatus::Current;
        Ok(&*product)
    }

    /// Sell a product to a team and route the reward.
    ///
    /// Mystery-card products grant one card and no points; every other type
    /// credits the point value and appends the product to the winner's list.
    pub fn mark_sold(
        &mut self,
        product_id: Uuid,
        winner: &str,
    ) -> Result<SaleOutcome, AuctionError> {
        let product = self.catalog.get(product_id)?;
        let team = self.ledger.get(winner)?;

        let reward = match product.product_type {
            ProductType::MysteryCard => Reward::MysteryCard,
            ProductType::Normal | ProductType::Mystery => Reward::Points(product.point_value),
        };
        if let Reward::Points(points) = reward {
            if team.points.checked_add(points).is_none() {
                return Err(AuctionError::InvalidAmount(format!(
                    "crediting {points} overflows `{winner}` balance"
                )));
            }
        }

        match reward {
            Reward::MysteryCard => {
                self.ledger.grant_mystery_card(winner)?;
            }
            Reward::Points(points) => {
                self.ledger.credit(winner, points)?;
                self.ledger.record_win(winner, product_id)?;
            }
        }

        let product = self.catalog.get_mut(product_id)?;
        product.status = ProductStatus::Sold;
        product.winner_team = Some(winner.to_owned());
        let product = product.clone();

        Ok(SaleOutcome {
            revealed: product.is_mystery(),
            winner: self.ledger.get(winner)?.clone(),
            product,
            reward,
        })
    }

    /// Diff `self` (the draft) against `before` (the committed state).
    pub fn changes_since(&self, before: &AuctionHouse) -> ChangeSet {
        let upserted_teams = self
            .ledger
            .iter()
            .filter(|team| before.ledger.get(&team.name).ok() != Some(*team))
            .cloned()
            .collect();
        let deleted_teams = before
            .ledger
            .iter()
            .filter(|team| !self.ledger.contains(&team.name))
            .map(|team| team.name.clone())
            .collect();
        let upserted_products = self
            .catalog
            .iter()
            .filter(|product| before.catalog.get(product.id).ok() != Some(*product))
            .cloned()
            .collect();
        let deleted_products = before
            .catalog
            .iter()
            .filter(|product| self.catalog.get(product.id).is_err())
            .map(|product| product.id)
            .collect();

        ChangeSet {
            upserted_teams,
            deleted_teams,
            upserted_products,
            deleted_products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::ProductDraft;

    fn draft(name: &str, points: u32, product_type: ProductType) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            description: "lot".into(),
            image_url: Some(format!("/uploads/{name}.png")),
            base_money_price: 500,
            point_value: points,
            product_type,
            is_mystery: false,
        }
    }

    fn house_with_teams(names: &[&str]) -> AuctionHouse {
        let mut house = AuctionHouse::new();
        for name in names {
            house.ledger.create_team(name).unwrap();
        }
        house
    }

    fn add(house: &mut AuctionHouse, name: &str, points: u32, product_type: ProductType) -> Uuid {
        house.catalog.insert(draft(name, points, product_type)).unwrap().id
    }

    fn current_count(house: &AuctionHouse) -> usize {
        house
            .catalog
            .iter()
            .filter(|p| p.status == ProductStatus::Current)
            .count()
    }

    #[test]
    fn set_current_keeps_a_single_current_product() {
        let mut house = AuctionHouse::new();
        let ids: Vec<Uuid> = (0..4)
            .map(|i| add(&mut house, &format!("P{i}"), 10, ProductType::Normal))
            .collect();

        for id in [ids[0], ids[2], ids[2], ids[1], ids[3], ids[0]] {
            house.set_current(id).unwrap();
            assert_eq!(current_count(&house), 1);
            assert_eq!(house.catalog.current().unwrap().id, id);
        }
    }

    #[test]
    fn set_current_unknown_product_changes_nothing() {
        let mut house = AuctionHouse::new();
        let id = add(&mut house, "P1", 10, ProductType::Normal);
        house.set_current(id).unwrap();
        let before = house.clone();

        let missing = Uuid::new_v4();
        assert_eq!(
            house.set_current(missing).unwrap_err(),
            AuctionError::ProductNotFound(missing)
        );
        assert_eq!(house, before);
    }

    #[test]
    fn set_current_resets_sold_products_and_their_winner() {
        let mut house = house_with_teams(&["Alpha"]);
        let p1 = add(&mut house, "P1", 10, ProductType::Normal);
        let p2 = add(&mut house, "P2", 10, ProductType::Normal);
        house.set_current(p1).unwrap();
        house.mark_sold(p1, "Alpha").unwrap();

        house.set_current(p2).unwrap();
        let p1 = house.catalog.get(p1).unwrap();
        assert_eq!(p1.status, ProductStatus::Pending);
        assert!(p1.winner_team.is_none());
    }

    #[test]
    fn normal_sale_credits_points_and_records_win() {
        let mut house = house_with_teams(&["Alpha", "Beta"]);
        let p1 = add(&mut house, "P1", 50, ProductType::Normal);
        house.set_current(p1).unwrap();

        let outcome = house.mark_sold(p1, "Alpha").unwrap();

        assert_eq!(outcome.reward, Reward::Points(50));
        assert!(!outcome.revealed);
        let alpha = house.ledger.get("Alpha").unwrap();
        assert_eq!(alpha.points, 50);
        assert_eq!(alpha.won_products, vec![p1]);
        let product = house.catalog.get(p1).unwrap();
        assert_eq!(product.status, ProductStatus::Sold);
        assert_eq!(product.winner_team.as_deref(), Some("Alpha"));
    }

    #[test]
    fn mystery_card_sale_grants_card_without_points() {
        let mut house = house_with_teams(&["Alpha", "Beta"]);
        let p2 = add(&mut house, "P2", 0, ProductType::MysteryCard);
        house.set_current(p2).unwrap();

        let outcome = house.mark_sold(p2, "Beta").unwrap();

        assert_eq!(outcome.reward, Reward::MysteryCard);
        let beta = house.ledger.get("Beta").unwrap();
        assert_eq!(beta.mystery_cards, 1);
        assert_eq!(beta.points, 0);
        assert!(beta.won_products.is_empty());
    }

    #[test]
    fn mystery_card_sale_ignores_point_value() {
        let mut house = house_with_teams(&["Beta"]);
        let p = add(&mut house, "Card", 80, ProductType::MysteryCard);
        house.mark_sold(p, "Beta").unwrap();
        assert_eq!(house.ledger.get("Beta").unwrap().points, 0);
    }

    #[test]
    fn mystery_sale_is_revealed_and_credits_points() {
        let mut house = house_with_teams(&["Alpha"]);
        let typed = add(&mut house, "Typed", 20, ProductType::Mystery);
        let mut flagged_draft = draft("Flagged", 5, ProductType::Normal);
        flagged_draft.is_mystery = true;
        let flagged = house.catalog.insert(flagged_draft).unwrap().id;

        assert!(house.mark_sold(typed, "Alpha").unwrap().revealed);
        assert!(house.mark_sold(flagged, "Alpha").unwrap().revealed);
        assert_eq!(house.ledger.get("Alpha").unwrap().points, 25);
    }

    #[test]
    fn mark_sold_requires_existing_product_and_team() {
        let mut house = house_with_teams(&["Alpha"]);
        let p1 = add(&mut house, "P1", 50, ProductType::Normal);
        let before = house.clone();

        assert_eq!(
            house.mark_sold(p1, "Ghost").unwrap_err(),
            AuctionError::TeamNotFound("Ghost".into())
        );
        let missing = Uuid::new_v4();
        assert_eq!(
            house.mark_sold(missing, "Alpha").unwrap_err(),
            AuctionError::ProductNotFound(missing)
        );
        assert_eq!(house, before);
    }

    #[test]
    fn changes_since_reports_touched_records_only() {
        let mut committed = house_with_teams(&["Alpha", "Beta", "Gamma"]);
        let p1 = add(&mut committed, "P1", 50, ProductType::Normal);
        let p2 = add(&mut committed, "P2", 50, ProductType::Normal);
        let untouched = add(&mut committed, "P3", 50, ProductType::Normal);

        let mut draft = committed.clone();
        draft.mark_sold(p1, "Alpha").unwrap();
        draft.ledger.delete_team("Gamma").unwrap();
        draft.catalog.remove(p2).unwrap();

        let changes = draft.changes_since(&committed);
        let teams: Vec<&str> = changes.upserted_teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(teams, vec!["Alpha"]);
        assert_eq!(changes.deleted_teams, vec!["Gamma".to_string()]);
        let products: Vec<Uuid> = changes.upserted_products.iter().map(|p| p.id).collect();
        assert_eq!(products, vec![p1]);
        assert_eq!(changes.deleted_products, vec![p2]);
        assert!(!products.contains(&untouched));
    }

    #[test]
    fn unchanged_draft_has_empty_change_set() {
        let committed = house_with_teams(&["Alpha"]);
        assert!(committed.clone().changes_since(&committed).is_empty());
    }

    #[test]
    fn hydration_repairs_interrupted_writes() {
        let mut source = house_with_teams(&["Alpha"]);
        let first = add(&mut source, "P1", 10, ProductType::Normal);
        let second = add(&mut source, "P2", 10, ProductType::Normal);
        let third = add(&mut source, "P3", 10, ProductType::Normal);

        let mut products: Vec<Product> = source.catalog.iter().cloned().collect();
        products[0].status = ProductStatus::Current;
        products[1].status = ProductStatus::Current;
        products[2].status = ProductStatus::Sold;
        let teams = source.ledger.iter().cloned().collect();

        let house = AuctionHouse::from_records(teams, products);
        assert_eq!(current_count(&house), 1);
        assert_eq!(house.catalog.get(first).unwrap().status, ProductStatus::Current);
        assert_eq!(house.catalog.get(second).unwrap().status, ProductStatus::Pending);
        let unsold = house.catalog.get(third).unwrap();
        assert_eq!(unsold.status, ProductStatus::Pending);
        assert!(unsold.winner_team.is_none());
    }
}
