use rust_decimal::Decimal;

use super::types::ApiMarket;

/// A market's resolution state as derived from the feed. The ledger treats
/// this as ground truth and never re-derives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFact {
    pub resolved: bool,
    pub winning_outcome: Option<String>,
}

/// Settlement price above which an outcome counts as the winner.
const WINNER_PRICE_THRESHOLD: (i64, u32) = (9, 1); // 0.9

/// Derive a resolution fact from a market listing: a closed market's winner
/// is the outcome whose settlement price exceeds 0.9. No outcome clearing
/// the bar yields resolved-with-no-winner, which settles nothing.
pub fn derive_resolution(market: &ApiMarket) -> ResolutionFact {
    if market.closed != Some(true) {
        return ResolutionFact {
            resolved: false,
            winning_outcome: None,
        };
    }

    let threshold = Decimal::new(WINNER_PRICE_THRESHOLD.0, WINNER_PRICE_THRESHOLD.1);
    let winner = market
        .tokens
        .iter()
        .find(|t| t.price.is_some_and(|p| p > threshold))
        .map(|t| t.outcome.clone());

    ResolutionFact {
        resolved: true,
        winning_outcome: winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::ApiOutcomeToken;

    fn market(closed: bool, prices: &[(&str, &str)]) -> ApiMarket {
        ApiMarket {
            condition_id: "cond-1".into(),
            question: "Will it happen?".into(),
            category: None,
            tokens: prices
                .iter()
                .map(|(outcome, price)| ApiOutcomeToken {
                    outcome: outcome.to_string(),
                    price: Some(price.parse().unwrap()),
                })
                .collect(),
            active: Some(!closed),
            closed: Some(closed),
            end_date_iso: None,
        }
    }

    #[test]
    fn test_open_market_is_unresolved() {
        let fact = derive_resolution(&market(false, &[("Yes", "0.97"), ("No", "0.03")]));
        assert_eq!(
            fact,
            ResolutionFact {
                resolved: false,
                winning_outcome: None
            }
        );
    }

    #[test]
    fn test_closed_market_with_clear_winner() {
        let fact = derive_resolution(&market(true, &[("Yes", "0.02"), ("No", "0.98")]));
        assert_eq!(fact.winning_outcome.as_deref(), Some("No"));
        assert!(fact.resolved);
    }

    #[test]
    fn test_closed_market_without_clear_winner() {
        let fact = derive_resolution(&market(true, &[("Yes", "0.55"), ("No", "0.45")]));
        assert!(fact.resolved);
        assert_eq!(fact.winning_outcome, None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let fact = derive_resolution(&market(true, &[("Yes", "0.9"), ("No", "0.1")]));
        assert_eq!(fact.winning_outcome, None, "exactly 0.9 does not clear the bar");
    }
}
