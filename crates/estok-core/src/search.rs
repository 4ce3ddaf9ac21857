//! # Search Ranking
//!
//! Tiered relevance for point-of-sale product lookup.
//!
//! Candidates (products whose codes equal the term or whose description
//! contains it) are bucketed into discrete priority tiers before any
//! secondary sort:
//!
//! ```text
//! rank 1  exact code match (ean13 or aux code)
//! rank 2  description starts with the term (case-insensitive)
//! rank 3  description contains the term anywhere else
//! ```
//!
//! Ties inside a rank break on description ascending (case-sensitive). The
//! result set is capped only AFTER ranking, so a late exact-code match beats
//! an early substring match even at the limit boundary.
//!
//! The candidate filter itself lives in SQL (the store is better at scanning)
//! while the tier assignment lives here where it is unit-testable.

use crate::types::Product;

/// Relevance tier of one candidate. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchRank {
    /// ean13 or aux code equals the term exactly.
    ExactCode = 1,
    /// Description starts with the term (case-insensitive).
    DescriptionPrefix = 2,
    /// Description contains the term elsewhere (case-insensitive).
    DescriptionContains = 3,
}

/// Assigns the relevance tier for one candidate product.
///
/// Assumes the product already matched the candidate filter; anything that
/// slips through without a recognizable match lands in the lowest tier.
pub fn rank_product(product: &Product, term: &str) -> SearchRank {
    if product.ean13.as_deref() == Some(term) || product.aux_code.as_deref() == Some(term) {
        return SearchRank::ExactCode;
    }

    let description = product.description.to_lowercase();
    let term = term.to_lowercase();
    if description.starts_with(&term) {
        SearchRank::DescriptionPrefix
    } else {
        SearchRank::DescriptionContains
    }
}

/// Ranks candidates by tier, breaks ties on description ascending, and caps
/// the result to `limit`.
pub fn rank_and_truncate(mut candidates: Vec<Product>, term: &str, limit: usize) -> Vec<Product> {
    candidates.sort_by(|a, b| {
        rank_product(a, term)
            .cmp(&rank_product(b, term))
            .then_with(|| a.description.cmp(&b.description))
    });
    candidates.truncate(limit);
    candidates
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(description: &str, ean13: Option<&str>, aux_code: Option<&str>) -> Product {
        Product {
            id: format!("id-{description}"),
            description: description.to_string(),
            ean13: ean13.map(String::from),
            aux_code: aux_code.map(String::from),
            quantity_milli: 0,
            cost_cents: None,
            price_cents: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_code_beats_description_matches() {
        let by_code = product("Widget Red", Some("AAA111"), None);
        let by_aux = product("Widget Blue", None, Some("BBB222"));

        assert_eq!(rank_product(&by_code, "AAA111"), SearchRank::ExactCode);
        assert_eq!(rank_product(&by_aux, "BBB222"), SearchRank::ExactCode);
    }

    #[test]
    fn test_prefix_beats_substring() {
        let prefix = product("Red Widget", None, None);
        let substring = product("Widget Red", None, None);

        assert_eq!(rank_product(&prefix, "Red"), SearchRank::DescriptionPrefix);
        assert_eq!(rank_product(&substring, "Red"), SearchRank::DescriptionContains);
    }

    #[test]
    fn test_ranking_is_case_insensitive_for_descriptions() {
        let prefix = product("RED Widget", None, None);
        assert_eq!(rank_product(&prefix, "red"), SearchRank::DescriptionPrefix);
    }

    #[test]
    fn test_full_ranking_scenario() {
        // Searching "Red": prefix match outranks substring match
        let ranked = rank_and_truncate(
            vec![
                product("Widget Red", Some("AAA111"), None),
                product("Red Widget", Some("BBB222"), None),
            ],
            "Red",
            20,
        );
        assert_eq!(ranked[0].description, "Red Widget");
        assert_eq!(ranked[1].description, "Widget Red");

        // Searching the exact code ranks that product first regardless
        // of what its description looks like
        let ranked = rank_and_truncate(
            vec![
                product("Red Widget", Some("BBB222"), None),
                product("Widget Red", Some("AAA111"), None),
            ],
            "AAA111",
            20,
        );
        assert_eq!(ranked[0].description, "Widget Red");
    }

    #[test]
    fn test_tie_break_is_description_ascending() {
        let ranked = rank_and_truncate(
            vec![
                product("Red Tape", None, None),
                product("Red Apple", None, None),
                product("Red Mug", None, None),
            ],
            "Red",
            20,
        );
        let descriptions: Vec<&str> = ranked.iter().map(|p| p.description.as_str()).collect();
        assert_eq!(descriptions, ["Red Apple", "Red Mug", "Red Tape"]);
    }

    #[test]
    fn test_cap_applies_after_ranking() {
        // The exact-code match arrives last in the candidate list but must
        // survive a limit of 1.
        let ranked = rank_and_truncate(
            vec![
                product("Red Apple", None, None),
                product("Red Mug", None, None),
                product("Widget Red", Some("AAA111"), None),
            ],
            "AAA111",
            1,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].description, "Widget Red");
    }
}
