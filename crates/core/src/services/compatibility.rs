//! Compatibility score between a tenant's preferences and an offer.
//!
//! Descriptive only: the percentage is shown next to search results and is
//! never used for access control.

use serde::Serialize;

use findcoloc_db::entities::{offer, user};

/// A single compared criterion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityCriterion {
    /// Criterion label.
    pub label: &'static str,
    /// Whether the tenant's preference matches the offer.
    pub matched: bool,
}

/// Compatibility between a tenant and an offer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityScore {
    /// Percentage of matched criteria, 0-100.
    pub score: u8,
    /// Per-criterion breakdown.
    pub criteria: Vec<CompatibilityCriterion>,
}

/// Compare a tenant's preferences with an offer's price and house rules.
///
/// A house rule only counts against the offer when the tenant needs it:
/// a non-smoker matches both smoking and non-smoking flats.
#[must_use]
pub fn compatibility_score(tenant: &user::Model, offer: &offer::Model) -> CompatibilityScore {
    let budget_ok = match (tenant.budget_min, tenant.budget_max) {
        (None, None) => true,
        (min, max) => {
            min.is_none_or(|m| offer.price >= m) && max.is_none_or(|m| offer.price <= m)
        }
    };

    let criteria = vec![
        CompatibilityCriterion {
            label: "budget",
            matched: budget_ok,
        },
        CompatibilityCriterion {
            label: "smoking",
            matched: !tenant.smoker || offer.smoking_allowed,
        },
        CompatibilityCriterion {
            label: "pets",
            matched: !tenant.has_pets || offer.pets_allowed,
        },
        CompatibilityCriterion {
            label: "visitors",
            matched: !tenant.accepts_visitors || offer.visitors_allowed,
        },
        CompatibilityCriterion {
            label: "parties",
            matched: !tenant.party_friendly || offer.party_allowed,
        },
    ];

    let matched = criteria.iter().filter(|c| c.matched).count();
    #[allow(clippy::cast_possible_truncation)]
    let score = (matched * 100 / criteria.len()) as u8;

    CompatibilityScore { score, criteria }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use findcoloc_db::entities::offer::OfferStatus;

    fn tenant() -> user::Model {
        user::Model {
            id: "t1".to_string(),
            username: "tenant".to_string(),
            username_lower: "tenant".to_string(),
            email: "tenant@example.com".to_string(),
            password_hash: "hash".to_string(),
            token: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            phone: None,
            is_admin: false,
            is_suspended: false,
            onboarding_completed: true,
            budget_min: None,
            budget_max: Some(600),
            smoker: false,
            has_pets: false,
            accepts_visitors: true,
            party_friendly: false,
            gender: None,
            preferred_gender: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn offer() -> offer::Model {
        offer::Model {
            id: "o1".to_string(),
            owner_id: "owner1".to_string(),
            title: "Room".to_string(),
            description: "Room".to_string(),
            price: 550,
            city: "Lyon".to_string(),
            address: "1 rue Test".to_string(),
            postal_code: "69001".to_string(),
            surface_m2: None,
            rooms: None,
            furnished: true,
            wifi: true,
            washing_machine: false,
            parking: false,
            smoking_allowed: false,
            pets_allowed: false,
            visitors_allowed: true,
            party_allowed: false,
            status: OfferStatus::Active,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_full_match() {
        let result = compatibility_score(&tenant(), &offer());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_price_above_budget() {
        let mut o = offer();
        o.price = 900;
        let result = compatibility_score(&tenant(), &o);
        assert_eq!(result.score, 80);
        assert!(!result.criteria[0].matched);
    }

    #[test]
    fn test_smoker_in_non_smoking_flat() {
        let mut t = tenant();
        t.smoker = true;
        let result = compatibility_score(&t, &offer());
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_non_smoker_matches_smoking_flat() {
        let mut o = offer();
        o.smoking_allowed = true;
        let result = compatibility_score(&tenant(), &o);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_pets_and_parties_mismatch() {
        let mut t = tenant();
        t.has_pets = true;
        t.party_friendly = true;
        let result = compatibility_score(&t, &offer());
        assert_eq!(result.score, 60);
    }

    #[test]
    fn test_no_budget_always_matches() {
        let mut t = tenant();
        t.budget_min = None;
        t.budget_max = None;
        let mut o = offer();
        o.price = 5000;
        let result = compatibility_score(&t, &o);
        assert!(result.criteria[0].matched);
    }
}
