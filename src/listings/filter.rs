use serde::{Deserialize, Serialize};

use super::repo::Listing;
use crate::error::{ApiError, ApiResult};

/// User-supplied search constraints. Every field is optional; an absent
/// field means "no constraint". Doubles as the snapshot stored on a
/// saved search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub query: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.location.is_none()
            && self.category.is_none()
            && self.condition.is_none()
    }

    pub fn validate(&self) -> ApiResult<()> {
        for bound in [self.price_min, self.price_max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(ApiError::validation("price bounds must be non-negative numbers"));
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(ApiError::validation("price_min must not exceed price_max"));
            }
        }
        Ok(())
    }

    /// In-memory mirror of the SQL predicate built in `repo::search`. AND of
    /// every present field; price bounds inclusive on both ends.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(min) = self.price_min {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if listing.price > max {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ci(&listing.location, location) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &listing.category != category {
                return false;
            }
        }
        if let Some(condition) = &self.condition {
            // A row without a condition key never matches a condition filter.
            match listing.condition() {
                Some(c) if &c == condition => {}
                _ => return false,
            }
        }
        if let Some(query) = &self.query {
            if !contains_ci(&listing.title, query) && !contains_ci(&listing.description, query) {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::repo::Listing;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn listing(title: &str, price: f64, location: &str, category: &str) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            title: title.into(),
            price,
            description: format!("{} description", title),
            images: vec![],
            location: location.into(),
            category: category.into(),
            specifications: serde_json::json!({}),
            user_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ListingFilter::default();
        assert!(filter.is_empty());
        for l in [
            listing("Sofa", 100.0, "Dubai", "Furniture"),
            listing("Toyota", 50_000.0, "Abu Dhabi", "Vehicles"),
        ] {
            assert!(filter.matches(&l));
        }
    }

    #[test]
    fn present_fields_are_anded() {
        let filter = ListingFilter {
            category: Some("Vehicles".into()),
            price_min: Some(1_000.0),
            ..Default::default()
        };
        assert!(filter.matches(&listing("Toyota", 50_000.0, "Dubai", "Vehicles")));
        // right category, price below min
        assert!(!filter.matches(&listing("Old bike", 500.0, "Dubai", "Vehicles")));
        // right price, wrong category
        assert!(!filter.matches(&listing("Sofa", 2_000.0, "Dubai", "Furniture")));
    }

    #[test]
    fn category_scenario_vehicles_only() {
        let filter = ListingFilter {
            category: Some("Vehicles".into()),
            ..Default::default()
        };
        let vehicles = listing("Toyota Camry", 50_000.0, "Dubai", "Vehicles");
        let furniture = listing("Old chair", 100.0, "Dubai", "Furniture");
        let matched: Vec<_> = [&vehicles, &furniture]
            .into_iter()
            .filter(|l| filter.matches(l))
            .collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, vehicles.id);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = ListingFilter {
            price_min: Some(250.0),
            price_max: Some(250.0),
            ..Default::default()
        };
        assert!(filter.matches(&listing("Exact", 250.0, "Dubai", "Furniture")));
        assert!(!filter.matches(&listing("Below", 249.99, "Dubai", "Furniture")));
        assert!(!filter.matches(&listing("Above", 250.01, "Dubai", "Furniture")));
    }

    #[test]
    fn location_and_query_are_case_insensitive_substrings() {
        let filter = ListingFilter {
            location: Some("dubai".into()),
            query: Some("CAMRY".into()),
            ..Default::default()
        };
        assert!(filter.matches(&listing("Toyota Camry 2020", 40_000.0, "Dubai Marina", "Vehicles")));
        assert!(!filter.matches(&listing("Toyota Corolla", 30_000.0, "Dubai", "Vehicles")));
        assert!(!filter.matches(&listing("Toyota Camry", 40_000.0, "Sharjah", "Vehicles")));
    }

    #[test]
    fn query_matches_description_too() {
        let filter = ListingFilter {
            query: Some("sofa description".into()),
            ..Default::default()
        };
        assert!(filter.matches(&listing("Sofa", 100.0, "Dubai", "Furniture")));
    }

    #[test]
    fn condition_filter_requires_condition_key() {
        let filter = ListingFilter {
            condition: Some("New".into()),
            ..Default::default()
        };

        let mut with_condition = listing("TV", 900.0, "Dubai", "Electronics");
        with_condition.specifications =
            serde_json::json!({"brand": "LG", "model": "C2", "condition": "New"});
        assert!(filter.matches(&with_condition));

        with_condition.specifications =
            serde_json::json!({"brand": "LG", "model": "C2", "condition": "Used"});
        assert!(!filter.matches(&with_condition));

        // no condition key anywhere: never matches
        let mut without = listing("Toyota", 50_000.0, "Dubai", "Vehicles");
        without.specifications = serde_json::json!({
            "make": "Toyota", "model": "Camry", "year": 2020.0,
            "mileage": 30000.0, "transmission": "Automatic", "fuelType": "Petrol"
        });
        assert!(!filter.matches(&without));
    }

    #[test]
    fn condition_filter_reads_raw_key_like_the_sql_does() {
        let filter = ListingFilter {
            condition: Some("New".into()),
            ..Default::default()
        };

        // Vehicles' typed schema has no condition field, but a stray raw key
        // still satisfies `specifications->>'condition'`; the in-memory
        // predicate must agree whether or not the typed decode succeeds.
        let mut car = listing("Toyota", 50_000.0, "Dubai", "Vehicles");
        car.specifications = serde_json::json!({
            "make": "Toyota", "model": "Camry", "year": 2020.0,
            "mileage": 30000.0, "transmission": "Automatic", "fuelType": "Petrol",
            "condition": "New"
        });
        assert!(filter.matches(&car));

        // same row minus one schema field decodes as untyped; same answer
        car.specifications = serde_json::json!({
            "make": "Toyota", "model": "Camry",
            "condition": "New"
        });
        assert!(filter.matches(&car));
    }

    #[test]
    fn validate_rejects_inverted_price_range() {
        let filter = ListingFilter {
            price_min: Some(500.0),
            price_max: Some(100.0),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        let ok = ListingFilter {
            price_min: Some(100.0),
            price_max: Some(500.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        // equal bounds are a valid exact-price query
        let exact = ListingFilter {
            price_min: Some(250.0),
            price_max: Some(250.0),
            ..Default::default()
        };
        assert!(exact.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_and_non_finite_bounds() {
        let negative = ListingFilter {
            price_min: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = ListingFilter {
            price_max: Some(f64::NAN),
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn filter_deserializes_from_sparse_params() {
        let filter: ListingFilter =
            serde_json::from_str(r#"{"category": "Vehicles", "price_min": 1000}"#).unwrap();
        assert_eq!(filter.category.as_deref(), Some("Vehicles"));
        assert_eq!(filter.price_min, Some(1000.0));
        assert!(filter.price_max.is_none());
        assert!(filter.query.is_none());
    }
}
