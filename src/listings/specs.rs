use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed per-category specification schemas. Listings store specifications
/// as free-form JSON; decoding is keyed by the listing's category so each
/// category gets its own field set. Unknown categories, and rows whose JSON
/// does not fit the schema, fall back to the untyped `Other` variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Specifications {
    RealEstate(RealEstateSpecs),
    Electronics(ElectronicsSpecs),
    Smartphones(SmartphoneSpecs),
    Vehicles(VehicleSpecs),
    Furniture(FurnitureSpecs),
    Other(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateSpecs {
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub square_meters: f64,
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectronicsSpecs {
    pub brand: String,
    pub model: String,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartphoneSpecs {
    pub brand: String,
    pub model: String,
    pub storage: f64,
    pub ram: f64,
    pub camera: f64,
    pub battery_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSpecs {
    pub make: String,
    pub model: String,
    pub year: f64,
    pub mileage: f64,
    pub transmission: String,
    pub fuel_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureSpecs {
    pub material: String,
    pub dimensions: String,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Specifications {
    pub fn from_value(category: &str, value: &Value) -> Self {
        fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
            serde_json::from_value(value.clone()).ok()
        }

        let typed = match category {
            "Real Estate" => decode(value).map(Self::RealEstate),
            "Electronics" => decode(value).map(Self::Electronics),
            "Smartphones" => decode(value).map(Self::Smartphones),
            "Vehicles" => decode(value).map(Self::Vehicles),
            "Furniture" => decode(value).map(Self::Furniture),
            _ => None,
        };
        typed.unwrap_or_else(|| Self::other_from(value))
    }

    fn other_from(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Other(map.clone()),
            _ => Self::Other(Map::new()),
        }
    }

    /// The `condition` value, for the categories whose schema has one.
    pub fn condition(&self) -> Option<&str> {
        match self {
            Self::Electronics(s) => Some(&s.condition),
            Self::Furniture(s) => Some(&s.condition),
            Self::Other(map) => map.get("condition").and_then(Value::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_typed_specs_per_category() {
        let value = json!({
            "make": "Toyota", "model": "Camry", "year": 2020.0,
            "mileage": 35000.0, "transmission": "Automatic", "fuelType": "Petrol"
        });
        let specs = Specifications::from_value("Vehicles", &value);
        match specs {
            Specifications::Vehicles(v) => {
                assert_eq!(v.make, "Toyota");
                assert_eq!(v.fuel_type, "Petrol");
            }
            other => panic!("expected vehicle specs, got {:?}", other),
        }
    }

    #[test]
    fn unknown_category_falls_back_to_untyped() {
        let value = json!({"anything": "goes", "count": 3});
        let specs = Specifications::from_value("Collectibles", &value);
        match specs {
            Specifications::Other(map) => {
                assert_eq!(map.get("anything").and_then(Value::as_str), Some("goes"));
            }
            other => panic!("expected untyped specs, got {:?}", other),
        }
    }

    #[test]
    fn shape_mismatch_falls_back_to_untyped() {
        // known category, but the row predates the schema
        let value = json!({"brand": "LG"});
        let specs = Specifications::from_value("Electronics", &value);
        assert!(matches!(specs, Specifications::Other(_)));
    }

    #[test]
    fn condition_accessor_covers_carrying_variants_only() {
        let electronics = Specifications::from_value(
            "Electronics",
            &json!({"brand": "LG", "model": "C2", "condition": "Like New"}),
        );
        assert_eq!(electronics.condition(), Some("Like New"));

        let vehicles = Specifications::from_value(
            "Vehicles",
            &json!({
                "make": "Toyota", "model": "Camry", "year": 2020.0,
                "mileage": 35000.0, "transmission": "Automatic", "fuelType": "Petrol"
            }),
        );
        assert_eq!(vehicles.condition(), None);

        let other = Specifications::from_value("Books", &json!({"condition": "Used"}));
        assert_eq!(other.condition(), Some("Used"));
    }

    #[test]
    fn serializes_with_original_key_casing() {
        let specs = Specifications::Smartphones(SmartphoneSpecs {
            brand: "Apple".into(),
            model: "iPhone 13".into(),
            storage: 256.0,
            ram: 6.0,
            camera: 12.0,
            battery_capacity: 3240.0,
        });
        let json = serde_json::to_value(&specs).unwrap();
        assert!(json.get("batteryCapacity").is_some());
        assert!(json.get("battery_capacity").is_none());
    }
}
