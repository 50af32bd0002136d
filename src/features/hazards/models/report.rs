use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::media::MediaFile;
use crate::features::map::models::MapPoint;

/// A validated report handed from the wizard to the orchestrator
#[derive(Debug)]
pub struct CompletedReport {
    /// Layer name the report belongs to
    pub category: String,
    /// Subcategory code from the layer's coded domain
    pub subcategory: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub media: Vec<MediaFile>,
}

/// Attribute set of a new hazard feature
#[derive(Debug, Clone, PartialEq)]
pub struct HazardAttributes {
    pub subcategory: String,
    pub description: String,
    pub date_reported: DateTime<Utc>,
    pub submitted_by: String,
}

impl HazardAttributes {
    /// Feature-service attribute map; dates are epoch milliseconds
    pub fn to_attribute_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("Hazard_Subcategory".to_string(), json!(self.subcategory));
        map.insert("Hazard_Description".to_string(), json!(self.description));
        map.insert(
            "Hazard_Date_Reported".to_string(),
            json!(self.date_reported.timestamp_millis()),
        );
        map.insert("Hazard_Submitted_By".to_string(), json!(self.submitted_by));
        map
    }
}

/// Geometry plus attributes of a feature to add
#[derive(Debug, Clone, PartialEq)]
pub struct HazardFeature {
    pub point: MapPoint,
    pub attributes: HazardAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_attribute_map_uses_epoch_millis() {
        let attributes = HazardAttributes {
            subcategory: "2".to_string(),
            description: "Lane shut".to_string(),
            date_reported: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            submitted_by: "river_watch".to_string(),
        };

        let map = attributes.to_attribute_map();
        assert_eq!(map["Hazard_Subcategory"], json!("2"));
        assert_eq!(map["Hazard_Date_Reported"], json!(1_714_564_800_000_i64));
        assert_eq!(map["Hazard_Submitted_By"], json!("river_watch"));
        assert_eq!(map.len(), 4);
    }
}
