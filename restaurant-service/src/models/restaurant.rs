use super::serde_helpers::{optional_text, text_list};
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub building: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub street: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub zipcode: Option<String>,
    /// Coordinates kept as text tokens; numeric input is stringified.
    #[serde(default, deserialize_with = "text_list")]
    pub coord: Vec<String>,
}

impl Address {
    /// `"{building} {street}"` with surrounding whitespace removed.
    pub fn display_line(&self) -> String {
        format!(
            "{} {}",
            self.building.as_deref().unwrap_or(""),
            self.street.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub borough: String,
    pub cuisine: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Restaurant {
    /// A record not yet persisted; storage assigns the id.
    pub fn new(
        name: String,
        borough: String,
        cuisine: String,
        address: Address,
        grades: Vec<Grade>,
    ) -> Self {
        Self {
            id: None,
            name,
            borough,
            cuisine,
            address,
            grades,
        }
    }

    /// Grade of the most recently dated entry.
    ///
    /// Undated entries rank below dated ones. On equal dates the entry stored
    /// first wins.
    pub fn current_grade(&self) -> Option<&str> {
        let mut latest: Option<&Grade> = None;
        for entry in &self.grades {
            match latest {
                Some(best) if entry.date <= best.date => {}
                _ => latest = Some(entry),
            }
        }
        latest.and_then(|entry| entry.grade.as_deref())
    }

    pub fn address_string(&self) -> String {
        self.address.display_line()
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Partial update over the mutable fields. `None` leaves the stored value alone;
/// grades are never part of an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub address: Option<Address>,
}

impl RestaurantUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.borough.is_none()
            && self.cuisine.is_none()
            && self.address.is_none()
    }

    /// Fields for a `$set` operation.
    pub fn to_set_document(&self) -> Result<Document, mongodb::bson::ser::Error> {
        let mut set = doc! {};
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(borough) = &self.borough {
            set.insert("borough", borough.as_str());
        }
        if let Some(cuisine) = &self.cuisine {
            set.insert("cuisine", cuisine.as_str());
        }
        if let Some(address) = &self.address {
            set.insert("address", mongodb::bson::to_bson(address)?);
        }
        Ok(set)
    }

    pub fn apply_to(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if let Some(borough) = self.borough {
            restaurant.borough = borough;
        }
        if let Some(cuisine) = self.cuisine {
            restaurant.cuisine = cuisine;
        }
        if let Some(address) = self.address {
            restaurant.address = address;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(millis: Option<i64>, letter: &str) -> Grade {
        Grade {
            date: millis.map(DateTime::from_millis),
            grade: Some(letter.to_string()),
            score: None,
        }
    }

    fn restaurant_with(grades: Vec<Grade>, address: Address) -> Restaurant {
        Restaurant::new(
            "Dj Reynolds Pub".to_string(),
            "Manhattan".to_string(),
            "Irish".to_string(),
            address,
            grades,
        )
    }

    #[test]
    fn current_grade_picks_latest_date_regardless_of_order() {
        let restaurant = restaurant_with(
            vec![
                grade(Some(1_494_873_250_847), "B"),
                grade(Some(1_502_706_148_453), "A"),
                grade(Some(1_493_436_615_836), "C"),
            ],
            Address::default(),
        );

        assert_eq!(restaurant.current_grade(), Some("A"));
    }

    #[test]
    fn current_grade_absent_without_grades() {
        let restaurant = restaurant_with(vec![], Address::default());
        assert_eq!(restaurant.current_grade(), None);
    }

    #[test]
    fn current_grade_tie_keeps_first_stored_entry() {
        let restaurant = restaurant_with(
            vec![
                grade(Some(1_000), "B"),
                grade(Some(2_000), "P"),
                grade(Some(2_000), "Z"),
            ],
            Address::default(),
        );

        assert_eq!(restaurant.current_grade(), Some("P"));
    }

    #[test]
    fn undated_entries_rank_below_dated_ones() {
        let restaurant = restaurant_with(
            vec![grade(None, "C"), grade(Some(5), "A"), grade(None, "B")],
            Address::default(),
        );

        assert_eq!(restaurant.current_grade(), Some("A"));
    }

    #[test]
    fn address_string_joins_building_and_street() {
        let address = Address {
            building: Some("123".to_string()),
            street: Some("Man st".to_string()),
            zipcode: Some("12345".to_string()),
            coord: vec![],
        };

        assert_eq!(address.display_line(), "123 Man st");
    }

    #[test]
    fn address_string_without_building_starts_with_street() {
        let address = Address {
            street: Some("  Broadway ".to_string()),
            ..Address::default()
        };

        assert_eq!(address.display_line(), "Broadway");
    }

    #[test]
    fn address_string_empty_when_both_absent() {
        assert_eq!(Address::default().display_line(), "");
    }

    #[test]
    fn update_set_contains_only_present_fields() {
        let update = RestaurantUpdate {
            name: Some("TEST TEST TEST".to_string()),
            cuisine: Some("futuristic fusion".to_string()),
            ..RestaurantUpdate::default()
        };

        let set = update.to_set_document().unwrap();
        assert_eq!(
            set,
            doc! { "name": "TEST TEST TEST", "cuisine": "futuristic fusion" }
        );
        assert!(!update.is_empty());
        assert!(RestaurantUpdate::default().is_empty());
    }

    #[test]
    fn apply_leaves_grades_untouched() {
        let mut restaurant = restaurant_with(vec![grade(Some(1), "A")], Address::default());
        let update = RestaurantUpdate {
            borough: Some("Queens".to_string()),
            address: Some(Address {
                building: Some("9".to_string()),
                ..Address::default()
            }),
            ..RestaurantUpdate::default()
        };

        update.apply_to(&mut restaurant);

        assert_eq!(restaurant.borough, "Queens");
        assert_eq!(restaurant.name, "Dj Reynolds Pub");
        assert_eq!(restaurant.address_string(), "9");
        assert_eq!(restaurant.grades.len(), 1);
    }

    #[test]
    fn stored_document_uses_mongo_id_field() {
        let mut restaurant = restaurant_with(vec![], Address::default());
        let oid = ObjectId::new();
        restaurant.id = Some(oid);

        let document = mongodb::bson::to_document(&restaurant).unwrap();
        assert_eq!(document.get_object_id("_id").unwrap(), oid);
        assert_eq!(restaurant.id_hex(), oid.to_hex());
    }

    #[test]
    fn stored_document_with_numeric_fields_reads_back_as_text() {
        let document = doc! {
            "_id": ObjectId::new(),
            "name": "Morris Park Bake Shop",
            "borough": "Bronx",
            "cuisine": "Bakery",
            "address": {
                "building": 1007,
                "street": "Morris Park Ave",
                "zipcode": 10462,
                "coord": [-73.856077, 40.848447],
            },
            "grades": [{ "date": DateTime::from_millis(1_399_075_200_000i64), "grade": "A", "score": 2 }],
        };

        let restaurant: Restaurant = mongodb::bson::from_document(document).unwrap();
        assert_eq!(restaurant.address.building.as_deref(), Some("1007"));
        assert_eq!(restaurant.address.zipcode.as_deref(), Some("10462"));
        assert_eq!(restaurant.address.coord, vec!["-73.856077", "40.848447"]);
        assert_eq!(restaurant.address_string(), "1007 Morris Park Ave");
        assert_eq!(restaurant.current_grade(), Some("A"));
    }
}
