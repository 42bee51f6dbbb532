//! People and pets domain types
//!
//! Produced by the extraction stage from free text and consumed by the
//! persistence stage. Absent values are kept as explicit `null` when
//! serialized so downstream consumers never have to guess.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validate::{Validate, ValidationError, require_text};

/// Free text describing one or more people and their pets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleDescription {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub age: Option<u32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub species: Option<Species>,
    #[serde(default, deserialize_with = "whole_number")]
    pub age: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub origin_city: Option<String>,
}

/// A person together with the pets they own, in the order given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonWithPets {
    pub person: Person,
    pub pets: Vec<Pet>,
}

/// Record ids created for one person and their pets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecordIds {
    pub owner_id: String,
    pub child_ids: Vec<String>,
}

/// Pet species
///
/// Deserialization never fails on an unknown label: anything that is not
/// one of the known species (case-insensitive) becomes `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Fish,
    Rabbit,
    Other,
}

impl Species {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "dog" => Species::Dog,
            "cat" => Species::Cat,
            "bird" => Species::Bird,
            "fish" => Species::Fish,
            "rabbit" => Species::Rabbit,
            _ => Species::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Bird => "Bird",
            Species::Fish => "Fish",
            Species::Rabbit => "Rabbit",
            Species::Other => "Other",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Species {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Species {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Species::from_label(&label))
    }
}

/// Accepts any JSON number with no fractional part, so `34` and `34.0`
/// both read as 34. Negative and fractional ages are rejected.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Option::<f64>::deserialize(deserializer)?
        .map(|n| {
            if n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n) {
                Ok(n as u32)
            } else {
                Err(D::Error::custom(format!(
                    "expected a non-negative whole number, got {}",
                    n
                )))
            }
        })
        .transpose()
}

impl Validate for PeopleDescription {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description)
    }
}

impl Validate for Person {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

impl Validate for Pet {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for PersonWithPets {
    fn validate(&self) -> Result<(), ValidationError> {
        self.person.validate().map_err(|e| e.within("person"))?;
        self.pets.validate().map_err(|e| e.within("pets"))
    }
}

impl Validate for PersonRecordIds {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("ownerId", &self.owner_id)?;
        for (idx, id) in self.child_ids.iter().enumerate() {
            require_text(&format!("childIds[{}]", idx), id)?;
        }
        Ok(())
    }
}
