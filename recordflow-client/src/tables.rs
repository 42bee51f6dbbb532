//! Table names and field mappings
//!
//! Column names written to the record store live here so the stages never
//! spell them out.

use recordflow_core::domain::person::{Person, Pet, Species};
use serde_json::{Value, json};

use crate::records::Fields;

pub const COMPANY_DESCRIPTION_FIELD: &str = "Google Description";
pub const COMPANY_STATUS_FIELD: &str = "Status";
pub const STATUS_SYNCHRONIZED: &str = "Synchronized";

/// Name given to pets the source text did not name
pub const UNNAMED_PET: &str = "Unnamed pet";

/// Names of the tables the pipelines write to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub companies: String,
    pub people: String,
    pub pets: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            companies: "Companies".to_string(),
            people: "People".to_string(),
            pets: "Pets".to_string(),
        }
    }
}

/// Fields written once a company description has been polished
pub fn company_description_fields(description: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(COMPANY_DESCRIPTION_FIELD.to_string(), json!(description));
    fields.insert(COMPANY_STATUS_FIELD.to_string(), json!(STATUS_SYNCHRONIZED));
    fields
}

/// Fields of a person record; unknown values are left out
pub fn person_fields(person: &Person) -> Fields {
    let mut fields = Fields::new();
    fields.insert("Name".to_string(), json!(person.name));
    insert_opt(&mut fields, "Age", person.age.map(Value::from));
    insert_opt(&mut fields, "City", person.city.as_deref().map(Value::from));
    insert_opt(&mut fields, "Job", person.job.as_deref().map(Value::from));
    insert_opt(&mut fields, "Bio", person.bio.as_deref().map(Value::from));
    fields
}

/// Fields of a pet record linked to its owner
pub fn pet_fields(pet: &Pet, owner_record_id: &str) -> Fields {
    let species = pet.species.unwrap_or(Species::Other);

    let mut fields = Fields::new();
    fields.insert(
        "Name".to_string(),
        json!(pet.name.as_deref().unwrap_or(UNNAMED_PET)),
    );
    fields.insert("Species".to_string(), json!(species.as_str()));
    insert_opt(&mut fields, "Age", pet.age.map(Value::from));
    insert_opt(&mut fields, "Notes", pet.notes.as_deref().map(Value::from));
    fields.insert("Owner".to_string(), json!([owner_record_id]));
    fields
}

fn insert_opt(fields: &mut Fields, name: &str, value: Option<Value>) {
    if let Some(value) = value {
        fields.insert(name.to_string(), value);
    }
}
