//! People and pets import stages

use std::sync::Arc;

use async_trait::async_trait;
use recordflow_agents::{Agent, GenerateRequest};
use recordflow_client::RecordStore;
use recordflow_client::tables::{TableNames, person_fields, pet_fields};
use recordflow_core::domain::person::{PeopleDescription, PersonRecordIds, PersonWithPets};
use recordflow_core::{Stage, StageFailure};
use tracing::{debug, info};

use super::RECORD_STORE;
use super::extract::parse_people;
use crate::prompts;

/// Extracts people and their pets from free text
///
/// The agent's answer is parsed once; a malformed answer fails the stage
/// without asking again.
pub struct ParseDescription {
    agent: Arc<dyn Agent>,
}

impl ParseDescription {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Stage for ParseDescription {
    type Input = PeopleDescription;
    type Output = Vec<PersonWithPets>;

    fn id(&self) -> &'static str {
        "parse-description"
    }

    async fn execute(&self, input: PeopleDescription) -> Result<Vec<PersonWithPets>, StageFailure> {
        let request =
            GenerateRequest::new(prompts::EXTRACTION_INSTRUCTIONS).user(input.description);

        let raw = self
            .agent
            .generate(&request)
            .await
            .map_err(|e| StageFailure::collaborator("extraction agent", e))?;

        let people = parse_people(&raw)?;
        info!(
            "Extracted {} person(s) with {} pet(s)",
            people.len(),
            people.iter().map(|p| p.pets.len()).sum::<usize>()
        );

        Ok(people)
    }
}

/// Creates each person, then that person's pets linked back to it
///
/// Records created before a failure are left in place.
pub struct CreatePeopleAndPets {
    store: Arc<dyn RecordStore>,
    tables: TableNames,
}

impl CreatePeopleAndPets {
    pub fn new(store: Arc<dyn RecordStore>, tables: TableNames) -> Self {
        Self { store, tables }
    }
}

#[async_trait]
impl Stage for CreatePeopleAndPets {
    type Input = Vec<PersonWithPets>;
    type Output = Vec<PersonRecordIds>;

    fn id(&self) -> &'static str {
        "create-people-and-pets-in-airtable"
    }

    async fn execute(&self, input: Vec<PersonWithPets>) -> Result<Vec<PersonRecordIds>, StageFailure> {
        let mut created = Vec::with_capacity(input.len());

        for entry in &input {
            let owner_id = self
                .store
                .create(&self.tables.people, person_fields(&entry.person))
                .await
                .map_err(|e| StageFailure::collaborator(RECORD_STORE, e))?;

            info!("Created person '{}' as {}", entry.person.name, owner_id);

            let mut child_ids = Vec::with_capacity(entry.pets.len());
            for pet in &entry.pets {
                let pet_id = self
                    .store
                    .create(&self.tables.pets, pet_fields(pet, &owner_id))
                    .await
                    .map_err(|e| StageFailure::collaborator(RECORD_STORE, e))?;

                debug!("Created pet {} for owner {}", pet_id, owner_id);
                child_ids.push(pet_id);
            }

            created.push(PersonRecordIds {
                owner_id,
                child_ids,
            });
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordflow_agents::ScriptedAgent;
    use recordflow_client::{InMemoryRecordStore, StoreCall};
    use recordflow_core::domain::person::{Person, Pet, Species};

    fn person(name: &str, pets: &[&str]) -> PersonWithPets {
        PersonWithPets {
            person: Person {
                name: name.to_string(),
                age: None,
                city: None,
                job: None,
                bio: None,
            },
            pets: pets
                .iter()
                .map(|p| Pet {
                    name: Some(p.to_string()),
                    species: Some(Species::Cat),
                    ..Pet::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_parse_sends_description_to_agent() {
        let agent = Arc::new(ScriptedAgent::new("extractor").reply(
            "```json\n[{\"person\":{\"name\":\"Ana\"},\"pets\":[]}]\n```",
        ));
        let stage = ParseDescription::new(agent.clone());

        let people = stage
            .execute(PeopleDescription {
                description: "Ana lives alone.".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(people.len(), 1);
        assert_eq!(people[0].person.name, "Ana");
        let requests = agent.requests();
        assert_eq!(requests[0].messages[0].content, "Ana lives alone.");
        assert!(!requests[0].web_search);
    }

    #[tokio::test]
    async fn test_parse_failure_is_not_retried() {
        let agent = Arc::new(ScriptedAgent::new("extractor").always("not json"));
        let stage = ParseDescription::new(agent.clone());

        let err = stage
            .execute(PeopleDescription {
                description: "Ana".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "extraction");
        assert_eq!(agent.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_people_created_before_their_pets() {
        let store = InMemoryRecordStore::new();
        let stage = CreatePeopleAndPets::new(Arc::new(store.clone()), TableNames::default());

        let ids = stage
            .execute(vec![person("Ana", &["Tom", "Kit"]), person("Luis", &["Max"])])
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].child_ids.len(), 2);
        assert_eq!(ids[1].child_ids.len(), 1);

        let calls = store.calls();
        let order: Vec<(&str, &str)> = calls
            .iter()
            .map(|c| (c.table(), c.fields()["Name"].as_str().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("People", "Ana"),
                ("Pets", "Tom"),
                ("Pets", "Kit"),
                ("People", "Luis"),
                ("Pets", "Max"),
            ]
        );

        for call in calls.iter().filter(|c| c.table() == "Pets") {
            let owner = &call.fields()["Owner"][0];
            let expected = ids
                .iter()
                .find(|ids| ids.child_ids.iter().any(|id| id == call.record_id()))
                .unwrap();
            assert_eq!(owner, expected.owner_id.as_str());
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_created_records() {
        let store = InMemoryRecordStore::new();
        store.fail_creates_in("Pets");
        let stage = CreatePeopleAndPets::new(Arc::new(store.clone()), TableNames::default());

        let err = stage
            .execute(vec![person("Ana", &["Tom"]), person("Luis", &[])])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "collaborator");
        // Ana stays, Luis is never reached
        assert_eq!(store.count("People"), 1);
        assert_eq!(store.count("Pets"), 0);
        assert!(matches!(store.calls()[0], StoreCall::Create { .. }));
    }

    #[tokio::test]
    async fn test_empty_input_creates_nothing() {
        let store = InMemoryRecordStore::new();
        let stage = CreatePeopleAndPets::new(Arc::new(store.clone()), TableNames::default());

        assert!(stage.execute(Vec::new()).await.unwrap().is_empty());
        assert!(store.calls().is_empty());
    }
}
