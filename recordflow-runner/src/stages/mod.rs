//! Pipeline stages
//!
//! Company description: [`ResearchCompany`] → [`PolishDescription`] →
//! [`UpdateCompanyRecord`].
//!
//! People import: [`ParseDescription`] → [`CreatePeopleAndPets`].

mod company;
pub mod extract;
mod people;

pub use company::{PolishDescription, ResearchCompany, UpdateCompanyRecord};
pub use people::{CreatePeopleAndPets, ParseDescription};

const RECORD_STORE: &str = "record store";
