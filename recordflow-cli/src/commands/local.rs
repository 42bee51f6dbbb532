//! Local pipeline execution
//!
//! Runs a pipeline in this process and waits for the result. Credentials
//! come from the same environment variables the orchestrator uses.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use recordflow_client::{Fields, InMemoryRecordStore, StoreCall};
use recordflow_core::domain::company::CompanyCreated;
use recordflow_core::domain::person::{PeopleDescription, PersonRecordIds};
use recordflow_runner::{Collaborators, Config};

/// Run the company description pipeline
pub async fn run_company(record_id: String, name: String, dry_run: bool) -> Result<()> {
    let (collaborators, dry_store) = collaborators(dry_run)?;

    if let Some(store) = &dry_store {
        // The pipeline updates an existing record
        store.insert(&collaborators.tables.companies, &record_id, Fields::new());
    }

    println!(
        "{} {} ({})",
        "Describing company".bold(),
        name.cyan(),
        record_id.dimmed()
    );

    let output = collaborators
        .company_pipeline()
        .run(CompanyCreated {
            airtable_record_id: record_id,
            name,
        })
        .await?;

    println!();
    println!("{}", "Description:".bold());
    println!("{}", output.description);
    println!();

    match dry_store {
        Some(store) => print_dry_run_writes(&store),
        None => println!(
            "{} Record {} synchronized",
            "✓".green(),
            output.airtable_record_id.cyan()
        ),
    }

    Ok(())
}

/// Run the people and pets import pipeline
pub async fn run_people(text: Option<String>, file: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let description = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read description from {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --text or --file is required"),
    };

    let (collaborators, dry_store) = collaborators(dry_run)?;

    let created = collaborators
        .people_pipeline()
        .run(PeopleDescription { description })
        .await?;

    print_created(&created);

    if let Some(store) = dry_store {
        println!();
        print_dry_run_writes(&store);
    }

    Ok(())
}

/// Production collaborators, with an in-memory store for dry runs
fn collaborators(dry_run: bool) -> Result<(Collaborators, Option<InMemoryRecordStore>)> {
    let config = Config::from_env().context("Failed to load configuration")?;

    if dry_run {
        config.validate_agents()?;
        let store = InMemoryRecordStore::new();
        let collaborators =
            Collaborators::from_config(&config).with_store(Arc::new(store.clone()));
        Ok((collaborators, Some(store)))
    } else {
        config.validate()?;
        Ok((Collaborators::from_config(&config), None))
    }
}

fn print_created(created: &[PersonRecordIds]) {
    if created.is_empty() {
        println!("{}", "No people found in the description.".yellow());
        return;
    }

    println!(
        "{}",
        format!("Created {} person record(s):", created.len()).bold()
    );
    for ids in created {
        println!("  {} Person {}", "▸".cyan(), ids.owner_id.bold());
        for pet in &ids.child_ids {
            println!("      Pet {}", pet.dimmed());
        }
    }
}

fn print_dry_run_writes(store: &InMemoryRecordStore) {
    println!("{}", "Dry run, nothing was written. Writes:".yellow());
    for call in store.calls() {
        let verb = match call {
            StoreCall::Create { .. } => "create",
            StoreCall::Update { .. } => "update",
        };
        let fields = serde_json::to_string(call.fields()).unwrap_or_default();
        println!(
            "  {} {}/{} {}",
            verb.cyan(),
            call.table(),
            call.record_id(),
            fields.dimmed()
        );
    }
}
