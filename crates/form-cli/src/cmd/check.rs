use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{FieldDescriptor, Schema};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long, value_name = "form.json")]
    pub schema: PathBuf,
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let document = super::load_document(&args.schema)?;
    let schema = Schema::new(document)
        .with_context(|| format!("invalid schema {}", args.schema.display()))?;
    let slots = schema
        .items()
        .iter()
        .filter(|item| matches!(item, FieldDescriptor::Slot(_)))
        .count();
    println!(
        "{}: ok ({} items, {} inputs, {} slots, {} rule sets)",
        args.schema.display(),
        schema.items().len(),
        schema.items().len() - slots,
        slots,
        schema.form().rules.len()
    );
    Ok(())
}
