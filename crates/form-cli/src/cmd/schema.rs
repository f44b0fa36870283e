use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{FormSchema, create_form};

#[derive(Args, Debug, Clone)]
pub struct ModelSchemaArgs {
    #[arg(long, value_name = "form.json")]
    pub schema: PathBuf,
    /// Data model deciding which conditional fields are included
    #[arg(long, value_name = "model.json")]
    pub model: Option<PathBuf>,
}

pub fn run_model(args: &ModelSchemaArgs) -> Result<()> {
    let document = super::load_document(&args.schema)?;
    let model = super::load_model(args.model.as_deref())?;
    let form = create_form(document, Some(model))
        .with_context(|| format!("invalid schema {}", args.schema.display()))?;
    println!("{}", serde_json::to_string_pretty(&form.model_schema())?);
    Ok(())
}

pub fn run_document() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&FormSchema::json_schema())?);
    Ok(())
}
