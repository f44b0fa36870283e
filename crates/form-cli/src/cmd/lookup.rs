use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use form_spec::Schema;
use serde_json::Value;

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[arg(long, value_name = "form.json")]
    pub schema: PathBuf,
    /// Input whose option tree is searched
    #[arg(long)]
    pub field: String,
    /// Option values from root to leaf; JSON literals are accepted (`2`)
    #[arg(value_name = "VALUE", required = true)]
    pub path: Vec<String>,
}

pub fn run(args: &LookupArgs) -> Result<()> {
    let document = super::load_document(&args.schema)?;
    let schema = Schema::new(document)
        .with_context(|| format!("invalid schema {}", args.schema.display()))?;
    let options = schema
        .inputs_named(&args.field)
        .find_map(|(_, input)| input.attrs.options.as_ref())
        .ok_or_else(|| anyhow!("'{}' has no options", args.field))?;

    let path: Vec<Value> = args
        .path
        .iter()
        .map(|segment| {
            serde_json::from_str(segment).unwrap_or_else(|_| Value::String(segment.clone()))
        })
        .collect();
    let labels = options
        .label_chain(&path)
        .with_context(|| format!("lookup failed for '{}'", args.field))?;
    println!("{}", labels.join(" / "));
    Ok(())
}
