use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{FieldError, FieldKind, ResolvedField, Schema, create_form};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(long, value_name = "form.json")]
    pub schema: PathBuf,
    /// Initial data model (JSON object)
    #[arg(long, value_name = "model.json")]
    pub model: Option<PathBuf>,
    /// Write `name=value` through the bindings before printing; repeatable
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    fields: &'a [ResolvedField],
    model: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<&'a FieldError>,
}

pub fn run(args: &ResolveArgs) -> Result<()> {
    let document = super::load_document(&args.schema)?;
    let model = super::load_model(args.model.as_deref())?;
    let assignments = args
        .set
        .iter()
        .map(|raw| super::parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut form = create_form(document, Some(model))
        .with_context(|| format!("invalid schema {}", args.schema.display()))?;
    for (name, value) in assignments {
        debug!(field = %name, %value, "applying override");
        form.bindings().set_value(name, value);
    }

    if args.json {
        let output = ResolveOutput {
            fields: form.resolved_fields(),
            model: form.snapshot().to_value(),
            errors: form.field_errors().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for line in render_lines(form.schema(), form.resolved_fields(), |name| {
        form.value(name).cloned()
    }) {
        println!("{line}");
    }
    Ok(())
}

fn render_lines<F>(schema: &Schema, fields: &[ResolvedField], value_of: F) -> Vec<String>
where
    F: Fn(&str) -> Option<Value>,
{
    fields
        .iter()
        .map(|field| match field.kind {
            FieldKind::Slot => format!(
                "{:>3}  [slot {}]{}",
                field.index,
                field.slot.as_deref().unwrap_or_default(),
                field
                    .form_item
                    .title()
                    .map(|title| format!(" {title}"))
                    .unwrap_or_default()
            ),
            FieldKind::Input => {
                let name = field.name.as_deref().unwrap_or_default();
                let widget = match (&field.slot, field.widget) {
                    (Some(slot), _) => format!("slot:{slot}"),
                    (None, Some(widget)) if field.detail => format!("{widget} (detail)"),
                    (None, Some(widget)) => widget.to_string(),
                    (None, None) => "-".to_string(),
                };
                let value = value_of(name)
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "<unset>".to_string());
                let required = if schema.rules_for(name).iter().any(|rule| rule.required) {
                    " *"
                } else {
                    ""
                };
                format!("{:>3}  {name}{required} ({widget}) = {value}", field.index)
            }
        })
        .collect()
}
