//! `pacer tool list` and `pacer tool call`.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use pacer_core::tools::ToolRegistry;

use crate::ToolCommands;

pub async fn run_tool_command(command: ToolCommands, registry: &ToolRegistry) -> Result<()> {
    match command {
        ToolCommands::List => {
            cmd_list(registry);
            Ok(())
        }
        ToolCommands::Call { name, args } => cmd_call(registry, &name, args.as_deref()).await,
    }
}

fn cmd_list(registry: &ToolRegistry) {
    for spec in registry.specs() {
        println!("{}", spec.name);
        println!("    {}", spec.description);
        for p in &spec.params {
            let marker = if p.required { "" } else { " (optional)" };
            println!("    - {}{}: {}", p.name, marker, p.description);
        }
        println!();
    }
}

pub fn parse_args(raw: Option<&str>) -> Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value = serde_json::from_str(raw).context("--args is not valid JSON")?;
    if !value.is_object() {
        bail!("--args must be a JSON object");
    }
    Ok(value)
}

async fn cmd_call(registry: &ToolRegistry, name: &str, args: Option<&str>) -> Result<()> {
    let args = parse_args(args)?;
    let out = registry.invoke(name, &args).await?;
    if out.is_error {
        bail!(out.output);
    }
    println!("{}", out.output);
    Ok(())
}
