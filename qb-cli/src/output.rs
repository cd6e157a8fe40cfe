use qb_core::errors::*;
use qb_core::model::hide_secrets;
use qb_core::prelude::*;
use serde::Serialize;
use serde_json as json;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

// The machine-readable stats trailer apply/diff/delete append to stdout.
pub fn print_stats<T: Serialize>(stats: &T) -> EmptyResult {
    let doc = json::json!({"stats": stats});
    println!("---");
    print!("{}", serde_yaml::to_string(&doc)?);
    Ok(())
}

pub fn print_objects(objects: &[LocalObject], format: OutputFormat, show_secrets: bool) -> EmptyResult {
    let docs: Vec<json::Value> = objects
        .iter()
        .map(|o| {
            let mut doc = o.to_json()?;
            if !show_secrets {
                hide_secrets(&mut doc);
            }
            Ok(doc)
        })
        .collect::<anyhow::Result<_>>()?;

    match format {
        OutputFormat::Yaml => {
            for doc in &docs {
                println!("---");
                print!("{}", serde_yaml::to_string(doc)?);
            }
        },
        OutputFormat::Json => {
            let list = json::json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": docs,
            });
            println!("{}", json::to_string_pretty(&list)?);
        },
    }
    Ok(())
}

pub fn print_doc<T: Serialize>(doc: &T, format: OutputFormat) -> EmptyResult {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(doc)?),
        OutputFormat::Json => println!("{}", json::to_string_pretty(doc)?),
    }
    Ok(())
}
