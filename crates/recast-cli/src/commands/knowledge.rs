use anyhow::Result;

use super::{Session, SettingsArgs};
use crate::output::OutputFormat;

pub fn run(settings: &SettingsArgs, format: OutputFormat) -> Result<()> {
    let session = Session::load(settings)?;
    let kb = &session.kb;
    let styles: Vec<&str> = kb.style_names().collect();
    let methods: Vec<&str> = kb.primary_methods().iter().map(String::as_str).collect();
    let diets: Vec<&str> = kb.diet_names().collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "styles": styles,
                "methods": methods,
                "diets": diets,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Styles:  {}", styles.join(", "));
            println!("Methods: {}", methods.join(", "));
            println!("Diets:   {}", diets.join(", "));
        }
        OutputFormat::Markdown => {
            for (title, items) in [("Styles", &styles), ("Methods", &methods), ("Diets", &diets)] {
                println!("## {title}\n");
                for item in items.iter() {
                    println!("- {item}");
                }
                println!();
            }
        }
    }

    Ok(())
}
