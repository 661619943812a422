use anyhow::Result;

use recast_core::model::Recipe;
use recast_engine::{DiffEntry, RecipeDiff, TransformReport};

use super::OutputFormat;

pub fn format_recipe(recipe: &Recipe, fmt: OutputFormat) -> Result<String> {
    Ok(match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(recipe)?,
        OutputFormat::Text => format_recipe_text(recipe),
        OutputFormat::Markdown => format_recipe_markdown(recipe),
    })
}

fn format_recipe_text(recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", recipe.name));
    out.push_str(&format!(
        "Prep: {} min  Cook: {} min  Total: {} min\n",
        recipe.preptime, recipe.cooktime, recipe.totaltime
    ));

    out.push_str("\nIngredients:\n");
    for ing in &recipe.ingredients {
        out.push_str(&format!("  - {}  [{}]\n", ing.render(), ing.category().label()));
    }

    out.push_str("\nInstructions:\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step.text));
    }

    let tools = recipe.tools();
    if !tools.is_empty() {
        out.push_str(&format!("\nTools:   {}\n", join(tools.iter())));
    }
    let methods = recipe.methods();
    if !methods.is_empty() {
        out.push_str(&format!("Methods: {}\n", join(methods.iter())));
    }
    out
}

fn format_recipe_markdown(recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", recipe.name));
    out.push_str(&format!(
        "*Prep {} min, cook {} min, total {} min*\n\n",
        recipe.preptime, recipe.cooktime, recipe.totaltime
    ));

    out.push_str("## Ingredients\n\n");
    for ing in &recipe.ingredients {
        out.push_str(&format!("- {}\n", ing.render()));
    }

    out.push_str("\n## Instructions\n\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step.text));
    }
    out
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub fn format_diff(diff: &RecipeDiff, fmt: OutputFormat) -> Result<String> {
    Ok(match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(diff)?,
        OutputFormat::Text => format_diff_text(diff),
        OutputFormat::Markdown => format_diff_markdown(diff),
    })
}

fn describe(entry: &DiffEntry) -> String {
    match entry.slot {
        Some(slot) => format!("{} {}", entry.section, slot + 1),
        None => format!("{}", entry.section),
    }
}

fn format_diff_text(diff: &RecipeDiff) -> String {
    if diff.is_empty() {
        return "No changes.".to_string();
    }

    let mut out = String::new();
    if !diff.added.is_empty() {
        out.push_str(&format!("Added ({}):\n", diff.added.len()));
        for e in &diff.added {
            let after = e.after.as_deref().unwrap_or_default();
            out.push_str(&format!("  + [{}] {after}\n", describe(e)));
        }
    }
    if !diff.removed.is_empty() {
        out.push_str(&format!("Removed ({}):\n", diff.removed.len()));
        for e in &diff.removed {
            let before = e.before.as_deref().unwrap_or_default();
            out.push_str(&format!("  - [{}] {before}\n", describe(e)));
        }
    }
    if !diff.substituted.is_empty() {
        out.push_str(&format!("Substituted ({}):\n", diff.substituted.len()));
        for e in &diff.substituted {
            let before = e.before.as_deref().unwrap_or_default();
            let after = e.after.as_deref().unwrap_or_default();
            out.push_str(&format!("  ~ [{}] {before} -> {after}\n", describe(e)));
        }
    }
    out
}

fn format_diff_markdown(diff: &RecipeDiff) -> String {
    if diff.is_empty() {
        return "_No changes._".to_string();
    }

    let mut out = String::from("| change | line | before | after |\n|---|---|---|---|\n");
    let rows = diff
        .added
        .iter()
        .map(|e| ("added", e))
        .chain(diff.removed.iter().map(|e| ("removed", e)))
        .chain(diff.substituted.iter().map(|e| ("substituted", e)));
    for (kind, e) in rows {
        out.push_str(&format!(
            "| {kind} | {} | {} | {} |\n",
            describe(e),
            e.before.as_deref().unwrap_or(""),
            e.after.as_deref().unwrap_or("")
        ));
    }
    out
}

pub fn format_transform(
    recipe: &Recipe,
    reports: &[TransformReport],
    diff: &RecipeDiff,
    fmt: OutputFormat,
) -> Result<String> {
    if let OutputFormat::Json = fmt {
        let json = serde_json::json!({
            "recipe": recipe,
            "reports": reports,
            "diff": diff,
        });
        return Ok(serde_json::to_string_pretty(&json)?);
    }

    let mut out = format_recipe(recipe, fmt)?;
    let notices: Vec<String> = reports
        .iter()
        .flat_map(|r| r.notices.iter().map(|n| format!("{}: {n}", r.operation)))
        .collect();
    if !notices.is_empty() {
        out.push_str(if let OutputFormat::Markdown = fmt {
            "\n## Notices\n\n"
        } else {
            "\nNotices:\n"
        });
        for notice in notices {
            out.push_str(&format!("  {notice}\n"));
        }
    }

    out.push_str(if let OutputFormat::Markdown = fmt {
        "\n## Changes\n\n"
    } else {
        "\nChanges:\n"
    });
    out.push_str(&format_diff(diff, fmt)?);
    Ok(out)
}
