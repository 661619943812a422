use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use recast_core::model::Recipe;
use recast_core::RecipeAssembler;
use recast_engine::{compare_to_original, Operation, TransformReport, Transformer};

use super::{read_input, Session, SettingsArgs};
use crate::output::format::format_transform;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct TransformArgs {
    /// Recipe record (JSON), or `-` for stdin
    pub input: PathBuf,

    /// Operation to apply, repeatable and applied in order
    /// (to-vegan, from-healthy, easy, style=thai:0.5, method=fry, ...)
    #[arg(long = "apply", value_name = "OP", required = true)]
    pub operations: Vec<String>,
}

/// Parse every operation first so a typo fails before any work is done,
/// then apply them in order to one working copy.
pub fn apply_operations(
    session: &Session,
    args: &TransformArgs,
) -> Result<(Recipe, Vec<TransformReport>)> {
    let operations = args
        .operations
        .iter()
        .map(|op| op.parse::<Operation>())
        .collect::<Result<Vec<_>, _>>()?;

    let input = read_input(&args.input)?;
    let mut recipe = RecipeAssembler::new(&session.kb)?
        .assemble(&input)
        .with_context(|| format!("Failed to assemble '{}'", input.name))?;

    let transformer =
        Transformer::new(&session.kb)?.with_style_threshold(session.config.style_threshold);
    let mut rng = session.rng();
    let mut reports = Vec::with_capacity(operations.len());
    for op in &operations {
        let report = transformer
            .apply(&mut recipe, op, &mut rng)
            .with_context(|| format!("Failed to apply '{op}'"))?;
        reports.push(report);
    }
    info!(operations = reports.len(), name = %recipe.name, "transformations complete");
    Ok((recipe, reports))
}

pub fn run(args: &TransformArgs, settings: &SettingsArgs, format: OutputFormat) -> Result<()> {
    let session = Session::load(settings)?;
    let (recipe, reports) = apply_operations(&session, args)?;
    let diff = compare_to_original(&recipe);

    println!("{}", format_transform(&recipe, &reports, &diff, format)?);
    Ok(())
}
