use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use recast_core::RecipeAssembler;

use super::{read_input, Session, SettingsArgs};
use crate::output::format::format_recipe;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ParseArgs {
    /// Recipe record (JSON), or `-` for stdin
    pub input: PathBuf,
}

pub fn run(args: &ParseArgs, settings: &SettingsArgs, format: OutputFormat) -> Result<()> {
    let session = Session::load(settings)?;
    let input = read_input(&args.input)?;
    let recipe = RecipeAssembler::new(&session.kb)?
        .assemble(&input)
        .with_context(|| format!("Failed to assemble '{}'", input.name))?;

    println!("{}", format_recipe(&recipe, format)?);
    Ok(())
}
