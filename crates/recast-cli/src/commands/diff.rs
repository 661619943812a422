use anyhow::Result;
use clap::Args;

use recast_engine::compare_to_original;

use super::transform::{apply_operations, TransformArgs};
use super::{Session, SettingsArgs};
use crate::output::format::format_diff;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub transform: TransformArgs,
}

pub fn run(args: &DiffArgs, settings: &SettingsArgs, format: OutputFormat) -> Result<()> {
    let session = Session::load(settings)?;
    let (recipe, _) = apply_operations(&session, &args.transform)?;
    let diff = compare_to_original(&recipe);

    println!("{}", format_diff(&diff, format)?);
    Ok(())
}
