use anyhow::Result;

pub fn run() -> Result<()> {
    println!("recast {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
