//! Preview command implementation

use anyhow::Result;
use snipprok::Snipprok;

use crate::cli::PreviewArgs;
use crate::commands::{load_theme, read_source};

pub fn run(args: &PreviewArgs) -> Result<()> {
    let source = read_source(&args.source)?;
    let snipprok = Snipprok::builder().theme(load_theme(&args.source)?).build()?;
    print!("{}", snipprok.preview(&source, &args.source.language));
    Ok(())
}
