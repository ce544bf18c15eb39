//! Render command implementation
//!
//! Reads the snippet, commits the numeric options the way the editor's
//! inputs do, and saves one PNG through an export session.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use snipprok::{
    fontdb::{FontChain, LocalFontSource, SystemFontSource},
    prelude::*,
};

use crate::cli::RenderArgs;
use crate::commands::{load_theme, read_source};

pub fn run(args: &RenderArgs) -> Result<()> {
    let source = read_source(&args.source)?;
    let params = export_parameters(args, source)?;

    let snipprok = Snipprok::builder()
        .theme(load_theme(&args.source)?)
        .fonts(Arc::new(font_chain(args)))
        .build()?;
    let session = ExportSession::new(snipprok, DirectorySink::new(&args.out_dir));

    match session.export(&params) {
        Notification::Saved(report) => {
            println!(
                "{} {} ({}x{}, {} lines)",
                "Saved".green().bold(),
                report.path.display(),
                report.width,
                report.height,
                report.line_count
            );
            Ok(())
        },
        Notification::Busy => bail!("Another export is already running"),
        Notification::Failed { message } => bail!(message),
    }
}

/// Parameters as the editor would hand them over
pub fn export_parameters(args: &RenderArgs, source_text: String) -> Result<ExportParameters> {
    let defaults = ExportParameters::default();

    let mut font_size = BoundedField::font_size(defaults.font_size_px);
    let mut padding = BoundedField::padding(defaults.outer_padding_px);
    let mut width = BoundedField::width(defaults.width_px);
    font_size.commit(&args.font_size);
    padding.commit(&args.padding);
    width.commit(&args.width);

    let pixel_scale = PixelScale::try_from(args.scale).context("Invalid --scale")?;

    Ok(ExportParameters {
        font_size_px: font_size.value(),
        background_color: args.background.clone(),
        outer_padding_px: padding.value(),
        pixel_scale,
        width_px: width.value(),
        language_tag: args.source.language.clone(),
        source_text,
    })
}

/// User fonts first, then the bundled chain, then the system face
pub fn font_chain(args: &RenderArgs) -> FontChain {
    let mut chain = FontChain::bundled();
    for path in args.fonts.iter().rev() {
        chain = chain.prepend(LocalFontSource::new(path));
    }
    if args.system_font {
        chain = chain.with_source(SystemFontSource::monospace());
    }
    log::debug!("font sources: {:?}", chain.describe());
    chain
}
