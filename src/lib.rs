//! Turns an expense-claim spreadsheet into a compiled PDF: load the
//! workbook, fill the LaTeX template, run the compiler, deliver the file.

pub mod config;
pub mod error;
pub mod excel;
pub mod pdf;
pub mod receipts;
pub mod render;
pub mod types;

use std::path::PathBuf;

pub use config::Config;
pub use error::Error;
pub use types::{Claim, ClaimMetadata, ExpenseLine};

/// Run the whole pipeline once: Loader → Renderer → Exporter. Returns the
/// path of the final PDF.
pub fn run(config: &Config) -> Result<PathBuf, Error> {
    let claim = excel::load_claim(config)?;
    let tex_source = render::render_claim(config, &claim)?;
    let output_filename = config
        .output_name
        .clone()
        .unwrap_or_else(|| render::output_filename(&claim.metadata));
    pdf::compile_pdf(config, &tex_source, &output_filename)
}
