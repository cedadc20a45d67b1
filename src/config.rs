use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Run configuration. Built once at startup and passed into every stage, so
/// nothing depends on the process working directory after this point.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the claim workspace; images referenced from the spreadsheet
    /// (signature, logo) are resolved against this directory.
    pub assets_dir: PathBuf,
    pub templates_dir: PathBuf,
    /// Scratch and final-output directory. One run at a time per directory:
    /// the temporary file names inside it are fixed.
    pub output_dir: PathBuf,
    pub data_file: PathBuf,
    pub receipts_dir: PathBuf,
    pub sheet_name: String,
    pub template_name: String,
    /// Compiler executable, either a bare name resolved on PATH or a full
    /// path to a local install. Must accept `-o <outdir> <texfile>`.
    pub compiler: String,
    pub compile_timeout: Duration,
    /// Keep the rendered .tex next to the final PDF instead of deleting it.
    pub keep_tex: bool,
    /// Final PDF name override; when unset the name is derived from the
    /// claim number and beneficiary.
    pub output_name: Option<String>,
}

const DEFAULT_SHEET: &str = "Tableau de bord";
const DEFAULT_TEMPLATE: &str = "main.tex";
const DEFAULT_COMPILER: &str = "tectonic";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

impl Config {
    /// Defaults matching the standard workspace layout: `templates/`,
    /// `output/`, `justificatifs/` and `data.xlsx` under the assets root.
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        let assets_dir = assets_dir.into();
        Self {
            templates_dir: assets_dir.join("templates"),
            output_dir: assets_dir.join("output"),
            data_file: assets_dir.join("data.xlsx"),
            receipts_dir: assets_dir.join("justificatifs"),
            assets_dir,
            sheet_name: DEFAULT_SHEET.to_string(),
            template_name: DEFAULT_TEMPLATE.to_string(),
            compiler: DEFAULT_COMPILER.to_string(),
            compile_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            keep_tex: false,
            output_name: None,
        }
    }

    /// Defaults plus `EXPENSE_*` environment overrides (a `.env` file loaded
    /// at startup feeds these too).
    pub fn from_env(assets_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(assets_dir);
        if let Ok(v) = env::var("EXPENSE_SHEET") {
            config.sheet_name = v;
        }
        if let Ok(v) = env::var("EXPENSE_TEMPLATE") {
            config.template_name = v;
        }
        if let Ok(v) = env::var("EXPENSE_COMPILER") {
            config.compiler = v;
        }
        if let Ok(v) = env::var("EXPENSE_COMPILE_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                config.compile_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(v) = env::var("EXPENSE_KEEP_TEX") {
            config.keep_tex = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = env::var("EXPENSE_OUTPUT_NAME") {
            if !v.trim().is_empty() {
                config.output_name = Some(v);
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_assets_root() {
        let config = Config::new("/claims/2026");
        assert_eq!(config.data_file, PathBuf::from("/claims/2026/data.xlsx"));
        assert_eq!(config.templates_dir, PathBuf::from("/claims/2026/templates"));
        assert_eq!(config.output_dir, PathBuf::from("/claims/2026/output"));
        assert_eq!(
            config.receipts_dir,
            PathBuf::from("/claims/2026/justificatifs")
        );
        assert_eq!(config.sheet_name, "Tableau de bord");
        assert_eq!(config.compiler, "tectonic");
        assert!(!config.keep_tex);
        assert!(config.output_name.is_none());
    }
}
