//! Template renderer: maps the workbook's human-readable labels onto the
//! fixed variable set of the LaTeX template and delegates substitution to
//! minijinja, configured with delimiters that cannot collide with LaTeX's
//! own braces (`\VAR{…}`, `\BLOCK{…}`, `\#{…}`).

use chrono::Local;
use log::info;
use minijinja::syntax::SyntaxConfig;
use minijinja::{path_loader, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::types::{format_price, Claim, ClaimMetadata, ExpenseLine};

// Exact label texts of the metadata block, parenthetical hints included.
// These must match the workbook cell contents character for character.
const LABEL_ASSOCIATION_NAME: &str = "Nom de l'association";
const LABEL_ASSOCIATION_ADRESS_1: &str = "Adresse de l'association (partie 1)";
const LABEL_ASSOCIATION_ADRESS_2: &str = "Adresse de l'association (partie 2)";
const LABEL_ASSOCIATION_EMAIL: &str = "Email de l'association";
const LABEL_CLAIM_NUMBER: &str = "Numéro de la note de frais";
const LABEL_MANDATE: &str = "Mandat";
const LABEL_TREASURER: &str = "Trésorier";
const LABEL_BENEFICIARY_NAME: &str = "Bénéficiaire (à remplir sur la feuille suivante)";
const LABEL_BENEFICIARY_ADRESS_1: &str = "Adresse (partie 1)";
const LABEL_BENEFICIARY_ADRESS_2: &str = "Adresse (partie 2)";
const LABEL_BENEFICIARY_PHONE: &str = "Téléphone";
const LABEL_BENEFICIARY_IBAN: &str = "IBAN (remplissage auto à partir du bénéficiaire)";
const LABEL_REFUND_MODE: &str = "Mode de remboursement";
const LABEL_SIGNING_PLACE: &str = "Fait à";
const LABEL_ATTACHMENT_LIST: &str = "Noms pièces jointes (séparées par une virgule)";
const LABEL_SIGNATURE_FILE: &str = "Nom du fichier signature (vide si pas)";
const LABEL_LOGO_FILE: &str = "Nom du fichier logo (vide si pas)";

const DEFAULT_SIGNING_PLACE: &str = "Toulouse";

/// The full variable set the document template may reference. Field names
/// are the published template interface; renaming one breaks every template
/// in the field.
#[derive(Debug, Serialize)]
pub struct RenderContext {
    pub association_name: String,
    pub association_adress_1: String,
    pub association_adress_2: String,
    pub association_email: String,
    #[serde(rename = "ERC_number")]
    pub erc_number: String,
    pub date: String,
    pub mandate: String,
    pub treasurer: String,
    pub beneficiary_name: String,
    pub beneficiary_adress_1: String,
    pub beneficiary_adress_2: String,
    pub beneficiary_phone: String,
    pub beneficiary_iban: String,
    pub refund_mod: String,
    pub lieu_signature: String,
    pub attachment_list: String,
    pub items: Vec<ExpenseLine>,
    pub final_price: String,
    pub receipt_files: Vec<String>,
    pub signature_path: String,
    pub logo_path: String,
}

/// Fill the template named by the config with the claim. Missing template or
/// a template referencing an unknown variable is a fatal render error.
pub fn render_claim(config: &Config, claim: &Claim) -> Result<String, Error> {
    let date = Local::now().format("%d/%m/%Y").to_string();
    let context = build_context(config, claim, date);

    let mut env = Environment::new();
    env.set_loader(path_loader(&config.templates_dir));
    env.set_syntax(latex_syntax()?);
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    let template = env.get_template(&config.template_name)?;
    let rendered = template.render(&context)?;
    info!("rendered template '{}'", config.template_name);
    Ok(rendered)
}

/// Jinja-style syntax that stays out of LaTeX's way.
fn latex_syntax() -> Result<SyntaxConfig, minijinja::Error> {
    SyntaxConfig::builder()
        .block_delimiters(r"\BLOCK{", "}")
        .variable_delimiters(r"\VAR{", "}")
        .comment_delimiters(r"\#{", "}")
        .build()
}

/// Assemble the fixed-shape context. Label absent from the workbook means
/// empty string, except the signing place which falls back to its default.
pub fn build_context(config: &Config, claim: &Claim, date: String) -> RenderContext {
    let metadata = &claim.metadata;
    let get = |label: &str| metadata.get_or(label, "").to_string();

    RenderContext {
        association_name: get(LABEL_ASSOCIATION_NAME),
        association_adress_1: get(LABEL_ASSOCIATION_ADRESS_1),
        association_adress_2: get(LABEL_ASSOCIATION_ADRESS_2),
        association_email: get(LABEL_ASSOCIATION_EMAIL),
        erc_number: get(LABEL_CLAIM_NUMBER),
        date,
        mandate: get(LABEL_MANDATE),
        treasurer: get(LABEL_TREASURER),
        beneficiary_name: get(LABEL_BENEFICIARY_NAME),
        beneficiary_adress_1: get(LABEL_BENEFICIARY_ADRESS_1),
        beneficiary_adress_2: get(LABEL_BENEFICIARY_ADRESS_2),
        beneficiary_phone: get(LABEL_BENEFICIARY_PHONE),
        beneficiary_iban: get(LABEL_BENEFICIARY_IBAN),
        refund_mod: get(LABEL_REFUND_MODE),
        lieu_signature: metadata
            .get_or(LABEL_SIGNING_PLACE, DEFAULT_SIGNING_PLACE)
            .to_string(),
        attachment_list: get(LABEL_ATTACHMENT_LIST),
        items: claim.lines.clone(),
        final_price: format_price(claim.total),
        receipt_files: claim
            .receipts
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        signature_path: optional_asset_path(config, metadata, LABEL_SIGNATURE_FILE),
        logo_path: optional_asset_path(config, metadata, LABEL_LOGO_FILE),
    }
}

/// Empty filename label (or no label at all) resolves to the empty string;
/// anything else resolves under the assets root, path separators and all.
fn optional_asset_path(config: &Config, metadata: &ClaimMetadata, label: &str) -> String {
    let filename = metadata.get_or(label, "");
    if filename.is_empty() {
        String::new()
    } else {
        config
            .assets_dir
            .join(filename)
            .to_string_lossy()
            .into_owned()
    }
}

/// Final PDF name: `note_de_frais_<nnn>_<beneficiary>.pdf`, degrading
/// gracefully when the claim number or the beneficiary is absent.
pub fn output_filename(metadata: &ClaimMetadata) -> String {
    let number = metadata
        .get_or(LABEL_CLAIM_NUMBER, "")
        .trim()
        .parse::<f64>()
        .ok()
        .map(|n| n as u32);
    let beneficiary = metadata
        .get_or(LABEL_BENEFICIARY_NAME, "")
        .trim()
        .replace([' ', '/', '\\'], "_");

    match (number, beneficiary.is_empty()) {
        (Some(n), false) => format!("note_de_frais_{n:03}_{beneficiary}.pdf"),
        (Some(n), true) => format!("note_de_frais_{n:03}.pdf"),
        (None, false) => format!("note_de_frais_{beneficiary}.pdf"),
        (None, true) => "note_de_frais.pdf".to_string(),
    }
}
