//! Normalization of company identifiers and names
//!
//! All candidate lookups and stored values go through these helpers so that
//! the same real-world identifier always compares equal.

use costledger_domain::constants::PLACEHOLDER_TAX_PREFIX;
use once_cell::sync::Lazy;
use regex::Regex;

/// Legal-form suffixes removed before comparing company names.
pub const LEGAL_SUFFIXES: &[&str] = &[
    "SPÓŁKA Z OGRANICZONĄ ODPOWIEDZIALNOŚCIĄ",
    "SPOLKA Z OGRANICZONA ODPOWIEDZIALNOSCIA",
    "SPÓŁKA Z O O",
    "SP Z O O",
    "SP. Z O.O.",
    "SP Z O.O.",
    "SP ZOO",
    "SPÓŁKA JAWNA",
    "SP J",
    "SP.J.",
];

const NIP_WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];

static NON_WORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s]").expect("NON_WORD_REGEX should compile - this is a bug")
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_REGEX should compile - this is a bug")
});

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Strip a leading `PL` country prefix (any case, optional spaces).
fn strip_pl_prefix(value: &str) -> &str {
    let trimmed = value.trim_start();
    match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("PL") => trimmed[2..].trim_start(),
        _ => trimmed,
    }
}

/// Ten NIP digits without the `PL` prefix and separators.
///
/// Returns `None` for blank or malformed input. Placeholder numbers are kept
/// unchanged.
pub fn normalize_tax_number(value: Option<&str>) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if value.starts_with(PLACEHOLDER_TAX_PREFIX) {
        return Some(value.to_string());
    }

    let digits = digits_only(strip_pl_prefix(value));
    (digits.len() == 10).then_some(digits)
}

/// NIP mod-11 checksum.
pub fn is_valid_nip(value: &str) -> bool {
    let digits: Vec<u32> =
        digits_only(strip_pl_prefix(value)).chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 10 {
        return false;
    }

    let checksum: u32 = digits.iter().zip(NIP_WEIGHTS).map(|(digit, weight)| digit * weight).sum();
    checksum % 11 == digits[9]
}

/// Account number without spaces, dashes or the `PL` prefix, upper-cased.
pub fn normalize_bank_account(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    let compact: String =
        value.chars().filter(|c| !c.is_whitespace() && *c != '-').collect::<String>();
    let compact = compact.to_uppercase();
    let stripped = compact.strip_prefix("PL").unwrap_or(&compact);
    Some(stripped.to_string()).filter(|number| !number.is_empty())
}

/// Nine-digit subscriber number; a `48` country prefix is dropped.
pub fn normalize_phone(value: Option<&str>) -> Option<String> {
    let digits = digits_only(value?);
    let local = match digits.len() {
        11 if digits.starts_with("48") => &digits[2..],
        _ => digits.as_str(),
    };
    (local.len() == 9).then(|| local.to_string())
}

pub fn normalize_email(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty())
}

/// Upper-cased name with punctuation and legal-form suffixes removed and
/// whitespace collapsed.
pub fn normalize_company_name(value: Option<&str>) -> Option<String> {
    let upper = value?.to_uppercase();
    let punctuation_free = NON_WORD_REGEX.replace_all(&upper, " ");
    let mut cleaned = WHITESPACE_REGEX.replace_all(&punctuation_free, " ").into_owned();

    for suffix in LEGAL_SUFFIXES {
        cleaned = cleaned.replace(suffix, "");
    }

    let collapsed = WHITESPACE_REGEX.replace_all(&cleaned, " ").trim().to_string();
    (!collapsed.is_empty()).then_some(collapsed)
}
