//! Email addresses derived from customer names.

use rand::{Rng, RngCore};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use salesgen_core::NormalizedEmail;

use crate::errors::GenerationError;

/// Local part used when a name has no usable characters.
const FALLBACK_LOCAL_PART: &str = "cliente";

/// How a synthesized address that is already taken is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmailStrategy {
    /// Append 1, 2, ... to the local part until the address is free.
    #[default]
    Suffixed,
    /// Keep the base address; the pool reuses its current owner.
    Plain,
}

/// `first.last` built from the outer name tokens.
///
/// Tokens ending in `.` (titles such as `Sr.` or `Dra.`) are skipped, accents
/// are folded to ASCII and every other non-alphanumeric character is dropped.
pub fn email_local_part(name: &str) -> String {
    let tokens: Vec<String> = name
        .split_whitespace()
        .filter(|token| !token.ends_with('.'))
        .map(fold_token)
        .filter(|token| !token.is_empty())
        .collect();

    match tokens.as_slice() {
        [] => FALLBACK_LOCAL_PART.to_string(),
        [only] => only.clone(),
        [first, .., last] => format!("{first}.{last}"),
    }
}

/// Build a normalized address for `name`.
///
/// The domain is drawn uniformly from `domains`. With
/// [`EmailStrategy::Suffixed`], `is_taken` is consulted and a counter is
/// appended to the local part until a free address is found.
pub fn synthesize_email<F>(
    name: &str,
    domains: &[String],
    strategy: EmailStrategy,
    is_taken: F,
    rng: &mut dyn RngCore,
) -> Result<NormalizedEmail, GenerationError>
where
    F: Fn(&NormalizedEmail) -> bool,
{
    if domains.is_empty() {
        return Err(GenerationError::Config(
            "at least one email domain is required".to_string(),
        ));
    }
    let domain = &domains[rng.random_range(0..domains.len())];
    let base = email_local_part(name);
    let mut email = NormalizedEmail::parse(&format!("{base}@{domain}"))?;

    if strategy == EmailStrategy::Suffixed {
        let mut counter = 1_u64;
        while is_taken(&email) {
            email = NormalizedEmail::parse(&format!("{base}{counter}@{domain}"))?;
            counter += 1;
        }
    }

    Ok(email)
}

fn fold_token(token: &str) -> String {
    let mut folded = String::with_capacity(token.len());
    for ch in token.chars().flat_map(char::to_lowercase) {
        match ch {
            'a'..='z' | '0'..='9' => folded.push(ch),
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => folded.push('a'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'í' | 'ì' | 'î' | 'ï' => folded.push('i'),
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => folded.push('o'),
            'ú' | 'ù' | 'û' | 'ü' => folded.push('u'),
            'ç' => folded.push('c'),
            'ñ' => folded.push('n'),
            'ý' | 'ÿ' => folded.push('y'),
            'ß' => folded.push_str("ss"),
            'æ' => folded.push_str("ae"),
            'œ' => folded.push_str("oe"),
            _ => {}
        }
    }
    folded
}
