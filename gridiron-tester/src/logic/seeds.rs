use anyhow::{Context, Result, bail};
use gridiron_game::seed::WORD_LIST;
use gridiron_game::{decode_share_code, encode_share_code};
use std::collections::HashMap;

/// Season year used for bare numeric seeds.
pub const DEFAULT_YEAR: u16 = 2024;

/// Seed metadata resolved from CLI tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub year: u16,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            year: DEFAULT_YEAR,
            code: None,
        }
    }

    #[must_use]
    pub const fn from_share_code(year: u16, seed: u64, code: String) -> Self {
        Self {
            seed,
            year,
            code: Some(code),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_share_code(self.year, self.seed))
    }
}

/// Resolve CLI seed tokens into canonical seed metadata.
///
/// Accepts literal integers, share codes (`2024-BLITZ42`), and the keyword
/// `all`, which expands to every share code for [`DEFAULT_YEAR`].
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some((year, seed)) = decode_share_code(token) {
            pending.push(SeedInfo::from_share_code(year, seed, token.trim().to_uppercase()));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(every_share_code(DEFAULT_YEAR)?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u16, u64), usize> = HashMap::new();
    for info in pending {
        if let Some(&existing) = index.get(&(info.year, info.seed)) {
            if deduped[existing].code.is_none() && info.code.is_some() {
                deduped[existing] = info;
            }
        } else {
            index.insert((info.year, info.seed), deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

fn every_share_code(year: u16) -> Result<Vec<SeedInfo>> {
    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100);
    for word in WORD_LIST {
        for suffix in 0..100 {
            let code = format!("{year}-{word}{suffix:02}");
            let (year, seed) = decode_share_code(&code)
                .with_context(|| format!("failed to parse share code: {code}"))?;
            seeds.push(SeedInfo::from_share_code(year, seed, code));
        }
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_share_code() {
        let raw = vec![
            "42".to_string(),
            "-7".to_string(),
            "2026-blitz42".to_string(),
        ];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert!(seeds.iter().any(|s| s.seed == 42 && s.code.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.year == DEFAULT_YEAR));
        assert!(
            seeds
                .iter()
                .any(|s| s.code.as_deref() == Some("2026-BLITZ42") && s.year == 2026)
        );
    }

    #[test]
    fn duplicate_seeds_keep_the_share_code() {
        let (_, seed) = decode_share_code("2024-SNAP07").unwrap();
        let raw = vec![seed.to_string(), "2024-SNAP07".to_string()];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].code.as_deref(), Some("2024-SNAP07"));
    }

    #[test]
    fn expands_all_share_codes() {
        let seeds = resolve_seed_inputs(&["all".to_string()]).unwrap();
        assert_eq!(seeds.len(), WORD_LIST.len() * 100);
        assert!(seeds.iter().all(|s| s.code.is_some()));
    }

    #[test]
    fn rejects_garbage_and_defaults_when_empty() {
        assert!(resolve_seed_inputs(&["nope".to_string()]).is_err());
        let seeds = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(1337)]);
    }
}
