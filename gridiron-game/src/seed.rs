//! Reversible season share codes.
//! Code format: <YEAR>-<WORD><NN>, e.g., 2024-BLITZ42, 2031-AUDIBLE07
use std::hash::Hasher;
use twox_hash::XxHash64;

pub const WORD_LIST: [&str; 64] = [
    "BLITZ", "AUDIBLE", "HUDDLE", "GRIDIRON", "ENDZONE", "PYLON", "FUMBLE", "SNAP", "SACK",
    "SAFETY", "PUNT", "KICKOFF", "ONSIDE", "REDZONE", "SHOTGUN", "PISTOL", "WILDCAT", "NICKEL",
    "DIME", "COVER", "ZONE", "SLANT", "POST", "CORNER", "FADE", "SCREEN", "DRAW", "SWEEP",
    "TOSS", "COUNTER", "TRAP", "ISO", "DIVE", "OPTION", "BOOT", "ROLLOUT", "SPIKE", "KNEEL",
    "HAILMARY", "PICKSIX", "STRIP", "TACKLE", "GUARD", "CENTER", "TIGHT", "SLOT", "FLAT",
    "SEAM", "CURL", "HITCH", "WHEEL", "GOLINE", "CHAINS", "FIRST", "DOWNS", "TWOMIN", "CLOCK",
    "HELMET", "PADS", "TURF", "STADIUM", "ROOKIE", "VETERAN", "TROPHY",
];

const DOMAIN: &[u8] = b"GRIDIRON-SEASON";

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    (word_index & 0x003F) | ((u16::from(nn) & 0x7F) << 6)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x003F, u8::try_from((packed >> 6) & 0x7F).unwrap_or(0))
}

fn compose_seed(year: u16, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(DOMAIN);
    hasher.write(&year.to_le_bytes());
    hasher.write(&packed.to_le_bytes());
    (hasher.finish() & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the share code for a season seed. Only seeds produced by
/// [`decode_share_code`] or [`generate_share_code`] round-trip exactly.
#[must_use]
pub fn encode_share_code(year: u16, seed: u64) -> String {
    let (wi, nn) = unpack(u16::try_from(seed & 0xFFFF).unwrap_or(0));
    let word = WORD_LIST.get(usize::from(wi)).copied().unwrap_or(WORD_LIST[0]);
    format!("{year}-{word}{:02}", nn % 100)
}

/// Parse a share code into the season year and seed.
#[must_use]
pub fn decode_share_code(code: &str) -> Option<(u16, u64)> {
    let (year_part, rest) = code.trim().split_once('-')?;
    let year: u16 = year_part.trim().parse().ok()?;
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| *w == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some((year, compose_seed(year, wi, nn)))
}

/// Pick a fresh code for `year` from arbitrary entropy.
#[must_use]
pub fn generate_share_code(year: u16, entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_share_code(year, compose_seed(year, wi, nn))
}
