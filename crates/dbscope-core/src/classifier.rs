//! Pure, total classification of cell content. Every character maps to
//! exactly one class and every string maps to a (possibly empty) set of
//! format tags; nothing here can fail.

/// Character-level class buckets. The four buckets partition all of `char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Numeric,
    Alphabetic,
    Special,
    Unknown,
}

/// Fixed rule table: digits first, then letters, then punctuation,
/// whitespace and symbols (ASCII plus the common Unicode punctuation and
/// symbol blocks). Whatever is left — emoji, format characters, unassigned
/// code points — is unknown.
pub fn classify_char(c: char) -> CharClass {
    if c.is_numeric() {
        CharClass::Numeric
    } else if c.is_alphabetic() {
        CharClass::Alphabetic
    } else if c.is_whitespace() || c.is_ascii() || is_symbol_or_punctuation(c) {
        CharClass::Special
    } else {
        CharClass::Unknown
    }
}

/// Unicode punctuation and symbol blocks beyond ASCII. Digits and letters
/// never reach this table; classification checks them first.
fn is_symbol_or_punctuation(c: char) -> bool {
    matches!(c as u32,
        0x00A1..=0x00BF         // Latin-1 punctuation and signs (¡ « ¿ § ·)
        | 0x00D7 | 0x00F7       // multiplication and division signs
        | 0x2000..=0x206F       // general punctuation (dashes, quotes, daggers)
        | 0x20A0..=0x20CF       // currency signs
        | 0x2100..=0x214F       // letterlike symbols (™ ℠ №)
        | 0x2190..=0x2BFF       // arrows, math operators, box drawing, misc symbols
        | 0x3000..=0x303F       // CJK punctuation
        | 0xFE30..=0xFE4F       // CJK compatibility forms
        | 0xFF01..=0xFF0F       // fullwidth punctuation runs
        | 0xFF1A..=0xFF20
        | 0xFF3B..=0xFF40
        | 0xFF5B..=0xFF65
    )
}

pub const FORMAT_EMAIL: &str = "email";
pub const FORMAT_URL: &str = "url";

/// Run the fixed set of format matchers against a whole cell value. A cell
/// may match zero, one, or several formats.
pub fn detect_formats(text: &str) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if looks_like_email(text) {
        tags.push(FORMAT_EMAIL);
    }
    if looks_like_url(text) {
        tags.push(FORMAT_URL);
    }
    tags
}

/// Email shape: one `@` separating a non-empty local part from a dotted
/// domain, no whitespace anywhere.
fn looks_like_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = text.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// URL shape: an explicit http(s) scheme or a `www.` prefix.
fn looks_like_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://") || text.starts_with("www.")
}
