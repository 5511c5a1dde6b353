//! The fixed ship table and the small string helpers built on it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// A ship, identified in object keys by a two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ship {
    NieuwAmsterdam,
    Zaandam,
    Koningsdam,
    Eurodam,
    Rotterdam,
    NieuwStatendam,
    Noordam,
    Oosterdam,
    Volendam,
    Westerdam,
    Zuiderdam,
}

impl Ship {
    pub const ALL: [Ship; 11] = [
        Ship::NieuwAmsterdam,
        Ship::Zaandam,
        Ship::Koningsdam,
        Ship::Eurodam,
        Ship::Rotterdam,
        Ship::NieuwStatendam,
        Ship::Noordam,
        Ship::Oosterdam,
        Ship::Volendam,
        Ship::Westerdam,
        Ship::Zuiderdam,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Ship::NieuwAmsterdam => "na",
            Ship::Zaandam => "za",
            Ship::Koningsdam => "ko",
            Ship::Eurodam => "eu",
            Ship::Rotterdam => "rn",
            Ship::NieuwStatendam => "ns",
            Ship::Noordam => "no",
            Ship::Oosterdam => "os",
            Ship::Volendam => "vo",
            Ship::Westerdam => "we",
            Ship::Zuiderdam => "zu",
        }
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Ship::NieuwAmsterdam => "Nieuw Amsterdam",
            Ship::Zaandam => "Zaandam",
            Ship::Koningsdam => "Koningsdam",
            Ship::Eurodam => "Eurodam",
            Ship::Rotterdam => "Rotterdam",
            Ship::NieuwStatendam => "Nieuw Statendam",
            Ship::Noordam => "Noordam",
            Ship::Oosterdam => "Oosterdam",
            Ship::Volendam => "Volendam",
            Ship::Westerdam => "Westerdam",
            Ship::Zuiderdam => "Zuiderdam",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_code(code: &str) -> Option<Ship> {
        Ship::ALL.into_iter().find(|ship| ship.code() == code)
    }

    /// Directory name for this ship's section.
    pub fn slug(self) -> String {
        slug(self.name())
    }
}

impl fmt::Display for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase, spaces to underscores.
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

static CONTENT_HASH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{32}[-_]").expect("content hash regex is valid"));

/// Drop a leading 32-hex-digit digest plus its `-`/`_` separator, if present.
pub fn strip_content_hash_prefix(name: &str) -> &str {
    match CONTENT_HASH_PREFIX.find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}
