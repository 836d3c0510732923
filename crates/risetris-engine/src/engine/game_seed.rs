use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for every random draw a session makes.
///
/// A 128-bit value written as 32 hex digits. Two sessions built from the same
/// seed and configuration, fed the same commands and ticks, evolve
/// identically: same pieces, same power-up tags, same rising-line holes.
///
/// # Example
///
/// ```
/// use risetris_engine::{GameConfig, GameSeed, GameSession};
/// use rand::Rng as _;
///
/// let seed: GameSeed = rand::rng().random();
/// let a = GameSession::with_seed(GameConfig::default(), seed).unwrap();
/// let b = GameSession::with_seed(GameConfig::default(), seed).unwrap();
/// assert_eq!(a.current_piece(), b.current_piece());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSeed([u8; 16]);

/// A seed string that is not exactly 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hex digits")]
pub struct InvalidSeed {
    input: String,
}

impl GameSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub(crate) fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl From<u128> for GameSeed {
    fn from(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for GameSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for GameSeed {
    type Err = InvalidSeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSeed {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u128::from_str_radix(s, 16)
            .map(Self::from)
            .map_err(|_| invalid())
    }
}

impl Serialize for GameSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GameSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<GameSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        GameSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_random_seed() {
        let seed: GameSeed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let deserialized: GameSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(seed, deserialized);
    }

    #[test]
    fn test_format_is_32_char_hex_string() {
        let seed = GameSeed::from(0x0123_4567_89ab_cdef_u128);
        assert_eq!(seed.to_string(), "00000000000000000123456789abcdef");
        assert_eq!(
            serde_json::to_string(&seed).unwrap(),
            "\"00000000000000000123456789abcdef\""
        );
    }

    #[test]
    fn test_parse_uppercase_hex() {
        let seed: GameSeed = "000102030405060708090A0B0C0D0E0F".parse().unwrap();
        assert_eq!(
            seed,
            GameSeed::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15])
        );
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "",
            "abc",
            "0000000000000000000000000000000g",
            "000000000000000000000000000000000",
            "+0000000000000000000000000000000",
        ] {
            let err = input.parse::<GameSeed>().unwrap_err();
            assert!(err.to_string().contains("expected 32 hex digits"), "{input}");
        }
        assert!(serde_json::from_str::<GameSeed>("\"1234\"").is_err());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let seed = GameSeed::from(42_u128);
        let a = seed.rng().random::<u64>();
        let b = seed.rng().random::<u64>();
        assert_eq!(a, b);
    }
}
