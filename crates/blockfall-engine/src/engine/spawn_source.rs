use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::PieceKind;

use super::collaborators::SpawnSource;

/// 128-bit seed for a deterministic piece sequence.
///
/// Written as 32 hex digits, both by [`fmt::Display`] and in JSON, so a seed
/// printed by one run can be passed back on the command line.
///
/// ```
/// use blockfall_engine::PieceSeed;
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// assert_eq!(seed.to_string(), "000102030405060708090a0b0c0d0e0f");
/// assert!("xyz".parse::<PieceSeed>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

/// Malformed textual [`PieceSeed`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex digits")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        let value = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(value.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Draws every piece kind independently with equal probability.
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: Pcg32,
}

impl Default for UniformSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSource {
    /// Creates a source with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self { rng: seed.rng() }
    }
}

impl SpawnSource for UniformSource {
    fn next_kind(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// 7-bag randomizer: each run of seven pieces contains every kind exactly
/// once, in shuffled order.
///
/// Keeps droughts of any single kind to at most twelve pieces.
///
/// ```
/// use std::collections::HashSet;
/// use blockfall_engine::{BagSource, PieceKind, SpawnSource as _};
///
/// let mut bag = BagSource::new();
/// let kinds: HashSet<_> = (0..PieceKind::LEN).map(|_| bag.next_kind()).collect();
/// assert_eq!(kinds.len(), PieceKind::LEN);
/// ```
#[derive(Debug, Clone)]
pub struct BagSource {
    rng: Pcg32,
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for BagSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BagSource {
    /// Creates a bag with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: seed.rng(),
            bag: ArrayVec::new(),
        }
    }

    /// Kinds left in the current bag, next one last.
    #[must_use]
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag
    }
}

impl SpawnSource for BagSource {
    fn next_kind(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            let mut kinds = PieceKind::ALL;
            kinds.shuffle(&mut self.rng);
            self.bag.extend(kinds);
        }
        self.bag.pop().unwrap_or(PieceKind::I)
    }
}
