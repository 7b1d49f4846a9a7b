use blockfall_engine::{BagSource, PieceKind, PieceSeed, SpawnSource, UniformSource};
use serde::Serialize;

/// Piece randomizer selectable on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RandomizerKind {
    /// Every kind independently with equal probability
    #[default]
    Uniform,
    /// Shuffled bags of all seven kinds
    Bag,
}

#[derive(Debug, Clone)]
pub enum Randomizer {
    Uniform(UniformSource),
    Bag(BagSource),
}

impl Randomizer {
    pub fn new(kind: RandomizerKind, seed: PieceSeed) -> Self {
        match kind {
            RandomizerKind::Uniform => Randomizer::Uniform(UniformSource::with_seed(seed)),
            RandomizerKind::Bag => Randomizer::Bag(BagSource::with_seed(seed)),
        }
    }
}

impl SpawnSource for Randomizer {
    fn next_kind(&mut self) -> PieceKind {
        match self {
            Randomizer::Uniform(source) => source.next_kind(),
            Randomizer::Bag(source) => source.next_kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomizer_matches_underlying_source() {
        let seed = PieceSeed::from_bytes([7; 16]);
        let mut uniform = Randomizer::new(RandomizerKind::Uniform, seed);
        let mut expected_uniform = UniformSource::with_seed(seed);
        let mut bag = Randomizer::new(RandomizerKind::Bag, seed);
        let mut expected_bag = BagSource::with_seed(seed);
        for _ in 0..20 {
            assert_eq!(uniform.next_kind(), expected_uniform.next_kind());
            assert_eq!(bag.next_kind(), expected_bag.next_kind());
        }
    }
}
