use crate::bag::RandomBag;
use crate::error::EngineError;
use crate::piece::{Piece, PieceType};

/// Builds pieces bound to their rotation and kick tables.
#[derive(Clone, Debug)]
pub struct PieceFactory {
    bag: RandomBag,
}

impl PieceFactory {
    pub fn new(seed: Option<u64>) -> Result<Self, EngineError> {
        let bag = match seed {
            Some(seed) => RandomBag::with_seed(PieceType::COUNT, seed)?,
            None => RandomBag::new(PieceType::COUNT)?,
        };
        Ok(Self { bag })
    }

    pub fn generate_random_tetromino(&mut self) -> Piece {
        // The bag holds exactly `PieceType::COUNT` values.
        let kind = PieceType::all()[self.bag.next() % PieceType::COUNT];
        Piece::new(kind)
    }

    /// Explicit lookup by name, bypassing the bag.
    pub fn generate_tetromino(&self, name: &str) -> Result<Piece, EngineError> {
        let kind: PieceType = name.parse()?;
        Ok(self.generate(kind))
    }

    pub fn generate(&self, kind: PieceType) -> Piece {
        Piece::new(kind)
    }

    pub fn flush(&mut self) {
        self.bag.reset_bag();
    }

    pub fn remaining_in_bag(&self) -> usize {
        self.bag.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Rotation;
    use std::collections::HashSet;

    #[test]
    fn random_pieces_cover_all_types_per_cycle() {
        let mut factory = PieceFactory::new(Some(7)).unwrap();
        let kinds: HashSet<PieceType> = (0..7)
            .map(|_| factory.generate_random_tetromino().kind())
            .collect();
        assert_eq!(kinds.len(), PieceType::COUNT);
    }

    #[test]
    fn generated_pieces_start_at_spawn_orientation() {
        let mut factory = PieceFactory::new(Some(3)).unwrap();
        for _ in 0..14 {
            assert_eq!(factory.generate_random_tetromino().rotation(), Rotation::Spawn);
        }
    }

    #[test]
    fn named_lookup_binds_the_right_tables() {
        let factory = PieceFactory::new(Some(0)).unwrap();
        let piece = factory.generate_tetromino("i").unwrap();
        assert_eq!(piece.kind(), PieceType::I);
        assert_eq!(piece.cells(), PieceType::I.rotation_table()[0]);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let factory = PieceFactory::new(Some(0)).unwrap();
        assert_eq!(
            factory.generate_tetromino("x"),
            Err(EngineError::UnknownPieceType("x".to_string()))
        );
    }

    #[test]
    fn long_runs_deal_every_type_equally() {
        let mut factory = PieceFactory::new(Some(19)).unwrap();
        let mut counts = [0usize; PieceType::COUNT];
        for _ in 0..PieceType::COUNT * 10 {
            counts[factory.generate_random_tetromino().kind().index()] += 1;
        }
        assert_eq!(counts, [10; PieceType::COUNT]);
    }

    #[test]
    fn flush_starts_a_fresh_cycle() {
        let mut factory = PieceFactory::new(Some(11)).unwrap();
        factory.generate_random_tetromino();
        factory.generate_random_tetromino();
        factory.flush();
        assert_eq!(factory.remaining_in_bag(), PieceType::COUNT);
    }
}
