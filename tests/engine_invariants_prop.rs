//! Property tests for the invariants the engine relies on: bag cycles,
//! rotation round trips, all-or-nothing inserts, and line collapse.

use proptest::prelude::*;

use blockfall::bag::RandomBag;
use blockfall::{
    Field, GameEngine, GameSettings, GameplayState, InputFrame, Piece, PieceType, Point,
};

fn kind_strategy() -> impl Strategy<Value = PieceType> {
    (0..PieceType::COUNT).prop_map(|i| PieceType::all()[i])
}

fn input_from_bits(bits: u8) -> InputFrame {
    InputFrame {
        left: bits & 1 != 0,
        right: bits & 2 != 0,
        soft_drop: bits & 4 != 0,
        hard_drop: bits & 8 != 0,
        rotate_ccw: bits & 16 != 0,
        rotate_cw: bits & 32 != 0,
        hold: bits & 64 != 0,
    }
}

/// Scatters pieces over an empty field; rejected placements are skipped.
fn scattered_field(placements: &[(PieceType, i32, i32)]) -> Field {
    let mut field = Field::new(10, 20);
    for &(kind, x, y) in placements {
        field.insert_tetromino_at(&Piece::new(kind), Point::new(x, y));
    }
    field
}

proptest! {
    #[test]
    fn bag_deals_each_value_once_per_cycle(
        seed in any::<u64>(),
        size in 1usize..12,
        cycles in 1usize..5,
    ) {
        let mut bag = RandomBag::with_seed(size, seed).unwrap();
        for _ in 0..cycles {
            let mut dealt: Vec<usize> = (0..size).map(|_| bag.next()).collect();
            dealt.sort_unstable();
            prop_assert_eq!(dealt, (0..size).collect::<Vec<_>>());
            prop_assert_eq!(bag.remaining(), size);
        }
    }

    #[test]
    fn rotation_round_trips(kind in kind_strategy(), turns in 0usize..8) {
        let mut piece = Piece::new(kind);
        for _ in 0..turns {
            piece.rotate_clockwise();
        }
        let before = piece.cells();
        let rotation = piece.rotation();

        piece.rotate_clockwise();
        piece.rotate_counter_clockwise();
        prop_assert_eq!(piece.rotation(), rotation);
        prop_assert_eq!(piece.cells(), before);

        for _ in 0..4 {
            piece.rotate_counter_clockwise();
        }
        prop_assert_eq!(piece.cells(), before);
        prop_assert_eq!(piece.get(0), Point::ZERO);
    }

    #[test]
    fn rejected_insert_changes_nothing(
        placements in prop::collection::vec((kind_strategy(), -2i32..12, -2i32..22), 0..30),
        kind in kind_strategy(),
        x in -2i32..12,
        y in -2i32..22,
    ) {
        let mut field = scattered_field(&placements);
        let piece = Piece::new(kind);
        let before = field.clone();
        let legal = field.is_tetromino_insertable_at(&piece, Point::new(x, y));
        let inserted = field.insert_tetromino_at(&piece, Point::new(x, y));
        prop_assert_eq!(legal, inserted);
        if !inserted {
            prop_assert_eq!(field, before);
        }
    }

    #[test]
    fn clearing_removes_exactly_the_full_rows(
        full in prop::collection::vec(any::<bool>(), 6),
        hole in 0usize..10,
    ) {
        let rows: Vec<String> = full
            .iter()
            .map(|&f| {
                (0..10)
                    .map(|x| if f || x != hole { 'S' } else { '.' })
                    .collect()
            })
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let mut field = Field::from_rows(&refs).unwrap();

        let expected = full.iter().filter(|&&f| f).count();
        prop_assert_eq!(field.clear_lines(), expected);
        prop_assert_eq!(field.height(), 6);
        for y in 0..6 {
            prop_assert!(!field.is_line_full(y));
        }
        let empty_rows = field
            .field_data()
            .iter()
            .take_while(|row| row.iter().all(Option::is_none))
            .count();
        prop_assert_eq!(empty_rows, expected);
    }

    #[test]
    fn random_play_keeps_engine_consistent(
        seed in any::<u64>(),
        inputs in prop::collection::vec(any::<u8>(), 1..300),
        dt in 1.0f32..120.0,
    ) {
        let mut engine = GameEngine::new(GameSettings::default(), Some(seed)).unwrap();
        let mut last_score = 0;
        for bits in inputs {
            engine.update(dt, input_from_bits(bits));

            prop_assert!(engine.score() >= last_score);
            last_score = engine.score();
            prop_assert!(engine.level() <= 14);
            prop_assert_eq!(engine.next_queue().count(), engine.settings().next_queue_len);
            prop_assert_eq!(engine.field().cell_values().len(), 200);

            if matches!(engine.state(), GameplayState::TetrominoFalling | GameplayState::LockDown) {
                let piece = engine.current_piece().unwrap();
                prop_assert!(engine.field().is_tetromino_insertable_at(piece, engine.cursor()));
            }
        }
    }
}
