//! Property tests for the row operations of [`Board`].
//!
//! - `remove_rows` keeps the surviving rows in order under `|S|` empty rows,
//!   for consecutive, scattered and top-plus-bottom row sets alike.
//! - `insert_rising_row` shifts every row up by one when the top row is empty,
//!   and leaves the board untouched otherwise.
//! - Generated rising rows always have a hole count inside the configured range.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use risetris_engine::{Block, Board, RisingConfig, RisingLinesController};

const WIDTH: usize = 10;
const HEIGHT: usize = 20;

fn arb_board() -> impl Strategy<Value = Board> {
    proptest::collection::vec(any::<bool>(), WIDTH * HEIGHT).prop_map(|cells| {
        let mut board = Board::new(WIDTH, HEIGHT);
        for (i, filled) in cells.into_iter().enumerate() {
            if filled {
                board.set_cell(i % WIDTH, i / WIDTH, Block::Rising);
            }
        }
        board
    })
}

fn assert_shape(board: &Board) {
    assert_eq!(board.rows().len(), HEIGHT);
    assert!(board.rows().iter().all(|row| row.cells().len() == WIDTH));
}

proptest! {
    #[test]
    fn remove_rows_keeps_survivors_in_order(
        board in arb_board(),
        rows in proptest::collection::btree_set(0..HEIGHT, 0..=HEIGHT),
    ) {
        let rows = rows.into_iter().collect::<Vec<_>>();
        let survivors = board
            .rows()
            .iter()
            .enumerate()
            .filter(|(y, _)| !rows.contains(y))
            .map(|(_, row)| row.clone())
            .collect::<Vec<_>>();

        let mut after = board.clone();
        after.remove_rows(&rows);

        assert_shape(&after);
        prop_assert!(after.rows()[..rows.len()].iter().all(|row| row.is_empty()));
        prop_assert_eq!(&after.rows()[rows.len()..], survivors.as_slice());
    }

    #[test]
    fn remove_rows_top_and_bottom_together(board in arb_board(), middle in 1..HEIGHT - 1) {
        let rows = [0, middle, HEIGHT - 1];
        let mut after = board.clone();
        after.remove_rows(&rows);

        assert_shape(&after);
        for y in 0..HEIGHT {
            // Removed rows below y decide how far it moved.
            if rows.contains(&y) {
                continue;
            }
            let shift = rows.iter().filter(|&&r| r > y).count();
            prop_assert_eq!(after.row(y + shift), board.row(y));
        }
    }

    #[test]
    fn remove_rows_ignores_duplicates(board in arb_board(), row in 0..HEIGHT) {
        let mut once = board.clone();
        once.remove_rows(&[row]);
        let mut twice = board;
        twice.remove_rows(&[row, row]);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn insert_rising_row_shifts_or_refuses(
        board in arb_board(),
        clear_top in any::<bool>(),
        seed in any::<u64>(),
        holes_min in 1_usize..5,
        extra in 0_usize..5,
    ) {
        let mut board = board;
        if clear_top {
            for x in 0..WIDTH {
                board.set_cell(x, 0, Block::Empty);
            }
        }
        let config = RisingConfig {
            holes_min,
            holes_max: holes_min + extra,
            ..RisingConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(seed);
        let row = RisingLinesController::generate_row_with_holes(&mut rng, WIDTH, &config);
        prop_assert!((config.holes_min..=config.holes_max).contains(&row.hole_count()));

        let mut after = board.clone();
        let overflow = board.would_overflow_on_rise();
        let result = after.insert_rising_row(row.clone());

        prop_assert_eq!(result.is_err(), overflow);
        if overflow {
            prop_assert_eq!(after, board);
        } else {
            assert_shape(&after);
            prop_assert_eq!(&after.rows()[..HEIGHT - 1], &board.rows()[1..]);
            prop_assert_eq!(after.row(HEIGHT - 1), &row);
        }
    }

    #[test]
    fn find_full_rows_matches_row_contents(board in arb_board(), full in proptest::collection::btree_set(0..HEIGHT, 0..6)) {
        let mut board = board;
        for &y in &full {
            for x in 0..WIDTH {
                board.set_cell(x, y, Block::Rising);
            }
        }
        let expected = board
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_filled())
            .map(|(y, _)| y)
            .collect::<BTreeSet<_>>();
        let found = board.find_full_rows();
        prop_assert!(found.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(full.is_subset(&expected));
        prop_assert_eq!(found.into_iter().collect::<BTreeSet<_>>(), expected);
    }
}
