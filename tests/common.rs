use polyomino_packing::{parse_input, Placement, Puzzle, Region};
use std::collections::{BTreeMap, BTreeSet};

/// The six shapes from the worked example followed by its three regions.
///
/// The first two regions can be packed, the third cannot.
pub const WORKED_EXAMPLE: &str = "\
0:
###
##.
##.

1:
###
##.
.##

2:
.##
###
##.

3:
##.
###
##.

4:
###
#..
###

5:
###
.#.
###

4x4: 0 0 0 0 2 0
12x5: 1 0 1 0 2 2
12x5: 1 0 1 0 3 2
";

/// Parse the worked example.
///
/// # Panics
///  - If the worked example stops parsing, which is a bug in the reader.
#[allow(dead_code)]
pub fn worked_example() -> Puzzle {
    parse_input(WORKED_EXAMPLE).unwrap()
}

/// Check that `packing` is a valid packing of `region`: every placement lies
/// inside the region, no cell is covered twice, and each shape is used
/// exactly as many times as the region requires.
///
/// # Panics
///  - If any of those conditions is violated.
#[allow(dead_code)]
pub fn assert_valid_packing<'a>(
    region: &Region,
    packing: impl IntoIterator<Item = &'a Placement>,
) {
    let mut covered = BTreeSet::new();
    let mut used = BTreeMap::<usize, BTreeSet<usize>>::new();

    for placement in packing {
        for cell in placement.occupied_cells() {
            assert!(
                cell.x >= 0
                    && cell.y >= 0
                    && (cell.x as usize) < region.width()
                    && (cell.y as usize) < region.height(),
                "Placement {:?} leaves the {}x{} region.",
                placement,
                region.width(),
                region.height()
            );
            assert!(covered.insert(cell), "Cell {:?} is covered twice.", cell);
        }

        assert!(
            used.entry(placement.shape_id())
                .or_default()
                .insert(placement.instance_id()),
            "Piece {:?} is placed twice.",
            (placement.shape_id(), placement.instance_id())
        );
    }

    for (&shape_id, &count) in region.required() {
        let placed = used.get(&shape_id).map_or(0, BTreeSet::len);
        assert_eq!(placed, count, "Wrong number of copies of shape {}.", shape_id);
    }
}
