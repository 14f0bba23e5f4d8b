#![no_main]

use libfuzzer_sys::fuzz_target;
use polyomino_packing::{Coord, Packer, Polyomino, Region};
use std::{collections::BTreeSet, ops::ControlFlow};

#[derive(Debug)]
struct SmallPackingInput {
    shapes: Vec<Polyomino>,
    region: Region,
}

impl<'a> arbitrary::Arbitrary<'a> for SmallPackingInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Up to three shapes, each a non-empty subset of a 3x3 box.
        let num_shapes = u.int_in_range(1..=3)?;
        let mut shapes = Vec::with_capacity(num_shapes);
        for shape_id in 0..num_shapes {
            let mask = u.int_in_range(1..=0x1ffu16)?;
            let cells = (0..9)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| Coord::new(bit % 3, bit / 3));
            shapes.push(Polyomino::new(cells, shape_id).map_err(|_| arbitrary::Error::IncorrectFormat)?);
        }

        let width = u.int_in_range(1..=5)?;
        let height = u.int_in_range(1..=5)?;
        let counts = (0..num_shapes)
            .map(|_| u.int_in_range(0..=2))
            .collect::<arbitrary::Result<Vec<usize>>>()?;

        Ok(SmallPackingInput {
            shapes,
            region: Region::from_counts(width, height, &counts),
        })
    }
}

fuzz_target!(|data: SmallPackingInput| {
    let packer = Packer::new(data.shapes).unwrap();
    let region = data.region;

    let can_pack = packer.can_pack(&region).unwrap();
    let packing = packer.find_packing(&region).unwrap();
    assert_eq!(can_pack, packing.is_some());

    packer
        .for_each_packing(&region, |packing| {
            let mut covered = BTreeSet::new();
            let mut pieces = BTreeSet::new();
            for placement in packing {
                assert!(pieces.insert((placement.shape_id(), placement.instance_id())));
                for cell in placement.occupied_cells() {
                    assert!((cell.x as usize) < region.width());
                    assert!((cell.y as usize) < region.height());
                    assert!(covered.insert(cell));
                }
            }
            let required: usize = region.required().values().sum();
            assert_eq!(pieces.len(), required);

            ControlFlow::Continue(())
        })
        .unwrap();
});
