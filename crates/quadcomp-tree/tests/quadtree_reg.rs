//! Quadtree regression test
//!
//! Reference decompositions, the partition and maximal-merge invariants,
//! build/update equivalence and sequential/parallel equivalence.

use quadcomp_core::{
    EqualMerge, Quad, RangeRegion, Raster, Rect, Recorder, ToleranceMerge, UniformRegion,
};
use quadcomp_stats::{DeviationOptions, DeviationPredicate};
use quadcomp_test::{RegParams, blocks, checkerboard, gradient, scenario_4x4};
use quadcomp_tree::{QuadTree, QuadTreeOptions, TreeError};

fn q(x_min: u32, x_max: u32, y_min: u32, y_max: u32, v: u8) -> Quad<Vec<u8>> {
    Quad::new(Rect::new_unchecked(x_min, x_max, y_min, y_max), Some(vec![v]))
}

fn flag(ok: bool) -> f64 {
    if ok { 1.0 } else { 0.0 }
}

/// Every cell of every leaf queries back to that leaf's value
fn round_trips(tree: &QuadTree<Vec<u8>>) -> bool {
    tree.regions().all(|quad| {
        (quad.y_min..quad.y_max)
            .all(|y| (quad.x_min..quad.x_max).all(|x| tree.query(x, y).ok() == Some(quad.value)))
    })
}

fn build_uniform(raster: &Raster<u8>) -> QuadTree<Vec<u8>> {
    let mut tree = QuadTree::new(raster.width(), raster.height()).expect("tree");
    tree.build(raster, &UniformRegion).expect("build");
    tree
}

fn build_by_updates(raster: &Raster<u8>) -> QuadTree<Vec<u8>> {
    let mut tree = QuadTree::new(raster.width(), raster.height()).expect("tree");
    // Column-major on purpose, so merges happen in a different order
    for x in 0..raster.width() {
        for y in 0..raster.height() {
            let pixel = raster.pixel(x, y).expect("pixel").to_vec();
            tree.update(x, y, pixel, &EqualMerge).expect("update");
        }
    }
    tree
}

#[test]
fn quadtree_reg() {
    let mut rp = RegParams::new("quadtree");

    // --- Test 1: Reference decompositions ---
    let tree = build_uniform(&scenario_4x4().expect("scenario"));
    let expected = vec![
        q(0, 2, 0, 2, 0),
        q(2, 3, 0, 1, 1),
        q(3, 4, 0, 1, 2),
        q(2, 3, 1, 2, 3),
        q(3, 4, 1, 2, 4),
        q(0, 1, 2, 3, 1),
        q(1, 2, 2, 3, 2),
        q(0, 1, 3, 4, 3),
        q(1, 2, 3, 4, 4),
        q(2, 4, 2, 4, 1),
    ];
    rp.compare_quads(&expected, &tree.quads());

    let zeros = Raster::from_rows(&[[0u8, 0], [0, 0]]).expect("zeros");
    rp.compare_quads(&[q(0, 2, 0, 2, 0)], &build_uniform(&zeros).quads());

    let single = Raster::from_rows(&[[1u8]]).expect("single");
    rp.compare_quads(&[q(0, 1, 0, 1, 1)], &build_uniform(&single).quads());

    // --- Test 2: Partition, round-trip and maximal merge ---
    for raster in [
        blocks(32, 32, 4, 1).expect("blocks"),
        checkerboard(32, 32, 8, 10, 20).expect("checkerboard"),
        gradient(16, 16, 1).expect("gradient"),
    ] {
        let tree = build_uniform(&raster);
        let quads = tree.quads();
        rp.check_partition(&quads, tree.side());
        rp.compare_values(1.0, flag(round_trips(&tree)), 0.0);
        rp.compare_values(1.0, flag(tree.is_fully_merged(&EqualMerge)), 0.0);
        eprintln!("  {} leaves, depth {}", tree.leaf_count(), tree.depth());
    }

    // --- Test 3: Bulk build equals cell-by-cell updates ---
    let mut patchy = blocks(16, 16, 4, 2).expect("blocks");
    patchy.set_pixel(5, 9, &[0, 0]).expect("set");
    patchy.set_pixel(12, 0, &[1, 2]).expect("set");
    for raster in [patchy, checkerboard(16, 16, 2, 0, 1).expect("checkerboard")] {
        let built = build_uniform(&raster);
        let updated = build_by_updates(&raster);
        rp.compare_quads(&built.quads(), &updated.quads());
        rp.compare_values(1.0, flag(updated.is_fully_merged(&EqualMerge)), 0.0);
    }

    // --- Test 4: Sequential and parallel builds agree ---
    let big = gradient(128, 96, 3).expect("gradient");
    let mut sequential = QuadTree::new(128, 96).expect("tree");
    sequential.build(&big, &RangeRegion::default()).expect("build");
    let mut parallel = QuadTree::new(128, 96)
        .expect("tree")
        .with_options(QuadTreeOptions::new().with_parallel(true));
    parallel.build(&big, &RangeRegion::default()).expect("build");
    rp.compare_quads(&sequential.quads(), &parallel.quads());
    eprintln!("  gradient 128x96: {} leaves", sequential.leaf_count());

    let opts = DeviationOptions::new().with_radius(2).with_threshold(8);
    let pred = DeviationPredicate::new(&big, &opts).expect("predicate");
    sequential.build(&big, &pred).expect("build");
    parallel.build(&big, &pred).expect("build");
    rp.compare_quads(&sequential.quads(), &parallel.quads());

    // --- Test 5: Non-power-of-two rasters ---
    for (w, h) in [(13, 7), (5, 16), (1, 3)] {
        let raster = gradient(w, h, 3).expect("gradient");
        let mut tree = QuadTree::new(w, h).expect("tree");
        tree.build(&raster, &RangeRegion::new(40)).expect("build");
        rp.check_partition(&tree.quads(), tree.side());

        let visible: Vec<_> = tree.visible_regions().map(Quad::cloned).collect();
        let area: u64 = visible.iter().map(Quad::area).sum();
        rp.compare_values((w * h) as f64, area as f64, 0.0);
        let inside = visible
            .iter()
            .all(|q| q.x_max <= w && q.y_max <= h && q.value.is_some());
        rp.compare_values(1.0, flag(inside), 0.0);
    }

    // --- Test 6: Leaves never straddle the raster edge, even when everything merges ---
    for (w, h) in [(3, 3), (6, 5), (9, 2)] {
        let flat = Raster::new_with_value(w, h, 1, 5u8).expect("flat");
        let mut tree = QuadTree::new(w, h).expect("tree");
        tree.build(&flat, &RangeRegion::new(255)).expect("build");
        let quads = tree.quads();
        rp.check_partition(&quads, tree.side());
        let straddling: Vec<_> = quads
            .iter()
            .filter(|q| (q.x_min < w && q.x_max > w) || (q.y_min < h && q.y_max > h))
            .collect();
        if !straddling.is_empty() {
            eprintln!("  {}x{}: straddling leaves {:?}", w, h, straddling);
        }
        rp.compare_values(0.0, straddling.len() as f64, 0.0);
        let valued_inside = quads
            .iter()
            .all(|q| q.value.is_some() == (q.x_max <= w && q.y_max <= h));
        rp.compare_values(1.0, flag(valued_inside), 0.0);
    }

    assert!(rp.cleanup(), "quadtree regression test failed");
}

#[test]
fn quadtree_update_reg() {
    let mut rp = RegParams::new("quadtree_update");

    // --- Test 1: Updates after a build keep the tree maximally merged ---
    let mut tree = build_uniform(&blocks(16, 16, 8, 1).expect("blocks"));
    rp.compare_values(4.0, tree.leaf_count() as f64, 0.0);

    let tile = tree.query(0, 0).expect("query").cloned().expect("value");
    tree.update(3, 3, vec![tile[0].wrapping_add(1)], &EqualMerge).expect("update");
    rp.compare_values(1.0, flag(tree.is_fully_merged(&EqualMerge)), 0.0);
    rp.compare_values(1.0, flag(round_trips(&tree)), 0.0);
    // 8 -> 4 -> 2 -> 1: three splits of three siblings each, plus the cell
    rp.compare_values(3.0 + 3.0 * 3.0 + 1.0, tree.leaf_count() as f64, 0.0);

    tree.update(3, 3, tile.clone(), &EqualMerge).expect("update");
    rp.compare_values(4.0, tree.leaf_count() as f64, 0.0);

    // --- Test 2: Tolerance merge averages neighbours ---
    let mut tree = QuadTree::<Vec<u8>>::with_max_power(1).expect("tree");
    let merge = ToleranceMerge::new(4);
    for (x, y, v) in [(0, 0, 100u8), (1, 0, 102), (0, 1, 101), (1, 1, 104)] {
        tree.update(x, y, vec![v], &merge).expect("update");
    }
    rp.compare_quads(&[q(0, 2, 0, 2, 102)], &tree.quads());

    // --- Test 3: Out-of-bounds updates are rejected without mutation ---
    let before = tree.clone();
    let err = tree.update(2, 0, vec![0], &merge);
    rp.compare_values(
        1.0,
        flag(matches!(err, Err(TreeError::OutOfBounds { x: 2, y: 0, side: 2 }))),
        0.0,
    );
    rp.compare_values(1.0, flag(tree == before), 0.0);

    assert!(rp.cleanup(), "quadtree update regression test failed");
}

#[test]
fn quadtree_record_reg() {
    let mut rp = RegParams::new("quadtree_record");

    let raster = scenario_4x4().expect("scenario");
    let recorder = Recorder::new(UniformRegion);
    let mut tree = QuadTree::new(4, 4).expect("tree");
    tree.build(&raster, &recorder).expect("build");
    let frames = recorder.into_frames();

    let sizes: Vec<u32> = frames.iter().map(|f| f.size).collect();
    rp.compare_values(3.0, sizes.len() as f64, 0.0);
    rp.compare_strings(
        format!("{:?}", sizes).as_bytes(),
        format!("{:?}", [4, 2, 1]).as_bytes(),
    );

    // Root rejected, four quadrants evaluated, eight single cells evaluated
    let counts: Vec<usize> = frames.iter().map(|f| f.evaluations.len()).collect();
    rp.compare_strings(
        format!("{:?}", counts).as_bytes(),
        format!("{:?}", [1, 4, 8]).as_bytes(),
    );
    let accepted: Vec<usize> = frames
        .iter()
        .map(|f| f.evaluations.iter().filter(|e| e.accepted).count())
        .collect();
    rp.compare_strings(
        format!("{:?}", accepted).as_bytes(),
        format!("{:?}", [0, 2, 8]).as_bytes(),
    );

    // Rejected squares are painted with their mean: root 22 / 16, top-right 10 / 4
    let root = &frames[0].evaluations[0];
    rp.compare_values(1.0, flag(!root.accepted && root.quad.value == Some(vec![1])), 0.0);
    let top_right = &frames[1].evaluations[1];
    rp.compare_values(
        1.0,
        flag(!top_right.accepted && top_right.quad == q(2, 4, 0, 2, 2)),
        0.0,
    );
    rp.compare_values(
        1.0,
        flag(frames[1].evaluations[0].accepted && frames[1].evaluations[0].quad == q(0, 2, 0, 2, 0)),
        0.0,
    );

    assert!(rp.cleanup(), "quadtree record regression test failed");
}
