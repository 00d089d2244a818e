#![allow(dead_code)]

use comicast::page::{RegionBox, RegionId, TextRegion};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Vertical distance between generated rows; more than twice the row tolerance.
pub const ROW_GAP: u32 = 100;

/// Largest vertical jitter inside a generated row; well under the row tolerance.
pub const ROW_JITTER: u32 = 9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A generated region plus the row it was placed in (if generated by rows).
#[derive(Clone, Debug)]
pub struct Placed {
    pub region: TextRegion,
    pub row: usize,
}

/// Builds a box centered on (`cy`, `cx`) with the given half extents.
pub fn centered_box(cy: f64, cx: f64, half_h: f64, half_w: f64) -> RegionBox {
    RegionBox::new(cy - half_h, cx - half_w, cy + half_h, cx + half_w)
}

/// Any region on the 0–1000 page, with unique ids in generation order.
pub fn arb_regions(max: usize) -> BoxedStrategy<Vec<TextRegion>> {
    proptest::collection::vec((0u32..=1000, 0u32..=1000, 1u32..=200, 1u32..=200), 0..=max)
        .prop_map(|boxes| {
            boxes
                .into_iter()
                .enumerate()
                .map(|(idx, (y, x, h, w))| {
                    let bbox = RegionBox::from_box_2d([
                        y as f64,
                        x as f64,
                        (y + h).min(1000) as f64,
                        (x + w).min(1000) as f64,
                    ]);
                    TextRegion::new(RegionId::new(format!("r{}", idx)), format!("text {}", idx), bbox)
                })
                .collect()
        })
        .boxed()
}

/// Regions laid out in clearly separated rows, then shuffled.
///
/// Rows are `ROW_GAP` apart and centers inside a row differ by at most
/// `ROW_JITTER`, so every pair is unambiguously same-row or not. Horizontal
/// centers are distinct within a row.
pub fn arb_rows(max_rows: usize, max_per_row: usize) -> BoxedStrategy<Vec<Placed>> {
    assert!(max_rows > 0, "max_rows must be > 0");
    assert!(max_per_row > 0, "max_per_row must be > 0");

    proptest::collection::vec(
        (
            proptest::collection::btree_set(20u32..=980, 1..=max_per_row),
            proptest::collection::vec(0u32..=ROW_JITTER, max_per_row),
        ),
        1..=max_rows,
    )
    .prop_map(|rows| {
        let mut placed = Vec::new();
        for (row, (columns, jitters)) in rows.into_iter().enumerate() {
            let base = 50 + row as u32 * ROW_GAP;
            for (cx, jitter) in columns.into_iter().zip(jitters) {
                let idx = placed.len();
                let bbox = centered_box((base + jitter) as f64, cx as f64, 15.0, 15.0);
                placed.push(Placed {
                    region: TextRegion::new(
                        RegionId::new(format!("r{}", idx)),
                        format!("row {} cell {}", row, idx),
                        bbox,
                    ),
                    row,
                });
            }
        }
        placed
    })
    .prop_shuffle()
    .boxed()
}

/// Regions packed into a narrow band so that rows chain through the
/// tolerance window: `a` may share a row with `b` and `b` with `c` while
/// `a` and `c` do not.
pub fn arb_chained_regions(max: usize) -> BoxedStrategy<Vec<TextRegion>> {
    proptest::collection::vec((0u32..60, 0u32..=1000), 0..=max)
        .prop_map(|centers| {
            centers
                .into_iter()
                .enumerate()
                .map(|(idx, (cy, cx))| {
                    TextRegion::new(
                        RegionId::new(format!("r{}", idx)),
                        format!("text {}", idx),
                        centered_box(cy as f64, cx as f64, 5.0, 10.0),
                    )
                })
                .collect()
        })
        .boxed()
}

/// Regions with pairwise distinct vertical centers.
pub fn arb_distinct_rows(max: usize) -> BoxedStrategy<Vec<TextRegion>> {
    (
        proptest::collection::btree_set(0u32..=1000, 0..=max),
        proptest::collection::vec(0u32..=1000, max),
    )
        .prop_map(|(centers, columns)| {
            centers
                .into_iter()
                .zip(columns)
                .enumerate()
                .map(|(idx, (cy, cx))| {
                    TextRegion::new(
                        RegionId::new(format!("r{}", idx)),
                        format!("text {}", idx),
                        centered_box(cy as f64, cx as f64, 10.0, 20.0),
                    )
                })
                .collect()
        })
        .boxed()
}

/// A value paired with a shuffled copy of itself.
pub fn with_shuffled<T>(strategy: BoxedStrategy<Vec<T>>) -> BoxedStrategy<(Vec<T>, Vec<T>)>
where
    T: Clone + std::fmt::Debug + 'static,
{
    strategy
        .prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle()))
        .boxed()
}
