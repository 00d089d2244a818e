//! Reading-order sequencing of text regions.
//!
//! [`sequence`] turns the unordered regions of one page into a linear
//! reading order for a [`ReadingMode`] and tags every region with its
//! 1-based position.
//!
//! - **Webtoon**: ascending vertical center, ties keep input order.
//! - **Manga**: two regions whose vertical centers are closer than
//!   [`ROW_TOLERANCE`] share a row and read right to left; otherwise the
//!   higher one reads first.
//!
//! The manga row test is pairwise, so it is not transitive when row
//! membership chains through an intermediate region. The sort below is a
//! stable insertion sort that never relies on the comparator being a total
//! order, which keeps the result deterministic for such chains and leaves
//! an already-sequenced page as it is.

use std::cmp::Ordering;

use crate::page::{ReadingMode, RegionBox, TextRegion};

/// Maximum vertical-center distance (0–1000 scale) for two regions to share a row.
pub const ROW_TOLERANCE: f64 = 20.0;

/// Orders regions for `mode` and assigns `order = index + 1` to each.
///
/// Any previous `order` values are overwritten. Equal inputs always yield
/// the same output; regions that compare equal keep their input order.
pub fn sequence(mut regions: Vec<TextRegion>, mode: ReadingMode) -> Vec<TextRegion> {
    insertion_sort_by(&mut regions, |a, b| compare(&a.bbox, &b.bbox, mode));
    renumber(&mut regions);
    regions
}

/// Compares two boxes in reading order for `mode`.
pub fn compare(a: &RegionBox, b: &RegionBox, mode: ReadingMode) -> Ordering {
    let (ay, by) = (a.center_y(), b.center_y());
    match mode {
        ReadingMode::Webtoon => cmp_f64(ay, by),
        ReadingMode::Manga => {
            if (ay - by).abs() < ROW_TOLERANCE {
                // Same row: right to left.
                cmp_f64(b.center_x(), a.center_x())
            } else {
                cmp_f64(ay, by)
            }
        }
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn renumber(regions: &mut [TextRegion]) {
    for (idx, region) in regions.iter_mut().enumerate() {
        region.order = Some(idx as u32 + 1);
    }
}

/// Stable insertion sort that leaves already-ordered input untouched.
///
/// The leading run is detected first: a strictly descending run is
/// reversed, a non-descending one is kept. Every later element moves left
/// past the elements it compares less than. For an antisymmetric
/// comparator each adjacent pair of the output is in order, so sorting the
/// output again is a no-op even when the comparator is not transitive.
fn insertion_sort_by<T, F>(items: &mut [T], mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let run = leading_run(items, &mut cmp);
    for start in run..items.len() {
        let mut pos = start;
        while pos > 0 && cmp(&items[start], &items[pos - 1]) == Ordering::Less {
            pos -= 1;
        }
        items[pos..=start].rotate_right(1);
    }
}

/// Length of the ordered run at the start of `items`, reversing it in place
/// if it is strictly descending.
fn leading_run<T, F>(items: &mut [T], cmp: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return items.len();
    }
    let descending = cmp(&items[1], &items[0]) == Ordering::Less;
    let mut end = 2;
    while end < items.len() {
        let less = cmp(&items[end], &items[end - 1]) == Ordering::Less;
        if less != descending {
            break;
        }
        end += 1;
    }
    if descending {
        items[..end].reverse();
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::RegionId;

    fn region(id: &str, box_2d: [f64; 4]) -> TextRegion {
        TextRegion::new(RegionId::new(id), id, RegionBox::from_box_2d(box_2d))
    }

    fn ids(regions: &[TextRegion]) -> Vec<&str> {
        regions.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(sequence(Vec::new(), ReadingMode::Manga).is_empty());
        assert!(sequence(Vec::new(), ReadingMode::Webtoon).is_empty());
    }

    #[test]
    fn test_same_row_reads_right_to_left_in_manga() {
        let regions = vec![
            region("A", [100.0, 800.0, 150.0, 900.0]),
            region("B", [100.0, 100.0, 150.0, 200.0]),
        ];
        let manga = sequence(regions.clone(), ReadingMode::Manga);
        assert_eq!(ids(&manga), ["A", "B"]);

        let reversed = sequence(vec![regions[1].clone(), regions[0].clone()], ReadingMode::Manga);
        assert_eq!(ids(&reversed), ["A", "B"]);
    }

    #[test]
    fn test_webtoon_tie_keeps_input_order() {
        let regions = vec![
            region("A", [100.0, 800.0, 150.0, 900.0]),
            region("B", [100.0, 100.0, 150.0, 200.0]),
        ];
        assert_eq!(ids(&sequence(regions.clone(), ReadingMode::Webtoon)), ["A", "B"]);

        let swapped = vec![regions[1].clone(), regions[0].clone()];
        assert_eq!(ids(&sequence(swapped, ReadingMode::Webtoon)), ["B", "A"]);
    }

    #[test]
    fn test_higher_region_reads_first_in_both_modes() {
        let regions = vec![
            region("low", [480.0, 0.0, 520.0, 100.0]),
            region("high", [30.0, 900.0, 70.0, 1000.0]),
        ];
        for mode in [ReadingMode::Manga, ReadingMode::Webtoon] {
            assert_eq!(ids(&sequence(regions.clone(), mode)), ["high", "low"]);
        }
    }

    #[test]
    fn test_manga_rows_then_right_to_left() {
        let regions = vec![
            region("row2-left", [500.0, 50.0, 540.0, 150.0]),
            region("row1-left", [100.0, 50.0, 140.0, 150.0]),
            region("row2-right", [505.0, 700.0, 545.0, 800.0]),
            region("row1-right", [110.0, 700.0, 150.0, 800.0]),
        ];
        let ordered = sequence(regions, ReadingMode::Manga);
        assert_eq!(
            ids(&ordered),
            ["row1-right", "row1-left", "row2-right", "row2-left"]
        );
    }

    #[test]
    fn test_orders_are_contiguous_and_overwritten() {
        let regions = vec![
            region("c", [900.0, 0.0, 950.0, 10.0]).with_order(7),
            region("a", [0.0, 0.0, 50.0, 10.0]).with_order(7),
            region("b", [400.0, 0.0, 450.0, 10.0]),
        ];
        let ordered = sequence(regions, ReadingMode::Webtoon);
        let orders: Vec<Option<u32>> = ordered.iter().map(|r| r.order).collect();
        assert_eq!(orders, [Some(1), Some(2), Some(3)]);
        assert_eq!(ids(&ordered), ["a", "b", "c"]);
    }

    #[test]
    fn test_identical_centers_keep_input_order() {
        let regions = vec![
            region("first", [100.0, 100.0, 200.0, 200.0]),
            region("second", [100.0, 100.0, 200.0, 200.0]),
            region("third", [100.0, 100.0, 200.0, 200.0]),
        ];
        for mode in [ReadingMode::Manga, ReadingMode::Webtoon] {
            assert_eq!(
                ids(&sequence(regions.clone(), mode)),
                ["first", "second", "third"]
            );
        }
    }

    #[test]
    fn test_chained_rows_do_not_panic() {
        // Centers 0, 15, 30: each adjacent pair shares a row, the outer pair does not.
        let regions = vec![
            region("a", [0.0, 0.0, 0.0, 100.0]),
            region("b", [15.0, 400.0, 15.0, 500.0]),
            region("c", [30.0, 900.0, 30.0, 1000.0]),
        ];
        let first = sequence(regions.clone(), ReadingMode::Manga);
        let second = sequence(regions, ReadingMode::Manga);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_chained_rows_resequence_unchanged() {
        // (cy, cx) pairs whose rows chain through the tolerance window.
        let centers = [
            (1.0, 872.0),
            (1.0, 559.0),
            (29.0, 990.0),
            (14.0, 676.0),
            (3.0, 337.0),
            (45.0, 120.0),
            (33.0, 610.0),
        ];
        let regions: Vec<TextRegion> = centers
            .iter()
            .enumerate()
            .map(|(idx, &(cy, cx))| {
                let id = format!("r{}", idx);
                TextRegion::new(
                    RegionId::new(id.as_str()),
                    id,
                    RegionBox::new(cy - 5.0, cx - 10.0, cy + 5.0, cx + 10.0),
                )
            })
            .collect();

        let once = sequence(regions, ReadingMode::Manga);
        for pair in once.windows(2) {
            assert_ne!(
                compare(&pair[1].bbox, &pair[0].bbox, ReadingMode::Manga),
                Ordering::Less
            );
        }
        let twice = sequence(once.clone(), ReadingMode::Manga);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_nan_centers_are_tolerated() {
        let regions = vec![
            TextRegion::new("nan", "nan", RegionBox::new(f64::NAN, 0.0, 10.0, 10.0)),
            region("ok", [0.0, 0.0, 10.0, 10.0]),
        ];
        let ordered = sequence(regions, ReadingMode::Manga);
        assert_eq!(ordered.len(), 2);
    }

    #[test]
    fn test_insertion_sort_is_stable() {
        let mut items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')];
        insertion_sort_by(&mut items, |a, b| a.0.cmp(&b.0));
        assert_eq!(items, [(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_insertion_sort_reverses_descending_run() {
        let mut items = vec![(5, 'a'), (4, 'b'), (3, 'c'), (3, 'd'), (1, 'e')];
        insertion_sort_by(&mut items, |a, b| a.0.cmp(&b.0));
        assert_eq!(items, [(1, 'e'), (3, 'c'), (3, 'd'), (4, 'b'), (5, 'a')]);
    }

    #[test]
    fn test_insertion_sort_keeps_sorted_input() {
        let mut calls = 0;
        let mut items = vec![1, 2, 2, 3, 8];
        insertion_sort_by(&mut items, |a, b| {
            calls += 1;
            a.cmp(b)
        });
        assert_eq!(items, [1, 2, 2, 3, 8]);
        assert_eq!(calls, 4);
    }
}
