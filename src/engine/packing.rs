//! Rectangle-to-bin packing, shelf heuristic.
//!
//! Rectangles are placed without rotation and without overlap. Each bin is
//! filled as a stack of shelves: a shelf's height is set by the first
//! rectangle placed on it, later rectangles sit to its right while they
//! fit. Placement order is tallest-first, which keeps shelves dense; bins
//! are tried in input order, so earlier bins fill before later ones open.

/// A placed rectangle: which bin, and where inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedRect {
    pub rect: usize,
    pub bin: usize,
    pub x: i64,
    pub y: i64,
}

struct Shelf {
    y: i64,
    height: i64,
    cursor: i64,
}

struct OpenBin {
    width: i64,
    height: i64,
    shelves: Vec<Shelf>,
}

impl OpenBin {
    fn place(&mut self, width: i64, height: i64) -> Option<(i64, i64)> {
        // Existing shelf with room first.
        for shelf in &mut self.shelves {
            if height <= shelf.height && self.width - shelf.cursor >= width {
                let x = shelf.cursor;
                shelf.cursor += width;
                return Some((x, shelf.y));
            }
        }
        // Otherwise open a new shelf on top.
        let top = self.shelves.last().map_or(0, |shelf| shelf.y + shelf.height);
        if self.height - top >= height && self.width >= width {
            self.shelves.push(Shelf {
                y: top,
                height,
                cursor: width,
            });
            return Some((0, top));
        }
        None
    }
}

/// Pack `rects` (width, height) into `bins` (width, height).
///
/// Returns placements for every rectangle that fit somewhere; rectangles
/// that fit no bin are absent from the result. Zero-sized rectangles are
/// never placed.
pub fn pack(rects: &[(i64, i64)], bins: &[(i64, i64)]) -> Vec<PlacedRect> {
    let mut open_bins: Vec<OpenBin> = bins
        .iter()
        .map(|&(width, height)| OpenBin {
            width,
            height,
            shelves: Vec::new(),
        })
        .collect();

    // Tallest first, width as tiebreak, original index retained.
    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by(|&a, &b| {
        (rects[b].1, rects[b].0).cmp(&(rects[a].1, rects[a].0))
    });

    let mut placed = Vec::new();
    for rect in order {
        let (width, height) = rects[rect];
        if width <= 0 || height <= 0 {
            continue;
        }
        for (bin, open) in open_bins.iter_mut().enumerate() {
            if let Some((x, y)) = open.place(width, height) {
                placed.push(PlacedRect { rect, bin, x, y });
                break;
            }
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_one_bin_before_opening_the_next() {
        let placed = pack(&[(5, 5), (5, 5)], &[(10, 5), (10, 5)]);
        assert_eq!(placed.len(), 2);
        assert!(placed.iter().all(|p| p.bin == 0));
    }

    #[test]
    fn oversized_rect_is_left_out() {
        let placed = pack(&[(20, 20), (2, 2)], &[(10, 10)]);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].rect, 1);
    }

    #[test]
    fn placements_do_not_overlap() {
        let rects = [(4, 3), (4, 3), (4, 3), (4, 3), (2, 2)];
        let placed = pack(&rects, &[(8, 8)]);
        for (i, a) in placed.iter().enumerate() {
            let (aw, ah) = rects[a.rect];
            for b in placed.iter().skip(i + 1) {
                if a.bin != b.bin {
                    continue;
                }
                let (bw, bh) = rects[b.rect];
                let disjoint =
                    a.x + aw <= b.x || b.x + bw <= a.x || a.y + ah <= b.y || b.y + bh <= a.y;
                assert!(disjoint, "rects {} and {} overlap", a.rect, b.rect);
            }
        }
    }

    #[test]
    fn placements_stay_inside_their_bin() {
        let rects = [(6, 4), (3, 3), (5, 2)];
        let bins = [(7, 7), (7, 7)];
        for p in pack(&rects, &bins) {
            let (w, h) = rects[p.rect];
            let (bw, bh) = bins[p.bin];
            assert!(p.x >= 0 && p.y >= 0);
            assert!(p.x + w <= bw && p.y + h <= bh);
        }
    }
}
