use crate::model::{Crosswalk, TrafficSemaphore};

/// Undirected conflict graph over intersection element locations (spec §3
/// ConflictGraph, §4.B). Stored as a dense `Vec<Vec<bool>>` sized
/// `max_location + 1` rather than a sparse adjacency structure: locations
/// are small contiguous integers, so the dense matrix is both simpler and
/// faster to query than an adjacency-list graph crate would be here (see
/// DESIGN.md).
pub struct ConflictGraph {
    matrix: Vec<Vec<bool>>,
}

impl ConflictGraph {
    /// Builds the graph from the element tables (spec §4.B `setUpGraphMatrix`):
    /// TSEM×TSEM via [`conflicts_tsem_tsem`], TSEM×Crosswalk via
    /// [`conflicts_tsem_crosswalk`], Crosswalk×Crosswalk never conflicts.
    pub fn build(tsems: &[TrafficSemaphore], crosswalks: &[Crosswalk], max_location: i32) -> Self {
        let size = (max_location + 1).max(0) as usize;
        let mut matrix = vec![vec![false; size]; size];

        for i in 0..tsems.len() {
            for j in (i + 1)..tsems.len() {
                if conflicts_tsem_tsem(&tsems[i], &tsems[j]) {
                    let a = tsems[i].location() as usize;
                    let b = tsems[j].location() as usize;
                    matrix[a][b] = true;
                    matrix[b][a] = true;
                }
            }
        }

        for crosswalk in crosswalks {
            let (p1, p2) = crosswalk.span();
            for tsem in tsems {
                if conflicts_tsem_crosswalk(tsem, crosswalk) {
                    let t = tsem.location() as usize;
                    matrix[t][p1 as usize] = true;
                    matrix[p1 as usize][t] = true;
                    matrix[t][p2 as usize] = true;
                    matrix[p2 as usize][t] = true;
                }
            }
        }

        Self { matrix }
    }

    pub fn conflicts(&self, a: i32, b: i32) -> bool {
        self.matrix[a as usize][b as usize]
    }
}

/// `crosses(p, q, x)`: true iff `x` lies strictly on the forward arc from
/// `p` to `q` on the cyclic `[0, maxLocation]` axis (spec §4.B).
fn crosses(p: i32, q: i32, x: i32) -> bool {
    if p < q {
        x > p && x < q
    } else {
        x > p || x < q
    }
}

/// Conflict predicate between two TrafficSemaphores (spec §4.B): identical
/// direction is an immediate conflict; otherwise the circular-approach
/// trajectory-intersection test via [`crosses`].
pub fn conflicts_tsem_tsem(a: &TrafficSemaphore, b: &TrafficSemaphore) -> bool {
    let la = a.location();
    let lb = b.location();
    for &da in a.destinations() {
        for &db in b.destinations() {
            if da == db {
                return true;
            }
            let a_cross_b = crosses(la, da, lb) ^ crosses(la, da, db);
            let b_cross_a = crosses(lb, db, la) ^ crosses(lb, db, da);
            if a_cross_b || b_cross_a {
                return true;
            }
        }
    }
    false
}

/// Conflict predicate between a TrafficSemaphore and a Crosswalk spanning
/// `(min, max)` exclusive (spec §4.B).
pub fn conflicts_tsem_crosswalk(a: &TrafficSemaphore, crosswalk: &Crosswalk) -> bool {
    let (min, max) = crosswalk.span();
    if a.location() > min && a.location() < max {
        return true;
    }
    a.destinations().iter().any(|&d| d > min && d < max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimLightLine;

    fn tsem(location: i32, destinations: Vec<i32>) -> TrafficSemaphore {
        TrafficSemaphore::new(
            location,
            destinations,
            Box::new(SimLightLine::new(location * 10)),
            Box::new(SimLightLine::new(location * 10 + 1)),
            Box::new(SimLightLine::new(location * 10 + 2)),
        )
    }

    #[test]
    fn opposite_through_movements_do_not_conflict() {
        let a = tsem(0, vec![4]);
        let b = tsem(4, vec![0]);
        assert!(!conflicts_tsem_tsem(&a, &b));
    }

    #[test]
    fn crossing_movements_conflict() {
        let a = tsem(0, vec![4]);
        let b = tsem(2, vec![6]);
        assert!(conflicts_tsem_tsem(&a, &b));
    }

    #[test]
    fn self_loop_destination_conflicts_with_shared_destination() {
        let a = tsem(0, vec![0]);
        let b = tsem(2, vec![0]);
        assert!(conflicts_tsem_tsem(&a, &b));
    }

    #[test]
    fn tsem_crossing_crosswalk_span_conflicts() {
        let a = tsem(2, vec![6]);
        let crosswalk = Crosswalk::new(
            crate::model::PedestrianSemaphore::new(
                1,
                Box::new(SimLightLine::new(100)),
                Box::new(SimLightLine::new(101)),
                None,
                None,
                None,
            ),
            crate::model::PedestrianSemaphore::new(
                3,
                Box::new(SimLightLine::new(102)),
                Box::new(SimLightLine::new(103)),
                None,
                None,
                None,
            ),
        );
        assert!(conflicts_tsem_crosswalk(&a, &crosswalk));
    }
}
