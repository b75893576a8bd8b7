use std::collections::HashMap;

use crate::model::{Crosswalk, Phase, TrafficSemaphore};

use super::graph::ConflictGraph;

#[derive(Clone, Copy)]
enum Element {
    Traffic(i32),
    Crosswalk(usize),
}

/// Enumerates every maximal independent set of the conflict graph and
/// materializes each into a [`Phase`] (spec §4.B). Ordering is deterministic:
/// the candidate list is pre-sorted ascending by location before recursion
/// starts, matching `findConfigurations`'s sorted `candidates` vector.
///
/// Unlike the backtracking this is grounded on, `backtrack` here takes and
/// returns owned `Vec<i32>`s instead of mutating a shared out-parameter
/// (REDESIGN FLAGS: idiomatic ownership, no behavior change).
pub fn enumerate_phases(
    graph: &ConflictGraph,
    tsems: &[TrafficSemaphore],
    crosswalks: &[Crosswalk],
) -> Vec<Phase> {
    let mut element_by_location: HashMap<i32, Element> = HashMap::new();
    let mut vertices = Vec::new();

    for tsem in tsems {
        element_by_location.insert(tsem.location(), Element::Traffic(tsem.location()));
        vertices.push(tsem.location());
    }
    for (idx, crosswalk) in crosswalks.iter().enumerate() {
        let (p1, p2) = crosswalk.span();
        element_by_location.insert(p1, Element::Crosswalk(idx));
        element_by_location.insert(p2, Element::Crosswalk(idx));
        vertices.push(p1);
        vertices.push(p2);
    }
    vertices.sort_unstable();

    let mut accepted = Vec::new();
    backtrack(graph, &vertices, Vec::new(), vertices.clone(), &mut accepted);

    accepted
        .into_iter()
        .map(|locations| materialize(&locations, &element_by_location, crosswalks))
        .collect()
}

fn backtrack(
    graph: &ConflictGraph,
    vertices: &[i32],
    current: Vec<i32>,
    mut candidates: Vec<i32>,
    out: &mut Vec<Vec<i32>>,
) {
    if candidates.is_empty() {
        if !current.is_empty() && is_maximal(graph, vertices, &current) {
            out.push(current);
        }
        return;
    }

    while let Some(v) = candidates.pop() {
        let new_candidates: Vec<i32> =
            candidates.iter().copied().filter(|&u| !graph.conflicts(v, u)).collect();
        let mut next_current = current.clone();
        next_current.push(v);
        backtrack(graph, vertices, next_current, new_candidates, out);
    }
}

/// Accepts `current` only if no vertex outside it is compatible with every
/// vertex inside it (spec §4.B maximality check).
fn is_maximal(graph: &ConflictGraph, vertices: &[i32], current: &[i32]) -> bool {
    for &v in vertices {
        if !current.contains(&v) {
            let compatible = current.iter().all(|&u| !graph.conflicts(v, u));
            if compatible {
                return false;
            }
        }
    }
    true
}

fn materialize(
    locations: &[i32],
    element_by_location: &HashMap<i32, Element>,
    crosswalks: &[Crosswalk],
) -> Phase {
    let mut tsem_locations = Vec::new();
    let mut crosswalk_idxs: Vec<usize> = Vec::new();

    for &loc in locations {
        match element_by_location[&loc] {
            Element::Traffic(l) => tsem_locations.push(l),
            Element::Crosswalk(idx) => {
                if !crosswalk_idxs.contains(&idx) {
                    crosswalk_idxs.push(idx);
                }
            }
        }
    }

    let crosswalk_spans = crosswalk_idxs.into_iter().map(|idx| crosswalks[idx].span()).collect();
    Phase::new(tsem_locations, crosswalk_spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimLightLine;
    use crate::model::PedestrianSemaphore;

    fn tsem(location: i32, destinations: Vec<i32>) -> TrafficSemaphore {
        TrafficSemaphore::new(
            location,
            destinations,
            Box::new(SimLightLine::new(location * 10)),
            Box::new(SimLightLine::new(location * 10 + 1)),
            Box::new(SimLightLine::new(location * 10 + 2)),
        )
    }

    fn psem(location: i32) -> PedestrianSemaphore {
        PedestrianSemaphore::new(
            location,
            Box::new(SimLightLine::new(location * 10)),
            Box::new(SimLightLine::new(location * 10 + 1)),
            None,
            None,
            None,
        )
    }

    #[test]
    fn four_way_intersection_yields_exactly_two_phases() {
        // Spec §8 Scenario 1: two opposing through-movements per phase.
        let tsems = vec![
            tsem(0, vec![4]),
            tsem(2, vec![6]),
            tsem(4, vec![0]),
            tsem(6, vec![2]),
        ];
        let crosswalks = vec![];
        let graph = ConflictGraph::build(&tsems, &crosswalks, 6);
        let phases = enumerate_phases(&graph, &tsems, &crosswalks);
        assert_eq!(phases.len(), 2);
        for phase in &phases {
            let mut locs = phase.tsem_locations().to_vec();
            locs.sort_unstable();
            assert!(locs == vec![0, 4] || locs == vec![2, 6]);
        }
    }

    #[test]
    fn two_non_conflicting_tsems_merge_into_one_maximal_phase() {
        let tsems = vec![tsem(0, vec![4]), tsem(4, vec![0])];
        let crosswalks = vec![];
        let graph = ConflictGraph::build(&tsems, &crosswalks, 4);
        let phases = enumerate_phases(&graph, &tsems, &crosswalks);
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].tsem_locations().len(), 2);
    }

    #[test]
    fn empty_element_tables_yield_no_phases() {
        let graph = ConflictGraph::build(&[], &[], 0);
        let phases = enumerate_phases(&graph, &[], &[]);
        assert!(phases.is_empty());
    }

    #[test]
    fn crosswalk_is_deduplicated_across_both_spanning_locations() {
        let tsems = vec![tsem(0, vec![4])];
        let crosswalks = vec![Crosswalk::new(psem(6), psem(8))];
        let graph = ConflictGraph::build(&tsems, &crosswalks, 8);
        let phases = enumerate_phases(&graph, &tsems, &crosswalks);
        let with_crosswalk = phases.iter().find(|p| !p.crosswalk_spans().is_empty()).unwrap();
        assert_eq!(with_crosswalk.crosswalk_spans().len(), 1);
    }
}
