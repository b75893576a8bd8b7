use intersection_control_core::conflict::{enumerate_phases, ConflictGraph};
use intersection_control_core::hal::sim::SimLightLine;
use intersection_control_core::model::{Crosswalk, PedestrianSemaphore, TrafficSemaphore};

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// A ring of `n` traffic semaphores, each routing to the semaphore halfway
/// around the ring, plus one crosswalk between every other pair of
/// consecutive locations. Large enough to give the maximal-independent-set
/// backtracking a non-trivial candidate list to chew through.
fn build_ring(n: i32) -> (Vec<TrafficSemaphore>, Vec<Crosswalk>, i32) {
    let spacing = 4;
    let max_location = n * spacing;
    let mut tsems = Vec::with_capacity(n as usize);
    let mut crosswalks = Vec::new();

    for i in 0..n {
        let location = i * spacing;
        let destination = (location + max_location / 2) % max_location;
        tsems.push(TrafficSemaphore::new(
            location,
            vec![destination],
            Box::new(SimLightLine::new((location * 10) as u32)),
            Box::new(SimLightLine::new((location * 10 + 1) as u32)),
            Box::new(SimLightLine::new((location * 10 + 2) as u32)),
        ));
        if i % 2 == 0 {
            let a = location + 1;
            let b = location + 2;
            crosswalks.push(Crosswalk::new(
                PedestrianSemaphore::new(
                    a,
                    Box::new(SimLightLine::new((a * 10) as u32)),
                    Box::new(SimLightLine::new((a * 10 + 1) as u32)),
                    None,
                    None,
                    None,
                ),
                PedestrianSemaphore::new(
                    b,
                    Box::new(SimLightLine::new((b * 10) as u32)),
                    Box::new(SimLightLine::new((b * 10 + 1) as u32)),
                    None,
                    None,
                    None,
                ),
            ));
        }
    }

    (tsems, crosswalks, max_location)
}

pub fn benchmark_phase_enumeration(c: &mut Criterion) {
    let (tsems, crosswalks, max_location) = build_ring(10);
    let graph = ConflictGraph::build(&tsems, &crosswalks, max_location);

    c.bench_function("enumerate_phases_ring_10", |b| {
        b.iter(|| {
            let phases = enumerate_phases(black_box(&graph), black_box(&tsems), black_box(&crosswalks));
            black_box(phases)
        })
    });
}

criterion_group!(benches, benchmark_phase_enumeration);
criterion_main!(benches);
