//! Conflict geometry tests

use junction_sim::simulation::{
    chords_cross, lanes_intersect, mappings_intersect, Direction, Lane, LaneDestinationMapping,
};

/// Lanes at placements 0..n, alternating inbound and outbound
fn create_lanes(n: i32) -> Vec<Lane> {
    (0..n)
        .map(|i| {
            let direction = if i % 2 == 0 { Direction::In } else { Direction::Out };
            Lane::new(format!("lane-{}", i), i, direction)
        })
        .collect()
}

fn mapping(lanes: &[Lane], source: usize, destinations: &[usize]) -> LaneDestinationMapping {
    let destinations: Vec<Lane> = destinations.iter().map(|&d| lanes[d].clone()).collect();
    LaneDestinationMapping::new(format!("m{}", source), &lanes[source], &destinations)
        .expect("valid mapping")
}

#[test]
fn test_lane_defaults_and_display() {
    let lane = Lane::inbound("N-in", 0);
    assert_eq!(lane.direction(), Direction::In);
    assert_eq!(lane.to_string(), "N-in: (0,IN)");
    assert_eq!(Lane::outbound("N-out", 1).to_string(), "N-out: (1,OUT)");
}

#[test]
fn test_crossing_chords_intersect() {
    let lanes: Vec<Lane> = (0..10).map(|i| Lane::inbound(i.to_string(), i)).collect();
    let l = |i: usize| &lanes[i];

    assert!(lanes_intersect(l(2), l(4), l(1), l(3)));
    assert!(lanes_intersect(l(2), l(4), l(3), l(1)));
    assert!(lanes_intersect(l(4), l(2), l(1), l(3)));
    assert!(lanes_intersect(l(4), l(2), l(3), l(1)));
    assert!(lanes_intersect(l(5), l(2), l(4), l(6)));
    assert!(lanes_intersect(l(5), l(2), l(6), l(4)));
    assert!(lanes_intersect(l(2), l(5), l(4), l(6)));
    assert!(lanes_intersect(l(2), l(5), l(6), l(4)));
}

#[test]
fn test_separate_or_nested_chords_do_not_intersect() {
    let lanes: Vec<Lane> = (0..10).map(|i| Lane::inbound(i.to_string(), i)).collect();
    let l = |i: usize| &lanes[i];

    assert!(!lanes_intersect(l(1), l(2), l(3), l(4)));
    assert!(!lanes_intersect(l(1), l(2), l(4), l(3)));
    assert!(!lanes_intersect(l(2), l(1), l(3), l(4)));
    assert!(!lanes_intersect(l(2), l(1), l(4), l(3)));
    assert!(!lanes_intersect(l(5), l(2), l(3), l(4)));
    assert!(!lanes_intersect(l(5), l(2), l(4), l(3)));
    assert!(!lanes_intersect(l(2), l(5), l(3), l(4)));
    assert!(!lanes_intersect(l(2), l(5), l(4), l(3)));
}

#[test]
fn test_chord_crossing_is_symmetric() {
    for a1 in 0..6 {
        for b1 in 0..6 {
            for a2 in 0..6 {
                for b2 in 0..6 {
                    let forward = chords_cross((a1, b1), (a2, b2));
                    assert_eq!(forward, chords_cross((a2, b2), (a1, b1)));
                    assert_eq!(forward, chords_cross((b1, a1), (a2, b2)));
                    assert_eq!(forward, chords_cross((a1, b1), (b2, a2)));
                }
            }
        }
    }
}

#[test]
fn test_shared_endpoint_touching_is_not_a_conflict() {
    // Both chords end at 5 and neither reaches inside the other's span
    assert!(!chords_cross((4, 5), (6, 5)));
    assert!(!chords_cross((1, 3), (3, 5)));
    // Identical chords only touch
    assert!(!chords_cross((1, 3), (1, 3)));
}

#[test]
fn test_shared_endpoint_with_inner_endpoint_is_a_conflict() {
    // 6 lies strictly between 5 and 8 while 5 does not
    assert!(chords_cross((8, 5), (6, 5)));
    assert!(chords_cross((1, 5), (2, 5)));
}

#[test]
fn test_endpoints_never_count_as_inside() {
    assert!(!chords_cross((1, 4), (4, 6)));
    assert!(!chords_cross((4, 1), (1, 0)));
    assert!(chords_cross((4, 1), (2, 6)));
}

#[test]
fn test_placements_are_read_linearly() {
    // The same shared-endpoint layout shifted by five positions
    assert!(!chords_cross((4, 5), (6, 5)));
    assert!(chords_cross((9, 0), (1, 0)));
}

#[test]
fn test_mapping_requires_inbound_source() {
    let lanes = create_lanes(4);
    let err = LaneDestinationMapping::new("bad", &lanes[1], &[lanes[3].clone()]).unwrap_err();
    assert!(err
        .to_string()
        .contains("A destination mapping must have a source"));
}

#[test]
fn test_mapping_requires_outbound_destinations() {
    let lanes = create_lanes(4);
    let err = LaneDestinationMapping::new("empty", &lanes[0], &[]).unwrap_err();
    assert!(err
        .to_string()
        .contains("A destination mapping must contain at least one destination"));

    let err = LaneDestinationMapping::new("inward", &lanes[0], &[lanes[2].clone()]).unwrap_err();
    assert!(err.to_string().contains("must be directed outwards"));
}

#[test]
fn test_mapping_keeps_its_own_destinations() {
    let lanes = create_lanes(6);
    let mut destinations = vec![lanes[1].clone(), lanes[3].clone(), lanes[5].clone()];
    let m = LaneDestinationMapping::new("m", &lanes[0], &destinations).expect("valid mapping");
    destinations.pop();

    assert_eq!(m.destinations().len(), 3);
    assert_eq!(m.to_string(), "m: (lane-0,0)->[(lane-1,1),(lane-3,3),(lane-5,5)]");
}

#[test]
fn test_mappings_intersect_on_any_chord() {
    let lanes = create_lanes(20);
    let m1 = mapping(&lanes, 8, &[3, 15, 5]);
    let m2 = mapping(&lanes, 2, &[1, 17, 13]);
    let m3 = mapping(&lanes, 16, &[1, 9]);
    let m4 = mapping(&lanes, 6, &[5]);

    assert!(mappings_intersect(&m1, &m2));
    assert!(mappings_intersect(&m1, &m3));
    assert!(mappings_intersect(&m1, &m4));
    assert!(mappings_intersect(&m2, &m1));
}

#[test]
fn test_mappings_without_crossing_chords() {
    let lanes = create_lanes(20);
    let m1 = mapping(&lanes, 8, &[3, 15, 5]);
    let m5 = mapping(&lanes, 6, &[7]);
    let m6 = mapping(&lanes, 16, &[1, 17]);

    assert!(!mappings_intersect(&m1, &m5));
    assert!(!mappings_intersect(&m1, &m6));
}

#[test]
fn test_four_way_through_movements() {
    let lanes = create_lanes(8);
    let north = mapping(&lanes, 0, &[5]);
    let south = mapping(&lanes, 4, &[1]);
    let east = mapping(&lanes, 6, &[3]);
    let west = mapping(&lanes, 2, &[7]);

    assert!(!mappings_intersect(&north, &south));
    assert!(!mappings_intersect(&east, &west));
    assert!(mappings_intersect(&north, &east));
    assert!(mappings_intersect(&north, &west));
    assert!(mappings_intersect(&south, &east));
    assert!(mappings_intersect(&south, &west));
}
