//! Topology configuration tests

use junction_sim::simulation::{
    Direction, JunctionConfig, LaneSpec, LightSpec, MovementSpec, SimWorld,
};

/// Two inbound and two outbound lanes, interleaved so the movements cross
fn small_config() -> JunctionConfig {
    JunctionConfig {
        key: Some("small".to_string()),
        lanes: vec![
            LaneSpec::new("n-in", 0, Direction::In),
            LaneSpec::new("e-in", 1, Direction::In),
            LaneSpec::new("s-out", 2, Direction::Out),
            LaneSpec::new("w-out", 3, Direction::Out),
        ],
        movements: vec![
            MovementSpec::new("a", "n-in", &["s-out"]),
            MovementSpec::new("b", "e-in", &["w-out"]),
        ],
        lights: vec![LightSpec::new("A", &["a"]), LightSpec::new("B", &["b"])],
        ..JunctionConfig::default()
    }
}

fn build_error(config: &JunctionConfig) -> String {
    match config.build() {
        Ok(_) => panic!("config should not build"),
        Err(err) => format!("{:#}", err),
    }
}

#[test]
fn test_small_config_builds() {
    let built = small_config().build().expect("valid config");

    assert_eq!(built.lanes.len(), 4);
    assert_eq!(built.movements.len(), 2);
    assert_eq!(built.intersection.key(), "small");
    assert_eq!(built.intersection.traffic_lights().len(), 2);
    // 0->2 and 1->3 cross
    assert_eq!(built.intersection.groups().len(), 2);
    assert_eq!(built.scheduler.time(), 0.0);
}

#[test]
fn test_overrides_reach_the_entities() {
    let built = small_config()
        .with_transition_delay(12.0)
        .with_switch_group_delay(45.0)
        .with_epoch(100.0)
        .build()
        .expect("valid config");

    assert_eq!(built.scheduler.time(), 100.0);
    assert_eq!(built.intersection.switch_group_delay(), 45.0);
    for light in built.intersection.traffic_lights() {
        assert_eq!(light.transition_delay(), 12.0);
    }
}

#[test]
fn test_missing_keys_are_generated() {
    let mut config = small_config();
    config.key = None;
    config.lanes[0].key = None;
    config.movements[0].source = "k0".to_string();
    config.lights[1].key = None;

    let built = config.build().expect("valid config");
    assert_eq!(built.lanes[0].key(), "k0");
    assert_eq!(built.intersection.traffic_lights()[1].key(), "k1");
    assert_eq!(built.intersection.key(), "k2");
}

#[test]
fn test_missing_placement_fails() {
    let mut config = small_config();
    config.lanes[2].placement = None;

    let err = build_error(&config);
    assert!(err.contains("Lane placement cannot be undefined (lane #2 's-out')"));
}

#[test]
fn test_unknown_lane_fails() {
    let mut config = small_config();
    config.movements[1].destinations.push("nowhere".to_string());

    let err = build_error(&config);
    assert!(err.contains("Invalid movement 'b'"));
    assert!(err.contains("Unknown lane 'nowhere'"));
}

#[test]
fn test_outbound_source_fails() {
    let mut config = small_config();
    config.movements[0].source = "s-out".to_string();

    let err = build_error(&config);
    assert!(err.contains("must enter the intersection"));
}

#[test]
fn test_movement_without_destinations_fails() {
    let mut config = small_config();
    config.movements[0].destinations.clear();

    let err = build_error(&config);
    assert!(err.contains("at least one destination"));
}

#[test]
fn test_unknown_movement_fails() {
    let mut config = small_config();
    config.lights[0].movements.push("c".to_string());

    let err = build_error(&config);
    assert!(err.contains("Invalid traffic light 'A'"));
    assert!(err.contains("Unknown movement 'c'"));
}

#[test]
fn test_light_with_crossing_movements_fails() {
    let mut config = small_config();
    config.lights = vec![LightSpec::new("AB", &["a", "b"])];

    let err = build_error(&config);
    assert!(err.contains("cannot serve intersecting mappings ('a' and 'b')"));
}

#[test]
fn test_duplicate_keys_fail() {
    let mut config = small_config();
    config.lanes[1] = LaneSpec::new("n-in", 1, Direction::In);
    assert!(build_error(&config).contains("Duplicate lane key 'n-in'"));

    let mut config = small_config();
    config.movements.push(MovementSpec::new("a", "e-in", &["s-out"]));
    assert!(build_error(&config).contains("Duplicate movement key 'a'"));

    let mut config = small_config();
    config.lights.push(LightSpec::new("A", &["b"]));
    assert!(build_error(&config).contains("Duplicate traffic light key 'A'"));
}

#[test]
fn test_empty_light_list_fails() {
    let mut config = small_config();
    config.lights.clear();

    let err = build_error(&config);
    assert!(err.contains("Invalid intersection 'small'"));
    assert!(err.contains("at least one trafficlight"));
}

#[test]
fn test_bad_delays_fail() {
    assert!(small_config().with_transition_delay(-1.0).build().is_err());
    assert!(small_config().with_switch_group_delay(f64::INFINITY).build().is_err());
    assert!(small_config().with_epoch(f64::NAN).build().is_err());
}

#[test]
fn test_world_from_config_starts_once() {
    let mut world = SimWorld::from_config(&small_config()).expect("valid config");
    world.start();
    world.start();
    assert_eq!(world.scheduler().pending(), 1);
    assert_eq!(world.lanes().len(), 4);
    assert_eq!(world.movements().len(), 2);
}
