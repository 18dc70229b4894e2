use contagio::{Config, Layout, Position, layout, topology};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

fn scattered_config(n_agents: usize) -> Config {
    Config {
        layout: Layout::Scattered { n_agents },
        ..Config::default()
    }
}

#[test]
fn exposure_threshold_is_strict_for_scattered() {
    // The pair sits exactly at the threshold distance of 5.
    let positions = vec![Position::new(0.0, 0.0), Position::new(3.0, 4.0)];

    let strict = topology::neighbor_indices(&positions, 5.0, false);
    assert!(strict[0].is_empty());
    assert!(strict[1].is_empty());

    let inclusive = topology::neighbor_indices(&positions, 5.0, true);
    assert_eq!(inclusive[0], vec![1]);
    assert_eq!(inclusive[1], vec![0]);

    let strict_closer = topology::neighbor_indices(&positions, 5.1, false);
    assert_eq!(strict_closer[0], vec![1]);
}

#[test]
fn no_agent_neighbors_itself() {
    let positions: Vec<_> = (0..6).map(|i| Position::new(i as f64, 0.0)).collect();

    let adjacency = topology::neighbor_indices(&positions, 100.0, true);
    for (i, neighbors) in adjacency.iter().enumerate() {
        assert_eq!(neighbors.len(), positions.len() - 1);
        assert!(!neighbors.contains(&i));
        assert!(neighbors.is_sorted());
    }
}

#[test]
fn dense_grid_neighbors_respect_inclusive_threshold() {
    let cfg = Config {
        layout: Layout::Grid { rows: 2, columns: 2 },
        exposure_distance: 20.0,
        ..Config::default()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let placement = layout::place(&cfg, &mut rng).unwrap();

    let adjacency = topology::neighbor_indices(
        &placement.positions,
        cfg.exposure_distance,
        cfg.layout.inclusive_exposure(),
    );

    // Orthogonally adjacent cells sit exactly at the threshold and are
    // neighbors; diagonal cells are sqrt(2) times further and are not.
    assert_eq!(adjacency[0], vec![1, 2]);
    assert_eq!(adjacency[1], vec![0, 3]);
    assert_eq!(adjacency[2], vec![0, 3]);
    assert_eq!(adjacency[3], vec![1, 2]);
}

#[test]
fn scattered_layout_respects_margin_and_seeds_leading_agents() {
    let cfg = Config {
        initial_sick: 2,
        initial_immune: 3,
        ..scattered_config(20)
    };
    let mut rng = ChaCha12Rng::seed_from_u64(1);
    let placement = layout::place(&cfg, &mut rng).unwrap();

    assert_eq!(placement.positions.len(), 20);
    for position in &placement.positions {
        assert!(position.x >= 5.0 && position.x <= cfg.width - 5.0);
        assert!(position.y >= 5.0 && position.y <= cfg.height - 5.0);
    }

    // Immune seeding takes the leading agents, sick seeding skips them.
    assert_eq!(placement.initial_immune, vec![0, 1, 2]);
    assert_eq!(placement.initial_sick, vec![3, 4]);
}

#[test]
fn dense_grid_layout_positions_and_disjoint_seeding() {
    let cfg = Config {
        layout: Layout::Grid { rows: 2, columns: 2 },
        exposure_distance: 20.0,
        initial_sick: 1,
        initial_immune: 1,
        ..Config::default()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(2);
    let placement = layout::place(&cfg, &mut rng).unwrap();

    let expected = [
        Position::new(10.0, 10.0),
        Position::new(30.0, 10.0),
        Position::new(10.0, 30.0),
        Position::new(30.0, 30.0),
    ];
    assert_eq!(placement.positions, expected);

    // Exactly one agent starts sick and a different agent starts immune.
    assert_eq!(placement.initial_sick.len(), 1);
    assert_eq!(placement.initial_immune.len(), 1);
    assert_ne!(placement.initial_sick[0], placement.initial_immune[0]);
    assert!(placement.initial_sick[0] < 4);
    assert!(placement.initial_immune[0] < 4);
}

#[test]
fn sparse_grid_layout_places_distinct_cells() {
    let cfg = Config {
        layout: Layout::RandomGrid {
            rows: 4,
            columns: 4,
            n_agents: 10,
        },
        initial_sick: 1,
        initial_immune: 1,
        ..Config::default()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(3);
    let placement = layout::place(&cfg, &mut rng).unwrap();

    assert_eq!(placement.positions.len(), 10);
    for (i, a) in placement.positions.iter().enumerate() {
        assert!(a.x > 0.0 && a.x < cfg.width);
        assert!(a.y > 0.0 && a.y < cfg.height);
        for b in &placement.positions[i + 1..] {
            assert!(a != b, "two agents share a cell");
        }
    }

    assert_eq!(placement.initial_immune, vec![0]);
    assert_eq!(placement.initial_sick, vec![1]);
}

#[test]
fn sparse_grid_rejects_overfull_population() {
    let cfg = Config {
        layout: Layout::RandomGrid {
            rows: 2,
            columns: 2,
            n_agents: 5,
        },
        ..Config::default()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(4);
    assert!(layout::place(&cfg, &mut rng).is_err());
}

#[test]
fn same_seed_reproduces_placement() {
    let cfg = scattered_config(50);

    let mut rng_a = ChaCha12Rng::seed_from_u64(7);
    let mut rng_b = ChaCha12Rng::seed_from_u64(7);
    let placement_a = layout::place(&cfg, &mut rng_a).unwrap();
    let placement_b = layout::place(&cfg, &mut rng_b).unwrap();

    assert_eq!(placement_a.positions, placement_b.positions);
}

#[test]
fn config_parses_all_keywords() {
    let text = "dimensions 400 300\n\
                exposuredistance 15\n\
                incubation 2\n\
                sickness 4\n\
                recover 0.8\n\
                randomgrid 10 12 50\n\
                initialsick 3\n\
                initialimmune 2\n\
                secondsperday 0.5\n\
                seed 99\n\
                somefuturekeyword 1 2 3\n";

    let cfg = Config::parse(text).unwrap();
    assert_eq!(cfg.width, 400.0);
    assert_eq!(cfg.height, 300.0);
    assert_eq!(cfg.exposure_distance, 15.0);
    assert_eq!(cfg.incubation_days, 2.0);
    assert_eq!(cfg.sickness_days, 4.0);
    assert_eq!(cfg.recover, 0.8);
    assert_eq!(
        cfg.layout,
        Layout::RandomGrid {
            rows: 10,
            columns: 12,
            n_agents: 50,
        }
    );
    assert_eq!(cfg.initial_sick, 3);
    assert_eq!(cfg.initial_immune, 2);
    assert_eq!(cfg.seconds_per_day, 0.5);
    assert_eq!(cfg.seed, Some(99));
}

#[test]
fn config_defaults_apply_without_keywords() {
    let cfg = Config::parse("").unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.layout, Layout::Scattered { n_agents: 100 });
    assert_eq!(cfg.layout.population(), 100);
    assert!(!cfg.layout.inclusive_exposure());
}

#[test]
fn last_layout_keyword_wins() {
    let cfg = Config::parse("grid 4 4\nrandom 30\n").unwrap();
    assert_eq!(cfg.layout, Layout::Scattered { n_agents: 30 });
}

#[test]
fn config_rejects_invalid_values() {
    assert!(Config::parse("recover 1.5\n").is_err());
    assert!(Config::parse("grid 0 4\n").is_err());
    assert!(Config::parse("incubation\n").is_err());
    assert!(Config::parse("sickness ten\n").is_err());
    assert!(Config::parse("random 4\ninitialsick 3\ninitialimmune 2\n").is_err());
    assert!(Config::parse("randomgrid 2 2 5\n").is_err());
}
