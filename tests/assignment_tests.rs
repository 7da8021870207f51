use reefmatch::prelude::*;
use reefmatch::{RegionOrigin, WEST_ATLANTIC, search_radius};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Regions roughly where the major reef provinces sit.
fn world_regions() -> Vec<ReefRegion> {
    vec![
        ReefRegion::new("AuA", 146.0, -18.0, Some(20_000.0)),
        ReefRegion::new("Pac", -150.0, -17.0, Some(3_000.0)),
        ReefRegion::new("IO-ME", 55.0, -5.0, None),
        ReefRegion::new("SEAsia", 120.0, 5.0, Some(50_000.0)),
        ReefRegion::new("Car", -75.0, 18.0, Some(10_000.0)),
    ]
}

/// Coarse grid of cells in the tropics, lon -180..180 step 7.5, lat -24..24 step 6.
fn tropical_cells() -> Vec<ReefCell> {
    let mut cells = Vec::new();
    let mut lat = -24.0;
    while lat <= 24.0 {
        let mut lon = -180.0;
        while lon < 180.0 {
            cells.push(ReefCell::new(lon, lat));
            lon += 7.5;
        }
        lat += 6.0;
    }
    cells
}

fn within(region: &ReefRegion, cell: &ReefCell, radius: f64) -> bool {
    let dx = cell.lon() - region.lon();
    let dy = cell.lat() - region.lat();
    dx * dx + dy * dy <= radius * radius
}

#[test]
fn test_every_cell_is_labeled() {
    init_logging();
    let regions = world_regions();
    let cells = tropical_cells();

    let run = RegionAssigner::builder()
        .build()
        .unwrap()
        .run(&regions, &cells)
        .unwrap();

    assert_eq!(run.table.len(), cells.len());
    assert!(run.table.is_fully_assigned());
    assert!(run.table.unassigned_ids().is_empty());
    for (_, _, label) in run.table.iter() {
        assert_ne!(label, "none");
    }

    let report = &run.report;
    assert_eq!(report.total, cells.len());
    assert_eq!(report.passes.last().unwrap().assigned, cells.len());
    let newly: usize = report.passes.iter().map(|p| p.newly_assigned).sum();
    assert_eq!(newly, cells.len());
}

#[test]
fn test_first_reach_wins() {
    let regions = world_regions();
    let cells = tropical_cells();
    let config = Config::default().without_overrides();

    let run = AssignerBuilder::new()
        .config(config.clone())
        .build()
        .unwrap()
        .run(&regions, &cells)
        .unwrap();

    for (id, cell, label) in run.table.iter() {
        let (winner, pass) = match run.table.origin(id) {
            Some(RegionOrigin::Matched { region, pass }) => (region, pass),
            other => panic!("cell {} has origin {:?}", id, other),
        };
        assert_eq!(regions[winner].name, label);

        // Nobody reached the cell on an earlier pass, and no earlier region
        // reached it on the winning pass.
        for q in 0..=pass {
            let multiplier = config.base_radius_deg * 2f64.powi(q as i32);
            for (idx, region) in regions.iter().enumerate() {
                if q == pass && idx >= winner {
                    continue;
                }
                let radius = search_radius(region.area_km2, multiplier, config.km_per_degree);
                assert!(
                    !within(region, cell, radius),
                    "cell {} reachable by {} at pass {} but labeled {} at pass {}",
                    id,
                    region.name,
                    q,
                    label,
                    pass
                );
            }
        }

        let multiplier = config.base_radius_deg * 2f64.powi(pass as i32);
        let radius = search_radius(regions[winner].area_km2, multiplier, config.km_per_degree);
        assert!(within(&regions[winner], cell, radius));
    }
}

#[test]
fn test_runs_are_deterministic() {
    let regions = world_regions();
    let cells = tropical_cells();
    let assigner = RegionAssigner::builder().build().unwrap();

    let first = assigner.run(&regions, &cells).unwrap();
    let second = assigner.run(&regions, &cells).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(first.report.passes, second.report.passes);
}

#[test]
fn test_priority_only_affects_contested_cells() {
    let regions = vec![
        ReefRegion::new("West", 0.0, 0.0, None),
        ReefRegion::new("East", 0.6, 0.0, None),
    ];
    // Cell 2 lies halfway, inside both base radii.
    let cells = vec![
        ReefCell::new(-0.2, 0.0),
        ReefCell::new(0.8, 0.0),
        ReefCell::new(0.3, 0.0),
    ];

    let table_order = AssignerBuilder::new().build().unwrap();
    let east_first = AssignerBuilder::new()
        .region_order(RegionOrder::Priority(vec![1, 0]))
        .build()
        .unwrap();

    let a = table_order.run(&regions, &cells).unwrap().table;
    let b = east_first.run(&regions, &cells).unwrap().table;

    assert_eq!(a.label(CellId::new(0)), "West");
    assert_eq!(b.label(CellId::new(0)), "West");
    assert_eq!(a.label(CellId::new(1)), "East");
    assert_eq!(b.label(CellId::new(1)), "East");
    assert_eq!(a.label(CellId::new(2)), "West");
    assert_eq!(b.label(CellId::new(2)), "East");
}

#[test]
fn test_reference_scenario_one_pass() {
    let regions = vec![
        ReefRegion::new("R1", 0.0, 0.0, None),
        ReefRegion::new("R2", 10.0, 10.0, None),
        ReefRegion::new("R3", 0.0, 0.4, None),
    ];
    let cells = vec![ReefCell::new(0.0, 0.0), ReefCell::new(10.0, 10.0)];

    let run = RegionAssigner::builder()
        .build()
        .unwrap()
        .run(&regions, &cells)
        .unwrap();

    assert_eq!(run.table.label(CellId::new(0)), "R1");
    assert_eq!(run.table.label(CellId::new(1)), "R2");
    assert_eq!(run.report.passes.len(), 1);
    assert_eq!(run.report.passes[0].multiplier, 0.5);
}

#[test]
fn test_far_region_needs_three_doublings() {
    let regions = vec![ReefRegion::new("Far", 0.0, 0.0, None)];
    let cells = vec![ReefCell::new(0.0, 3.5)];

    let run = RegionAssigner::builder()
        .build()
        .unwrap()
        .run(&regions, &cells)
        .unwrap();

    assert_eq!(run.report.doublings(), 3);
    assert_eq!(run.report.multipliers(), vec![0.5, 1.0, 2.0, 4.0]);
    let counts: Vec<usize> = run.report.passes.iter().map(|p| p.newly_assigned).collect();
    assert_eq!(counts, vec![0, 0, 0, 1]);
}

#[test]
fn test_brazil_override_beats_indian_ocean() {
    init_logging();
    let regions = vec![
        ReefRegion::new("IO-ME", -28.0, -20.0, None),
        ReefRegion::new("Pac", -150.0, -17.0, None),
    ];
    let cells = vec![ReefCell::new(-27.8, -20.1), ReefCell::new(-150.1, -17.0)];

    let run = RegionAssigner::builder()
        .build()
        .unwrap()
        .run(&regions, &cells)
        .unwrap();

    assert_eq!(run.table.label(CellId::new(0)), WEST_ATLANTIC);
    assert_eq!(
        run.table.origin(CellId::new(0)),
        Some(RegionOrigin::Override { rule: 0 })
    );
    assert_eq!(run.table.label(CellId::new(1)), "Pac");

    let counts = run.table.region_counts();
    assert_eq!(counts.get(WEST_ATLANTIC), Some(&1));
    assert_eq!(counts.get("IO-ME"), None);
}

#[test]
fn test_overrides_are_idempotent_on_real_run() {
    let regions = world_regions();
    let cells = tropical_cells();
    let rules = OverrideRules::reference();

    let run = AssignerBuilder::new()
        .config(Config::default().with_overrides(rules.clone()))
        .build()
        .unwrap()
        .run(&regions, &cells)
        .unwrap();

    let mut again = run.table.clone();
    rules.apply(&mut again);
    assert_eq!(again, run.table);
}

#[test]
fn test_iteration_cap_is_an_error() {
    let regions = vec![ReefRegion::new("Tiny", 0.0, 0.0, None)];
    let cells = vec![ReefCell::new(0.0, 0.0), ReefCell::new(100.0, 0.0)];

    let assigner = AssignerBuilder::new()
        .config(Config::default().with_max_doublings(3))
        .build()
        .unwrap();

    match assigner.run(&regions, &cells) {
        Err(ReefError::Convergence {
            passes,
            assigned,
            total,
        }) => {
            assert_eq!(passes, 4);
            assert_eq!(assigned, 1);
            assert_eq!(total, 2);
        }
        other => panic!("expected convergence error, got {:?}", other.map(|r| r.table)),
    }
}
