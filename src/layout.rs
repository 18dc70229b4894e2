use crate::agent::Position;
use crate::config::{Config, Layout};
use anyhow::{Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;
use std::collections::HashSet;

/// Margin keeping scattered agents away from the field edges.
const EDGE_MARGIN: f64 = 5.0;

/// Finalized agent positions plus the seeded initial states for a run.
///
/// The two index lists are always disjoint: an agent seeded immune never
/// also receives the initial-sick message.
#[derive(Debug, Clone)]
pub struct Placement {
    pub positions: Vec<Position>,
    pub initial_sick: Vec<usize>,
    pub initial_immune: Vec<usize>,
}

/// Compute agent positions and seeding for the configured layout.
pub fn place(cfg: &Config, rng: &mut ChaCha12Rng) -> Result<Placement> {
    match cfg.layout {
        Layout::Scattered { n_agents } => scattered(cfg, n_agents, rng),
        Layout::Grid { rows, columns } => dense_grid(cfg, rows, columns, rng),
        Layout::RandomGrid {
            rows,
            columns,
            n_agents,
        } => sparse_grid(cfg, rows, columns, n_agents, rng),
    }
}

/// Uniformly random positions within the field, bounded away from the edges.
///
/// Positions already provide randomness, so seeding is not randomized again:
/// immune seeding takes the leading agents in creation order and sick
/// seeding scans on from there, skipping the immune ones.
fn scattered(cfg: &Config, n_agents: usize, rng: &mut ChaCha12Rng) -> Result<Placement> {
    let x_dist = Uniform::new(EDGE_MARGIN, cfg.width - EDGE_MARGIN)?;
    let y_dist = Uniform::new(EDGE_MARGIN, cfg.height - EDGE_MARGIN)?;

    let mut positions = Vec::with_capacity(n_agents);
    for _ in 0..n_agents {
        positions.push(Position::new(x_dist.sample(rng), y_dist.sample(rng)));
    }

    let (initial_sick, initial_immune) = seed_leading(cfg.initial_immune, cfg.initial_sick);

    Ok(Placement {
        positions,
        initial_sick,
        initial_immune,
    })
}

/// One agent per cell of a regular grid with cell spacing equal to the
/// exposure distance, positioned at the cell centers.
///
/// Seeding draws `initial_sick + initial_immune` distinct cell indices
/// without replacement, so no cell receives both seeds.
fn dense_grid(
    cfg: &Config,
    rows: usize,
    columns: usize,
    rng: &mut ChaCha12Rng,
) -> Result<Placement> {
    let spacing = cfg.exposure_distance;
    let n_agents = rows * columns;

    let mut positions = Vec::with_capacity(n_agents);
    for row in 0..rows {
        for column in 0..columns {
            positions.push(Position::new(
                column as f64 * spacing + spacing / 2.0,
                row as f64 * spacing + spacing / 2.0,
            ));
        }
    }

    let n_seeds = cfg.initial_sick + cfg.initial_immune;
    let mut seeds = rand::seq::index::sample(rng, n_agents, n_seeds).into_vec();
    let initial_immune = seeds.split_off(cfg.initial_sick);
    let initial_sick = seeds;

    Ok(Placement {
        positions,
        initial_sick,
        initial_immune,
    })
}

/// N agents placed at distinct randomly chosen cells of an R×C grid,
/// leaving the other cells empty.
///
/// Placement is already randomized, so seeding takes the leading agents in
/// creation order, as in the scattered layout.
fn sparse_grid(
    cfg: &Config,
    rows: usize,
    columns: usize,
    n_agents: usize,
    rng: &mut ChaCha12Rng,
) -> Result<Placement> {
    if n_agents > rows * columns {
        bail!("number of agents must not exceed the {rows}x{columns} grid");
    }

    let cell_width = cfg.width / columns as f64;
    let cell_height = cfg.height / rows as f64;

    // Rejection sampling: redraw until the cell is unoccupied.
    let mut occupied = HashSet::with_capacity(n_agents);
    let mut positions = Vec::with_capacity(n_agents);
    while positions.len() < n_agents {
        let row = rng.random_range(0..rows);
        let column = rng.random_range(0..columns);
        if !occupied.insert((row, column)) {
            continue;
        }
        positions.push(Position::new(
            column as f64 * cell_width + cell_width / 2.0,
            row as f64 * cell_height + cell_height / 2.0,
        ));
    }

    let (initial_sick, initial_immune) = seed_leading(cfg.initial_immune, cfg.initial_sick);

    Ok(Placement {
        positions,
        initial_sick,
        initial_immune,
    })
}

/// First-agents seeding: immune agents are the leading `n_immune` in
/// creation order, sick agents the `n_sick` immediately after them.
fn seed_leading(n_immune: usize, n_sick: usize) -> (Vec<usize>, Vec<usize>) {
    let initial_immune = (0..n_immune).collect();
    let initial_sick = (n_immune..n_immune + n_sick).collect();
    (initial_sick, initial_immune)
}
