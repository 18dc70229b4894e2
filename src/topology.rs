use crate::agent::Position;

/// Compute the neighbor relation over finalized agent positions.
///
/// For every ordered pair of distinct agents, agent `j` is a neighbor of
/// agent `i` iff their Euclidean distance satisfies the threshold predicate:
/// strict `<` for the scattered-random layout, `<=` for both grid layouts
/// (`inclusive`). Each neighbor list is ordered by ascending agent index and
/// never contains the agent itself.
///
/// Pairwise over the whole population, so quadratic in its size; fine for
/// populations in the low hundreds.
pub fn neighbor_indices(
    positions: &[Position],
    exposure_distance: f64,
    inclusive: bool,
) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); positions.len()];

    for (i, pos) in positions.iter().enumerate() {
        for (j, other) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let distance = pos.distance(other);
            let within = if inclusive {
                distance <= exposure_distance
            } else {
                distance < exposure_distance
            };
            if within {
                adjacency[i].push(j);
            }
        }
    }

    adjacency
}
