//! Optimal strategy: maximum-weight assignment via the Hungarian algorithm.

use std::collections::HashMap;

use tracing::debug;

use crate::core::types::MatchMethod;
use crate::matching::mapping::Mapping;
use crate::matching::network::{connected_components, scaled_weight, Component};
use crate::similarity::graph::{SimilarityEdge, SimilarityGraph};

/// Maximise the summed score of an injective mapping over surviving edges.
///
/// Each connected component is solved as a dense assignment problem where
/// missing edges weigh zero; pairs without a real edge are discarded
/// afterwards. Cost is cubic in the component size.
pub(crate) fn resolve(graph: &SimilarityGraph, threshold: f64) -> Mapping {
    let edges: Vec<SimilarityEdge> = graph.edges_at_least(threshold).copied().collect();
    let components = connected_components(&edges);
    debug!(
        "Bipartite matching over {} edges in {} components",
        edges.len(),
        components.len()
    );

    let matched = components.iter().flat_map(solve_component);
    Mapping::from_edges(Some(MatchMethod::Bipartite), matched.collect::<Vec<_>>())
}

fn solve_component(component: &Component) -> Vec<SimilarityEdge> {
    if let [edge] = component.edges.as_slice() {
        return vec![*edge];
    }

    // The assignment below needs rows <= columns
    let transpose = component.sources.len() > component.targets.len();
    let (rows, cols) = if transpose {
        (&component.targets, &component.sources)
    } else {
        (&component.sources, &component.targets)
    };
    let row_of: HashMap<usize, usize> = rows.iter().enumerate().map(|(i, &x)| (x, i)).collect();
    let col_of: HashMap<usize, usize> = cols.iter().enumerate().map(|(i, &x)| (x, i)).collect();

    let mut cost = vec![vec![0i64; cols.len()]; rows.len()];
    let mut edge_at: Vec<Vec<Option<usize>>> = vec![vec![None; cols.len()]; rows.len()];
    for (i, edge) in component.edges.iter().enumerate() {
        let (r, c) = if transpose {
            (row_of[&edge.index_b], col_of[&edge.index_a])
        } else {
            (row_of[&edge.index_a], col_of[&edge.index_b])
        };
        cost[r][c] = -scaled_weight(edge.score);
        edge_at[r][c] = Some(i);
    }

    min_cost_assignment(&cost)
        .into_iter()
        .enumerate()
        .filter_map(|(r, c)| edge_at[r][c].map(|i| component.edges[i]))
        .collect()
}

/// Minimum-cost assignment of every row to a distinct column.
///
/// Kuhn-Munkres in its O(rows² · cols) potentials form. Requires
/// `rows <= cols`; returns the chosen column for each row.
pub(crate) fn min_cost_assignment(cost: &[Vec<i64>]) -> Vec<usize> {
    const INF: i64 = i64::MAX / 4;

    let n = cost.len();
    let m = cost.first().map_or(0, Vec::len);
    debug_assert!(n <= m, "assignment needs rows <= columns");

    // 1-based; column 0 is a virtual start column
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut row_of_col = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        row_of_col[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = row_of_col[j0];
            let mut delta = INF;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[row_of_col[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if row_of_col[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            row_of_col[j0] = row_of_col[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut col_of_row = vec![0usize; n];
    for j in 1..=m {
        if row_of_col[j] != 0 {
            col_of_row[row_of_col[j] - 1] = j - 1;
        }
    }
    col_of_row
}
