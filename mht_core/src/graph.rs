//! Weighted conflict graph and maximum weighted independent set.
//!
//! The solver follows the classical reduction: the maximal independent sets
//! of a graph are the maximal cliques of its complement. Cliques are
//! enumerated with Bron–Kerbosch using pivoting inside an outer degeneracy
//! ordering, and the heaviest set wins. Every tie is broken on vertex ids so
//! that identical inputs always produce identical outputs.

use tracing::debug;

/// Undirected graph with weighted vertices. Vertex ids are dense `[0, n)`;
/// weights are real and may be negative.
#[derive(Debug, Default)]
pub struct WeightedGraph {
    weights: Vec<f64>,
    edges: Vec<(usize, usize)>,
}

impl WeightedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its id.
    pub fn add_weighted_vertex(&mut self, weight: f64) -> usize {
        self.weights.push(weight);
        self.weights.len() - 1
    }

    /// Add an undirected edge between two existing vertices.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        debug_assert!(a < self.weights.len() && b < self.weights.len() && a != b);
        self.edges.push((a, b));
    }

    pub fn vertex_count(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, vertex: usize) -> f64 {
        self.weights[vertex]
    }

    /// Dense adjacency matrix of the complement graph (no self loops).
    fn complement(&self) -> Vec<Vec<bool>> {
        let n = self.weights.len();
        let mut adjacency = vec![vec![true; n]; n];
        for (v, row) in adjacency.iter_mut().enumerate() {
            row[v] = false;
        }
        for &(a, b) in &self.edges {
            adjacency[a][b] = false;
            adjacency[b][a] = false;
        }
        adjacency
    }

    /// Maximum weighted independent set, as ascending vertex ids.
    ///
    /// Enumerates every maximal independent set and keeps the heaviest. The
    /// initial best weight is `-Σ|wᵢ| - 1`, below any achievable total, so an
    /// all-negative solution still beats the empty set whenever at least one
    /// maximal set exists. Equal weights resolve to the lexicographically
    /// smallest id set.
    pub fn mwis(&self) -> Vec<usize> {
        if self.weights.is_empty() {
            return Vec::new();
        }

        let complement = self.complement();
        let mut independent_sets = Vec::new();
        bron_kerbosch_degeneracy(&complement, &mut independent_sets);
        debug!(
            vertices = self.weights.len(),
            sets = independent_sets.len(),
            "enumerated maximal independent sets"
        );

        let mut best_weight = -self.weights.iter().map(|w| w.abs()).sum::<f64>() - 1.0;
        let mut best: Vec<usize> = Vec::new();
        for set in independent_sets {
            let weight: f64 = set.iter().map(|&v| self.weights[v]).sum();
            if weight > best_weight || (weight == best_weight && set < best) {
                best_weight = weight;
                best = set;
            }
        }
        best
    }
}

/// Outer Bron–Kerbosch loop over a degeneracy ordering of `adjacency`.
/// Collects every maximal clique, each sorted ascending.
fn bron_kerbosch_degeneracy(adjacency: &[Vec<bool>], results: &mut Vec<Vec<usize>>) {
    let n = adjacency.len();
    let mut candidates: Vec<usize> = (0..n).collect();
    let mut excluded: Vec<usize> = Vec::new();

    for v in degeneracy_ordering(adjacency) {
        let p = intersect_neighbors(&candidates, v, adjacency);
        let x = intersect_neighbors(&excluded, v, adjacency);
        bron_kerbosch_pivot(adjacency, vec![v], p, x, results);

        candidates.retain(|&u| u != v);
        insert_sorted(&mut excluded, v);
    }
}

/// Recursive step with pivoting: only non-neighbors of the pivot are
/// branched on. The pivot is the vertex of `P ∪ X` with the most neighbors
/// in `P`, smallest id on ties.
fn bron_kerbosch_pivot(
    adjacency: &[Vec<bool>],
    clique: Vec<usize>,
    mut candidates: Vec<usize>,
    mut excluded: Vec<usize>,
    results: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        let mut clique = clique;
        clique.sort_unstable();
        results.push(clique);
        return;
    }

    let pivot = choose_pivot(adjacency, &candidates, &excluded);
    let branches: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&v| !adjacency[pivot][v])
        .collect();

    for v in branches {
        let p = intersect_neighbors(&candidates, v, adjacency);
        let x = intersect_neighbors(&excluded, v, adjacency);
        let mut extended = clique.clone();
        extended.push(v);
        bron_kerbosch_pivot(adjacency, extended, p, x, results);

        candidates.retain(|&u| u != v);
        insert_sorted(&mut excluded, v);
    }
}

fn choose_pivot(adjacency: &[Vec<bool>], candidates: &[usize], excluded: &[usize]) -> usize {
    let mut pivot = usize::MAX;
    let mut best_count = usize::MAX;
    for &u in candidates.iter().chain(excluded.iter()) {
        let count = candidates.iter().filter(|&&v| adjacency[u][v]).count();
        // Maximise the neighbor count; prefer the smallest id on ties.
        if best_count == usize::MAX || count > best_count || (count == best_count && u < pivot) {
            best_count = count;
            pivot = u;
        }
    }
    pivot
}

/// Order vertices by repeatedly removing the minimum-degree vertex of the
/// remaining graph, smallest id on ties.
fn degeneracy_ordering(adjacency: &[Vec<bool>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut degrees: Vec<usize> = (0..n)
        .map(|v| adjacency[v].iter().filter(|&&e| e).count())
        .collect();
    let mut removed = vec![false; n];
    let mut ordering = Vec::with_capacity(n);

    for _ in 0..n {
        let mut next = usize::MAX;
        for v in 0..n {
            if !removed[v] && (next == usize::MAX || degrees[v] < degrees[next]) {
                next = v;
            }
        }
        removed[next] = true;
        ordering.push(next);
        for u in 0..n {
            if !removed[u] && adjacency[next][u] {
                degrees[u] -= 1;
            }
        }
    }
    ordering
}

fn intersect_neighbors(set: &[usize], v: usize, adjacency: &[Vec<bool>]) -> Vec<usize> {
    set.iter().copied().filter(|&u| adjacency[v][u]).collect()
}

fn insert_sorted(set: &mut Vec<usize>, v: usize) {
    match set.binary_search(&v) {
        Ok(_) => {}
        Err(position) => set.insert(position, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn graph(weights: &[f64], edges: &[(usize, usize)]) -> WeightedGraph {
        let mut g = WeightedGraph::new();
        for &w in weights {
            g.add_weighted_vertex(w);
        }
        for &(a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    #[test]
    fn test_empty_graph_yields_empty_set() {
        assert!(WeightedGraph::new().mwis().is_empty());
    }

    #[test]
    fn test_isolated_vertices_are_all_selected() {
        let g = graph(&[1.0, 2.0, 3.0], &[]);
        assert_eq!(g.mwis(), vec![0, 1, 2]);
    }

    #[test]
    fn test_single_edge_picks_heavier_endpoint() {
        let g = graph(&[1.0, 5.0], &[(0, 1)]);
        assert_eq!(g.mwis(), vec![1]);
    }

    #[test]
    fn test_path_graph_alternating_set() {
        // 0-1-2: {0, 2} outweighs {1}.
        let g = graph(&[1.0, 1.5, 1.0], &[(0, 1), (1, 2)]);
        assert_eq!(g.mwis(), vec![0, 2]);
    }

    #[test]
    fn test_all_negative_weights_still_select_a_set() {
        // The complement of an edge has no edge, so the maximal independent
        // sets are the singletons; the less negative one wins.
        let g = graph(&[-5.0, -1.0], &[(0, 1)]);
        assert_eq!(g.mwis(), vec![1]);
    }

    #[test]
    fn test_equal_weights_tie_break_lexicographic() {
        let g = graph(&[1.0, 1.0], &[(0, 1)]);
        assert_eq!(g.mwis(), vec![0]);
    }

    #[test]
    fn test_triangle_with_pendant() {
        // Triangle 0-1-2 plus pendant 3 attached to 2.
        let g = graph(&[2.0, 3.0, 10.0, 4.0], &[(0, 1), (1, 2), (0, 2), (2, 3)]);
        // {2} = 10 versus {0, 3} = 6 versus {1, 3} = 7.
        assert_eq!(g.mwis(), vec![2]);
    }

    #[test]
    fn test_mwis_weight_is_maximum_over_maximal_sets() {
        let g = graph(
            &[4.0, 3.0, 2.0, 5.0, 1.0],
            &[(0, 1), (1, 2), (2, 3), (3, 4), (0, 4)],
        );
        // 5-cycle: best pair is {0, 3} = 9.
        let solution = g.mwis();
        assert_eq!(solution, vec![0, 3]);
        let weight: f64 = solution.iter().map(|&v| g.weight(v)).sum();
        assert_relative_eq!(weight, 9.0);
    }

    #[test]
    fn test_selected_set_is_independent() {
        let edges = [(0, 1), (0, 2), (1, 3), (2, 4), (3, 4), (1, 4)];
        let g = graph(&[1.0, 2.0, 3.0, 4.0, 5.0], &edges);
        let solution = g.mwis();
        for (i, &a) in solution.iter().enumerate() {
            for &b in &solution[i + 1..] {
                assert!(!edges.contains(&(a, b)) && !edges.contains(&(b, a)));
            }
        }
    }
}
