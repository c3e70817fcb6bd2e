//! Compact letter display for group equivalence classes
//!
//! Two groups share a letter exactly when no significant pairwise
//! difference is recorded between them (absent entries count as
//! p = 1.0). The partition is the clique decomposition of the
//! "not significantly different" graph: every maximal clique gets one
//! letter, and a group's label concatenates the letters of each clique
//! it belongs to, so overlapping classes come out as "ab".

use std::collections::HashMap;

use crate::stats::sigmap::SignificanceMaps;

/// Assign equivalence-class letters to `groups` (in display order).
///
/// Deterministic for a fixed group order. Every group receives at least
/// one letter; the alphabet reuses 'z' in the unlikely case more than 26
/// maximal cliques exist.
pub fn assign_letters(
    groups: &[String],
    maps: &SignificanceMaps,
    alpha: f64,
) -> HashMap<String, String> {
    let n = groups.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let p = maps.pairwise_p(&groups[i], &groups[j]).unwrap_or(1.0);
            if p >= alpha {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut cliques = Vec::new();
    bron_kerbosch(
        &mut Vec::new(),
        (0..n).collect(),
        Vec::new(),
        &adjacency,
        &mut cliques,
    );

    let mut letters: HashMap<String, String> = groups
        .iter()
        .map(|g| (g.clone(), String::new()))
        .collect();
    for (idx, clique) in cliques.iter().enumerate() {
        let letter = (b'a' + idx.min(25) as u8) as char;
        for &member in clique {
            letters
                .entry(groups[member].clone())
                .or_default()
                .push(letter);
        }
    }
    letters
}

/// Bron-Kerbosch maximal-clique enumeration with pivoting.
///
/// Candidate sets are kept as sorted index vectors so the recursion, and
/// therefore the clique discovery order and the letters, are
/// deterministic.
fn bron_kerbosch(
    current: &mut Vec<usize>,
    mut candidates: Vec<usize>,
    mut excluded: Vec<usize>,
    adjacency: &[Vec<usize>],
    cliques: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        if !current.is_empty() {
            cliques.push(current.clone());
        }
        return;
    }

    // pivot: the vertex covering the most candidates, lowest index on ties
    let pivot = candidates
        .iter()
        .chain(excluded.iter())
        .copied()
        .max_by_key(|&u| {
            let degree = candidates.iter().filter(|v| adjacency[u].contains(v)).count();
            (degree, std::cmp::Reverse(u))
        });

    let to_visit: Vec<usize> = match pivot {
        Some(u) => candidates
            .iter()
            .copied()
            .filter(|v| !adjacency[u].contains(v))
            .collect(),
        None => candidates.clone(),
    };

    for v in to_visit {
        current.push(v);
        let next_candidates: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|w| adjacency[v].contains(w))
            .collect();
        let next_excluded: Vec<usize> = excluded
            .iter()
            .copied()
            .filter(|w| adjacency[v].contains(w))
            .collect();
        bron_kerbosch(current, next_candidates, next_excluded, adjacency, cliques);
        current.pop();

        candidates.retain(|&w| w != v);
        excluded.push(v);
    }
}
