// Connected components of the bond graph rendered as Hill-order formulas.

use std::collections::{BTreeMap, VecDeque};

use super::{Atom, Bond, Species};
use crate::elements::Element;

/// Group atoms into molecules. Isolated atoms are single-atom molecules.
/// Components come out ordered by their lowest atom index.
pub fn connected_components(n: usize, bonds: &[Bond]) -> Vec<Vec<usize>> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for bond in bonds {
        adj[bond.i].push(bond.j);
        adj[bond.j].push(bond.i);
    }

    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(node) = queue.pop_front() {
            component.push(node);
            for &neighbour in &adj[node] {
                if !visited[neighbour] {
                    visited[neighbour] = true;
                    queue.push_back(neighbour);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Hill order: C, then H, then the rest alphabetically; without carbon everything is alphabetical.
pub fn hill_formula(counts: &BTreeMap<Element, usize>) -> String {
    let mut symbols: Vec<(&'static str, usize)> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(element, count)| (element.symbol(), *count))
        .collect();

    let has_carbon = counts.get(&Element::C).copied().unwrap_or(0) > 0;
    let rank = |symbol: &str| -> u8 {
        match symbol {
            "C" if has_carbon => 0,
            "H" if has_carbon => 1,
            _ => 2,
        }
    };
    symbols.sort_by(|a, b| rank(a.0).cmp(&rank(b.0)).then_with(|| a.0.cmp(b.0)));

    let mut formula = String::new();
    for (symbol, count) in symbols {
        formula.push_str(symbol);
        if count > 1 {
            formula.push_str(&count.to_string());
        }
    }
    formula
}

pub fn formula_of(atoms: &[Atom], component: &[usize]) -> String {
    let mut counts = BTreeMap::new();
    for &idx in component {
        *counts.entry(atoms[idx].element).or_insert(0) += 1;
    }
    hill_formula(&counts)
}

/// Formula counts, most abundant first; ties keep first-appearance order.
pub fn detect_species(atoms: &[Atom], bonds: &[Bond]) -> Vec<Species> {
    let mut species: Vec<Species> = Vec::new();
    for component in connected_components(atoms.len(), bonds) {
        let formula = formula_of(atoms, &component);
        match species.iter_mut().find(|s| s.formula == formula) {
            Some(existing) => existing.count += 1,
            None => species.push(Species { formula, count: 1 }),
        }
    }
    // stable sort
    species.sort_by(|a, b| b.count.cmp(&a.count));
    species
}
