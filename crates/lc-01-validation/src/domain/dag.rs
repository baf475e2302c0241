//! # Dependency-DAG Cycle Detection
//!
//! Transactions inside one block may depend on each other; the relation
//! must be acyclic. The walk is an iterative three-color DFS with an
//! explicit stack: transaction counts are attacker-controlled, so the
//! check must not recurse.
//!
//! Dependencies naming IDs absent from the block are ignored here -- the
//! graph under test is restricted to the block's own transactions.

use super::errors::ValidationError;
use shared_types::{Hash, Transaction};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// Reject the block if its in-block dependency graph has a cycle.
///
/// The error names the transaction at the closing edge of the first cycle
/// found.
pub fn check_dependency_cycles(transactions: &[Transaction]) -> Result<(), ValidationError> {
    let index: HashMap<Hash, usize> = transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| (tx.tx_id, i))
        .collect();

    // Adjacency restricted to IDs present in this block.
    let edges: Vec<Vec<usize>> = transactions
        .iter()
        .map(|tx| {
            tx.dependencies
                .iter()
                .filter_map(|dep| index.get(dep).copied())
                .collect()
        })
        .collect();

    let mut color = vec![Color::White; transactions.len()];

    for start in 0..transactions.len() {
        if color[start] != Color::White {
            continue;
        }

        // (node, next edge to explore)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        color[start] = Color::Gray;

        while let Some((node, edge_cursor)) = stack.last_mut() {
            if let Some(&next) = edges[*node].get(*edge_cursor) {
                *edge_cursor += 1;
                match color[next] {
                    Color::White => {
                        color[next] = Color::Gray;
                        stack.push((next, 0));
                    }
                    Color::Gray => {
                        // Back edge: `next` is on the current path.
                        return Err(ValidationError::DependencyCycle {
                            tx_id: transactions[next].tx_id,
                        });
                    }
                    Color::Black => {}
                }
            } else {
                color[*node] = Color::Black;
                stack.pop();
            }
        }
    }

    Ok(())
}
