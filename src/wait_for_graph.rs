use std::collections::{HashMap, HashSet, VecDeque};

use crate::transaction_id::TransactionId;

/// Directed graph of transactions where `T -> O` means `T` waits for a
/// lock held by `O`. Modeled as a pure `tid -> set<tid>` map, never
/// embedded as back-pointers inside per-page lock state, per the Design
/// Notes.
#[derive(Default)]
pub(crate) struct WaitForGraph {
    graph: HashMap<TransactionId, HashSet<TransactionId>>,
}

impl WaitForGraph {
    pub(crate) fn new() -> Self {
        Self {
            graph: HashMap::new(),
        }
    }

    pub(crate) fn add_edge(&mut self, from: TransactionId, to: TransactionId) {
        if from == to {
            return;
        }
        self.graph.entry(from).or_insert_with(HashSet::new).insert(to);
    }

    /// Drop every outgoing edge from `tid`, keeping it as a node with no
    /// waits. Called at the start of every wait-loop re-check so stale
    /// edges left over from a holder that has since released never
    /// outlive the iteration that produced them.
    pub(crate) fn clear_waits(&mut self, tid: TransactionId) {
        self.graph.entry(tid).or_insert_with(HashSet::new).clear();
    }

    /// Drop `tid` entirely: it is no longer waiting on anything.
    pub(crate) fn remove_waiter(&mut self, tid: TransactionId) {
        self.graph.remove(&tid);
    }

    /// Breadth-first search: is there a non-trivial path from `tid` back to
    /// itself? Called immediately after `tid`'s new wait edges are added,
    /// so a `true` result means granting this wait would complete a cycle
    /// in the wait-for graph — the defining condition for deadlock.
    pub(crate) fn would_deadlock(&self, tid: TransactionId) -> bool {
        let mut visited: HashSet<TransactionId> = HashSet::new();
        let mut queue: VecDeque<TransactionId> = VecDeque::new();

        if let Some(neighbors) = self.graph.get(&tid) {
            for &n in neighbors {
                queue.push_back(n);
                visited.insert(n);
            }
        }

        while let Some(current) = queue.pop_front() {
            if current == tid {
                return true;
            }
            if let Some(neighbors) = self.graph.get(&current) {
                for &n in neighbors {
                    if visited.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
        }

        false
    }
}
