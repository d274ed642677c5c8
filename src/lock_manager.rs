use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use log::debug;

use crate::error::{DbError, DbResult};
use crate::page_id::PageId;
use crate::transaction_id::TransactionId;
use crate::wait_for_graph::WaitForGraph;

/// The granted mode of a page's lock, returned by `holds_lock` for
/// instrumentation and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Shared,
    Exclusive,
}

struct PageLock {
    mode: Mode,
    owners: HashSet<TransactionId>,
    /// Transactions currently parked in `acquire`'s wait loop for this
    /// page, tracked so a newly granted shared owner can be wired into
    /// every existing waiter's wait-for edges immediately instead of
    /// leaving them to notice only when they happen to wake again.
    waiters: HashSet<TransactionId>,
}

struct State {
    pages: HashMap<PageId, PageLock>,
    wait_for: WaitForGraph,
}

/// Per-page shared/exclusive locks with wait-for graph deadlock detection.
///
/// Strict two-phase locking: every lock a transaction acquires is held
/// until `release_all` is called at transaction end, never released early.
/// A single global mutex protects both the per-page lock table and the
/// wait-for graph so that the cycle check is always consistent with the
/// graph; one condition variable, broadcast on every change, wakes every
/// waiter to re-test its predicate (never a sleep-poll loop).
pub struct LockManager {
    state: Mutex<State>,
    cond: Condvar,
    wait_timeout: Duration,
}

impl LockManager {
    pub fn new(wait_timeout: Duration) -> Self {
        LockManager {
            state: Mutex::new(State {
                pages: HashMap::new(),
                wait_for: WaitForGraph::new(),
            }),
            cond: Condvar::new(),
            wait_timeout,
        }
    }

    pub fn acquire_shared(&self, tid: TransactionId, pid: PageId) -> DbResult<()> {
        self.acquire(tid, pid, false)
    }

    pub fn acquire_exclusive(&self, tid: TransactionId, pid: PageId) -> DbResult<()> {
        self.acquire(tid, pid, true)
    }

    fn acquire(&self, tid: TransactionId, pid: PageId, exclusive: bool) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();

        loop {
            if Self::can_grant(&state, tid, pid, exclusive) {
                self.grant(&mut state, tid, pid, exclusive);
                state.wait_for.remove_waiter(tid);
                Self::remove_page_waiter(&mut state, pid, tid);
                return Ok(());
            }

            // Every owner currently blocking this request becomes an edge
            // from `tid`; stale edges from an owner that has since
            // released are dropped first so the graph always reflects the
            // live blocking relationship, not history.
            state.wait_for.clear_waits(tid);
            Self::add_wait_edges(&mut state, tid, pid, exclusive);
            // Register as a waiter on this page so a future shared grant
            // to a different transaction can wire itself into our edges
            // right away instead of waiting for us to wake up on our own.
            state.pages.get_mut(&pid).unwrap().waiters.insert(tid);

            if state.wait_for.would_deadlock(tid) {
                debug!(
                    "deadlock detected: {:?} acquiring {:?} on {:?}",
                    tid, exclusive, pid
                );
                state.wait_for.remove_waiter(tid);
                Self::remove_page_waiter(&mut state, pid, tid);
                return Err(DbError::TransactionAborted);
            }

            let (guard, _timeout_result) = self
                .cond
                .wait_timeout(state, self.wait_timeout)
                .expect("lock manager condvar poisoned");
            state = guard;
            // Loop around: re-test the grant predicate regardless of
            // whether we were woken by a notify or the timeout backstop.
            // Cycle detection above is what's authoritative for aborting a
            // waiter; the timeout only guards against a missed wakeup.
        }
    }

    fn can_grant(state: &State, tid: TransactionId, pid: PageId, exclusive: bool) -> bool {
        match state.pages.get(&pid) {
            None => true,
            Some(lock) => match lock.mode {
                Mode::Shared => {
                    if exclusive {
                        lock.owners.len() == 1 && lock.owners.contains(&tid)
                    } else {
                        true
                    }
                }
                Mode::Exclusive => lock.owners.contains(&tid),
            },
        }
    }

    /// Grant `tid` the requested mode on `pid`. When a new shared owner
    /// joins a page other transactions are already parked waiting on
    /// (per spec §4.2: "When a new owner is granted a shared lock while
    /// others already wait, edges {waiter→new_owner} are added"), wire
    /// those waiters' edges to the new owner immediately and wake them
    /// so the wait-for graph never goes stale waiting on the timeout
    /// backstop.
    fn grant(&self, state: &mut State, tid: TransactionId, pid: PageId, exclusive: bool) {
        let new_shared_waiters: Vec<TransactionId>;
        {
            let entry = state.pages.entry(pid).or_insert_with(|| PageLock {
                mode: Mode::Shared,
                owners: HashSet::new(),
                waiters: HashSet::new(),
            });
            if exclusive {
                entry.mode = Mode::Exclusive;
                entry.owners.clear();
                entry.owners.insert(tid);
                new_shared_waiters = Vec::new();
            } else {
                entry.mode = Mode::Shared;
                entry.owners.insert(tid);
                new_shared_waiters = entry.waiters.iter().copied().filter(|&w| w != tid).collect();
            }
        }
        if !new_shared_waiters.is_empty() {
            for waiter in new_shared_waiters {
                state.wait_for.add_edge(waiter, tid);
            }
            self.cond.notify_all();
        }
    }

    /// Drop `tid` from the set of transactions parked waiting on `pid`,
    /// once it has either been granted the lock or aborted out of the
    /// wait.
    fn remove_page_waiter(state: &mut State, pid: PageId, tid: TransactionId) {
        if let Some(lock) = state.pages.get_mut(&pid) {
            lock.waiters.remove(&tid);
        }
    }

    fn add_wait_edges(state: &mut State, tid: TransactionId, pid: PageId, exclusive: bool) {
        if let Some(lock) = state.pages.get(&pid) {
            match lock.mode {
                Mode::Exclusive => {
                    for &owner in &lock.owners {
                        state.wait_for.add_edge(tid, owner);
                    }
                }
                Mode::Shared => {
                    if exclusive {
                        for &owner in &lock.owners {
                            state.wait_for.add_edge(tid, owner);
                        }
                    }
                }
            }
        }
    }

    pub fn release(&self, tid: TransactionId, pid: PageId) {
        let mut state = self.state.lock().unwrap();
        if let Some(lock) = state.pages.get_mut(&pid) {
            lock.owners.remove(&tid);
            if lock.owners.is_empty() {
                state.pages.remove(&pid);
            }
        }
        self.cond.notify_all();
    }

    pub fn release_all(&self, tid: TransactionId) {
        let mut state = self.state.lock().unwrap();
        let held: Vec<PageId> = state
            .pages
            .iter()
            .filter(|(_, lock)| lock.owners.contains(&tid))
            .map(|(pid, _)| *pid)
            .collect();
        for pid in held {
            if let Some(lock) = state.pages.get_mut(&pid) {
                lock.owners.remove(&tid);
                if lock.owners.is_empty() {
                    state.pages.remove(&pid);
                }
            }
        }
        state.wait_for.remove_waiter(tid);
        self.cond.notify_all();
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> Option<LockKind> {
        let state = self.state.lock().unwrap();
        state.pages.get(&pid).and_then(|lock| {
            if lock.owners.contains(&tid) {
                Some(match lock.mode {
                    Mode::Shared => LockKind::Shared,
                    Mode::Exclusive => LockKind::Exclusive,
                })
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(n: u64) -> TransactionId {
        TransactionId::from_raw(n)
    }

    fn pid(n: usize) -> PageId {
        PageId::new(0, n)
    }

    fn manager() -> LockManager {
        LockManager::new(Duration::from_millis(200))
    }

    #[test]
    fn concurrent_shared_locks_are_granted() {
        let lm = manager();
        lm.acquire_shared(tid(1), pid(0)).unwrap();
        lm.acquire_shared(tid(2), pid(0)).unwrap();
        assert_eq!(lm.holds_lock(tid(1), pid(0)), Some(LockKind::Shared));
        assert_eq!(lm.holds_lock(tid(2), pid(0)), Some(LockKind::Shared));
    }

    #[test]
    fn exclusive_lock_excludes_others() {
        let lm = manager();
        lm.acquire_exclusive(tid(1), pid(0)).unwrap();
        assert_eq!(lm.holds_lock(tid(1), pid(0)), Some(LockKind::Exclusive));
        assert_eq!(lm.holds_lock(tid(2), pid(0)), None);
    }

    #[test]
    fn sole_shared_holder_can_upgrade_in_place() {
        let lm = manager();
        lm.acquire_shared(tid(1), pid(0)).unwrap();
        lm.acquire_exclusive(tid(1), pid(0)).unwrap();
        assert_eq!(lm.holds_lock(tid(1), pid(0)), Some(LockKind::Exclusive));
    }

    #[test]
    fn reentrant_exclusive_is_a_no_op() {
        let lm = manager();
        lm.acquire_exclusive(tid(1), pid(0)).unwrap();
        lm.acquire_exclusive(tid(1), pid(0)).unwrap();
        lm.acquire_shared(tid(1), pid(0)).unwrap();
        assert_eq!(lm.holds_lock(tid(1), pid(0)), Some(LockKind::Exclusive));
    }

    #[test]
    fn release_frees_the_page_for_other_owners() {
        let lm = manager();
        lm.acquire_exclusive(tid(1), pid(0)).unwrap();
        lm.release(tid(1), pid(0));
        lm.acquire_exclusive(tid(2), pid(0)).unwrap();
        assert_eq!(lm.holds_lock(tid(2), pid(0)), Some(LockKind::Exclusive));
    }

    #[test]
    fn release_all_drops_every_held_page() {
        let lm = manager();
        lm.acquire_shared(tid(1), pid(0)).unwrap();
        lm.acquire_shared(tid(1), pid(1)).unwrap();
        lm.release_all(tid(1));
        assert_eq!(lm.holds_lock(tid(1), pid(0)), None);
        assert_eq!(lm.holds_lock(tid(1), pid(1)), None);
    }

    #[test]
    fn two_party_deadlock_aborts_exactly_one_side() {
        use std::sync::Arc;
        use std::thread;

        let lm = Arc::new(manager());
        lm.acquire_shared(tid(1), pid(0)).unwrap();
        lm.acquire_shared(tid(2), pid(0)).unwrap();

        // T1 waits for T2's shared lock (upgrade); T2 then requests
        // exclusive too, which must wait on T1 — the classic S3 cycle.
        let lm1 = Arc::clone(&lm);
        let t1 = thread::spawn(move || lm1.acquire_exclusive(tid(1), pid(0)));

        // Give T1 a moment to register as a waiter before T2 closes the
        // cycle.
        thread::sleep(Duration::from_millis(50));

        let result2 = lm.acquire_exclusive(tid(2), pid(0));
        assert!(matches!(result2, Err(DbError::TransactionAborted)));

        // T2 never got the lock, so it never acquired anything to hold;
        // release its original shared lock so T1's upgrade can proceed.
        lm.release(tid(2), pid(0));

        let result1 = t1.join().unwrap();
        assert!(result1.is_ok(), "the non-victim must eventually succeed");
    }
}
