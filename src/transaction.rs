//! Transaction Coordinator
//!
//! Wraps a batch of mutations across one or more Objects in
//! begin/apply/validate/commit/rollback phases so that a single malformed
//! write inside a multi-object batch can never leave some Objects updated
//! and others not.

use tracing::{debug, warn};

use crate::error::Result;
use crate::path::Oid;
use crate::registry::Registry;

impl Registry {
    /// Run `apply` as an atomic transaction across `participants`.
    ///
    /// Phases, per the two-phase discipline:
    /// 1. every participant takes its snapshot; if any begin fails, the
    ///    snapshots already taken are discarded by rollback and nothing
    ///    is applied;
    /// 2. `apply` mutates the registry, provisionally;
    /// 3. every participant validates its end state;
    /// 4. on success all snapshots are discarded (commit); on any apply or
    ///    validate failure every participant is rolled back to its
    ///    begin-phase state and the original error is returned.
    pub fn transaction<T, F>(&mut self, participants: &[Oid], apply: F) -> Result<T>
    where
        F: FnOnce(&mut Registry) -> Result<T>,
    {
        let mut begun: Vec<Oid> = Vec::with_capacity(participants.len());
        for &oid in participants {
            match self.object_mut(oid).and_then(|obj| obj.transaction_begin()) {
                Ok(()) => begun.push(oid),
                Err(err) => {
                    // Begin is itself all-or-nothing: discard snapshots
                    // already taken on the other participants
                    warn!(oid, error = %err, "transaction begin failed");
                    self.rollback_all(&begun);
                    return Err(err);
                }
            }
        }

        let outcome = apply(self).and_then(|value| {
            for &oid in participants {
                self.object(oid)?.transaction_validate()?;
            }
            Ok(value)
        });

        match outcome {
            Ok(value) => {
                for &oid in participants {
                    if let Ok(obj) = self.object_mut(oid) {
                        obj.transaction_commit();
                    }
                }
                debug!(?participants, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                warn!(?participants, error = %err, "transaction rolled back");
                self.rollback_all(participants);
                Err(err)
            }
        }
    }

    /// Roll back every listed participant; rollback operates purely on
    /// already-allocated snapshot data and reports no secondary errors
    fn rollback_all(&mut self, participants: &[Oid]) {
        for &oid in participants {
            if let Ok(obj) = self.object_mut(oid) {
                obj.transaction_rollback();
            }
        }
    }
}
