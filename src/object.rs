//! Object capability contract
//!
//! Every LwM2M Object implements [`ObjectHandlers`]. Required operations
//! are plain trait methods; optional capabilities have default bodies that
//! make their absence explicit (`MethodNotAllowed` or a documented no-op)
//! instead of being silently skipped.

use serde_json::Value;

use crate::error::{DmError, Result};
use crate::path::{Iid, Oid, Rid, Riid};
use crate::value::ResourceType;

/// Operation mode of a Resource, fixed by the Object definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOps {
    /// Read-only
    Read,
    /// Write-only
    Write,
    /// Read-write
    ReadWrite,
}

impl ResourceOps {
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// Multiplicity of a Resource. The bound of a multi-instance Resource is
/// fixed by the Object definition; writes beyond it fail `NotFound` rather
/// than growing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Single,
    Multiple {
        /// RIIDs `0..max_instances` are addressable
        max_instances: Riid,
    },
}

/// One entry of an Object's per-instance resource listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDef {
    pub rid: Rid,
    pub rtype: ResourceType,
    pub ops: ResourceOps,
    pub kind: ResourceKind,
    /// Mandatory Resources are always present; optional ones may be absent
    /// until explicitly populated
    pub present: bool,
}

impl ResourceDef {
    /// Single-instance resource entry
    pub fn single(rid: Rid, rtype: ResourceType, ops: ResourceOps, present: bool) -> Self {
        Self {
            rid,
            rtype,
            ops,
            kind: ResourceKind::Single,
            present,
        }
    }

    /// Multi-instance resource entry with its fixed multiplicity bound
    pub fn multiple(
        rid: Rid,
        rtype: ResourceType,
        ops: ResourceOps,
        max_instances: Riid,
        present: bool,
    ) -> Self {
        Self {
            rid,
            rtype,
            ops,
            kind: ResourceKind::Multiple { max_instances },
            present,
        }
    }
}

/// Capability contract implemented per Object, consumed by the Registry.
///
/// `resource_read`/`resource_write` receive `riid = None` for
/// single-instance resources and `Some(riid)` when a Resource Instance of a
/// multi-instance resource is addressed.
pub trait ObjectHandlers {
    /// Stable numeric identifier of this Object
    fn oid(&self) -> Oid;

    /// IIDs of all live Instances, in strictly ascending order
    fn list_instances(&self) -> Vec<Iid>;

    /// Create an Instance with the given IID
    fn instance_create(&mut self, iid: Iid) -> Result<()> {
        let _ = iid;
        Err(DmError::MethodNotAllowed(format!(
            "/{} does not support instance creation",
            self.oid()
        )))
    }

    /// Remove the Instance with the given IID
    fn instance_remove(&mut self, iid: Iid) -> Result<()> {
        let _ = iid;
        Err(DmError::MethodNotAllowed(format!(
            "/{} does not support instance removal",
            self.oid()
        )))
    }

    /// Clear all Resource values of an Instance back to their
    /// absent/default state, keeping its IID
    fn instance_reset(&mut self, iid: Iid) -> Result<()> {
        let _ = iid;
        Err(DmError::MethodNotAllowed(format!(
            "/{} does not support instance reset",
            self.oid()
        )))
    }

    /// Resource declarations for one Instance, including presence flags
    fn list_resources(&self, iid: Iid) -> Result<Vec<ResourceDef>>;

    /// Read a Resource or Resource Instance value
    fn resource_read(&self, iid: Iid, rid: Rid, riid: Option<Riid>) -> Result<Value>;

    /// Write a Resource or Resource Instance value; a successful write
    /// marks the resource present
    fn resource_write(&mut self, iid: Iid, rid: Rid, riid: Option<Riid>, value: &Value)
    -> Result<()>;

    /// Clear one Resource back to absent; idempotent
    fn resource_reset(&mut self, iid: Iid, rid: Rid) -> Result<()> {
        let _ = (iid, rid);
        Ok(())
    }

    /// RIIDs currently present for a multi-instance Resource. Calling this
    /// on a single-instance resource is an invariant violation.
    fn list_resource_instances(&self, iid: Iid, rid: Rid) -> Result<Vec<Riid>> {
        let _ = iid;
        Err(DmError::Internal(format!(
            "/{}/-/{} is not a multi-instance resource",
            self.oid(),
            rid
        )))
    }

    /// Take a snapshot sufficient to restore exact prior state.
    /// Objects without transaction support treat this as a no-op success.
    fn transaction_begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Reject semantically invalid end states before commit
    fn transaction_validate(&self) -> Result<()> {
        Ok(())
    }

    /// Discard the snapshot, making Apply-phase state permanent.
    /// Commit is a pure snapshot discard and cannot fail.
    fn transaction_commit(&mut self) {}

    /// Replace live state with the Begin-phase snapshot and discard it.
    /// Rollback operates purely on already-allocated data and cannot fail.
    fn transaction_rollback(&mut self) {}
}
