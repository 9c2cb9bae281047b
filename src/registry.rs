//! Object Registry
//!
//! Owns the set of live Objects and dispatches path-addressed operations
//! to the matching implementation. Resolution order is fixed: Object by
//! OID, then Instance by IID, then the Resource operation itself; each
//! step fails before the next runs, and Object-level errors propagate to
//! the caller unmodified.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{DmError, Result};
use crate::object::{ObjectHandlers, ResourceDef, ResourceKind};
use crate::path::{Iid, Oid, Path, Rid, Riid};
use crate::value::check_type;

/// Polymorphic collection of Objects keyed by OID
#[derive(Default)]
pub struct Registry {
    objects: BTreeMap<Oid, Box<dyn ObjectHandlers>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an Object; exactly one live Object per OID
    pub fn register(&mut self, object: Box<dyn ObjectHandlers>) -> Result<()> {
        let oid = object.oid();
        if self.objects.contains_key(&oid) {
            return Err(DmError::Internal(format!(
                "object /{} already registered",
                oid
            )));
        }
        self.objects.insert(oid, object);
        Ok(())
    }

    /// Remove an Object from the registry, returning ownership
    pub fn unregister(&mut self, oid: Oid) -> Result<Box<dyn ObjectHandlers>> {
        self.objects
            .remove(&oid)
            .ok_or_else(|| DmError::not_found(Path::object(oid)))
    }

    /// Registered OIDs in ascending order
    pub fn oids(&self) -> impl Iterator<Item = Oid> + '_ {
        self.objects.keys().copied()
    }

    /// Resolve an Object by OID
    pub fn object(&self, oid: Oid) -> Result<&dyn ObjectHandlers> {
        self.objects
            .get(&oid)
            .map(|b| b.as_ref())
            .ok_or_else(|| DmError::not_found(Path::object(oid)))
    }

    /// Resolve an Object by OID, mutably
    pub fn object_mut(&mut self, oid: Oid) -> Result<&mut Box<dyn ObjectHandlers>> {
        self.objects
            .get_mut(&oid)
            .ok_or_else(|| DmError::not_found(Path::object(oid)))
    }

    /// List the Instances of one Object
    pub fn list_instances(&self, oid: Oid) -> Result<Vec<Iid>> {
        Ok(self.object(oid)?.list_instances())
    }

    /// Create an Instance
    pub fn create_instance(&mut self, oid: Oid, iid: Iid) -> Result<()> {
        self.object_mut(oid)?.instance_create(iid)
    }

    /// Remove an Instance
    pub fn remove_instance(&mut self, oid: Oid, iid: Iid) -> Result<()> {
        self.object_mut(oid)?.instance_remove(iid)
    }

    /// Reset an Instance to its default state
    pub fn reset_instance(&mut self, oid: Oid, iid: Iid) -> Result<()> {
        self.object_mut(oid)?.instance_reset(iid)
    }

    /// Resource declarations for one Instance
    pub fn list_resources(&self, oid: Oid, iid: Iid) -> Result<Vec<ResourceDef>> {
        let object = self.object(oid)?;
        check_instance(object, iid)?;
        object.list_resources(iid)
    }

    /// Read a Resource or Resource Instance value at the given path
    pub fn read(&self, path: Path) -> Result<Value> {
        let (iid, rid, object) = self.resolve_resource_path(path)?;
        let def = resource_def(object, path, iid, rid)?;
        if !def.ops.is_readable() {
            return Err(DmError::MethodNotAllowed(format!(
                "{} is not readable",
                path
            )));
        }
        if !def.present {
            return Err(DmError::not_found(path));
        }
        object.resource_read(iid, rid, check_riid(path, def)?)
    }

    /// Write a Resource or Resource Instance value at the given path.
    /// A successful write marks the target present.
    pub fn write(&mut self, path: Path, value: &Value) -> Result<()> {
        let rid = path
            .rid
            .ok_or_else(|| DmError::BadRequest(format!("{} does not address a resource", path)))?;
        let iid = path
            .iid
            .ok_or_else(|| DmError::BadRequest(format!("{} does not address an instance", path)))?;
        // Immutable pass for path resolution and access checks
        {
            let object = self.object(path.oid)?;
            check_instance(object, iid)?;
            let def = resource_def(object, path, iid, rid)?;
            if !def.ops.is_writable() {
                return Err(DmError::MethodNotAllowed(format!(
                    "{} is not writable",
                    path
                )));
            }
            check_riid(path, def)?;
            check_type(value, def.rtype)?;
        }
        self.object_mut(path.oid)?
            .resource_write(iid, rid, path.riid, value)
    }

    /// Clear one Resource back to absent; idempotent
    pub fn reset_resource(&mut self, oid: Oid, iid: Iid, rid: Rid) -> Result<()> {
        {
            let object = self.object(oid)?;
            check_instance(object, iid)?;
        }
        self.object_mut(oid)?.resource_reset(iid, rid)
    }

    /// RIIDs present for a multi-instance Resource
    pub fn list_resource_instances(&self, oid: Oid, iid: Iid, rid: Rid) -> Result<Vec<Riid>> {
        let object = self.object(oid)?;
        check_instance(object, iid)?;
        let def = resource_def(object, Path::resource(oid, iid, rid), iid, rid)?;
        if let ResourceKind::Single = def.kind {
            return Err(DmError::Internal(format!(
                "{} is a single-instance resource",
                Path::resource(oid, iid, rid)
            )));
        }
        object.list_resource_instances(iid, rid)
    }

    fn resolve_resource_path(&self, path: Path) -> Result<(Iid, Rid, &dyn ObjectHandlers)> {
        let rid = path
            .rid
            .ok_or_else(|| DmError::BadRequest(format!("{} does not address a resource", path)))?;
        let iid = path
            .iid
            .ok_or_else(|| DmError::BadRequest(format!("{} does not address an instance", path)))?;
        let object = self.object(path.oid)?;
        check_instance(object, iid)?;
        Ok((iid, rid, object))
    }
}

fn check_instance(object: &dyn ObjectHandlers, iid: Iid) -> Result<()> {
    if object.list_instances().contains(&iid) {
        Ok(())
    } else {
        Err(DmError::not_found(Path::instance(object.oid(), iid)))
    }
}

fn resource_def(object: &dyn ObjectHandlers, path: Path, iid: Iid, rid: Rid) -> Result<ResourceDef> {
    object
        .list_resources(iid)?
        .into_iter()
        .find(|def| def.rid == rid)
        .ok_or_else(|| DmError::MethodNotAllowed(format!("unknown resource {}", path)))
}

/// Validate the RIID level against the resource's declared multiplicity.
/// A RIID at or beyond the fixed bound fails `NotFound` rather than
/// extending storage; a RIID on a single-instance resource addresses
/// nothing.
fn check_riid(path: Path, def: ResourceDef) -> Result<Option<Riid>> {
    match (def.kind, path.riid) {
        (ResourceKind::Single, None) => Ok(None),
        (ResourceKind::Single, Some(_)) => Err(DmError::not_found(path)),
        (ResourceKind::Multiple { max_instances }, Some(riid)) => {
            if riid >= max_instances {
                Err(DmError::not_found(path))
            } else {
                Ok(Some(riid))
            }
        }
        // Whole-resource access on a multi-instance resource is delegated
        // as-is; the object decides how to aggregate
        (ResourceKind::Multiple { .. }, None) => Ok(None),
    }
}
