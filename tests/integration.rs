//! Cross-module integration tests
//!
//! Exercises the registry, transaction coordinator and security resolver
//! together, using the Security Object plus a multi-instance data-storage
//! object as the second transaction participant.

use serde_json::{Value, json};

use rust_lwm2m_dm::resolver::{self, connection_security};
use rust_lwm2m_dm::security::{
    RID_PK_OR_IDENTITY, RID_SECRET_KEY, RID_SECURITY_MODE, RID_SERVER_URI,
};
use rust_lwm2m_dm::value::{ResourceType, bytes_to_value};
use rust_lwm2m_dm::{
    DmError, Iid, InstanceStore, ObjectHandlers, Oid, Path, Registry, ResourceDef, ResourceOps,
    Result, Rid, Riid, SecurityMode, SecurityObject,
};

const OID_STORAGE: Oid = 16;
const RID_IDENTITY: Rid = 0;
const MAX_IDENTITY_INSTANCES: Riid = 4;

/// Data-storage object with one mandatory multi-instance resource and full
/// transaction support
#[derive(Debug, Default)]
struct StorageObject {
    instances: InstanceStore<StorageInstance>,
    backup: Option<InstanceStore<StorageInstance>>,
}

#[derive(Debug, Clone, Default)]
struct StorageInstance {
    identity: [Option<String>; MAX_IDENTITY_INSTANCES as usize],
}

impl ObjectHandlers for StorageObject {
    fn oid(&self) -> Oid {
        OID_STORAGE
    }

    fn list_instances(&self) -> Vec<Iid> {
        self.instances.list().collect()
    }

    fn instance_create(&mut self, iid: Iid) -> Result<()> {
        self.instances.insert(iid, StorageInstance::default())
    }

    fn instance_remove(&mut self, iid: Iid) -> Result<()> {
        self.instances.remove(iid).map(|_| ())
    }

    fn instance_reset(&mut self, iid: Iid) -> Result<()> {
        self.instances.reset(iid)
    }

    fn list_resources(&self, iid: Iid) -> Result<Vec<ResourceDef>> {
        if self.instances.find(iid).is_none() {
            return Err(DmError::not_found(Path::instance(OID_STORAGE, iid)));
        }
        Ok(vec![ResourceDef::multiple(
            RID_IDENTITY,
            ResourceType::String,
            ResourceOps::ReadWrite,
            MAX_IDENTITY_INSTANCES,
            true,
        )])
    }

    fn resource_read(&self, iid: Iid, rid: Rid, riid: Option<Riid>) -> Result<Value> {
        let inst = self
            .instances
            .find(iid)
            .ok_or_else(|| DmError::not_found(Path::instance(OID_STORAGE, iid)))?;
        match (rid, riid) {
            (RID_IDENTITY, Some(riid)) => inst.identity[riid as usize]
                .clone()
                .map(Value::String)
                .ok_or_else(|| {
                    DmError::not_found(Path::resource_instance(OID_STORAGE, iid, rid, riid))
                }),
            _ => Err(DmError::MethodNotAllowed(format!("read RID {}", rid))),
        }
    }

    fn resource_write(
        &mut self,
        iid: Iid,
        rid: Rid,
        riid: Option<Riid>,
        value: &Value,
    ) -> Result<()> {
        let inst = self
            .instances
            .find_mut(iid)
            .ok_or_else(|| DmError::not_found(Path::instance(OID_STORAGE, iid)))?;
        match (rid, riid) {
            (RID_IDENTITY, Some(riid)) if riid < MAX_IDENTITY_INSTANCES => {
                let text = value
                    .as_str()
                    .ok_or_else(|| DmError::TypeConversion("identity must be a string".into()))?;
                inst.identity[riid as usize] = Some(text.to_string());
                Ok(())
            }
            (RID_IDENTITY, Some(riid)) => Err(DmError::not_found(Path::resource_instance(
                OID_STORAGE,
                iid,
                rid,
                riid,
            ))),
            _ => Err(DmError::MethodNotAllowed(format!("write RID {}", rid))),
        }
    }

    fn resource_reset(&mut self, iid: Iid, rid: Rid) -> Result<()> {
        if rid == RID_IDENTITY
            && let Some(inst) = self.instances.find_mut(iid)
        {
            inst.identity = Default::default();
        }
        Ok(())
    }

    fn list_resource_instances(&self, iid: Iid, rid: Rid) -> Result<Vec<Riid>> {
        let inst = self
            .instances
            .find(iid)
            .ok_or_else(|| DmError::not_found(Path::instance(OID_STORAGE, iid)))?;
        match rid {
            RID_IDENTITY => Ok((0..MAX_IDENTITY_INSTANCES)
                .filter(|&riid| inst.identity[riid as usize].is_some())
                .collect()),
            _ => Err(DmError::Internal(format!(
                "RID {} is not a multi-instance resource",
                rid
            ))),
        }
    }

    fn transaction_begin(&mut self) -> Result<()> {
        self.backup = Some(self.instances.snapshot());
        Ok(())
    }

    fn transaction_commit(&mut self) {
        self.backup = None;
    }

    fn transaction_rollback(&mut self) {
        if let Some(backup) = self.backup.take() {
            self.instances.restore(backup);
        }
    }
}

fn registry_with_objects() -> Registry {
    let mut registry = Registry::new();
    registry.register(Box::new(SecurityObject::new())).unwrap();
    registry.register(Box::new(StorageObject::default())).unwrap();
    registry
}

#[test]
fn test_instance_order_under_create_remove() {
    let mut registry = registry_with_objects();

    for iid in [9, 2, 6, 0, 4] {
        registry.create_instance(OID_STORAGE, iid).unwrap();
    }
    registry.remove_instance(OID_STORAGE, 6).unwrap();
    registry.create_instance(OID_STORAGE, 3).unwrap();

    assert_eq!(registry.list_instances(OID_STORAGE).unwrap(), vec![0, 2, 3, 4, 9]);
}

#[test]
fn test_duplicate_create_and_absent_remove_leave_store_unchanged() {
    let mut registry = registry_with_objects();
    registry.create_instance(OID_STORAGE, 1).unwrap();

    assert!(registry.create_instance(OID_STORAGE, 1).is_err());
    assert!(matches!(
        registry.remove_instance(OID_STORAGE, 5),
        Err(DmError::NotFound(_))
    ));
    assert_eq!(registry.list_instances(OID_STORAGE).unwrap(), vec![1]);
}

#[test]
fn test_instance_reset_is_idempotent() {
    let mut registry = registry_with_objects();
    registry.create_instance(OID_STORAGE, 0).unwrap();
    registry
        .write(
            Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 1),
            &json!("device-model"),
        )
        .unwrap();

    registry.reset_instance(OID_STORAGE, 0).unwrap();
    let once = registry
        .list_resource_instances(OID_STORAGE, 0, RID_IDENTITY)
        .unwrap();
    registry.reset_instance(OID_STORAGE, 0).unwrap();
    let twice = registry
        .list_resource_instances(OID_STORAGE, 0, RID_IDENTITY)
        .unwrap();

    assert!(once.is_empty());
    assert_eq!(once, twice);
}

#[test]
fn test_riid_beyond_multiplicity_bound_is_not_found() {
    let mut registry = registry_with_objects();
    registry.create_instance(OID_STORAGE, 0).unwrap();

    let before = registry
        .list_resource_instances(OID_STORAGE, 0, RID_IDENTITY)
        .unwrap();
    let err = registry
        .write(
            Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, MAX_IDENTITY_INSTANCES),
            &json!("overflows"),
        )
        .unwrap_err();
    let after = registry
        .list_resource_instances(OID_STORAGE, 0, RID_IDENTITY)
        .unwrap();

    assert!(matches!(err, DmError::NotFound(_)));
    assert_eq!(before, after);
}

#[test]
fn test_multi_instance_write_and_listing() {
    let mut registry = registry_with_objects();
    registry.create_instance(OID_STORAGE, 0).unwrap();

    registry
        .write(
            Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 2),
            &json!("device-model"),
        )
        .unwrap();
    registry
        .write(
            Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 0),
            &json!("device-id"),
        )
        .unwrap();

    assert_eq!(
        registry
            .list_resource_instances(OID_STORAGE, 0, RID_IDENTITY)
            .unwrap(),
        vec![0, 2]
    );
    assert_eq!(
        registry
            .read(Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 2))
            .unwrap(),
        json!("device-model")
    );
}

#[test]
fn test_failed_multi_object_transaction_restores_every_participant() {
    let mut registry = registry_with_objects();
    registry.create_instance(0, 1).unwrap();
    registry
        .write(Path::resource(0, 1, RID_SERVER_URI), &json!("coap://a.example"))
        .unwrap();
    registry.create_instance(OID_STORAGE, 0).unwrap();
    registry
        .write(
            Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 0),
            &json!("original"),
        )
        .unwrap();

    // One payload touching both objects, failing on the second object's
    // out-of-range resource instance
    let err = registry
        .transaction(&[0, OID_STORAGE], |reg| {
            reg.write(Path::resource(0, 1, RID_SERVER_URI), &json!("coap://b.example"))?;
            reg.create_instance(OID_STORAGE, 7)?;
            reg.write(
                Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, MAX_IDENTITY_INSTANCES),
                &json!("bad"),
            )
        })
        .unwrap_err();
    assert!(matches!(err, DmError::NotFound(_)));

    // Both participants are bit-for-bit back at their pre-begin state
    assert_eq!(
        registry.read(Path::resource(0, 1, RID_SERVER_URI)).unwrap(),
        json!("coap://a.example")
    );
    assert_eq!(registry.list_instances(OID_STORAGE).unwrap(), vec![0]);
    assert_eq!(
        registry
            .read(Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 0))
            .unwrap(),
        json!("original")
    );
}

#[test]
fn test_successful_transaction_commits_both_objects() {
    let mut registry = registry_with_objects();
    registry.create_instance(0, 1).unwrap();
    registry.create_instance(OID_STORAGE, 0).unwrap();

    registry
        .transaction(&[0, OID_STORAGE], |reg| {
            reg.write(Path::resource(0, 1, RID_SERVER_URI), &json!("coap://c.example"))?;
            reg.write(
                Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 1),
                &json!("manufacturer"),
            )
        })
        .unwrap();

    assert_eq!(
        registry.read(Path::resource(0, 1, RID_SERVER_URI)).unwrap(),
        json!("coap://c.example")
    );
    assert_eq!(
        registry
            .read(Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 1))
            .unwrap(),
        json!("manufacturer")
    );
}

#[test]
fn test_provisional_writes_visible_inside_then_gone_after_rollback() {
    let mut registry = registry_with_objects();
    registry.create_instance(OID_STORAGE, 0).unwrap();

    let path = Path::resource_instance(OID_STORAGE, 0, RID_IDENTITY, 0);
    let err = registry
        .transaction(&[OID_STORAGE], |reg| {
            reg.write(path, &json!("provisional"))?;
            // Apply-phase state takes effect immediately for readers
            // inside the transaction
            assert_eq!(reg.read(path).unwrap(), json!("provisional"));
            Err::<(), _>(DmError::BadRequest("malformed remainder".into()))
        })
        .unwrap_err();
    assert!(matches!(err, DmError::BadRequest(_)));

    // After rollback no reader can observe the provisional write
    assert!(matches!(registry.read(path), Err(DmError::NotFound(_))));
}

#[test]
fn test_provisioning_then_security_resolution() {
    let mut registry = registry_with_objects();

    registry
        .transaction(&[0], |reg| {
            reg.create_instance(0, 2)?;
            reg.write(Path::resource(0, 2, RID_SERVER_URI), &json!("coaps://server.example"))?;
            reg.write(Path::resource(0, 2, RID_SECURITY_MODE), &json!(1))?;
            reg.write(Path::resource(0, 2, RID_PK_OR_IDENTITY), &bytes_to_value(b"device-42"))?;
            reg.write(Path::resource(0, 2, RID_SECRET_KEY), &bytes_to_value(b"psk-secret"))
        })
        .unwrap();

    let (url, config) = connection_security(&registry, 2).unwrap();
    assert_eq!(url.host_str(), Some("server.example"));
    assert_eq!(config.mode, SecurityMode::Psk);
    assert!(config.psk.is_some());
}

#[test]
fn test_rejected_mode_write_rolls_back_provisioning() {
    let mut registry = registry_with_objects();
    registry.create_instance(0, 1).unwrap();
    registry
        .write(Path::resource(0, 1, RID_SECURITY_MODE), &json!(0))
        .unwrap();

    // The raw write of an unknown mode value succeeds, but the Security
    // Object's validate hook catches it and the batch rolls back
    let err = registry
        .transaction(&[0], |reg| {
            reg.write(Path::resource(0, 1, RID_SECURITY_MODE), &json!(99))
        })
        .unwrap_err();
    assert!(matches!(err, DmError::BadRequest(_)));

    assert_eq!(
        registry.read(Path::resource(0, 1, RID_SECURITY_MODE)).unwrap(),
        json!(0)
    );
    // And the resolver still sees the pre-transaction NoSec mode
    let config = resolver::security_config(&registry, 1, None).unwrap();
    assert_eq!(config.mode, SecurityMode::NoSec);
}
