//! LwM2M Security Object (OID 0)
//!
//! Holds the per-server connection security parameters consumed by the
//! resolver: server URI, security mode and the three key-material
//! resources. One Instance per known server (plus, optionally, the
//! bootstrap server).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DmError, Result};
use crate::object::{ObjectHandlers, ResourceDef, ResourceOps};
use crate::path::{Iid, Oid, Path, Rid, Riid, oid};
use crate::store::InstanceStore;
use crate::value::{
    ResourceType, bytes_to_value, value_to_bool, value_to_bytes, value_to_i64, value_to_string,
};

/// LwM2M Server URI: string, mandatory
pub const RID_SERVER_URI: Rid = 0;
/// Bootstrap-Server: boolean, mandatory
pub const RID_BOOTSTRAP_SERVER: Rid = 1;
/// Security Mode: integer, mandatory
pub const RID_SECURITY_MODE: Rid = 2;
/// Public Key or Identity: opaque, mandatory
pub const RID_PK_OR_IDENTITY: Rid = 3;
/// Server Public Key: opaque, mandatory
pub const RID_SERVER_PK_OR_IDENTITY: Rid = 4;
/// Secret Key: opaque, mandatory
pub const RID_SECRET_KEY: Rid = 5;
/// Short Server ID: integer, optional
pub const RID_SHORT_SERVER_ID: Rid = 10;

/// Upper bound on a single key-material resource, in bytes. Oversized
/// material is rejected with `BadRequest` at write time, never truncated.
pub const MAX_SECRET_MATERIAL_SIZE: usize = 2048;

/// Security mode wire values from the Security Object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityMode {
    NoSec,
    Psk,
    /// Recognized but unsupported; the resolver rejects it
    Rpk,
    Certificate,
    Est,
}

impl SecurityMode {
    /// Map a wire integer to a recognized mode; any other value is a
    /// `BadRequest`
    pub fn from_wire(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::NoSec),
            1 => Ok(Self::Psk),
            2 => Ok(Self::Rpk),
            3 => Ok(Self::Certificate),
            4 => Ok(Self::Est),
            other => Err(DmError::BadRequest(format!(
                "invalid security mode: {}",
                other
            ))),
        }
    }

    pub fn as_wire(self) -> i64 {
        match self {
            Self::NoSec => 0,
            Self::Psk => 1,
            Self::Rpk => 2,
            Self::Certificate => 3,
            Self::Est => 4,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SecurityInstance {
    server_uri: Option<String>,
    bootstrap_server: Option<bool>,
    security_mode: Option<i64>,
    pk_or_identity: Option<Vec<u8>>,
    server_pk_or_identity: Option<Vec<u8>>,
    secret_key: Option<Vec<u8>>,
    short_server_id: Option<i64>,
}

/// The Security Object implementation, with full transaction support
#[derive(Debug, Default)]
pub struct SecurityObject {
    instances: InstanceStore<SecurityInstance>,
    backup: Option<InstanceStore<SecurityInstance>>,
}

impl SecurityObject {
    pub fn new() -> Self {
        Self::default()
    }

    fn instance(&self, iid: Iid) -> Result<&SecurityInstance> {
        self.instances
            .find(iid)
            .ok_or_else(|| DmError::not_found(Path::instance(oid::SECURITY, iid)))
    }

    fn instance_mut(&mut self, iid: Iid) -> Result<&mut SecurityInstance> {
        self.instances
            .find_mut(iid)
            .ok_or_else(|| DmError::not_found(Path::instance(oid::SECURITY, iid)))
    }
}

fn key_material(value: &Value, path: Path) -> Result<Vec<u8>> {
    let bytes = value_to_bytes(value)?;
    if bytes.len() > MAX_SECRET_MATERIAL_SIZE {
        return Err(DmError::BadRequest(format!(
            "{}: key material of {} bytes exceeds the {}-byte limit",
            path,
            bytes.len(),
            MAX_SECRET_MATERIAL_SIZE
        )));
    }
    Ok(bytes)
}

impl ObjectHandlers for SecurityObject {
    fn oid(&self) -> Oid {
        oid::SECURITY
    }

    fn list_instances(&self) -> Vec<Iid> {
        self.instances.list().collect()
    }

    fn instance_create(&mut self, iid: Iid) -> Result<()> {
        self.instances.insert(iid, SecurityInstance::default())
    }

    fn instance_remove(&mut self, iid: Iid) -> Result<()> {
        self.instances.remove(iid).map(|_| ())
    }

    fn instance_reset(&mut self, iid: Iid) -> Result<()> {
        self.instances.reset(iid)
    }

    fn list_resources(&self, iid: Iid) -> Result<Vec<ResourceDef>> {
        use ResourceOps::ReadWrite;
        use ResourceType::{Boolean, Integer, Opaque, String};

        let inst = self.instance(iid)?;
        Ok(vec![
            ResourceDef::single(RID_SERVER_URI, String, ReadWrite, inst.server_uri.is_some()),
            ResourceDef::single(
                RID_BOOTSTRAP_SERVER,
                Boolean,
                ReadWrite,
                inst.bootstrap_server.is_some(),
            ),
            ResourceDef::single(
                RID_SECURITY_MODE,
                Integer,
                ReadWrite,
                inst.security_mode.is_some(),
            ),
            ResourceDef::single(
                RID_PK_OR_IDENTITY,
                Opaque,
                ReadWrite,
                inst.pk_or_identity.is_some(),
            ),
            ResourceDef::single(
                RID_SERVER_PK_OR_IDENTITY,
                Opaque,
                ReadWrite,
                inst.server_pk_or_identity.is_some(),
            ),
            ResourceDef::single(RID_SECRET_KEY, Opaque, ReadWrite, inst.secret_key.is_some()),
            ResourceDef::single(
                RID_SHORT_SERVER_ID,
                Integer,
                ReadWrite,
                inst.short_server_id.is_some(),
            ),
        ])
    }

    fn resource_read(&self, iid: Iid, rid: Rid, _riid: Option<Riid>) -> Result<Value> {
        let inst = self.instance(iid)?;
        let absent = || DmError::not_found(Path::resource(oid::SECURITY, iid, rid));
        match rid {
            RID_SERVER_URI => Ok(Value::String(inst.server_uri.clone().ok_or_else(absent)?)),
            RID_BOOTSTRAP_SERVER => Ok(Value::Bool(inst.bootstrap_server.ok_or_else(absent)?)),
            RID_SECURITY_MODE => Ok(Value::Number(inst.security_mode.ok_or_else(absent)?.into())),
            RID_PK_OR_IDENTITY => Ok(bytes_to_value(
                inst.pk_or_identity.as_deref().ok_or_else(absent)?,
            )),
            RID_SERVER_PK_OR_IDENTITY => Ok(bytes_to_value(
                inst.server_pk_or_identity.as_deref().ok_or_else(absent)?,
            )),
            RID_SECRET_KEY => Ok(bytes_to_value(inst.secret_key.as_deref().ok_or_else(absent)?)),
            RID_SHORT_SERVER_ID => {
                Ok(Value::Number(inst.short_server_id.ok_or_else(absent)?.into()))
            }
            _ => Err(DmError::MethodNotAllowed(format!(
                "unknown resource {}",
                Path::resource(oid::SECURITY, iid, rid)
            ))),
        }
    }

    fn resource_write(
        &mut self,
        iid: Iid,
        rid: Rid,
        _riid: Option<Riid>,
        value: &Value,
    ) -> Result<()> {
        let path = Path::resource(oid::SECURITY, iid, rid);
        let inst = self.instance_mut(iid)?;
        match rid {
            RID_SERVER_URI => inst.server_uri = Some(value_to_string(value)?),
            RID_BOOTSTRAP_SERVER => inst.bootstrap_server = Some(value_to_bool(value)?),
            RID_SECURITY_MODE => inst.security_mode = Some(value_to_i64(value)?),
            RID_PK_OR_IDENTITY => inst.pk_or_identity = Some(key_material(value, path)?),
            RID_SERVER_PK_OR_IDENTITY => {
                inst.server_pk_or_identity = Some(key_material(value, path)?)
            }
            RID_SECRET_KEY => inst.secret_key = Some(key_material(value, path)?),
            RID_SHORT_SERVER_ID => inst.short_server_id = Some(value_to_i64(value)?),
            _ => {
                return Err(DmError::MethodNotAllowed(format!(
                    "unknown resource {}",
                    path
                )));
            }
        }
        Ok(())
    }

    fn resource_reset(&mut self, iid: Iid, rid: Rid) -> Result<()> {
        let inst = self.instance_mut(iid)?;
        match rid {
            RID_SERVER_URI => inst.server_uri = None,
            RID_BOOTSTRAP_SERVER => inst.bootstrap_server = None,
            RID_SECURITY_MODE => inst.security_mode = None,
            RID_PK_OR_IDENTITY => inst.pk_or_identity = None,
            RID_SERVER_PK_OR_IDENTITY => inst.server_pk_or_identity = None,
            RID_SECRET_KEY => inst.secret_key = None,
            RID_SHORT_SERVER_ID => inst.short_server_id = None,
            _ => {}
        }
        Ok(())
    }

    fn transaction_begin(&mut self) -> Result<()> {
        self.backup = Some(self.instances.snapshot());
        Ok(())
    }

    fn transaction_validate(&self) -> Result<()> {
        for (iid, inst) in self.instances.iter() {
            if let Some(mode) = inst.security_mode {
                SecurityMode::from_wire(mode).map_err(|_| {
                    DmError::BadRequest(format!(
                        "{}: invalid security mode {}",
                        Path::resource(oid::SECURITY, iid, RID_SECURITY_MODE),
                        mode
                    ))
                })?;
            }
        }
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
