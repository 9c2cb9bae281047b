//! LwM2M path addressing
//!
//! Every data-model operation is addressed by a 2-, 3-, or 4-tuple of
//! Object ID, Instance ID, Resource ID and Resource-Instance ID. All four
//! levels are 16-bit identifiers; the wire protocol reserves 0xFFFF as the
//! "invalid/unset" sentinel for levels that do not apply.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Object ID
pub type Oid = u16;
/// Instance ID
pub type Iid = u16;
/// Resource ID
pub type Rid = u16;
/// Resource-Instance ID
pub type Riid = u16;

/// Reserved "invalid/unset" identifier value used on the wire when an
/// addressing level does not apply. Internally, unset levels are `None`.
pub const ID_INVALID: u16 = u16::MAX;

/// Well-known Object IDs from the OMA registry
pub mod oid {
    use super::Oid;

    /// LwM2M Security Object
    pub const SECURITY: Oid = 0;
    /// LwM2M Server Object
    pub const SERVER: Oid = 1;
    /// Device Object
    pub const DEVICE: Oid = 3;
}

/// A data-model path: `/OID`, `/OID/IID`, `/OID/IID/RID` or
/// `/OID/IID/RID/RIID`. Deeper levels require all shallower ones to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub oid: Oid,
    pub iid: Option<Iid>,
    pub rid: Option<Rid>,
    pub riid: Option<Riid>,
}

impl Path {
    /// Path addressing a whole Object
    pub fn object(oid: Oid) -> Self {
        Self {
            oid,
            iid: None,
            rid: None,
            riid: None,
        }
    }

    /// Path addressing an Object Instance
    pub fn instance(oid: Oid, iid: Iid) -> Self {
        Self {
            oid,
            iid: Some(iid),
            rid: None,
            riid: None,
        }
    }

    /// Path addressing a Resource
    pub fn resource(oid: Oid, iid: Iid, rid: Rid) -> Self {
        Self {
            oid,
            iid: Some(iid),
            rid: Some(rid),
            riid: None,
        }
    }

    /// Path addressing a Resource Instance of a multi-instance Resource
    pub fn resource_instance(oid: Oid, iid: Iid, rid: Rid, riid: Riid) -> Self {
        Self {
            oid,
            iid: Some(iid),
            rid: Some(rid),
            riid: Some(riid),
        }
    }

    /// Build a path from raw wire identifiers, treating [`ID_INVALID`] as
    /// unset. Levels after the first unset one are ignored.
    pub fn from_raw(oid: Oid, iid: Iid, rid: Rid, riid: Riid) -> Self {
        let mut path = Self::object(oid);
        if iid == ID_INVALID {
            return path;
        }
        path.iid = Some(iid);
        if rid == ID_INVALID {
            return path;
        }
        path.rid = Some(rid);
        if riid != ID_INVALID {
            path.riid = Some(riid);
        }
        path
    }

    /// Number of set levels (1..=4)
    pub fn depth(&self) -> usize {
        1 + self.iid.is_some() as usize + self.rid.is_some() as usize + self.riid.is_some() as usize
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.oid)?;
        if let Some(iid) = self.iid {
            write!(f, "/{}", iid)?;
        }
        if let Some(rid) = self.rid {
            write!(f, "/{}", rid)?;
        }
        if let Some(riid) = self.riid {
            write!(f, "/{}", riid)?;
        }
        Ok(())
    }
}
