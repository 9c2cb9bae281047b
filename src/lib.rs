//! rust-lwm2m-dm - LwM2M object/resource data model and security resolver
//!
//! This library provides the in-memory data-model engine of an LwM2M
//! client: a registry of Objects with ordered Instances and typed
//! Resources, atomic multi-object transactions, and the resolver that
//! turns a Security Object Instance into a per-connection security
//! configuration for the transport layer.
//!
//! # Example
//!
//! ```
//! use rust_lwm2m_dm::{Path, Registry, SecurityObject};
//! use rust_lwm2m_dm::security::{RID_SECURITY_MODE, RID_SERVER_URI};
//! use rust_lwm2m_dm::resolver;
//!
//! let mut registry = Registry::new();
//! registry.register(Box::new(SecurityObject::new())).unwrap();
//!
//! // Provision one server inside a transaction
//! registry
//!     .transaction(&[0], |reg| {
//!         reg.create_instance(0, 1)?;
//!         reg.write(
//!             Path::resource(0, 1, RID_SERVER_URI),
//!             &serde_json::json!("coap://server.example:5683"),
//!         )?;
//!         reg.write(
//!             Path::resource(0, 1, RID_SECURITY_MODE),
//!             &serde_json::json!(0),
//!         )
//!     })
//!     .unwrap();
//!
//! // Resolve the connection security config for that server
//! let (url, _config) = resolver::connection_security(&registry, 1).unwrap();
//! assert_eq!(url.scheme(), "coap");
//! ```

mod error;
pub mod object;
pub mod path;
pub mod registry;
pub mod resolver;
pub mod security;
pub mod store;
mod transaction;
pub mod transport;
pub mod value;

pub use error::{DmError, Result};
pub use object::{ObjectHandlers, ResourceDef, ResourceKind, ResourceOps};
pub use path::{ID_INVALID, Iid, Oid, Path, Rid, Riid};
pub use registry::Registry;
pub use resolver::SecurityConfig;
pub use security::{SecurityMode, SecurityObject};
pub use store::InstanceStore;
pub use transport::{TransportInfo, TransportSecurity, transport_info_by_uri_scheme};
