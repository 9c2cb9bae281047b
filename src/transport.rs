//! Transport information derived from URI schemes
//!
//! The Security Resolver checks the negotiated transport against the
//! configured security mode. Each supported scheme carries an inherent
//! security property: encrypted, unencrypted, or none at all (SMS binding,
//! where encryption happens below the URI level).

/// Security property inherent to a URI scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// The scheme does not specify security; valid for all security modes
    Undefined,
    /// Plaintext transport
    Unencrypted,
    /// DTLS/TLS transport
    Encrypted,
}

/// Underlying transport binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Udp,
    Tcp,
    Sms,
}

/// Static description of one supported URI scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportInfo {
    pub uri_scheme: &'static str,
    pub kind: TransportKind,
    pub security: TransportSecurity,
}

impl TransportInfo {
    pub fn is_encrypted(&self) -> bool {
        self.security == TransportSecurity::Encrypted
    }
}

const TRANSPORTS: &[TransportInfo] = &[
    TransportInfo {
        uri_scheme: "coap",
        kind: TransportKind::Udp,
        security: TransportSecurity::Unencrypted,
    },
    TransportInfo {
        uri_scheme: "coaps",
        kind: TransportKind::Udp,
        security: TransportSecurity::Encrypted,
    },
    TransportInfo {
        uri_scheme: "coap+tcp",
        kind: TransportKind::Tcp,
        security: TransportSecurity::Unencrypted,
    },
    TransportInfo {
        uri_scheme: "coaps+tcp",
        kind: TransportKind::Tcp,
        security: TransportSecurity::Encrypted,
    },
    TransportInfo {
        uri_scheme: "sms",
        kind: TransportKind::Sms,
        security: TransportSecurity::Undefined,
    },
];

/// Look up transport information for a URI scheme; `None` for schemes the
/// client does not speak
pub fn transport_info_by_uri_scheme(scheme: &str) -> Option<&'static TransportInfo> {
    TRANSPORTS.iter().find(|t| t.uri_scheme == scheme)
}
