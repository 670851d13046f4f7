use std::fmt;
use std::io;

// Declaration order is the Gao-Rexford preference order used by
// Announcement::is_better_than: Origin most preferred, Provider least.
// Don't reorder these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relationship {
    Origin,
    Customer,
    Peer,
    Provider,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationship::Origin => "ORIGIN",
            Relationship::Customer => "CUSTOMER",
            Relationship::Peer => "PEER",
            Relationship::Provider => "PROVIDER",
        };
        write!(f, "{s}")
    }
}

pub type ASN = u32;

#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("cannot open AS relationships file {path}: {source}")]
    TopologyLoad {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cycle detected in customer-provider relation at AS {asn}")]
    Cycle { asn: ASN },

    #[error("unknown origin ASN {asn}: not present in the AS graph")]
    UnknownOrigin { asn: ASN },
}
