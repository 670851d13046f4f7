use std::fmt;

use crate::shared::{Relationship, ASN};

pub type Prefix = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub prefix: Prefix,
    pub as_path: Vec<ASN>,
    pub next_hop_asn: ASN,
    pub received_from: Relationship,
    pub rov_invalid: bool,
    pub local_pref: i32,
}

impl Announcement {
    pub fn originate(prefix: impl Into<Prefix>, seed_asn: ASN, rov_invalid: bool) -> Self {
        Announcement {
            prefix: prefix.into(),
            as_path: vec![seed_asn],
            next_hop_asn: seed_asn,
            received_from: Relationship::Origin,
            rov_invalid,
            local_pref: 100,
        }
    }

    pub fn origin(&self) -> ASN {
        *self.as_path.last().expect("as_path is never empty")
    }

    /// Copy tagged for flooding to a neighbor. Path is untouched; the
    /// receiver prepends its own ASN when it processes the announcement.
    pub fn forwarded(&self, sender_asn: ASN, received_from: Relationship) -> Self {
        let mut copy = self.clone();
        copy.next_hop_asn = sender_asn;
        copy.received_from = received_from;
        copy
    }

    pub fn prepended(&self, receiving_asn: ASN) -> Self {
        let mut copy = self.clone();
        copy.as_path.insert(0, receiving_asn);
        copy
    }

    /// Whether `self` displaces `other` as the installed route. Ties keep
    /// the incumbent.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.local_pref != other.local_pref {
            return self.local_pref > other.local_pref;
        }
        if self.received_from != other.received_from {
            return self.received_from < other.received_from;
        }
        if self.as_path.len() != other.as_path.len() {
            return self.as_path.len() < other.as_path.len();
        }
        let this_neighbor = self.as_path.get(1).unwrap_or(&self.as_path[0]);
        let other_neighbor = other.as_path.get(1).unwrap_or(&other.as_path[0]);
        if this_neighbor != other_neighbor {
            return this_neighbor < other_neighbor;
        }
        false
    }
}

impl fmt::Display for Announcement {
    /// Renders `(a, b, c)`, or `(a,)` for a single element.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, asn) in self.as_path.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{asn}")?;
        }
        if self.as_path.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_sets_singleton_path() {
        let ann = Announcement::originate("10.0.0.0/8", 2, false);
        assert_eq!(ann.as_path, vec![2]);
        assert_eq!(ann.next_hop_asn, 2);
        assert_eq!(ann.received_from, Relationship::Origin);
        assert_eq!(ann.local_pref, 100);
        assert_eq!(ann.origin(), 2);
    }

    #[test]
    fn path_string_rendering() {
        assert_eq!(Announcement::originate("p", 2, false).to_string(), "(2,)");
        let multi = Announcement {
            as_path: vec![1, 2, 3],
            ..Announcement::originate("p", 3, false)
        };
        assert_eq!(multi.to_string(), "(1, 2, 3)");
    }

    fn with_path(path: Vec<ASN>, rel: Relationship) -> Announcement {
        Announcement {
            as_path: path,
            received_from: rel,
            ..Announcement::originate("p", 0, false)
        }
    }

    #[test]
    fn higher_local_pref_wins() {
        let mut better = with_path(vec![1, 2], Relationship::Provider);
        better.local_pref = 200;
        let worse = with_path(vec![1, 2], Relationship::Customer);
        assert!(better.is_better_than(&worse));
    }

    #[test]
    fn customer_beats_peer_beats_provider() {
        let via_customer = with_path(vec![1, 2], Relationship::Customer);
        let via_peer = with_path(vec![1, 2], Relationship::Peer);
        let via_provider = with_path(vec![1, 2], Relationship::Provider);
        assert!(via_customer.is_better_than(&via_peer));
        assert!(via_peer.is_better_than(&via_provider));
        assert!(!via_provider.is_better_than(&via_customer));
    }

    #[test]
    fn shorter_path_wins_on_tied_relationship() {
        let short = with_path(vec![1, 2], Relationship::Customer);
        let long = with_path(vec![1, 4, 5, 2], Relationship::Customer);
        assert!(short.is_better_than(&long));
        assert!(!long.is_better_than(&short));
    }

    #[test]
    fn lower_neighbor_asn_wins_final_tiebreak() {
        let via_1 = with_path(vec![1, 9], Relationship::Customer);
        let via_2 = with_path(vec![2, 9], Relationship::Customer);
        assert!(via_1.is_better_than(&via_2));
    }

    #[test]
    fn identical_candidate_keeps_incumbent() {
        let a = with_path(vec![1, 2], Relationship::Customer);
        let b = with_path(vec![1, 2], Relationship::Customer);
        assert!(!a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
    }
}
