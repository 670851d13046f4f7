use std::collections::HashMap;

use log::trace;

use crate::announcement::{Announcement, Prefix};
use crate::shared::ASN;

pub type LocalRib = HashMap<Prefix, Announcement>;

pub trait Policy {
    fn should_accept(&self, ann: &Announcement) -> bool {
        let _ = ann;
        true
    }

    fn process_announcements(
        &self,
        received: Vec<Announcement>,
        local_rib: &mut LocalRib,
        receiving_asn: ASN,
    ) {
        for ann in received {
            if !self.should_accept(&ann) {
                trace!("AS {receiving_asn}: rejected announcement for {} (policy filter)", ann.prefix);
                continue;
            }
            if ann.as_path.contains(&receiving_asn) {
                trace!("AS {receiving_asn}: dropped looped announcement for {}", ann.prefix);
                continue;
            }

            let candidate = ann.prepended(receiving_asn);
            match local_rib.get(&candidate.prefix) {
                None => {
                    local_rib.insert(candidate.prefix.clone(), candidate);
                }
                Some(incumbent) if candidate.is_better_than(incumbent) => {
                    local_rib.insert(candidate.prefix.clone(), candidate);
                }
                Some(_) => {}
            }
        }
    }

    fn name(&self) -> &'static str;
}

/// Loop-free acceptance plus best-path selection, no extra filtering.
#[derive(Debug, Default)]
pub struct Bgp;

impl Policy for Bgp {
    fn name(&self) -> &'static str {
        "BGP"
    }
}

/// BGP plus rejection of announcements carrying the precomputed
/// `rov_invalid` flag.
#[derive(Debug, Default)]
pub struct Rov;

impl Policy for Rov {
    fn should_accept(&self, ann: &Announcement) -> bool {
        !ann.rov_invalid
    }

    fn name(&self) -> &'static str {
        "ROV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Relationship;

    fn recv(prefix: &str, path: Vec<ASN>, rel: Relationship) -> Announcement {
        Announcement {
            prefix: prefix.to_string(),
            as_path: path,
            next_hop_asn: 0,
            received_from: rel,
            rov_invalid: false,
            local_pref: 100,
        }
    }

    #[test]
    fn bgp_installs_first_candidate() {
        let bgp = Bgp;
        let mut rib = LocalRib::new();
        bgp.process_announcements(
            vec![recv("10.0.0.0/8", vec![2], Relationship::Customer)],
            &mut rib,
            1,
        );
        let ann = rib.get("10.0.0.0/8").unwrap();
        assert_eq!(ann.as_path, vec![1, 2]);
    }

    #[test]
    fn bgp_discards_looped_announcement() {
        let bgp = Bgp;
        let mut rib = LocalRib::new();
        bgp.process_announcements(
            vec![recv("10.0.0.0/8", vec![2, 1, 5], Relationship::Customer)],
            &mut rib,
            1,
        );
        assert!(rib.is_empty());
    }

    #[test]
    fn bgp_replaces_incumbent_only_when_strictly_better() {
        let bgp = Bgp;
        let mut rib = LocalRib::new();
        rib.insert(
            "10.0.0.0/8".to_string(),
            recv("10.0.0.0/8", vec![1, 2], Relationship::Customer),
        );
        bgp.process_announcements(
            vec![recv("10.0.0.0/8", vec![2, 9], Relationship::Provider)],
            &mut rib,
            1,
        );
        assert_eq!(rib["10.0.0.0/8"].as_path, vec![1, 2]);
    }

    #[test]
    fn rov_rejects_flagged_announcement() {
        let rov = Rov;
        let mut rib = LocalRib::new();
        let mut invalid = recv("10.0.0.0/8", vec![2], Relationship::Customer);
        invalid.rov_invalid = true;
        rov.process_announcements(vec![invalid], &mut rib, 1);
        assert!(rib.is_empty());
    }

    #[test]
    fn rov_accepts_unflagged_announcement() {
        let rov = Rov;
        let mut rib = LocalRib::new();
        rov.process_announcements(
            vec![recv("10.0.0.0/8", vec![2], Relationship::Customer)],
            &mut rib,
            1,
        );
        assert!(rib.contains_key("10.0.0.0/8"));
    }
}
