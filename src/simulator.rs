use std::path::Path;

use log::info;

use crate::announcement::Announcement;
use crate::as_graph::AsGraph;
use crate::shared::{Relationship, SimulatorError, ASN};
use crate::topology_loader::load_from_path;

pub type RibEntry = (ASN, String, String);

pub struct Simulator {
    pub as_graph: AsGraph,
}

impl Simulator {
    pub fn from_relationships_file(path: impl AsRef<Path>) -> Result<Self, SimulatorError> {
        let mut as_graph = load_from_path(path)?;
        as_graph.check_for_cycles()?;
        as_graph.assign_propagation_ranks();
        info!(
            "topology loaded: {} ASes across {} ranks",
            as_graph.nodes.len(),
            as_graph.ranks.len()
        );
        Ok(Simulator { as_graph })
    }

    pub fn new(as_graph: AsGraph) -> Self {
        Simulator { as_graph }
    }

    /// Overwrites any prior entry for `prefix` unconditionally.
    pub fn add_announcement(
        &mut self,
        seed_asn: ASN,
        prefix: impl Into<String>,
        rov_invalid: bool,
    ) -> Result<(), SimulatorError> {
        let prefix = prefix.into();
        let node = self
            .as_graph
            .get_mut(seed_asn)
            .ok_or(SimulatorError::UnknownOrigin { asn: seed_asn })?;
        let ann = Announcement::originate(prefix.clone(), seed_asn, rov_invalid);
        node.local_rib.insert(prefix, ann);
        Ok(())
    }

    pub fn add_rov_asn(&mut self, asn: ASN) {
        self.as_graph.add_rov_asn(asn);
    }

    /// Not idempotent: calling this twice continues propagating from
    /// whatever state the RIBs are in.
    pub fn propagate(&mut self) {
        self.propagate_up();
        self.propagate_across();
        self.propagate_down();
    }

    // Customer-to-provider flow, ascending rank. Every lower rank has
    // already forwarded by the time a rank is processed.
    fn propagate_up(&mut self) {
        let ranks = self.as_graph.ranks.clone();
        for rank_asns in &ranks {
            for &asn in rank_asns {
                if let Some(node) = self.as_graph.get_mut(asn) {
                    node.process_received();
                }
            }
            for &asn in rank_asns {
                self.forward_rib(asn, Relationship::Provider, Relationship::Customer);
            }
        }
    }

    // Peer-to-peer flow: stage every AS's current RIB to its peers, then
    // drain every AS once in ascending ASN order.
    fn propagate_across(&mut self) {
        let mut asns: Vec<ASN> = self.as_graph.nodes.keys().copied().collect();
        asns.sort_unstable();

        for &asn in &asns {
            self.forward_rib(asn, Relationship::Peer, Relationship::Peer);
        }
        for &asn in &asns {
            if let Some(node) = self.as_graph.get_mut(asn) {
                node.process_received();
            }
        }
    }

    // Provider-to-customer flow, descending rank. Forwards the whole local
    // RIB, customer- and peer-learned entries alike.
    fn propagate_down(&mut self) {
        let ranks = self.as_graph.ranks.clone();
        for rank_asns in ranks.iter().rev() {
            for &asn in rank_asns {
                if let Some(node) = self.as_graph.get_mut(asn) {
                    node.process_received();
                }
            }
            for &asn in rank_asns {
                self.forward_rib(asn, Relationship::Customer, Relationship::Provider);
            }
        }
    }

    // Forwards `asn`'s current local RIB to every neighbor under
    // `to_neighbors`, tagging each outbound copy with `received_from` as
    // the receiver will perceive it.
    fn forward_rib(&mut self, asn: ASN, to_neighbors: Relationship, received_from: Relationship) {
        let (neighbors, outgoing): (Vec<ASN>, Vec<Announcement>) = match self.as_graph.get(asn) {
            Some(node) => (
                node.get_neighbors(to_neighbors).to_vec(),
                node.local_rib.values().cloned().collect(),
            ),
            None => return,
        };
        if neighbors.is_empty() || outgoing.is_empty() {
            return;
        }

        for ann in &outgoing {
            let forwarded = ann.forwarded(asn, received_from);
            for &neighbor in &neighbors {
                if let Some(neighbor_node) = self.as_graph.get_mut(neighbor) {
                    neighbor_node.receive(forwarded.clone());
                }
            }
        }
    }

    /// Order is unspecified; sort if you need a stable readout.
    pub fn get_ribs(&self) -> Vec<RibEntry> {
        let mut rows = Vec::new();
        for (&asn, node) in &self.as_graph.nodes {
            for ann in node.local_rib.values() {
                rows.push((asn, ann.prefix.clone(), ann.to_string()));
            }
        }
        rows
    }
}
