use std::collections::{HashMap, HashSet, VecDeque};

use crate::announcement::{Announcement, Prefix};
use crate::policy::{Bgp, LocalRib, Policy, Rov};
use crate::shared::{Relationship, SimulatorError, ASN};

pub struct AsNode {
    pub asn: ASN,
    pub customers: Vec<ASN>,
    pub peers: Vec<ASN>,
    pub providers: Vec<ASN>,
    pub local_rib: LocalRib,
    pub received_queue: HashMap<Prefix, Vec<Announcement>>,
    pub propagation_rank: Option<u32>,
    pub policy: Box<dyn Policy>,
}

impl AsNode {
    pub fn new(asn: ASN) -> Self {
        AsNode {
            asn,
            customers: Vec::new(),
            peers: Vec::new(),
            providers: Vec::new(),
            local_rib: LocalRib::new(),
            received_queue: HashMap::new(),
            propagation_rank: None,
            policy: Box::new(Bgp),
        }
    }

    pub fn get_neighbors(&self, rel: Relationship) -> &[ASN] {
        match rel {
            Relationship::Customer => &self.customers,
            Relationship::Peer => &self.peers,
            Relationship::Provider => &self.providers,
            Relationship::Origin => &[],
        }
    }

    pub fn receive(&mut self, ann: Announcement) {
        self.received_queue
            .entry(ann.prefix.clone())
            .or_default()
            .push(ann);
    }

    pub fn process_received(&mut self) {
        let staged: Vec<Announcement> = self
            .received_queue
            .drain()
            .flat_map(|(_, anns)| anns)
            .collect();
        if staged.is_empty() {
            return;
        }
        self.policy
            .process_announcements(staged, &mut self.local_rib, self.asn);
    }
}

fn push_unique(neighbors: &mut Vec<ASN>, asn: ASN) {
    if !neighbors.contains(&asn) {
        neighbors.push(asn);
    }
}

pub struct AsGraph {
    pub nodes: HashMap<ASN, AsNode>,
    pub ranks: Vec<Vec<ASN>>,
    pub rov_asns: HashSet<ASN>,
}

impl AsGraph {
    pub fn new() -> Self {
        AsGraph {
            nodes: HashMap::new(),
            ranks: Vec::new(),
            rov_asns: HashSet::new(),
        }
    }

    pub fn get(&self, asn: ASN) -> Option<&AsNode> {
        self.nodes.get(&asn)
    }

    pub fn get_mut(&mut self, asn: ASN) -> Option<&mut AsNode> {
        self.nodes.get_mut(&asn)
    }

    pub fn ensure(&mut self, asn: ASN) -> &mut AsNode {
        self.nodes.entry(asn).or_insert_with(|| AsNode::new(asn))
    }

    /// `rel == -1` means asn1 provides for asn2; `rel == 0` means they peer;
    /// any other value is ignored.
    pub fn add_relationship(&mut self, asn1: ASN, asn2: ASN, rel: i64) {
        match rel {
            -1 => {
                self.ensure(asn2);
                push_unique(&mut self.ensure(asn1).customers, asn2);
                self.ensure(asn1);
                push_unique(&mut self.ensure(asn2).providers, asn1);
            }
            0 => {
                self.ensure(asn2);
                push_unique(&mut self.ensure(asn1).peers, asn2);
                self.ensure(asn1);
                push_unique(&mut self.ensure(asn2).peers, asn1);
            }
            _ => {}
        }
    }

    // Three-color DFS over the edges from an AS to each of its providers.
    // A back-edge to a gray node is a cycle. Peer edges are ignored.
    pub fn check_for_cycles(&self) -> Result<(), SimulatorError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        fn visit(
            asn: ASN,
            nodes: &HashMap<ASN, AsNode>,
            colors: &mut HashMap<ASN, Color>,
        ) -> Result<(), ASN> {
            colors.insert(asn, Color::Gray);
            if let Some(node) = nodes.get(&asn) {
                for &provider in &node.providers {
                    match colors.get(&provider).copied().unwrap_or(Color::White) {
                        Color::Gray => return Err(provider),
                        Color::White => visit(provider, nodes, colors)?,
                        Color::Black => {}
                    }
                }
            }
            colors.insert(asn, Color::Black);
            Ok(())
        }

        let mut colors: HashMap<ASN, Color> =
            self.nodes.keys().map(|&asn| (asn, Color::White)).collect();
        let mut asns: Vec<ASN> = self.nodes.keys().copied().collect();
        asns.sort_unstable();

        for asn in asns {
            if colors.get(&asn).copied() == Some(Color::White) {
                visit(asn, &self.nodes, &mut colors).map_err(|asn| SimulatorError::Cycle { asn })?;
            }
        }
        Ok(())
    }

    // Kahn-style layering over the customer-provider DAG. ASes with no
    // customers start at rank 0; a provider's rank is the max of its
    // customers' ranks plus one. Unreached ASes fall back to rank 0.
    pub fn assign_propagation_ranks(&mut self) {
        let mut customer_count: HashMap<ASN, usize> = self
            .nodes
            .iter()
            .map(|(&asn, node)| (asn, node.customers.len()))
            .collect();

        let mut rank: HashMap<ASN, u32> = HashMap::new();
        let mut initial: Vec<ASN> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.customers.is_empty())
            .map(|(&asn, _)| asn)
            .collect();
        initial.sort_unstable();

        let mut queue: VecDeque<ASN> = VecDeque::new();
        for asn in initial {
            rank.insert(asn, 0);
            queue.push_back(asn);
        }

        while let Some(asn) = queue.pop_front() {
            let current_rank = rank[&asn];
            let providers = match self.nodes.get(&asn) {
                Some(node) => node.providers.clone(),
                None => continue,
            };
            for provider in providers {
                let candidate_rank = current_rank + 1;
                let entry = rank.entry(provider).or_insert(candidate_rank);
                if candidate_rank > *entry {
                    *entry = candidate_rank;
                }

                let count = customer_count.entry(provider).or_insert(0);
                if *count > 0 {
                    *count -= 1;
                }
                if *count == 0 {
                    queue.push_back(provider);
                }
            }
        }

        for &asn in self.nodes.keys() {
            rank.entry(asn).or_insert(0);
        }

        let max_rank = rank.values().copied().max().unwrap_or(0);
        let mut ranks: Vec<Vec<ASN>> = vec![Vec::new(); (max_rank + 1) as usize];
        for (&asn, &r) in &rank {
            ranks[r as usize].push(asn);
        }
        for level in &mut ranks {
            level.sort_unstable();
        }

        for (&asn, &r) in &rank {
            if let Some(node) = self.nodes.get_mut(&asn) {
                node.propagation_rank = Some(r);
            }
        }
        self.ranks = ranks;
    }

    pub fn add_rov_asn(&mut self, asn: ASN) {
        if let Some(node) = self.nodes.get_mut(&asn) {
            node.policy = Box::new(Rov);
            self.rov_asns.insert(asn);
        }
    }
}

impl Default for AsGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from_edges(edges: &[(ASN, ASN, i64)]) -> AsGraph {
        let mut graph = AsGraph::new();
        for &(a, b, rel) in edges {
            graph.add_relationship(a, b, rel);
        }
        graph
    }

    #[test]
    fn relationship_mirroring_is_symmetric() {
        let graph = graph_from_edges(&[(1, 2, -1)]);
        assert_eq!(graph.get(1).unwrap().customers, vec![2]);
        assert_eq!(graph.get(2).unwrap().providers, vec![1]);
    }

    #[test]
    fn peer_relationship_is_symmetric() {
        let graph = graph_from_edges(&[(1, 2, 0)]);
        assert_eq!(graph.get(1).unwrap().peers, vec![2]);
        assert_eq!(graph.get(2).unwrap().peers, vec![1]);
    }

    #[test]
    fn unrecognized_relationship_value_is_ignored() {
        let graph = graph_from_edges(&[(1, 2, 7)]);
        assert!(graph.get(1).unwrap().customers.is_empty());
        assert!(graph.get(1).unwrap().peers.is_empty());
        assert!(graph.get(1).unwrap().providers.is_empty());
    }

    #[test]
    fn triangle_rank_assignment() {
        let mut graph = graph_from_edges(&[(1, 2, -1), (1, 3, -1)]);
        graph.assign_propagation_ranks();
        assert_eq!(graph.get(2).unwrap().propagation_rank, Some(0));
        assert_eq!(graph.get(3).unwrap().propagation_rank, Some(0));
        assert_eq!(graph.get(1).unwrap().propagation_rank, Some(1));
        assert_eq!(graph.ranks.len(), 2);
    }

    #[test]
    fn provider_rank_exceeds_every_customer() {
        let mut graph = graph_from_edges(&[(1, 2, -1), (2, 3, -1), (1, 4, -1)]);
        graph.assign_propagation_ranks();
        let rank = |asn: ASN| graph.get(asn).unwrap().propagation_rank.unwrap();
        assert!(rank(1) > rank(2));
        assert!(rank(2) > rank(3));
        assert!(rank(1) > rank(4));
    }

    #[test]
    fn direct_cycle_is_detected() {
        let graph = graph_from_edges(&[(1, 2, -1), (2, 1, -1)]);
        assert!(graph.check_for_cycles().is_err());
    }

    #[test]
    fn acyclic_graph_passes() {
        let graph = graph_from_edges(&[(1, 2, -1), (1, 3, -1), (1, 3, 0)]);
        assert!(graph.check_for_cycles().is_ok());
    }

    #[test]
    fn isolated_as_falls_back_to_rank_zero() {
        let mut graph = graph_from_edges(&[(1, 2, -1)]);
        graph.ensure(99);
        graph.assign_propagation_ranks();
        assert_eq!(graph.get(99).unwrap().propagation_rank, Some(0));
    }
}
