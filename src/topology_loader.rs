use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::as_graph::AsGraph;
use crate::shared::{SimulatorError, ASN};

pub trait TopologyLoader {
    fn load(&self) -> Result<AsGraph, SimulatorError>;
}

/// Reads AS relationship lines of the form `asn1<sep>asn2<sep>rel`, where
/// `<sep>` is any run of non-numeric characters (commonly `|`). Comment
/// lines and blank lines are skipped; lines that don't yield three
/// integers are skipped silently rather than treated as errors.
pub struct RelationshipFileLoader {
    path: String,
}

impl RelationshipFileLoader {
    pub fn new(path: impl Into<String>) -> Self {
        RelationshipFileLoader { path: path.into() }
    }
}

impl TopologyLoader for RelationshipFileLoader {
    fn load(&self) -> Result<AsGraph, SimulatorError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| SimulatorError::TopologyLoad {
            path: self.path.clone(),
            source,
        })?;

        let mut graph = AsGraph::new();
        let mut accepted = 0usize;
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_relationship_line(line) {
                Some((asn1, asn2, rel)) => {
                    graph.add_relationship(asn1, asn2, rel);
                    accepted += 1;
                }
                None => warn!("relationship file {}: skipping malformed line {}", self.path, lineno + 1),
            }
        }
        debug!("loaded {accepted} relationship lines from {}", self.path);
        Ok(graph)
    }
}

// Extracts the first three integer tokens on a line, split on any run of
// non-numeric characters (so `1|2|-1`, `1,2,-1`, and `1 2 -1` all parse).
fn parse_relationship_line(line: &str) -> Option<(ASN, ASN, i64)> {
    let mut tokens = Vec::with_capacity(3);
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c == '-' || c.is_ascii_digit() {
            current.push(c);
            chars.next();
        } else {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            chars.next();
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    if tokens.len() < 3 {
        return None;
    }

    let asn1: i64 = tokens[0].parse().ok()?;
    let asn2: i64 = tokens[1].parse().ok()?;
    let rel: i64 = tokens[2].parse().ok()?;
    if asn1 < 0 || asn2 < 0 {
        return None;
    }
    Some((asn1 as ASN, asn2 as ASN, rel))
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<AsGraph, SimulatorError> {
    RelationshipFileLoader::new(path.as_ref().to_string_lossy().to_string()).load()
}
