use clap::Parser;
use log::info;
use serde::Serialize;

use asgraph_sim::{Simulator, ASN};

#[derive(Serialize)]
struct RibRow {
    asn: ASN,
    prefix: String,
    as_path: String,
}

/// Run a Gao-Rexford inter-domain propagation simulation over an AS
/// relationship file and print the resulting RIBs.
#[derive(Parser)]
#[command(name = "asgraph-sim")]
#[command(about = "Inter-domain route propagation simulator (Gao-Rexford, with ROV)")]
#[command(version)]
struct Cli {
    /// Path to the AS relationship file (lines of `asn1<sep>asn2<sep>rel`)
    relationships: String,

    /// Seed announcement as `asn:prefix`, repeatable
    #[arg(long = "seed", value_name = "ASN:PREFIX")]
    seeds: Vec<String>,

    /// Seed an invalid (ROV-triggering) announcement as `asn:prefix`, repeatable
    #[arg(long = "seed-invalid", value_name = "ASN:PREFIX")]
    seeds_invalid: Vec<String>,

    /// ASN to run the ROV policy on, repeatable
    #[arg(long = "rov")]
    rov_asns: Vec<ASN>,

    /// Print the final RIB snapshot as JSON instead of tab-separated rows
    #[arg(long)]
    json: bool,
}

fn parse_seed(spec: &str) -> Option<(ASN, String)> {
    let (asn, prefix) = spec.split_once(':')?;
    Some((asn.parse().ok()?, prefix.to_string()))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut simulator = match Simulator::from_relationships_file(&cli.relationships) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    for asn in &cli.rov_asns {
        simulator.add_rov_asn(*asn);
    }

    for spec in &cli.seeds {
        match parse_seed(spec) {
            Some((asn, prefix)) => {
                if let Err(err) = simulator.add_announcement(asn, prefix, false) {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
            None => {
                eprintln!("error: malformed --seed value {spec:?}, expected ASN:PREFIX");
                std::process::exit(1);
            }
        }
    }
    for spec in &cli.seeds_invalid {
        match parse_seed(spec) {
            Some((asn, prefix)) => {
                if let Err(err) = simulator.add_announcement(asn, prefix, true) {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
            None => {
                eprintln!("error: malformed --seed-invalid value {spec:?}, expected ASN:PREFIX");
                std::process::exit(1);
            }
        }
    }

    info!("propagating...");
    simulator.propagate();

    let mut ribs = simulator.get_ribs();
    ribs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    if cli.json {
        let rows: Vec<RibRow> = ribs
            .into_iter()
            .map(|(asn, prefix, as_path)| RibRow { asn, prefix, as_path })
            .collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to serialize RIB snapshot: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    for (asn, prefix, as_path) in ribs {
        println!("{asn}\t{prefix}\t{as_path}");
    }
}
