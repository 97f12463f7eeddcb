/////////////////////////////////////////////////////////////////////////////////////////////
//
// Writes and reads cluster-pair lists as CSV for block-cluster diagnostics.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use csv::{ReaderBuilder, Writer};
use ferreus_bct::ClusterPair;
use std::error::Error;
use std::fs::File;

/// Write a cluster-pair list to a CSV file.
///
/// Each row holds the two node ids of one pair, with headers
/// `Cluster1, Cluster2`. Dumping the admissible and inadmissible lists of a
/// block-cluster tree makes the decomposition inspectable outside the
/// process (plotting block structure, diffing runs).
///
/// # Arguments
/// * `pairs` - The pair list to dump.
/// * `filename` - Output CSV filename.
///
/// # Errors
/// Returns an error if writing to disk fails.
pub fn cluster_pairs_to_csv(pairs: &[ClusterPair], filename: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record(&["Cluster1", "Cluster2"])?;
    for pair in pairs {
        wtr.write_record(&[pair.cluster1.to_string(), pair.cluster2.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Load a cluster-pair list from a CSV file.
///
/// # Arguments
/// * `file_path` - Path to the CSV file.
/// * `has_headers` - Whether the file has a single header row to skip.
///
/// # Returns
/// The pair list in file order.
pub fn csv_to_cluster_pairs(
    file_path: &str,
    has_headers: bool,
) -> Result<Vec<ClusterPair>, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(file);

    let mut pairs = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() != 2 {
            return Err("Expected two columns per cluster pair".into());
        }

        pairs.push(ClusterPair {
            cluster1: record[0].trim().parse()?,
            cluster2: record[1].trim().parse()?,
        });
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_lists_round_trip_through_csv() {
        let pairs = vec![
            ClusterPair {
                cluster1: 1,
                cluster2: 8,
            },
            ClusterPair {
                cluster1: 8,
                cluster2: 1,
            },
            ClusterPair {
                cluster1: 3,
                cluster2: 12,
            },
        ];

        let path = std::env::temp_dir().join("ferreus_mesh_utils_pairs_roundtrip.csv");
        let path = path.to_str().unwrap();

        cluster_pairs_to_csv(&pairs, path).unwrap();
        let loaded = csv_to_cluster_pairs(path, true).unwrap();

        assert_eq!(loaded, pairs);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn empty_pair_list_writes_headers_only() {
        let path = std::env::temp_dir().join("ferreus_mesh_utils_pairs_empty.csv");
        let path = path.to_str().unwrap();

        cluster_pairs_to_csv(&[], path).unwrap();
        let loaded = csv_to_cluster_pairs(path, true).unwrap();

        assert!(loaded.is_empty());
        let _ = std::fs::remove_file(path);
    }
}
