//! Integration tests for dataset loading and proximity search.

use std::fs;

use airdist::airport::{AirportIndex, DatasetParser};
use airdist::grid::{GeoGridIndex, PopulateFilter};
use tempfile::TempDir;

const DATASET: &str = "\
name;country;region;municipality;latitude;longitude;type;primary_code;secondary_code
Sofia Airport;BG;BG-23;Sofia;42.6952;23.4062;large_airport;SOF;LBSF
Burgas Airport;BG;BG-02;Burgas;42.5696;27.5152;large_airport;BOJ;LBBG
Plovdiv Airport;BG;BG-16;Plovdiv;42.0678;24.8508;medium_airport;PDV;LBPD
Heathrow Airport;GB;GB-ENG;London;51.4706;-0.4619;large_airport;LHR;EGLL
Bojurishte Strip;BG;BG-23;Bozhurishte;42.7000;23.2000;small_airport;;
Old Field;BG;BG-23;Sofia;42.7100;23.4500;closed;OLD;
Broken Row;BG;not-enough-columns
";

fn load(skip_small: bool) -> AirportIndex {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("airports.csv");
    fs::write(&path, DATASET).unwrap();
    AirportIndex::from_dataset(&path, DatasetParser::default(), skip_small).unwrap()
}

#[test]
fn test_dataset_selection() {
    let index = load(true);
    // The codeless strip and the broken row are dropped.
    assert_eq!(index.len(), 5);
    assert!(index.get("SOF_LBSF").is_some());
    assert!(index.get("sof_lbsf").is_some());
    assert!(index.get("OLD").is_some());
}

#[test]
fn test_find_nearby_scenario() {
    let index = load(true);
    let grid = GeoGridIndex::new();
    grid.populate(index.iter().cloned(), PopulateFilter::default());

    let sofia = index.get("SOF_LBSF").unwrap();
    let nearby = grid.find_nearby(sofia, 400.0);
    let names: Vec<&str> = nearby.iter().map(|n| n.airport.name.as_str()).collect();
    // Closed airports are left out of the grid by default.
    assert_eq!(names, vec!["Plovdiv Airport", "Burgas Airport"]);
    assert!(nearby[0].distance_km < nearby[1].distance_km);

    let heathrow = index.get("LHR_EGLL").unwrap();
    assert!(grid.find_nearby(heathrow, 400.0).is_empty());
}

#[test]
fn test_find_nearby_including_closed() {
    let index = load(true);
    let grid = GeoGridIndex::new();
    grid.populate(index.iter().cloned(), PopulateFilter::all());

    let sofia = index.get("SOF_LBSF").unwrap();
    let nearby = grid.find_nearby(sofia, 10.0);
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].airport.name, "Old Field");
}

#[test]
fn test_missing_dataset_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let result = AirportIndex::from_dataset(
        temp_dir.path().join("missing.csv"),
        DatasetParser::default(),
        true,
    );
    assert!(result.is_err());
}
