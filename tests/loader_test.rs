use macross::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_closes_and_timestamps_in_file_order() {
    let file = csv_file(
        "timestamp,open,high,low,close,volume\n\
         2024-12-28 10:00:00,1,1,1,100.5,10\n\
         2024-12-28 11:00:00,1,1,1,101.0,10\n\
         2024-12-28T12:00:00Z,1,1,1,99.5,10\n",
    );

    let data = load_csv(file.path()).unwrap();
    assert_eq!(data.series.as_slice(), &[100.5, 101.0, 99.5]);
    assert_eq!(
        data.timestamp(2).unwrap().to_rfc3339(),
        "2024-12-28T12:00:00+00:00"
    );
    assert_eq!(
        data.timestamp(0).unwrap().to_rfc3339(),
        "2024-12-28T10:00:00+00:00"
    );
}

#[test]
fn accepts_capitalized_close_without_timestamps() {
    let file = csv_file("Close\n100\n102\n101\n");

    let data = load_csv(file.path()).unwrap();
    assert_eq!(data.series.len(), 3);
    assert!(data.timestamps.iter().all(Option::is_none));
}

#[test]
fn drops_rows_with_missing_close() {
    let file = csv_file("timestamp,close\n2024-01-01 00:00:00,100\n2024-01-01 01:00:00,\n2024-01-01 02:00:00,n/a\n2024-01-01 03:00:00,103\n");

    let data = load_csv(file.path()).unwrap();
    assert_eq!(data.series.as_slice(), &[100.0, 103.0]);
    assert_eq!(data.timestamps.len(), 2);
    assert_eq!(
        data.timestamp(1).unwrap().to_rfc3339(),
        "2024-01-01T03:00:00+00:00"
    );
}

#[test]
fn rejects_files_without_usable_prices() {
    let no_close = csv_file("timestamp,open\n2024-01-01 00:00:00,1\n");
    assert!(load_csv(no_close.path()).is_err());

    let negative = csv_file("close\n100\n-3\n");
    assert!(load_csv(negative.path()).is_err());

    let empty = csv_file("close\n");
    assert!(load_csv(empty.path()).is_err());
}

#[test]
fn config_round_trips_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = BacktestConfiguration {
        initial_cash: 2500.0,
        params: ParameterSet::new(3, 8, 0.0, 0.02),
        skip_inverted_windows: true,
        ..Default::default()
    };
    config.to_json_file(&path).unwrap();

    let loaded = BacktestConfiguration::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn loaded_series_feeds_the_optimizer() {
    let mut contents = String::from("close\n");
    for i in 0..120 {
        contents.push_str(&format!("{}\n", 100.0 + (i as f64 / 5.0).sin() * 10.0));
    }
    let file = csv_file(&contents);
    let data = load_csv(file.path()).unwrap();

    let grid = ParameterGrid::cartesian(&[2, 5], &[10, 20], &[0.0, 0.01], &[0.0, 0.01]);
    let outcome = optimize(&data.series, &grid, 10000.0).unwrap();

    //re-running the winner reproduces the reported profit
    let rerun = run_backtest(&data.series, &outcome.best_params, 10000.0).unwrap();
    assert_eq!(rerun.profit, outcome.best_profit);
}
