use crate::engine::{ParameterGrid, ParameterSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//candidate values per parameter, expanded into a cartesian grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
    pub buy_thresholds: Vec<f64>,
    pub sell_thresholds: Vec<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            short_windows: vec![5, 10, 20],
            long_windows: vec![20, 50, 100],
            buy_thresholds: vec![0.01, 0.02, 0.03],
            sell_thresholds: vec![0.01, 0.03, 0.05],
        }
    }
}

impl GridConfig {
    //builds the search grid, optionally dropping short >= long points
    pub fn to_grid(&self, skip_inverted_windows: bool) -> ParameterGrid {
        let grid = ParameterGrid::cartesian(
            &self.short_windows,
            &self.long_windows,
            &self.buy_thresholds,
            &self.sell_thresholds,
        );
        if skip_inverted_windows {
            grid.without_inverted()
        } else {
            grid
        }
    }
}

//settings for the synthetic demo series used when no data file is given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub length: usize,
    pub base: f64,
    pub amplitude: f64,
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            length: 300,
            base: 100.0,
            amplitude: 10.0,
            noise_std: 2.0,
            seed: 42,
        }
    }
}

//complete backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfiguration {
    //data, synthetic series when absent
    pub data_path: Option<PathBuf>,
    pub synthetic: SyntheticConfig,

    //account settings
    pub initial_cash: f64,

    //single run parameters
    pub params: ParameterSet,

    //optimization
    pub grid: GridConfig,
    pub skip_inverted_windows: bool,
    pub parallel: bool,

    //optional output paths
    pub output_trades_csv: Option<PathBuf>,
    pub output_equity_csv: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            data_path: None,
            synthetic: SyntheticConfig::default(),
            initial_cash: 10000.0,
            params: ParameterSet::default(),
            grid: GridConfig::default(),
            skip_inverted_windows: false,
            parallel: false,
            output_trades_csv: None,
            output_equity_csv: None,
        }
    }
}

impl BacktestConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn parameter_grid(&self) -> ParameterGrid {
        self.grid.to_grid(self.skip_inverted_windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_the_calibration_grid() {
        let config = BacktestConfiguration::default();
        assert_eq!(config.parameter_grid().len(), 81);

        let skipping = BacktestConfiguration {
            skip_inverted_windows: true,
            ..Default::default()
        };
        assert_eq!(skipping.parameter_grid().len(), 72);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: BacktestConfiguration =
            serde_json::from_str(r#"{ "initial_cash": 500.0, "parallel": true }"#).unwrap();
        assert_eq!(config.initial_cash, 500.0);
        assert!(config.parallel);
        assert_eq!(config.params, ParameterSet::default());
        assert_eq!(config.grid, GridConfig::default());
    }
}
