use crate::data::PriceSeries;
use crate::engine::backtest::run_backtest;
use crate::error::{BacktestError, Result};
use crate::strategy::sma_crossover::validate_threshold;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

//one point of the strategy parameter space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub short_window: usize,
    pub long_window: usize,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet {
            short_window: 20,
            long_window: 100,
            buy_threshold: 0.01,
            sell_threshold: 0.01,
        }
    }
}

impl ParameterSet {
    pub fn new(
        short_window: usize,
        long_window: usize,
        buy_threshold: f64,
        sell_threshold: f64,
    ) -> Self {
        ParameterSet {
            short_window,
            long_window,
            buy_threshold,
            sell_threshold,
        }
    }

    //windows must be positive and thresholds finite non-negative fractions
    //short >= long is allowed, see is_inverted
    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 || self.long_window == 0 {
            return Err(BacktestError::InvalidParameter(format!(
                "windows must be positive, got short={} long={}",
                self.short_window, self.long_window
            )));
        }
        validate_threshold("buy_threshold", self.buy_threshold)?;
        validate_threshold("sell_threshold", self.sell_threshold)?;
        Ok(())
    }

    //true when the "short" window is not shorter than the "long" one
    pub fn is_inverted(&self) -> bool {
        self.short_window >= self.long_window
    }
}

//finite, ordered set of parameter sets to search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterGrid {
    sets: Vec<ParameterSet>,
}

impl ParameterGrid {
    //cartesian product, enumerated short -> long -> buy -> sell (last field varies fastest)
    pub fn cartesian(
        short_windows: &[usize],
        long_windows: &[usize],
        buy_thresholds: &[f64],
        sell_thresholds: &[f64],
    ) -> Self {
        let mut sets = Vec::with_capacity(
            short_windows.len() * long_windows.len() * buy_thresholds.len() * sell_thresholds.len(),
        );

        for &short_window in short_windows {
            for &long_window in long_windows {
                for &buy_threshold in buy_thresholds {
                    for &sell_threshold in sell_thresholds {
                        sets.push(ParameterSet::new(
                            short_window,
                            long_window,
                            buy_threshold,
                            sell_threshold,
                        ));
                    }
                }
            }
        }

        ParameterGrid { sets }
    }

    //grid from an explicit list, order preserved
    pub fn from_sets(sets: Vec<ParameterSet>) -> Self {
        ParameterGrid { sets }
    }

    //drops points whose short window is not below the long window
    pub fn without_inverted(self) -> Self {
        ParameterGrid {
            sets: self.sets.into_iter().filter(|p| !p.is_inverted()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterSet> {
        self.sets.iter()
    }

    pub fn as_slice(&self) -> &[ParameterSet] {
        &self.sets
    }
}

impl<'a> IntoIterator for &'a ParameterGrid {
    type Item = &'a ParameterSet;
    type IntoIter = std::slice::Iter<'a, ParameterSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

//outcome of one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub params: ParameterSet,
    pub profit: f64,
    pub num_trades: usize,
}

//result of a grid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_params: ParameterSet,
    pub best_profit: f64,
    //every trial in grid order
    pub trials: Vec<TrialResult>,
}

impl OptimizationResult {
    //best n trials by profit, earlier grid points first among equals
    pub fn top(&self, n: usize) -> Vec<&TrialResult> {
        let mut ranked: Vec<&TrialResult> = self.trials.iter().collect();
        //sort_by is stable so ties keep grid order
        ranked.sort_by(|a, b| b.profit.total_cmp(&a.profit));
        ranked.truncate(n);
        ranked
    }
}

//exhaustive search over the grid, single-threaded
pub fn optimize(
    series: &PriceSeries,
    grid: &ParameterGrid,
    initial_cash: f64,
) -> Result<OptimizationResult> {
    start_search(grid)?;
    let started = Instant::now();

    let trials = grid
        .iter()
        .map(|params| evaluate(series, params, initial_cash))
        .collect::<Result<Vec<_>>>()?;

    finish_search(trials, started)
}

//same search as optimize, trials fanned out over the rayon pool
//the winner is picked by a scan in grid order, so the result matches optimize exactly
pub fn optimize_parallel(
    series: &PriceSeries,
    grid: &ParameterGrid,
    initial_cash: f64,
) -> Result<OptimizationResult> {
    start_search(grid)?;
    let started = Instant::now();

    //indexed collect keeps submission order
    let trials = grid
        .as_slice()
        .par_iter()
        .map(|params| evaluate(series, params, initial_cash))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    finish_search(trials, started)
}

//first strictly greater profit wins, later equal profits are discarded
pub fn select_best(trials: &[TrialResult]) -> Option<&TrialResult> {
    let mut best: Option<&TrialResult> = None;
    for trial in trials {
        if best.map_or(true, |current| trial.profit > current.profit) {
            best = Some(trial);
        }
    }
    best
}

fn evaluate(series: &PriceSeries, params: &ParameterSet, initial_cash: f64) -> Result<TrialResult> {
    let result = run_backtest(series, params, initial_cash)?;
    debug!(
        short = params.short_window,
        long = params.long_window,
        buy = params.buy_threshold,
        sell = params.sell_threshold,
        profit = result.profit,
        trades = result.num_trades(),
        "trial complete"
    );
    Ok(TrialResult {
        params: *params,
        profit: result.profit,
        num_trades: result.num_trades(),
    })
}

fn start_search(grid: &ParameterGrid) -> Result<()> {
    if grid.is_empty() {
        return Err(BacktestError::InvalidInput(
            "parameter grid is empty".to_string(),
        ));
    }

    let inverted = grid.iter().filter(|p| p.is_inverted()).count();
    if inverted > 0 {
        warn!(
            inverted,
            "grid contains points whose short window is not below the long window"
        );
    }

    info!(points = grid.len(), "starting parameter search");
    Ok(())
}

fn finish_search(trials: Vec<TrialResult>, started: Instant) -> Result<OptimizationResult> {
    let best = select_best(&trials)
        .ok_or_else(|| BacktestError::InvalidInput("parameter grid is empty".to_string()))?;
    let best_params = best.params;
    let best_profit = best.profit;

    info!(
        short = best_params.short_window,
        long = best_params.long_window,
        buy = best_params.buy_threshold,
        sell = best_params.sell_threshold,
        profit = best_profit,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "parameter search finished"
    );

    Ok(OptimizationResult {
        best_params,
        best_profit,
        trials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave() -> PriceSeries {
        let prices = (0..200)
            .map(|i| 100.0 + (i as f64 / 6.0).sin() * 10.0 + (i as f64 / 40.0))
            .collect();
        PriceSeries::new(prices).unwrap()
    }

    #[test]
    fn cartesian_enumerates_last_field_fastest() {
        let grid = ParameterGrid::cartesian(&[5, 10], &[20], &[0.01], &[0.01, 0.03]);
        let sets: Vec<_> = grid.iter().copied().collect();

        assert_eq!(
            sets,
            vec![
                ParameterSet::new(5, 20, 0.01, 0.01),
                ParameterSet::new(5, 20, 0.01, 0.03),
                ParameterSet::new(10, 20, 0.01, 0.01),
                ParameterSet::new(10, 20, 0.01, 0.03),
            ]
        );
    }

    #[test]
    fn calibration_grid_has_81_points_and_9_inverted() {
        let grid = ParameterGrid::cartesian(
            &[5, 10, 20],
            &[20, 50, 100],
            &[0.01, 0.02, 0.03],
            &[0.01, 0.03, 0.05],
        );
        assert_eq!(grid.len(), 81);
        assert_eq!(grid.iter().filter(|p| p.is_inverted()).count(), 9);
        assert_eq!(grid.without_inverted().len(), 72);
    }

    #[test]
    fn empty_grid_is_invalid_input() {
        let grid = ParameterGrid::default();
        assert!(matches!(
            optimize(&wave(), &grid, 10000.0),
            Err(BacktestError::InvalidInput(_))
        ));
        assert!(matches!(
            optimize_parallel(&wave(), &grid, 10000.0),
            Err(BacktestError::InvalidInput(_))
        ));
    }

    #[test]
    fn first_of_equal_profits_wins() {
        //windows longer than the series never trade, so every point earns zero
        let short = PriceSeries::new(vec![100.0, 101.0, 99.0, 103.0]).unwrap();
        let grid = ParameterGrid::cartesian(&[2, 3], &[10, 20], &[0.0], &[0.0, 0.01]);

        let result = optimize(&short, &grid, 10000.0).unwrap();
        assert!(result.trials.iter().all(|t| t.profit == 0.0));
        assert_eq!(result.best_params, ParameterSet::new(2, 10, 0.0, 0.0));
        assert_eq!(result.best_profit, 0.0);

        let parallel = optimize_parallel(&short, &grid, 10000.0).unwrap();
        assert_eq!(parallel.best_params, result.best_params);
    }

    #[test]
    fn select_best_uses_strict_comparison() {
        let trial = |short, profit| TrialResult {
            params: ParameterSet::new(short, 10, 0.0, 0.0),
            profit,
            num_trades: 0,
        };
        let trials = vec![trial(1, 5.0), trial(2, 7.0), trial(3, 7.0), trial(4, -1.0)];

        assert_eq!(select_best(&trials).unwrap().params.short_window, 2);
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn best_profit_is_the_maximum_over_trials() {
        let grid = ParameterGrid::cartesian(&[2, 5, 10], &[10, 20, 40], &[0.0, 0.01], &[0.0, 0.02]);
        let result = optimize(&wave(), &grid, 10000.0).unwrap();

        let max = result
            .trials
            .iter()
            .map(|t| t.profit)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.best_profit, max);
        assert_eq!(result.trials.len(), grid.len());
    }

    #[test]
    fn parallel_search_matches_sequential() {
        let grid = ParameterGrid::cartesian(
            &[2, 3, 5, 10],
            &[10, 20, 40],
            &[0.0, 0.01, 0.02],
            &[0.0, 0.01, 0.03],
        );
        let sequential = optimize(&wave(), &grid, 10000.0).unwrap();
        let parallel = optimize_parallel(&wave(), &grid, 10000.0).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn invalid_point_aborts_the_run() {
        let grid = ParameterGrid::from_sets(vec![
            ParameterSet::new(2, 10, 0.0, 0.0),
            ParameterSet::new(2, 10, -0.5, 0.0),
        ]);
        assert!(matches!(
            optimize(&wave(), &grid, 10000.0),
            Err(BacktestError::InvalidParameter(_))
        ));
        assert!(matches!(
            optimize_parallel(&wave(), &grid, 10000.0),
            Err(BacktestError::InvalidParameter(_))
        ));
    }

    #[test]
    fn top_ranks_by_profit_keeping_grid_order_for_ties() {
        let trial = |short, profit| TrialResult {
            params: ParameterSet::new(short, 10, 0.0, 0.0),
            profit,
            num_trades: 0,
        };
        let result = OptimizationResult {
            best_params: ParameterSet::new(2, 10, 0.0, 0.0),
            best_profit: 7.0,
            trials: vec![trial(1, 5.0), trial(2, 7.0), trial(3, 7.0), trial(4, -1.0)],
        };

        let shorts: Vec<_> = result.top(3).iter().map(|t| t.params.short_window).collect();
        assert_eq!(shorts, vec![2, 3, 1]);
    }
}
