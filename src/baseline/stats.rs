use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Online mean/variance (Welford) for one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStat {
    pub count: u64,
    pub mean: f64,
    /// Sum of squared deviations from the running mean.
    pub m2: f64,
}

impl RunningStat {
    pub fn new(count: u64, mean: f64, std_dev: f64) -> Self {
        let m2 = if count > 1 {
            std_dev * std_dev * (count - 1) as f64
        } else {
            0.0
        };
        RunningStat { count, mean, m2 }
    }

    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Sample variance; zero below two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0)
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Coefficient of variation; zero when the mean is not positive.
    pub fn cv(&self) -> f64 {
        if self.mean > 0.0 {
            self.std_dev() / self.mean
        } else {
            0.0
        }
    }
}

/// Games and wins for one option of a discrete choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinStat {
    pub games: u64,
    pub wins: u64,
}

impl WinStat {
    pub fn new(games: u64, wins: u64) -> Self {
        WinStat { games, wins }
    }

    pub fn record(&mut self, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

impl Add for WinStat {
    type Output = WinStat;

    fn add(self, other: WinStat) -> WinStat {
        WinStat {
            games: self.games + other.games,
            wins: self.wins + other.wins,
        }
    }
}

impl AddAssign for WinStat {
    fn add_assign(&mut self, other: WinStat) {
        self.games += other.games;
        self.wins += other.wins;
    }
}

impl Sum for WinStat {
    fn sum<I: Iterator<Item = WinStat>>(iter: I) -> Self {
        iter.fold(WinStat::default(), |a, b| a + b)
    }
}
