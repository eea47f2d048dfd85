use crate::rank::{Ranking, WindowMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "chartbook";
const SETTINGS_FILE: &str = "settings.json";

const WEEKS_IN_MONTH: f64 = 4.345;
const MONTHS_IN_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WindowUnit {
    #[default]
    Weeks,
    Months,
    Years,
    AllTime,
    YearToDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSettings {
    #[serde(default = "default_window_duration")]
    pub window_duration: u32,
    #[serde(default)]
    pub window_unit: WindowUnit,
    #[serde(default = "default_chart_size")]
    pub chart_size: u32,
    #[serde(default = "default_min_plays")]
    pub min_plays_to_chart: u64,
}

fn default_window_duration() -> u32 {
    1
}

fn default_chart_size() -> u32 {
    100
}

fn default_min_plays() -> u64 {
    1
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            window_duration: default_window_duration(),
            window_unit: WindowUnit::default(),
            chart_size: default_chart_size(),
            min_plays_to_chart: default_min_plays(),
        }
    }
}

impl ChartSettings {
    // Month and year durations approximate to whole weeks before they reach
    // the sliding ranker; the two cumulative modes skip conversion.
    pub fn window_mode(&self) -> WindowMode {
        let duration = self.window_duration.max(1);
        match self.window_unit {
            WindowUnit::AllTime => WindowMode::AllTime,
            WindowUnit::YearToDate => WindowMode::YearToDate,
            WindowUnit::Weeks => WindowMode::Sliding(duration),
            WindowUnit::Months => {
                WindowMode::Sliding(((f64::from(duration) * WEEKS_IN_MONTH).floor() as u32).max(1))
            }
            WindowUnit::Years => WindowMode::Sliding(
                ((f64::from(duration) * MONTHS_IN_YEAR * WEEKS_IN_MONTH).floor() as u32).max(1),
            ),
        }
    }

    pub fn ranking(&self) -> Ranking {
        Ranking {
            mode: self.window_mode(),
            chart_size: self.chart_size.max(1),
            min_plays: self.min_plays_to_chart.max(1),
        }
    }
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("CHARTBOOK_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<ChartSettings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(ChartSettings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: ChartSettings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &ChartSettings) -> Result<()> {
    ensure_config_dir()?;
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("tempdir");
        unsafe {
            env::set_var("CHARTBOOK_CONFIG_DIR", dir.path().to_string_lossy().as_ref());
        }

        let settings = ChartSettings {
            window_unit: WindowUnit::AllTime,
            chart_size: 40,
            ..ChartSettings::default()
        };
        save_settings(&settings).expect("save");
        let loaded = load_settings().expect("load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: ChartSettings =
            serde_json::from_str(r#"{"window_unit":"all-time"}"#).expect("parse");
        assert_eq!(settings.window_unit, WindowUnit::AllTime);
        assert_eq!(settings.window_duration, 1);
        assert_eq!(settings.chart_size, 100);
        assert_eq!(settings.min_plays_to_chart, 1);
    }

    #[test]
    fn month_and_year_durations_convert_to_weeks() {
        let mut settings = ChartSettings {
            window_unit: WindowUnit::Months,
            window_duration: 1,
            ..ChartSettings::default()
        };
        assert_eq!(settings.window_mode(), WindowMode::Sliding(4));

        settings.window_duration = 3;
        assert_eq!(settings.window_mode(), WindowMode::Sliding(13));

        settings.window_unit = WindowUnit::Years;
        settings.window_duration = 1;
        assert_eq!(settings.window_mode(), WindowMode::Sliding(52));
    }

    #[test]
    fn zero_duration_is_clamped() {
        let settings = ChartSettings {
            window_duration: 0,
            ..ChartSettings::default()
        };
        assert_eq!(settings.window_mode(), WindowMode::Sliding(1));
        assert_eq!(settings.ranking().min_plays, 1);
    }

    #[test]
    fn cumulative_units_skip_conversion() {
        let mut settings = ChartSettings {
            window_unit: WindowUnit::AllTime,
            window_duration: 9,
            ..ChartSettings::default()
        };
        assert_eq!(settings.window_mode(), WindowMode::AllTime);
        settings.window_unit = WindowUnit::YearToDate;
        assert_eq!(settings.window_mode(), WindowMode::YearToDate);
    }
}
