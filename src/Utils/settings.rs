//! Run settings read from a flat TOML document.
//!
//! ```toml
//! function = "x**2 - 4*x + 4"
//! x_min = -10
//! x_max = 10
//! show_derivative = true
//! derivative_order = 1
//! show_integral = true
//! points = 1000
//! loglevel = "info"
//! log_to_file = false
//! log_file = "calculus.log"   # optional, timestamped name when omitted
//! csv_output = "plot.csv"     # optional
//! ```
//! Every key is optional; unknown keys are reported and ignored.
use crate::Utils::logging::parse_level;
use crate::numerical::plot_data::{MAX_DERIVATIVE_ORDER, PlotOptions};
use crate::numerical::sampler::DEFAULT_POINTS;
use log::{LevelFilter, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

const KNOWN_KEYS: [&str; 11] = [
    "function",
    "x_min",
    "x_max",
    "show_derivative",
    "derivative_order",
    "show_integral",
    "points",
    "loglevel",
    "log_to_file",
    "log_file",
    "csv_output",
];

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Toml(toml::de::Error),
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Cannot read settings: {}", e),
            SettingsError::Toml(e) => write!(f, "Malformed settings: {}", e),
            SettingsError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(e: toml::de::Error) -> Self {
        SettingsError::Toml(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub function: String,
    pub x_min: f64,
    pub x_max: f64,
    pub show_derivative: bool,
    pub derivative_order: usize,
    pub show_integral: bool,
    pub points: usize,
    pub loglevel: LevelFilter,
    pub log_to_file: bool,
    pub log_file: Option<PathBuf>,
    pub csv_output: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            function: "x**2 - 4*x + 4".to_string(),
            x_min: -10.0,
            x_max: 10.0,
            show_derivative: true,
            derivative_order: 1,
            show_integral: true,
            points: DEFAULT_POINTS,
            loglevel: LevelFilter::Info,
            log_to_file: false,
            log_file: None,
            csv_output: None,
        }
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn get_f64(table: &Table, key: &str) -> Result<Option<f64>, SettingsError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Float(v)) if v.is_finite() => Ok(Some(*v)),
        Some(Value::Integer(v)) => Ok(Some(*v as f64)),
        Some(_) => Err(invalid(key, "expected a finite number")),
    }
}

fn get_usize(table: &Table, key: &str) -> Result<Option<usize>, SettingsError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(v)) if *v >= 0 => Ok(Some(*v as usize)),
        Some(_) => Err(invalid(key, "expected a non-negative integer")),
    }
}

fn get_bool(table: &Table, key: &str) -> Result<Option<bool>, SettingsError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(v)) => Ok(Some(*v)),
        Some(_) => Err(invalid(key, "expected true or false")),
    }
}

fn get_string(table: &Table, key: &str) -> Result<Option<String>, SettingsError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(invalid(key, "expected a string")),
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let table: Table = content.parse()?;
        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("unknown settings key '{}' ignored", key);
            }
        }
        let mut settings = Settings::default();
        if let Some(function) = get_string(&table, "function")? {
            settings.function = function;
        }
        if let Some(x_min) = get_f64(&table, "x_min")? {
            settings.x_min = x_min;
        }
        if let Some(x_max) = get_f64(&table, "x_max")? {
            settings.x_max = x_max;
        }
        if let Some(flag) = get_bool(&table, "show_derivative")? {
            settings.show_derivative = flag;
        }
        if let Some(order) = get_usize(&table, "derivative_order")? {
            if !(1..=MAX_DERIVATIVE_ORDER).contains(&order) {
                return Err(invalid(
                    "derivative_order",
                    &format!("must be between 1 and {}", MAX_DERIVATIVE_ORDER),
                ));
            }
            settings.derivative_order = order;
        }
        if let Some(flag) = get_bool(&table, "show_integral")? {
            settings.show_integral = flag;
        }
        if let Some(points) = get_usize(&table, "points")? {
            if points == 0 {
                return Err(invalid("points", "at least one point is required"));
            }
            settings.points = points;
        }
        if let Some(level) = get_string(&table, "loglevel")? {
            settings.loglevel = parse_level(&level)
                .ok_or_else(|| invalid("loglevel", "must be debug, info, warn, error or off"))?;
        }
        if let Some(flag) = get_bool(&table, "log_to_file")? {
            settings.log_to_file = flag;
        }
        settings.log_file = get_string(&table, "log_file")?.map(PathBuf::from);
        settings.csv_output = get_string(&table, "csv_output")?.map(PathBuf::from);
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            include_derivative: self.show_derivative,
            derivative_order: self.derivative_order,
            include_integral: self.show_integral,
            points: self.points,
        }
    }

    /// Range handed to the assembler: when `x_min >= x_max`, `x_max` becomes `x_min + 1`.
    pub fn repaired_range(&self) -> (f64, f64) {
        if self.x_min >= self.x_max {
            let x_max = self.x_min + 1.0;
            warn!(
                "x_min ({}) must be less than x_max ({}), using [{}, {}]",
                self.x_min, self.x_max, self.x_min, x_max
            );
            (self.x_min, x_max)
        } else {
            (self.x_min, self.x_max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.plot_options(), PlotOptions::default());
    }

    #[test]
    fn test_all_keys() {
        let content = r#"
            function = "sin(x)"
            x_min = -3.5
            x_max = 4
            show_derivative = false
            derivative_order = 3
            show_integral = false
            points = 200
            loglevel = "debug"
            log_to_file = true
            log_file = "run.log"
            csv_output = "out.csv"
        "#;
        let settings = Settings::from_toml_str(content).unwrap();
        assert_eq!(settings.function, "sin(x)");
        assert_eq!(settings.x_min, -3.5);
        assert_eq!(settings.x_max, 4.0);
        assert!(!settings.show_derivative);
        assert_eq!(settings.derivative_order, 3);
        assert!(!settings.show_integral);
        assert_eq!(settings.points, 200);
        assert_eq!(settings.loglevel, LevelFilter::Debug);
        assert!(settings.log_to_file);
        assert_eq!(settings.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(settings.csv_output, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_invalid_values() {
        for content in [
            "derivative_order = 6",
            "derivative_order = 0",
            "points = 0",
            "points = -5",
            "loglevel = \"loud\"",
            "x_min = \"left\"",
            "show_integral = 1",
        ] {
            assert!(
                matches!(Settings::from_toml_str(content), Err(SettingsError::InvalidValue { .. })),
                "{}",
                content
            );
        }
        assert!(matches!(Settings::from_toml_str("x_min = "), Err(SettingsError::Toml(_))));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings = Settings::from_toml_str("colour = \"red\"").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_repaired_range() {
        let mut settings = Settings::default();
        assert_eq!(settings.repaired_range(), (-10.0, 10.0));
        settings.x_min = 5.0;
        settings.x_max = 5.0;
        assert_eq!(settings.repaired_range(), (5.0, 6.0));
        settings.x_max = -1.0;
        assert_eq!(settings.repaired_range(), (5.0, 6.0));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "function = \"1/x\"\npoints = 50").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.function, "1/x");
        assert_eq!(settings.points, 50);
        let missing = Settings::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(SettingsError::Io(_))));
    }
}
