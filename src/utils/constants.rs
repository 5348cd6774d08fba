/// Observation store column names
pub const COL_LOCATION: &str = "location";
pub const COL_DATETIME: &str = "datetime";

/// Date-derived feature names
pub const FEATURE_LOCATION: &str = "location_enc";
pub const FEATURE_MONTH: &str = "month";
pub const FEATURE_DAY_OF_YEAR: &str = "dayofyear";

/// Lag offsets (days) and rolling window length
pub const LAG_OFFSETS: [usize; 3] = [1, 7, 14];
pub const ROLLING_WINDOW: usize = 3;

/// Forecast defaults
pub const DEFAULT_HORIZON: usize = 15;
pub const DEFAULT_HOLDOUT_DAYS: i64 = 60;

/// External weather source defaults
pub const DEFAULT_SOURCE_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";
pub const DEFAULT_UNIT_GROUP: &str = "metric";

/// File names
pub const DEFAULT_STORE_FILE: &str = "data/weather_history.csv";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const MODEL_FILE_SUFFIX: &str = "_model.json";
pub const CONFIG_FILE: &str = "heatcast";
pub const ENV_PREFIX: &str = "HEATCAST";

/// Heat risk band upper bounds (°C, exclusive)
pub const RISK_NORMAL_MAX: f64 = 27.0;
pub const RISK_CAUTION_MAX: f64 = 33.0;
pub const RISK_EXTREME_CAUTION_MAX: f64 = 41.0;
pub const RISK_DANGER_MAX: f64 = 51.0;

/// Divisions of the Colombo district served by default, as (name, lat, lon)
pub const DEFAULT_LOCATIONS: [(&str, f64, f64); 13] = [
    ("homagama", 6.845, 80.015),
    ("kaduwela", 6.936, 79.984),
    ("kolonnawa", 6.933, 79.885),
    ("colombo", 6.932, 79.846),
    ("moratuwa", 6.779, 79.883),
    ("padukka", 6.841, 80.093),
    ("dehiwala", 6.851, 79.866),
    ("kesbawa", 6.779, 79.947),
    ("rathmalana", 6.819, 79.881),
    ("seethawaka", 6.954, 80.205),
    ("thimbirigasyaya", 7.7102, 81.6924),
    ("maharagama", 6.848, 79.927),
    ("jayawardanapuna", 6.912, 79.883),
];
