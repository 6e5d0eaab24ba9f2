use crate::error::{BacklinkError, Result};
use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer};
use toml::Value;
use std::path::Path;

/// Which inbound date a stub inherits when several linking documents are dated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StubDatePolicy {
    /// The first dated source in discovery order.
    #[default]
    FirstDiscovered,
    Earliest,
    Latest,
}

/// Settings for a run. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Time of day (UTC) given to dates synthesized from `YYYY-MM-DD` filenames.
    /// Either a TOML local time (`08:30:00`) or a string (`"08:30:00"`).
    #[serde(deserialize_with = "deserialize_time")]
    pub default_time: NaiveTime,
    pub stub_date_policy: StubDatePolicy,
    pub backlinks_heading: String,
}

fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => text.parse().map_err(de::Error::custom),
        Value::Datetime(datetime) if datetime.date.is_none() && datetime.offset.is_none() => {
            let time = datetime
                .time
                .ok_or_else(|| de::Error::custom("expected a time of day"))?;
            NaiveTime::from_hms_nano_opt(
                time.hour.into(),
                time.minute.into(),
                time.second.into(),
                time.nanosecond,
            )
            .ok_or_else(|| de::Error::custom(format!("invalid time of day {datetime}")))
        }
        other => Err(de::Error::custom(format!(
            "expected a time of day like 21:00:00, found {}",
            other.type_str()
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
            stub_date_policy: StubDatePolicy::default(),
            backlinks_heading: "Backlinks".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BacklinkError::io(path, e))?;
        let config = Self::from_toml(&text).map_err(|e| BacklinkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(config.stub_date_policy, StubDatePolicy::FirstDiscovered);
        assert_eq!(config.backlinks_heading, "Backlinks");
    }

    #[test]
    fn parses_all_keys() {
        let config = Config::from_toml(
            "default-time = \"08:30:00\"\nstub-date-policy = \"latest\"\nbacklinks-heading = \"Linked from\"\n",
        )
        .unwrap();
        assert_eq!(config.default_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(config.stub_date_policy, StubDatePolicy::Latest);
        assert_eq!(config.backlinks_heading, "Linked from");
    }

    #[test]
    fn accepts_native_toml_time() {
        let config = Config::from_toml("default-time = 08:30:00\n").unwrap();
        assert_eq!(config.default_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn rejects_non_time_default_time() {
        assert!(Config::from_toml("default-time = 2020-04-19\n").is_err());
        assert!(Config::from_toml("default-time = 830\n").is_err());
        assert!(Config::from_toml("default-time = \"half past eight\"\n").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::from_toml("colour = \"blue\"\n").is_err());
    }

    #[test]
    fn load_reports_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stub-date-policy = \"random\"").unwrap();
        let err = Config::load(file.path()).expect_err("unknown policy should fail");
        assert!(matches!(err, BacklinkError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, BacklinkError::Io { .. }));
    }
}
