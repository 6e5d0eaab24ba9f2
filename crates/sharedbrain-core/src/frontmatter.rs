use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use toml::value::Datetime;
use toml::{Table, Value};

/// Line that opens and closes a metadata block.
pub const DELIMITER: &str = "+++";

pub const TITLE_KEY: &str = "title";
pub const DATE_KEY: &str = "date";

/// A `+++` line with no matching closing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unterminated;

/// Split a document into its metadata block and the rest.
///
/// The block must start on the very first line. Returns `(None, text)` when the
/// document has no block at all.
pub fn split_frontmatter(text: &str) -> Result<(Option<&str>, &str), Unterminated> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((None, text));
    };
    if first.trim_end_matches(['\n', '\r']) != DELIMITER {
        return Ok((None, text));
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            let block = &text[block_start..offset];
            let body = &text[offset + line.len()..];
            return Ok((Some(block), body));
        }
        offset += line.len();
    }
    Err(Unterminated)
}

/// Key/value metadata from a document's `+++` block, in TOML.
///
/// Key order is preserved from the source; new keys are appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    fields: Table,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(block: &str) -> Result<Self, toml::de::Error> {
        let fields: Table = toml::from_str(block)?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &Table {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// The `title` field, if present. `Err` carries the type name when the
    /// field exists but is not a string.
    pub fn title(&self) -> Result<Option<&str>, &'static str> {
        match self.fields.get(TITLE_KEY) {
            None => Ok(None),
            Some(Value::String(title)) => Ok(Some(title)),
            Some(other) => Err(other.type_str()),
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.insert(TITLE_KEY, Value::String(title.to_string()));
    }

    /// The `date` field as a timestamp. Non-date values are left alone and
    /// read as "no date".
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        match self.fields.get(DATE_KEY)? {
            Value::Datetime(datetime) => to_timestamp(datetime),
            _ => None,
        }
    }

    pub fn set_date(&mut self, date: DateTime<FixedOffset>) {
        if let Some(datetime) = to_toml_datetime(date) {
            self.insert(DATE_KEY, Value::Datetime(datetime));
        }
    }

    /// Rewrite a partial `date` (date only, or no offset) as a full UTC timestamp.
    pub fn normalize_date(&mut self) {
        let is_partial = matches!(
            self.fields.get(DATE_KEY),
            Some(Value::Datetime(datetime)) if datetime.offset.is_none()
        );
        if is_partial {
            if let Some(date) = self.date() {
                self.set_date(date);
            }
        }
    }

    /// Serialize as a complete block, delimiters included.
    pub fn render(&self) -> Result<String, toml::ser::Error> {
        let body = toml::to_string(&self.fields)?;
        Ok(format!("{DELIMITER}\n{body}{DELIMITER}\n"))
    }
}

/// Convert a TOML datetime into a timestamp. Missing parts default to UTC
/// midnight, so `2019-08-26` reads as `2019-08-26T00:00:00Z`.
pub fn to_timestamp(datetime: &Datetime) -> Option<DateTime<FixedOffset>> {
    let text = datetime.to_string();
    if let Ok(full) = DateTime::parse_from_rfc3339(&text) {
        return Some(full);
    }
    let local = match (datetime.date.is_some(), datetime.time.is_some()) {
        (true, true) => NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f").ok()?,
        (true, false) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?,
        _ => return None,
    };
    Some(local.and_utc().fixed_offset())
}

fn to_toml_datetime(date: DateTime<FixedOffset>) -> Option<Datetime> {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true).parse().ok()
}

/// Timestamp for a calendar date at `time` UTC.
pub fn date_at(date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc).fixed_offset()
}
