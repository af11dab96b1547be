use super::conditions::stale_answers;
use super::questionnaire::Questionnaire;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use std::path::Path;

/// Indicator id to selected option value. Owned by the caller; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap {
    entries: BTreeMap<String, String>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, indicator: &str) -> Option<&str> {
        self.entries.get(indicator).map(String::as_str)
    }

    pub fn contains(&self, indicator: &str) -> bool {
        self.entries.contains_key(indicator)
    }

    pub fn insert(&mut self, indicator: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(indicator.into(), value.into())
    }

    pub fn remove(&mut self, indicator: &str) -> Option<String> {
        self.entries.remove(indicator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(indicator, value)| (indicator.as_str(), value.as_str()))
    }

    /// Drops answers whose indicators are no longer eligible, cascading through
    /// dependent indicators, and returns the removed ids.
    pub fn prune_stale(&mut self, questionnaire: &Questionnaire) -> Vec<String> {
        let stale = stale_answers(questionnaire, self);
        for indicator in &stale {
            self.entries.remove(indicator);
        }
        stale
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AnswerImportError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a two-column `indicator,value` export. Blank values count as unanswered.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AnswerImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut answers = Self::new();
        let mut seen = HashSet::new();

        for record in csv_reader.deserialize::<AnswerRow>() {
            let row = record?;
            if !seen.insert(row.indicator.clone()) {
                return Err(AnswerImportError::DuplicateEntry(row.indicator));
            }
            if let Some(value) = row.value {
                answers.insert(row.indicator, value);
            }
        }

        Ok(answers)
    }

    /// Loads answers from a `.csv` export or a JSON object, chosen by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnswerImportError> {
        let path = path.as_ref();
        if is_csv_path(path) {
            let file = std::fs::File::open(path)?;
            Self::from_csv_reader(file)
        } else {
            let raw = std::fs::read_to_string(path)?;
            Self::from_json_str(&raw)
        }
    }
}

impl AnswerMap {
    /// Writes the `indicator,value` export read by [`AnswerMap::from_csv_reader`].
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), AnswerImportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["indicator", "value"])?;
        for (indicator, value) in self.iter() {
            csv_writer.write_record([indicator, value])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Saves answers as CSV or a JSON object, chosen by extension like [`AnswerMap::from_path`].
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), AnswerImportError> {
        let path = path.as_ref();
        if is_csv_path(path) {
            let file = std::fs::File::create(path)?;
            self.to_csv_writer(file)
        } else {
            let raw = serde_json::to_string_pretty(self)?;
            std::fs::write(path, raw)?;
            Ok(())
        }
    }
}

fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

impl<K, V> FromIterator<(K, V)> for AnswerMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(indicator, value)| (indicator.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for AnswerMap {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    indicator: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerImportError {
    #[error("failed to read answers: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid answer CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid answer JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("indicator '{0}' is answered more than once")]
    DuplicateEntry(String),
}
