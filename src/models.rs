use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Menstrual flow intensity, ordinal 0-4.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum FlowLevel {
    #[default]
    None,
    Spotting,
    Light,
    Medium,
    Heavy,
}

impl FlowLevel {
    /// Out-of-range ordinals fall back to `None`.
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Spotting,
            2 => Self::Light,
            3 => Self::Medium,
            4 => Self::Heavy,
            _ => Self::None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Cervical mucus observation, ordinal 0-4. Watery and egg-white are the fertile readings.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum CervicalMucus {
    #[default]
    Dry,
    Sticky,
    Creamy,
    Watery,
    EggWhite,
}

impl CervicalMucus {
    /// Out-of-range ordinals fall back to `Dry`.
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Sticky,
            2 => Self::Creamy,
            3 => Self::Watery,
            4 => Self::EggWhite,
            _ => Self::Dry,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum SexDrive {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl SexDrive {
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::None,
        }
    }
}

/// Grouping of a symptom tag. Unknown names parse to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymptomCategory {
    Physical,
    Emotional,
    Discharge,
    Other,
}

impl SymptomCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "PHYSICAL",
            Self::Emotional => "EMOTIONAL",
            Self::Discharge => "DISCHARGE",
            Self::Other => "OTHER",
        }
    }

    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "PHYSICAL" => Self::Physical,
            "EMOTIONAL" => Self::Emotional,
            "DISCHARGE" => Self::Discharge,
            _ => Self::Other,
        }
    }
}

impl From<String> for SymptomCategory {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<SymptomCategory> for String {
    fn from(value: SymptomCategory) -> Self {
        value.as_str().to_owned()
    }
}

/// Kind of a single granular log entry. Unknown names parse to `Note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogEntryType {
    Symptom,
    Mood,
    Flow,
    Water,
    Sleep,
    SleepQuality,
    Note,
    Sex,
    Temperature,
    Mucus,
}

impl LogEntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symptom => "SYMPTOM",
            Self::Mood => "MOOD",
            Self::Flow => "FLOW",
            Self::Water => "WATER",
            Self::Sleep => "SLEEP",
            Self::SleepQuality => "SLEEP_QUALITY",
            Self::Note => "NOTE",
            Self::Sex => "SEX",
            Self::Temperature => "TEMPERATURE",
            Self::Mucus => "MUCUS",
        }
    }

    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "SYMPTOM" => Self::Symptom,
            "MOOD" => Self::Mood,
            "FLOW" => Self::Flow,
            "WATER" => Self::Water,
            "SLEEP" => Self::Sleep,
            "SLEEP_QUALITY" => Self::SleepQuality,
            "SEX" => Self::Sex,
            "TEMPERATURE" => Self::Temperature,
            "MUCUS" => Self::Mucus,
            _ => Self::Note,
        }
    }
}

impl From<String> for LogEntryType {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<LogEntryType> for String {
    fn from(value: LogEntryType) -> Self {
        value.as_str().to_owned()
    }
}

/// One period occurrence. Cycle length is measured between consecutive start dates,
/// not from `start_date` to `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Cycle {
    pub fn new(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
        }
    }

    /// An open cycle, or one whose end is not before its start.
    pub fn is_well_formed(&self) -> bool {
        self.end_date.map_or(true, |end| end >= self.start_date)
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Inclusive duration; open cycles are closed at `today`.
    pub fn duration_days(&self, today: NaiveDate) -> i64 {
        let end = self.end_date.unwrap_or(today);
        (end - self.start_date).num_days() + 1
    }
}

/// Everything the user recorded for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub flow_level: FlowLevel,
    #[serde(default)]
    pub moods: BTreeSet<String>,
    #[serde(default)]
    pub symptoms: BTreeSet<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub cervical_mucus: CervicalMucus,
    #[serde(default)]
    pub sleep_hours: f64,
    #[serde(default)]
    pub sleep_quality: u8, // 0-5
    #[serde(default)]
    pub water_intake: u32,
    #[serde(default)]
    pub sex_drive: SexDrive,
    #[serde(default)]
    pub notes: String,
}

impl DailyLog {
    /// An empty log for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            flow_level: FlowLevel::None,
            moods: BTreeSet::new(),
            symptoms: BTreeSet::new(),
            temperature: None,
            cervical_mucus: CervicalMucus::Dry,
            sleep_hours: 0.0,
            sleep_quality: 0,
            water_intake: 0,
            sex_drive: SexDrive::None,
            notes: String::new(),
        }
    }
}

/// Immutable cycle and log collections handed to the engine for one computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub cycles: Vec<Cycle>,
    pub logs: Vec<DailyLog>,
}

impl Snapshot {
    pub fn new(cycles: Vec<Cycle>, logs: Vec<DailyLog>) -> Self {
        Self { cycles, logs }
    }

    pub fn log_on(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.logs.iter().find(|l| l.date == date)
    }

    /// Logs dated within `[start, end]`, oldest first.
    pub fn logs_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&DailyLog> {
        let mut logs: Vec<&DailyLog> = self
            .logs
            .iter()
            .filter(|l| l.date >= start && l.date <= end)
            .collect();
        logs.sort_by_key(|l| l.date);
        logs
    }

    /// The well-formed cycle with the latest start date.
    pub fn latest_cycle(&self) -> Option<&Cycle> {
        self.cycles
            .iter()
            .filter(|c| c.is_well_formed())
            .max_by_key(|c| c.start_date)
    }
}

/// Predicted ovulation and the fertile days around it, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertileWindow {
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub ovulation_day: NaiveDate,
}

impl FertileWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.fertile_start && date <= self.fertile_end
    }
}

/// One projected future cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_start: NaiveDate,
    pub predicted_end: NaiveDate,
    pub fertility: FertileWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub total_cycles: usize,
    pub avg_cycle_length: Option<i64>,
    pub avg_period_length: i64,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub std_deviation: f64,
    pub irregular: bool,
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
}

/// Shape of recent cycle history. Unknown names parse to `Irregular`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnomalyType {
    Irregular,
    SuddenShift,
    TrendingLonger,
    TrendingShorter,
}

impl AnomalyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Irregular => "IRREGULAR",
            Self::SuddenShift => "SUDDEN_SHIFT",
            Self::TrendingLonger => "TRENDING_LONGER",
            Self::TrendingShorter => "TRENDING_SHORTER",
        }
    }

    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "SUDDEN_SHIFT" => Self::SuddenShift,
            "TRENDING_LONGER" => Self::TrendingLonger,
            "TRENDING_SHORTER" => Self::TrendingShorter,
            _ => Self::Irregular,
        }
    }
}

impl From<String> for AnomalyType {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<AnomalyType> for String {
    fn from(value: AnomalyType) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleAnomaly {
    pub anomaly_type: AnomalyType,
    pub description: String,
    pub severity: u8, // 1 (info) to 3 (alert)
}

/// Which signal an ovulation estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OvulationSource {
    Temperature,
    Mucus,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvulationEstimate {
    pub date: NaiveDate,
    pub source: OvulationSource,
}

/// Fixed, non-overlapping day ranges of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

impl CyclePhase {
    /// Days outside 1-17 (including 0 and anything past 35) count as luteal.
    pub fn for_day(day: i64) -> Self {
        match day {
            1..=5 => Self::Menstrual,
            6..=13 => Self::Follicular,
            14..=17 => Self::Ovulation,
            _ => Self::Luteal,
        }
    }

    pub fn days(self) -> std::ops::RangeInclusive<i64> {
        match self {
            Self::Menstrual => 1..=5,
            Self::Follicular => 6..=13,
            Self::Ovulation => 14..=17,
            Self::Luteal => 18..=35,
        }
    }
}

/// How often a symptom lands on a given cycle day across history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomCorrelation {
    pub symptom: String,
    pub cycle_day: u32,
    pub frequency: f64, // 0.0-1.0
    pub occurrences: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub length: i64,
    pub narrative: String,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDigest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub narrative: String,
    pub dominant_mood: Option<String>,
    pub dominant_symptom: Option<String>,
}

/// Flags painted on a single calendar cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFlags {
    pub is_period: bool,
    pub is_predicted_period: bool,
    pub is_fertile: bool,
    pub is_ovulation: bool,
    pub has_log: bool,
    pub flow: FlowLevel,
}

/// Position of a confirmed period day within its run of period days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    None,
    Start,
    Middle,
    End,
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub flags: DayFlags,
    pub period_type: PeriodType,
}

/// Data returned to the frontend for a month view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthData {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Home-screen view of the most recent cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStatus {
    pub current_cycle_day: i64,
    pub phase: CyclePhase,
    pub next_period_start: NaiveDate,
    pub days_until_period: i64,
    pub ovulation: OvulationEstimate,
    pub fertility: FertileWindow,
    pub is_fertile: bool,
    pub is_period_active: bool,
    pub is_period_ongoing: bool,
    pub is_ended_today: bool,
    pub days_remaining_in_period: Option<i64>,
    pub quick_log_symptoms: Vec<String>,
    pub anomalies: Vec<CycleAnomaly>,
    pub logged_today: bool,
}

/// Inclusive length of one closed cycle, for the history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleLength {
    pub start_date: NaiveDate,
    pub length: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Everything the analysis screen shows, computed in one pass over a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOverview {
    /// Closed cycles, oldest first.
    pub cycle_history: Vec<CycleLength>,
    /// Symptom tags in the history window, most frequent first.
    pub symptom_counts: Vec<TagCount>,
    pub mood_counts: Vec<TagCount>,
    /// Most recent closed cycles first.
    pub recent_summaries: Vec<CycleSummary>,
    pub weekly_digest: WeeklyDigest,
    pub correlations: Vec<SymptomCorrelation>,
    pub anomalies: Vec<CycleAnomaly>,
}

/// How often a medication is taken. Unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MedicationFrequency {
    Daily,
    Weekly,
    AsNeeded,
    Other(String),
}

impl From<String> for MedicationFrequency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "as_needed" => Self::AsNeeded,
            _ => Self::Other(value),
        }
    }
}

impl From<MedicationFrequency> for String {
    fn from(value: MedicationFrequency) -> Self {
        match value {
            MedicationFrequency::Daily => "daily".into(),
            MedicationFrequency::Weekly => "weekly".into(),
            MedicationFrequency::AsNeeded => "as_needed".into(),
            MedicationFrequency::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    pub frequency: MedicationFrequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}
