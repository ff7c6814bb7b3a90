use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::models::{Cycle, CycleSummary, DailyLog, WeeklyDigest};
use crate::statistics::mean;
use crate::tally;

/// Plain-language recap of a closed cycle. Open cycles have nothing to summarise yet.
pub fn cycle_summary(
    cycle: &Cycle,
    logs: &[DailyLog],
    config: &EngineConfig,
) -> Option<CycleSummary> {
    let end_date = cycle.end_date?;
    if !cycle.is_well_formed() {
        warn!(cycle_id = %cycle.id, "cannot summarise a cycle that ends before it starts");
        return None;
    }

    let settings = &config.narrative;
    let start_date = cycle.start_date;
    let length = (end_date - start_date).num_days() + 1;
    let cycle_logs: Vec<&DailyLog> = logs
        .iter()
        .filter(|l| l.date >= start_date && l.date <= end_date)
        .collect();

    let mut narrative = vec![format!("Cycle {} lasted {} days.", cycle.id, length)];
    let mut insights = Vec::new();

    if length < settings.short_cycle_days {
        insights.push(format!("Short cycle length ({length} days)."));
    } else if length > settings.long_cycle_days {
        insights.push(format!("Long cycle length ({length} days)."));
    } else {
        narrative.push("This is within the typical range.".to_string());
    }

    let heavy_days = cycle_logs
        .iter()
        .filter(|l| l.flow_level >= settings.heavy_flow)
        .count();
    if heavy_days > settings.heavy_days_insight {
        insights.push(format!("Experienced {heavy_days} days of heavy flow."));
    }

    let common_symptoms = tally::top(cycle_logs.iter().flat_map(|l| l.symptoms.iter()), 2);
    if !common_symptoms.is_empty() {
        let names: Vec<String> = common_symptoms.iter().map(|s| s.to_lowercase()).collect();
        narrative.push(format!(
            "Frequent symptoms included {}.",
            names.join(" and ")
        ));
    }

    if let Some(mood) = tally::dominant(cycle_logs.iter().flat_map(|l| l.moods.iter())) {
        insights.push(format!("Dominant mood: {mood}."));
    }

    Some(CycleSummary {
        cycle_id: cycle.id,
        start_date,
        end_date,
        length,
        narrative: narrative.join(" "),
        insights,
    })
}

/// Recap of the trailing week ending on `reference` (inclusive).
pub fn weekly_digest(
    logs: &[DailyLog],
    reference: NaiveDate,
    config: &EngineConfig,
) -> WeeklyDigest {
    let start_date = reference - Duration::days(config.narrative.digest_days - 1);
    let week: Vec<&DailyLog> = logs
        .iter()
        .filter(|l| l.date >= start_date && l.date <= reference)
        .collect();

    if week.is_empty() {
        debug!(%reference, "no logs in digest window");
        return WeeklyDigest {
            start_date,
            end_date: reference,
            narrative: "No logs recorded this week.".to_string(),
            dominant_mood: None,
            dominant_symptom: None,
        };
    }

    let mut narrative = Vec::new();

    let dominant_mood = tally::dominant(week.iter().flat_map(|l| l.moods.iter()));
    match &dominant_mood {
        Some(mood) => narrative.push(format!("You mostly felt {mood} this week.")),
        None => narrative.push("Your mood was balanced.".to_string()),
    }

    let dominant_symptom = tally::dominant(week.iter().flat_map(|l| l.symptoms.iter()));
    if let Some(symptom) = &dominant_symptom {
        narrative.push(format!("Top symptom was {symptom}."));
    }

    let sleep: Vec<f64> = week.iter().map(|l| l.sleep_hours).collect();
    let avg_sleep = mean(&sleep);
    if avg_sleep > 0.0 {
        narrative.push(format!("Average sleep: {avg_sleep:.1} hours."));
    }

    WeeklyDigest {
        start_date,
        end_date: reference,
        narrative: narrative.join(" "),
        dominant_mood,
        dominant_symptom,
    }
}
