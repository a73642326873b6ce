//! Plain-text rendering of a finished query.

use std::fmt::Write as _;

use cityscout_shared::{DailyForecast, Source, WorkflowState};

/// Aggregates over the forecast series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ForecastStats {
    pub avg_high: f64,
    pub avg_low: f64,
    pub total_precipitation: f64,
}

impl ForecastStats {
    /// `None` for an empty series.
    pub fn from_days(days: &[DailyForecast]) -> Option<Self> {
        if days.is_empty() {
            return None;
        }
        let n = days.len() as f64;
        Some(Self {
            avg_high: days.iter().map(|d| d.temp_max).sum::<f64>() / n,
            avg_low: days.iter().map(|d| d.temp_min).sum::<f64>() / n,
            total_precipitation: days.iter().map(|d| d.precipitation).sum(),
        })
    }
}

/// Capitalize the first letter of every word, lower-case the rest.
/// A word starts after any non-alphabetic character (`rio de janeiro` -> `Rio De Janeiro`).
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn knowledge_line(state: &WorkflowState) -> &'static str {
    match state.in_knowledge_base {
        Some(true) => "Information retrieved from knowledge base",
        Some(false) => "Information retrieved from web search",
        None => "Information source unknown",
    }
}

fn degraded_notes(state: &WorkflowState) -> Vec<String> {
    let provenance = &state.provenance;
    [
        ("summary", &provenance.summary),
        ("coordinates", &provenance.coordinates),
        ("forecast", &provenance.forecast),
        ("images", &provenance.images),
    ]
    .into_iter()
    .filter_map(|(field, source)| match source {
        Some(Source::Synthetic { failures }) => {
            let reasons: Vec<String> = failures.iter().map(ToString::to_string).collect();
            Some(format!("{field} is a fallback value ({})", reasons.join("; ")))
        }
        _ => None,
    })
    .collect()
}

/// Render the report. `show_notes` adds a line per fallback value.
pub(crate) fn render_text(state: &WorkflowState, show_notes: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail, so results are ignored below.
    let _ = writeln!(out, "\n  {}", title_case(&state.city));
    let _ = writeln!(out, "  {}\n", knowledge_line(state));

    let _ = writeln!(out, "  Summary");
    let _ = writeln!(out, "  {}\n", state.summary);

    let _ = writeln!(out, "  Weather forecast (next {} days)", state.forecast.len());
    match ForecastStats::from_days(&state.forecast) {
        Some(stats) => {
            let _ = writeln!(
                out,
                "  Avg high: {:.1}°C   Avg low: {:.1}°C   Total precipitation: {:.1}mm",
                stats.avg_high, stats.avg_low, stats.total_precipitation
            );
            let _ = writeln!(out, "  {:<12} {:>8} {:>8} {:>8}", "date", "high", "low", "rain");
            for day in &state.forecast {
                let _ = writeln!(
                    out,
                    "  {:<12} {:>8.1} {:>8.1} {:>8.1}",
                    day.date, day.temp_max, day.temp_min, day.precipitation
                );
            }
        }
        None => {
            let _ = writeln!(out, "  No forecast data available");
        }
    }

    let _ = writeln!(out, "\n  Images");
    for url in &state.images {
        let _ = writeln!(out, "  - {url}");
    }

    if show_notes {
        let notes = degraded_notes(state);
        if !notes.is_empty() {
            let _ = writeln!(out, "\n  Notes");
            for note in notes {
                let _ = writeln!(out, "  ! {note}");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityscout_shared::{Failure, FailureKind, ProviderError, Provenance};

    fn day(max: f64, min: f64, rain: f64) -> DailyForecast {
        DailyForecast {
            date: "2025-06-01".into(),
            temp_max: max,
            temp_min: min,
            precipitation: rain,
        }
    }

    #[test]
    fn stats_average_and_total() {
        let stats = ForecastStats::from_days(&[day(20.0, 10.0, 1.5), day(24.0, 12.0, 0.5)]).unwrap();
        assert_eq!(stats.avg_high, 22.0);
        assert_eq!(stats.avg_low, 11.0);
        assert_eq!(stats.total_precipitation, 2.0);
        assert!(ForecastStats::from_days(&[]).is_none());
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("PARIS"), "Paris");
        assert_eq!(title_case("saint-étienne"), "Saint-Étienne");
    }

    #[test]
    fn report_has_every_section() {
        let mut state = WorkflowState::pending("new york");
        state.in_knowledge_base = Some(true);
        state.summary = "The Big Apple.".into();
        state.forecast = vec![day(20.0, 10.0, 0.0), day(21.0, 11.0, 0.0)];
        state.images = vec!["https://images.example/1.jpg".into()];

        let text = render_text(&state, false);
        assert!(text.contains("New York"));
        assert!(text.contains("retrieved from knowledge base"));
        assert!(text.contains("The Big Apple."));
        assert!(text.contains("Avg high: 20.5°C"));
        assert!(text.contains("Avg low: 10.5°C"));
        assert!(text.contains("Total precipitation: 0.0mm"));
        assert!(text.contains("- https://images.example/1.jpg"));
    }

    #[test]
    fn notes_list_fallbacks() {
        let mut state = WorkflowState::pending("Nowhereville");
        state.in_knowledge_base = Some(false);
        state.provenance = Provenance {
            summary: Some(Source::live("gemini-1.5-flash")),
            forecast: Some(Source::Synthetic {
                failures: vec![Failure::new(
                    "tomorrow.io",
                    ProviderError::new(FailureKind::Timeout, "timed out"),
                )],
            }),
            ..Default::default()
        };

        let text = render_text(&state, true);
        assert!(text.contains("retrieved from web search"));
        assert!(text.contains("No forecast data available"));
        assert!(text.contains("forecast is a fallback value (tomorrow.io: timeout: timed out)"));
        assert!(!text.contains("summary is a fallback"));
    }
}
