//! Plain-text rendering of sessions and decisions.

use std::fmt::Write;

use weatherlens_core::{Decision, Session, Verdict};

const TIME_FORMAT: &str = "%I:%M %p";

pub fn snapshot(session: &Session) -> String {
    let forecast = &session.forecast;
    let mut out = String::new();

    let _ = writeln!(out, "Location: {}", session.place.name);
    let _ = writeln!(out);

    let _ = writeln!(out, "Weather snapshot");
    let _ = writeln!(
        out,
        "  Now {:.1} °C   High {:.1} °C   Low {:.1} °C",
        forecast.current().slot.temperature_c,
        forecast.high_c(),
        forecast.low_c(),
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Air quality");
    match session.aqi() {
        Some(aqi) => {
            let _ = writeln!(out, "  {} air quality (AQI {aqi}, scale 1-5)", aqi.label());
            if aqi.is_poor() {
                let _ = writeln!(out, "  Breathing outdoors for long durations is not advised.");
            }
        }
        None => {
            let _ = writeln!(out, "  No reading available");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Rain update");
    match &session.rain_alert {
        Some(alert) => {
            let _ = writeln!(out, "  {}", alert.message());
        }
        None => {
            let _ = writeln!(out, "  No rain expected, skies look clear");
        }
    }
    let _ = writeln!(out);

    let best = session.best();
    let _ = writeln!(out, "Best time to step out");
    let _ = writeln!(
        out,
        "  {} (comfort score {:.2})",
        best.slot.time.format(TIME_FORMAT),
        best.score
    );

    out
}

pub fn decision(decision: &Decision, session: &Session) -> String {
    let mut out = String::new();
    let marker = match decision.verdict {
        Verdict::Safe => "[OK]",
        Verdict::Caution => "[!]",
        Verdict::NotRecommended => "[X]",
    };

    let _ = writeln!(out, "{marker} {}", decision.verdict.headline());
    let _ = writeln!(out);
    let _ = writeln!(out, "Why this decision?");
    if decision.reasons.is_empty() {
        let _ = writeln!(out, "  - Weather and air quality are suitable.");
    }
    for reason in &decision.reasons {
        let _ = writeln!(out, "  - {}", reason.explanation());
    }

    let evidence = &decision.evidence.slot;
    let aqi = session
        .aqi()
        .map_or_else(|| "n/a".to_string(), |aqi| aqi.to_string());
    let _ = writeln!(
        out,
        "Checked for {} · Temp {:.1}°C · Rain {} mm · AQI {aqi}",
        evidence.time.format(TIME_FORMAT),
        evidence.temperature_c,
        evidence.rain_mm,
    );

    out
}

pub fn details(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<18} {:>9} {:>9} {:>6}",
        "Time", "Temp (°C)", "Rain (mm)", "Score"
    );
    for s in session.forecast.slots() {
        let _ = writeln!(
            out,
            "{:<18} {:>9.1} {:>9.2} {:>6.2}",
            s.slot.time.format("%a %I:%M %p").to_string(),
            s.slot.temperature_c,
            s.slot.rain_mm,
            s.score,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeDelta};
    use weatherlens_core::{
        AirQualityIndex, ForecastSlot, ResolvedLocation, ScoredForecast, ScoringConfig,
        engine,
        model::{EventKind, Reason},
    };

    fn session(rows: &[(f64, f64)], aqi: i64) -> Session {
        let start = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
            .and_local_timezone(FixedOffset::east_opt(19_800).unwrap())
            .unwrap();
        let slots = rows.iter().enumerate().map(|(i, &(temperature_c, rain_mm))| ForecastSlot {
            time: start + TimeDelta::hours(3 * i as i64),
            temperature_c,
            rain_mm,
        });
        let forecast = ScoredForecast::build(
            slots,
            Some(AirQualityIndex::try_from(aqi).unwrap()),
            &ScoringConfig::default(),
        )
        .unwrap();

        Session {
            place: ResolvedLocation {
                latitude: 28.6,
                longitude: 77.2,
                name: "New Delhi".into(),
            },
            rain_alert: forecast.rain_alert(),
            forecast,
            fetched_at: start,
        }
    }

    #[test]
    fn snapshot_shows_alert_label_and_best_window() {
        let text = snapshot(&session(&[(24.0, 0.0), (30.0, 0.0), (22.0, 1.5)], 4));
        assert!(text.contains("Location: New Delhi"));
        assert!(text.contains("Now 24.0 °C   High 30.0 °C   Low 22.0 °C"));
        assert!(text.contains("Poor air quality (AQI 4, scale 1-5)"));
        assert!(text.contains("not advised"));
        assert!(text.contains("Rain likely in ~6 hours"));
        assert!(text.contains("08:30 AM (comfort score 0.85)"));
    }

    #[test]
    fn snapshot_without_rain() {
        let text = snapshot(&session(&[(24.0, 0.0)], 1));
        assert!(text.contains("No rain expected"));
        assert!(!text.contains("not advised"));
    }

    #[test]
    fn decision_lists_reasons_in_order() {
        let s = session(&[(25.0, 1.0)], 5);
        let d = engine::decide(&s.forecast.slots()[0], s.aqi(), EventKind::Outdoor);
        assert_eq!(d.reasons, vec![Reason::RainExpected, Reason::PoorAirQuality]);

        let text = decision(&d, &s);
        assert!(text.starts_with("[X] Not recommended"));
        let rain = text.find("Rain is expected").unwrap();
        let air = text.find("Air quality is poor").unwrap();
        assert!(rain < air);
        assert!(text.contains("Checked for 08:30 AM · Temp 25.0°C · Rain 1 mm · AQI 5"));
    }

    #[test]
    fn safe_decision_explains_itself() {
        let s = session(&[(22.0, 0.0)], 1);
        let d = engine::decide(&s.forecast.slots()[0], s.aqi(), EventKind::Indoor);
        let text = decision(&d, &s);
        assert!(text.starts_with("[OK] Safe to go"));
        assert!(text.contains("Weather and air quality are suitable."));
    }

    #[test]
    fn details_has_one_row_per_slot() {
        let text = details(&session(&[(24.0, 0.0), (30.0, 0.0), (22.0, 1.5)], 2));
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().next().unwrap().starts_with("Time"));
    }
}
