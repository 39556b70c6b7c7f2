use std::path::Path;

use urania::forecast::{MergedTransit, StationKind};
use urania::{BirthChartRecord, Chart, MoonPhase, YearlyForecast};

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn chart(chart: &Chart, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(chart);
    }
    println!("Chart for {}", chart.timestamp.to_rfc3339());
    for entry in &chart.entries {
        println!(
            "  {:<8} {:>7.3}  {} {:<11}{}",
            entry.body.name(),
            entry.longitude,
            entry.degree,
            entry.sign.name(),
            if entry.retrograde { " R" } else { "" }
        );
    }
    if !chart.is_complete() {
        println!("  partial chart, {} bodies missing:", chart.missing.len());
        for missing in &chart.missing {
            println!("    {}: {}", missing.body, missing.error);
        }
    }
    Ok(())
}

pub fn moon(phase: &MoonPhase, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(phase);
    }
    println!(
        "{} ({:.1}°, {:.0}% lit, {:.1} days old){}",
        phase.name,
        phase.phase_angle,
        phase.illumination * 100.0,
        phase.age_days,
        if phase.is_significant { " *" } else { "" }
    );
    Ok(())
}

pub fn birth_chart(
    id: &str,
    record: &BirthChartRecord,
    stored_at: &Path,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(record);
    }
    println!("Birth chart '{}' ({})", id, stored_at.display());
    for p in record.placements() {
        println!(
            "  {:<8} {:>2}°{:02}' {:<11}{}",
            p.body.name(),
            p.degree,
            p.minute,
            p.sign.name(),
            if p.retrograde { " R" } else { "" }
        );
    }
    Ok(())
}

pub fn forecast(
    forecast: &YearlyForecast,
    transits: &[MergedTransit],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "forecast": forecast,
            "transits": transits,
        }));
    }

    println!("Forecast {}", forecast.year);
    println!("Ingresses:");
    for t in transits {
        let when = t
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .or_else(|| t.date_hint.map(|d| format!("~{}", d)))
            .unwrap_or_else(|| "undated".to_string());
        let from = t.from_sign.map(|s| format!("{} -> ", s)).unwrap_or_default();
        println!(
            "  {:<17} {:<8} {}{}{}{}",
            when,
            t.body.name(),
            from,
            t.to_sign,
            if t.is_retrograde_reentry { " (retrograde)" } else { "" },
            t.title.as_deref().map(|title| format!("  {}", title)).unwrap_or_default()
        );
    }
    println!("Conjunctions:");
    for c in &forecast.conjunctions {
        println!(
            "  {:<17} {}-{} in {} ({:.2}°, {:?})",
            c.timestamp.format("%Y-%m-%d %H:%M"),
            c.body_a,
            c.body_b,
            c.sign,
            c.angular_separation_degrees,
            c.significance
        );
    }
    println!("Stations:");
    for s in &forecast.stations {
        let kind = match s.kind {
            StationKind::Retrograde => "stations retrograde",
            StationKind::Direct => "stations direct",
        };
        println!(
            "  {:<17} {} {} in {}",
            s.timestamp.format("%Y-%m-%d %H:%M"),
            s.body,
            kind,
            s.sign
        );
    }
    println!("By month:");
    for month in forecast.by_month() {
        println!(
            "  {:>2}  {} ingresses, {} conjunctions, {} stations",
            month.month,
            month.ingresses(),
            month.conjunctions(),
            month.stations()
        );
    }
    let unavailable = forecast.unavailable_bodies();
    if !unavailable.is_empty() {
        println!("Unavailable all year: {:?}", unavailable);
    }
    Ok(())
}
