//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::services::ChartReport;
use crate::domain::{fmt_deg_in_sign, fmt_deg_min, Language, Sign};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Placeholder for values that never arrived.
const UNKNOWN: &str = "—";

/// Render the full chart report as aligned tables.
pub fn render_report(report: &ChartReport) {
    let lang = report.language;

    header(section(lang, "Positions", "Posiciones"));
    for point in &report.points {
        match point.longitude() {
            Some(lon) => {
                let sign = Sign::from_longitude(lon);
                let house = point
                    .house
                    .map(|h| h.to_string())
                    .unwrap_or_else(|| UNKNOWN.into());
                detail(&format!(
                    "{:<14} {:<12} {:>8}  {} {}",
                    point.label,
                    sign.label(lang),
                    fmt_deg_in_sign(lon),
                    section(lang, "house", "casa"),
                    house,
                ));
            }
            None => detail(&format!("{:<14} {UNKNOWN}", point.label)),
        }
    }

    if !report.cusps.is_empty() {
        println!();
        header(section(lang, "Houses", "Casas"));
        for cusp in &report.cusps {
            let sign = Sign::from_longitude(cusp.longitude);
            detail(&format!(
                "{:<4} {:<12} {:>8}",
                cusp.number,
                sign.label(lang),
                fmt_deg_in_sign(cusp.longitude),
            ));
        }
    }

    if !report.aspects.is_empty() {
        println!();
        header(section(lang, "Aspects", "Aspectos"));
        for aspect in &report.aspects {
            let orb = aspect
                .orb
                .map(fmt_deg_min)
                .unwrap_or_else(|| UNKNOWN.into());
            detail(&format!(
                "{:<14} {:<12} — {:<12} orb {}",
                or_unknown(aspect.kind.label(lang)),
                aspect.label_a,
                aspect.label_b,
                orb,
            ));
        }
    }

    println!();
    header(section(lang, "Elements", "Elementos"));
    for (element, pct) in &report.elements {
        detail(&format!("{:<10} {:>3}%", element.label(lang), pct));
    }
    header(section(lang, "Modalities", "Modalidades"));
    for (modality, pct) in &report.modalities {
        detail(&format!("{:<10} {:>3}%", modality.label(lang), pct));
    }
}

/// An aspect record with no type field at all yields an empty label;
/// show the placeholder instead of a blank column.
fn or_unknown(label: String) -> String {
    if label.trim().is_empty() {
        UNKNOWN.into()
    } else {
        label
    }
}

fn section(lang: Language, en: &'static str, es: &'static str) -> &'static str {
    match lang {
        Language::En => en,
        Language::Es => es,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AspectType;

    #[test]
    fn missing_aspect_type_renders_as_placeholder() {
        let label = AspectType::Other(String::new()).label(Language::Es);
        assert_eq!(or_unknown(label), UNKNOWN);
        assert_eq!(or_unknown("Cuadratura".into()), "Cuadratura");
    }
}
