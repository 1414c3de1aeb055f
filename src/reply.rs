// ✉️ Reply Formatting
// Outcome -> short WhatsApp text -> TwiML envelope

use crate::command::SummaryScope;
use crate::error::LedgerError;
use crate::ledger::{Outcome, SummaryReport};
use crate::record::ExpenseRecord;

pub const SUCCESS_MARK: &str = "✅";
pub const FAILURE_MARK: &str = "❌";

/// Shown for store and configuration faults; details go to the log only
pub const BACKEND_FAILURE: &str = "No pude acceder a la planilla. Probá de nuevo en un rato.";

/// Thousands-separated amount, `12500` -> `12.500`
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn recorded_message(record: &ExpenseRecord) -> String {
    let mut msg = format!(
        "{} Registrado: ${} en {}.",
        SUCCESS_MARK, record.amount, record.category
    );
    if !record.description.is_empty() {
        msg.push_str(&format!(" ({})", record.description));
    }
    msg
}

pub fn summary_message(report: &SummaryReport) -> String {
    let mut lines = Vec::new();

    let title = match &report.person {
        Some(person) => format!("📊 Resumen de {}", person),
        None => "📊 Resumen".to_string(),
    };
    lines.push(title);

    if matches!(report.scope, SummaryScope::Today | SummaryScope::Full) {
        lines.push(format!("Hoy: ${}", format_amount(report.totals.day)));
    }
    if matches!(report.scope, SummaryScope::Month | SummaryScope::Full) {
        lines.push(format!("Mes: ${}", format_amount(report.totals.month)));
        for entry in &report.categories {
            lines.push(format!("• {}: ${}", entry.category, format_amount(entry.total)));
        }
    }

    lines.join("\n")
}

/// Text for any request result. Never fails.
pub fn render(result: &Result<Outcome, LedgerError>) -> String {
    match result {
        Ok(Outcome::Recorded(record)) => recorded_message(record),
        Ok(Outcome::Summary(report)) => summary_message(report),
        Err(LedgerError::Parse(e)) => format!("{} {}", FAILURE_MARK, e.user_message()),
        Err(_) => format!("{} {}", FAILURE_MARK, BACKEND_FAILURE),
    }
}

// ============================================================================
// TWIML
// ============================================================================

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Messaging response body for the webhook
pub fn twiml(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{CategoryTotal, TargetDate, Totals};
    use crate::error::{ParseError, StoreError, USAGE_HINT};
    use chrono::NaiveDate;

    fn record(description: &str) -> ExpenseRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ExpenseRecord::new(ts, 5000, "comida", description, "Facu")
    }

    fn report(scope: SummaryScope, person: Option<&str>) -> SummaryReport {
        SummaryReport {
            scope,
            person: person.map(str::to_string),
            date: TargetDate::new(2024, 3, 9),
            totals: Totals { day: 3000, month: 1234567 },
            categories: vec![CategoryTotal { category: "comida".to_string(), total: 1234567 }],
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1.000");
        assert_eq!(format_amount(1234567), "1.234.567");
        assert_eq!(format_amount(-12500), "-12.500");
    }

    #[test]
    fn test_recorded_message() {
        assert_eq!(
            recorded_message(&record("almuerzo")),
            "✅ Registrado: $5000 en comida. (almuerzo)"
        );
        assert_eq!(recorded_message(&record("")), "✅ Registrado: $5000 en comida.");
    }

    #[test]
    fn test_summary_scopes() {
        let today = summary_message(&report(SummaryScope::Today, None));
        assert!(today.contains("Hoy: $3.000"));
        assert!(!today.contains("Mes"));

        let month = summary_message(&report(SummaryScope::Month, None));
        assert!(month.contains("Mes: $1.234.567"));
        assert!(month.contains("• comida: $1.234.567"));
        assert!(!month.contains("Hoy"));

        let full = summary_message(&report(SummaryScope::Full, Some("Facu")));
        assert!(full.starts_with("📊 Resumen de Facu"));
        assert!(full.contains("Hoy: $3.000") && full.contains("Mes: $1.234.567"));
    }

    #[test]
    fn test_errors_render_with_failure_mark() {
        let parse = render(&Err(LedgerError::Parse(ParseError::Usage)));
        assert!(parse.starts_with(FAILURE_MARK));
        assert!(parse.contains(USAGE_HINT));

        let store = render(&Err(LedgerError::Store(StoreError::Poisoned)));
        assert_eq!(store, format!("{} {}", FAILURE_MARK, BACKEND_FAILURE));
        assert!(!store.contains("poisoned"));
    }

    #[test]
    fn test_twiml_escapes_text() {
        assert_eq!(
            twiml("a < b & \"c\""),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Response><Message>a &lt; b &amp; &quot;c&quot;</Message></Response>"
        );
    }
}
