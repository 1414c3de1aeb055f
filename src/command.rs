// 💬 Command Parser
// Classifies one line of WhatsApp text into exactly one command

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Which totals a summary command asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryScope {
    /// `hoy` - today's total only
    Today,
    /// `mes` - this month's total only
    Month,
    /// `resumen` - both totals
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `gasto <amount> <category> [description...]`
    RecordExpense {
        amount: i64,
        category: String,
        description: String,
    },

    /// `resumen [person]`, `hoy`, `mes`
    Summarize {
        scope: SummaryScope,
        person: Option<String>,
    },
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse one message. Pure: no store access, no clock.
pub fn parse_command(text: &str) -> Result<Command, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let Some(keyword) = tokens.first() else {
        return Err(ParseError::Usage);
    };

    match keyword.to_lowercase().as_str() {
        "gasto" => parse_expense(&tokens),
        "resumen" => {
            let person = if tokens.len() > 1 {
                Some(tokens[1..].join(" "))
            } else {
                None
            };
            Ok(Command::Summarize {
                scope: SummaryScope::Full,
                person,
            })
        }
        kw @ ("hoy" | "mes") => {
            if tokens.len() > 1 {
                return Err(ParseError::UnexpectedArguments {
                    keyword: kw.to_string(),
                });
            }
            let scope = if kw == "hoy" {
                SummaryScope::Today
            } else {
                SummaryScope::Month
            };
            Ok(Command::Summarize {
                scope,
                person: None,
            })
        }
        _ => Err(ParseError::Usage),
    }
}

fn parse_expense(tokens: &[&str]) -> Result<Command, ParseError> {
    if tokens.len() < 3 {
        return Err(ParseError::Usage);
    }

    let amount = parse_amount(tokens[1])?;
    let category = tokens[2].to_lowercase();
    let description = tokens[3..].join(" ");

    Ok(Command::RecordExpense {
        amount,
        category,
        description,
    })
}

/// Parse a whole, positive amount.
///
/// `.` and `,` are only accepted as thousands separators: the leading group
/// has 1-3 digits and every later group exactly 3. `"10.50"` is rejected
/// rather than read as 1050.
pub fn parse_amount(token: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidAmount(token.to_string());

    let groups: Vec<&str> = token.split(['.', ',']).collect();
    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());

    if !groups.iter().all(|g| all_digits(g)) {
        return Err(invalid());
    }
    if groups.len() > 1 && (groups[0].len() > 3 || groups[1..].iter().any(|g| g.len() != 3)) {
        return Err(invalid());
    }

    let amount = groups
        .concat()
        .parse::<i64>()
        .map_err(|_| invalid())?;

    if amount == 0 {
        return Err(invalid());
    }

    Ok(amount)
}
