use super::types::ExpenseDna;

/// Fixed monthly growth rate used by the deterministic projection: 12% nominal
/// annual return compounded monthly.
pub const MONTHLY_RATE: f64 = 0.12 / 12.0;

/// Deterministic compound-growth projection with monthly contributions.
///
/// future = W * (1 + r)^n + M * (((1 + r)^n - 1) / r), r = 0.01, n = months.
/// The annuity term is well defined because r is a nonzero constant.
pub fn projected_wealth(current_wealth: f64, monthly_contribution: f64, months: u32) -> f64 {
    let growth = (1.0 + MONTHLY_RATE).powi(months as i32);
    let compound_principal = current_wealth * growth;
    let future_value_series = monthly_contribution * ((growth - 1.0) / MONTHLY_RATE);
    compound_principal + future_value_series
}

/// Monthly spend across the discretionary "vice" categories.
pub fn vice_spend(dna: &ExpenseDna) -> f64 {
    dna.shopping + dna.subscriptions + dna.trips + dna.party + dna.habits
}

/// Lifestyle risk score on a 0..100 scale: vice spend as a share of income,
/// capped at 100. Zero income scores 0 rather than dividing by zero.
pub fn expense_risk_score(dna: &ExpenseDna, monthly_income: f64) -> f64 {
    if monthly_income == 0.0 {
        return 0.0;
    }
    (vice_spend(dna) / monthly_income * 100.0).min(100.0)
}

/// Compact rupee rendering: crores above 1e7, lakhs above 1e5, otherwise
/// Indian-grouped digits.
pub fn format_inr(value: f64) -> String {
    if value >= 10_000_000.0 {
        return format!("\u{20B9}{:.2} Cr", value / 10_000_000.0);
    }
    if value >= 100_000.0 {
        return format!("\u{20B9}{:.2} L", value / 100_000.0);
    }
    format!("\u{20B9}{}", group_indian(value))
}

/// Indian digit grouping: the last three digits form one group, every earlier
/// pair forms another (12,34,567).
fn group_indian(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();

    let mut grouped = String::new();
    if digits.len() > 3 {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let head_bytes = head.as_bytes();
        let mut start = head_bytes.len() % 2;
        if start == 1 {
            grouped.push(head_bytes[0] as char);
        }
        while start < head_bytes.len() {
            if !grouped.is_empty() {
                grouped.push(',');
            }
            grouped.push(head_bytes[start] as char);
            grouped.push(head_bytes[start + 1] as char);
            start += 2;
        }
        grouped.push(',');
        grouped.push_str(tail);
    } else {
        grouped.push_str(&digits);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
