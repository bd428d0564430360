use clap::Args;
use lendfront::eligibility::{
    assess, monthly_rate, EligibilityInput, EligibilityResult, LoanType, DEFAULT_TENURE_MONTHS,
    FOIR,
};
use lendfront::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Loan product key (car, twowheeler, gold, agriculture, personal, home, industrial,
    /// weaver, business, plot). Unknown keys use the fallback rate.
    #[arg(long, default_value = "personal")]
    pub(crate) loan_type: String,
    /// Gross monthly income
    #[arg(long)]
    pub(crate) monthly_income: f64,
    /// Installments already being paid every month
    #[arg(long, default_value_t = 0.0)]
    pub(crate) existing_emi: f64,
    /// Desired principal
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Repayment duration in months
    #[arg(long, default_value_t = DEFAULT_TENURE_MONTHS)]
    pub(crate) tenure_months: u32,
    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let EstimateArgs {
        loan_type,
        monthly_income,
        existing_emi,
        loan_amount,
        tenure_months,
        json,
    } = args;

    let input = EligibilityInput {
        loan_type: LoanType::from_key(&loan_type),
        monthly_income,
        existing_emi,
        loan_amount,
        loan_tenure_months: tenure_months,
    };

    let Some(result) = assess(&input) else {
        println!("Enter a positive monthly income, loan amount and tenure to estimate eligibility.");
        return Ok(());
    };

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Result unavailable as JSON: {err}"),
        }
    } else {
        println!("{}", render_estimate(&input, &result));
    }

    Ok(())
}

pub(crate) fn render_estimate(input: &EligibilityInput, result: &EligibilityResult) -> String {
    let annual_rate = input.loan_type.annual_rate();
    let verdict = if result.is_eligible {
        "Eligible"
    } else {
        "Not eligible"
    };

    let mut lines = vec![
        format!(
            "Loan eligibility estimate ({} @ {annual_rate}% p.a., monthly rate {:.6})",
            input.loan_type,
            monthly_rate(annual_rate)
        ),
        format!(
            "- Requested {:.0} over {} months -> EMI {:.0}",
            input.loan_amount, input.loan_tenure_months, result.monthly_emi
        ),
        format!(
            "- Affordable EMI {:.0} ({:.0}% of income {:.0} less existing EMI {:.0})",
            result.eligible_emi,
            FOIR * 100.0,
            input.monthly_income,
            input.existing_emi
        ),
        format!("- Maximum loan amount {:.0}", result.max_loan_amount),
        format!("Verdict: {verdict}"),
    ];

    if !result.is_eligible && result.max_loan_amount > 0.0 {
        lines.push(format!(
            "Consider a principal of at most {:.0} or a longer tenure.",
            result.max_loan_amount
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(income: f64, amount: f64) -> EligibilityInput {
        EligibilityInput {
            loan_type: LoanType::Personal,
            monthly_income: income,
            existing_emi: 0.0,
            loan_amount: amount,
            loan_tenure_months: 36,
        }
    }

    #[test]
    fn summary_reports_verdict_and_amounts() {
        let input = input(100_000.0, 500_000.0);
        let result = assess(&input).expect("computed");
        let rendered = render_estimate(&input, &result);

        assert!(rendered.contains("personal @ 10.99% p.a."));
        assert!(rendered.contains("EMI 16367"));
        assert!(rendered.contains("Affordable EMI 50000"));
        assert!(rendered.ends_with("Verdict: Eligible"));
    }

    #[test]
    fn ineligible_summary_suggests_a_smaller_principal() {
        let input = input(20_000.0, 900_000.0);
        let result = assess(&input).expect("computed");
        let rendered = render_estimate(&input, &result);

        assert!(rendered.contains("Verdict: Not eligible"));
        assert!(rendered.contains("Consider a principal of at most"));
    }
}
