use super::types::FilingStatus;

/// One marginal bracket: the slice of income between the previous bracket's
/// ceiling and this one is taxed at `rate`. The final bracket of every table
/// carries an infinite ceiling and absorbs all remaining income.
#[derive(Copy, Clone, Debug)]
pub struct TaxBracket {
    pub ceiling: f64,
    pub rate: f64,
}

const fn bracket(ceiling: f64, rate: f64) -> TaxBracket {
    TaxBracket { ceiling, rate }
}

const SINGLE_2024: [TaxBracket; 7] = [
    bracket(11_925.0, 0.10),
    bracket(48_475.0, 0.12),
    bracket(103_350.0, 0.22),
    bracket(197_300.0, 0.24),
    bracket(250_525.0, 0.32),
    bracket(626_350.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

const MARRIED_JOINTLY_2024: [TaxBracket; 7] = [
    bracket(23_850.0, 0.10),
    bracket(96_950.0, 0.12),
    bracket(206_700.0, 0.22),
    bracket(394_600.0, 0.24),
    bracket(501_050.0, 0.32),
    bracket(751_600.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

const MARRIED_SEPARATELY_2024: [TaxBracket; 7] = [
    bracket(11_925.0, 0.10),
    bracket(48_475.0, 0.12),
    bracket(103_350.0, 0.22),
    bracket(197_300.0, 0.24),
    bracket(250_525.0, 0.32),
    bracket(375_800.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

const HEAD_OF_HOUSEHOLD_2024: [TaxBracket; 7] = [
    bracket(17_000.0, 0.10),
    bracket(64_850.0, 0.12),
    bracket(103_350.0, 0.22),
    bracket(197_300.0, 0.24),
    bracket(250_525.0, 0.32),
    bracket(626_350.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

/// Every tunable the engines read, bundled so a future tax year swaps in as
/// one unit without touching engine logic.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    pub tax_year: u16,
    /// Worker baseline savings rate applied to gross income.
    pub default_savings_rate: f64,
    /// Investor target spending as a share of after-tax income.
    pub after_tax_spending_rate: f64,
    /// Investor target spending as a share of existing wealth.
    pub wealth_spending_rate: f64,
    /// Blended annual investment return.
    pub investment_return_rate: f64,
    /// Rate at which assets are converted to passive income.
    pub withdrawal_rate: f64,
    pub projection_years: u32,
    pub crossover_horizon_years: u32,
    /// Upper bound on endurance iterations; the recurrence terminates on its
    /// own for any spending strictly above the sustainable threshold, so this
    /// only guards against near-threshold inputs that would grind for
    /// thousands of steps.
    pub endurance_cap_years: u32,
    single: &'static [TaxBracket],
    married_jointly: &'static [TaxBracket],
    married_separately: &'static [TaxBracket],
    head_of_household: &'static [TaxBracket],
}

impl PlanConfig {
    pub fn tax_year_2024() -> Self {
        Self {
            tax_year: 2024,
            default_savings_rate: 0.10,
            after_tax_spending_rate: 0.50,
            wealth_spending_rate: 0.05,
            investment_return_rate: 0.07,
            withdrawal_rate: 0.05,
            projection_years: 15,
            crossover_horizon_years: 50,
            endurance_cap_years: 1000,
            single: &SINGLE_2024,
            married_jointly: &MARRIED_JOINTLY_2024,
            married_separately: &MARRIED_SEPARATELY_2024,
            head_of_household: &HEAD_OF_HOUSEHOLD_2024,
        }
    }

    pub fn brackets(&self, status: FilingStatus) -> &[TaxBracket] {
        match status {
            FilingStatus::Single => self.single,
            FilingStatus::MarriedJointly => self.married_jointly,
            FilingStatus::MarriedSeparately => self.married_separately,
            FilingStatus::HeadOfHousehold => self.head_of_household,
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self::tax_year_2024()
    }
}
