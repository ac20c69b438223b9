use super::config::PlanConfig;
use super::types::{
    CalculationResult, CrossoverBreakdown, CrossoverResult, CrossoverYear, CrossoverYearRecord,
    Endurance, EnduranceMetrics, FilingStatus, Inputs, Session,
};

/// Progressive federal tax from the bracket table for `status`.
///
/// Non-positive income yields zero tax; that is a defined default, not an
/// error. Brackets are walked in ascending ceiling order and the walk stops at
/// the first bracket whose ceiling covers the income, so the unbounded top
/// bracket absorbs everything above the last finite threshold.
pub fn federal_tax(income: f64, status: FilingStatus, cfg: &PlanConfig) -> f64 {
    if income <= 0.0 {
        return 0.0;
    }

    let mut tax = 0.0;
    let mut floor = 0.0;
    for bracket in cfg.brackets(status) {
        tax += (income.min(bracket.ceiling) - floor) * bracket.rate;
        if bracket.ceiling >= income {
            break;
        }
        floor = bracket.ceiling;
    }
    tax.round()
}

/// Share of income paid as tax, zero for non-positive income. Unrounded.
pub fn effective_tax_rate(tax: f64, income: f64) -> f64 {
    if income <= 0.0 { 0.0 } else { tax / income }
}

/// Derives the worker baseline and the investor target from one submission.
///
/// The investor figures start from the two-rate heuristic (spend half of
/// after-tax income plus a slice of wealth) and are then corrected so the
/// investor path never saves less or spends more than the worker path. The
/// saving floor is applied before the spending ceiling; the two corrections
/// are not commutative and the ceiling check must see the spending recomputed
/// by the floor.
pub fn calculate_plan(inputs: &Inputs, cfg: &PlanConfig) -> CalculationResult {
    let federal = federal_tax(inputs.pre_tax_income, inputs.filing_status, cfg);
    let total_tax = federal + inputs.state_income_tax;
    let after_tax = inputs.pre_tax_income - total_tax;
    let wealth = inputs.wealth_account.unwrap_or(0.0);

    let estimated_saving = inputs.pre_tax_income * cfg.default_savings_rate;
    let estimated_spending = after_tax - estimated_saving;

    let mut target_spending =
        cfg.after_tax_spending_rate * after_tax + cfg.wealth_spending_rate * wealth;
    let mut target_saving = (after_tax - target_spending).max(0.0);

    if target_saving < estimated_saving {
        target_saving = estimated_saving;
        target_spending = after_tax - target_saving;
    }
    if target_spending > estimated_spending {
        target_spending = estimated_spending;
        target_saving = after_tax - target_spending;
    }

    CalculationResult {
        federal_tax: federal,
        total_tax: total_tax.round(),
        after_tax_income: after_tax,
        target_spending: target_spending.round(),
        target_saving: target_saving.round(),
        estimated_saving: estimated_saving.round(),
        estimated_spending: estimated_spending.round(),
        wealth_account: wealth.round(),
    }
}

/// Year-by-year balances for a fixed annual contribution at the blended
/// return. The contribution lands at the start of each year, before growth;
/// swapping that order changes every recorded value. The running balance
/// compounds at full precision, only the recorded values are rounded.
pub fn project_balances(
    annual_saving: f64,
    years: u32,
    starting_balance: f64,
    cfg: &PlanConfig,
) -> Vec<f64> {
    let mut series = Vec::with_capacity(years as usize);
    let mut balance = starting_balance;
    for _ in 0..years {
        balance += annual_saving;
        balance *= 1.0 + cfg.investment_return_rate;
        series.push(balance.round());
    }
    series
}

/// Terminal balance after the configured projection horizon; equals the last
/// element of [`project_balances`] over the same horizon.
pub fn horizon_value(annual_saving: f64, starting_balance: f64, cfg: &PlanConfig) -> f64 {
    let mut balance = starting_balance;
    for _ in 0..cfg.projection_years {
        balance += annual_saving;
        balance *= 1.0 + cfg.investment_return_rate;
    }
    balance.round()
}

/// How long an asset base sustains a fixed annual spend.
///
/// Indefinite as soon as investment growth on the current base covers the
/// spend. Otherwise the year's spend comes out, the remainder grows, and the
/// loop continues; each pass either terminates or strictly shrinks the
/// runway. The iteration cap only matters for spending infinitesimally above
/// the sustainable threshold, where depletion is reported at the cap.
pub fn asset_endurance(annual_spending: f64, asset_base: f64, cfg: &PlanConfig) -> Endurance {
    let mut base = asset_base;
    for elapsed in 0..cfg.endurance_cap_years {
        if annual_spending <= base * cfg.investment_return_rate {
            return Endurance::Indefinite;
        }
        let remainder = base - annual_spending;
        if remainder <= 0.0 {
            return Endurance::DepletedAfter(elapsed + 1);
        }
        base = remainder * (1.0 + cfg.investment_return_rate);
    }
    Endurance::DepletedAfter(cfg.endurance_cap_years)
}

/// First year passive income (withdrawal rate times assets) meets or exceeds
/// a fixed earned income, simulating asset growth plus constant savings over
/// the crossover horizon.
///
/// Assets grow first and the year's savings land after growth, the opposite
/// convention from [`project_balances`]. Both conventions are preserved
/// as observed; unifying them changes the numbers.
pub fn crossover_point(
    earned_income: f64,
    current_assets: f64,
    annual_savings: f64,
    cfg: &PlanConfig,
) -> CrossoverResult {
    let horizon = cfg.crossover_horizon_years;
    let mut yearly_records = Vec::with_capacity(horizon as usize + 1);

    let mut assets = current_assets;
    let mut passive = assets * cfg.withdrawal_rate;
    let mut crossover_year = if passive >= earned_income {
        CrossoverYear::Achieved(0)
    } else {
        CrossoverYear::Never
    };
    yearly_records.push(CrossoverYearRecord {
        year: 0,
        assets: assets.round(),
        passive_income: passive.round(),
        earned_income,
    });

    for year in 1..=horizon {
        assets = assets * (1.0 + cfg.investment_return_rate) + annual_savings;
        passive = assets * cfg.withdrawal_rate;
        if crossover_year == CrossoverYear::Never && passive >= earned_income {
            crossover_year = CrossoverYear::Achieved(year);
        }
        yearly_records.push(CrossoverYearRecord {
            year,
            assets: assets.round(),
            passive_income: passive.round(),
            earned_income,
        });
    }

    CrossoverResult {
        crossover_year,
        yearly_records,
    }
}

/// Crossover for both paths: worker savings and investor savings, each
/// against the same after-tax income and starting wealth.
pub fn crossover_breakdown(calc: &CalculationResult, cfg: &PlanConfig) -> CrossoverBreakdown {
    CrossoverBreakdown {
        worker: crossover_point(
            calc.after_tax_income,
            calc.wealth_account,
            calc.estimated_saving,
            cfg,
        ),
        investor: crossover_point(
            calc.after_tax_income,
            calc.wealth_account,
            calc.target_saving,
            cfg,
        ),
    }
}

/// Endurance of current wealth and of projected horizon wealth, per path.
pub fn endurance_metrics(calc: &CalculationResult, cfg: &PlanConfig) -> EnduranceMetrics {
    let worker_wealth_at_horizon = horizon_value(calc.estimated_saving, calc.wealth_account, cfg);
    let investor_wealth_at_horizon = horizon_value(calc.target_saving, calc.wealth_account, cfg);

    EnduranceMetrics {
        worker_current: asset_endurance(calc.estimated_spending, calc.wealth_account, cfg),
        investor_current: asset_endurance(calc.target_spending, calc.wealth_account, cfg),
        worker_future: asset_endurance(calc.estimated_spending, worker_wealth_at_horizon, cfg),
        investor_future: asset_endurance(calc.target_spending, investor_wealth_at_horizon, cfg),
        worker_wealth_at_horizon,
        investor_wealth_at_horizon,
    }
}

/// Runs the whole pipeline for one submission and returns the session value
/// that replaces the original's shared mutable state. The caller owns the
/// lifecycle: build on submit, replace on resubmit, drop on navigation.
pub fn run_session(inputs: &Inputs, cfg: &PlanConfig) -> Session {
    let result = calculate_plan(inputs, cfg);
    let worker_projection = project_balances(
        result.estimated_saving,
        cfg.projection_years,
        result.wealth_account,
        cfg,
    );
    let investor_projection = project_balances(
        result.target_saving,
        cfg.projection_years,
        result.wealth_account,
        cfg,
    );
    let crossover = crossover_breakdown(&result, cfg);
    let endurance = endurance_metrics(&result, cfg);

    Session {
        result,
        worker_projection,
        investor_projection,
        crossover,
        endurance,
    }
}

/// The slider-driven third projection: an arbitrary annual saving clamped to
/// what after-tax income can actually fund.
pub fn adjusted_projection(
    calc: &CalculationResult,
    annual_saving: f64,
    cfg: &PlanConfig,
) -> Vec<f64> {
    let ceiling = calc.after_tax_income.max(0.0);
    let saving = annual_saving.clamp(0.0, ceiling);
    project_balances(saving, cfg.projection_years, calc.wealth_account, cfg)
}
