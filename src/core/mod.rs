mod config;
mod engine;
mod types;

pub use config::{PlanConfig, TaxBracket};
pub use engine::{
    adjusted_projection, asset_endurance, calculate_plan, crossover_breakdown, crossover_point,
    effective_tax_rate, endurance_metrics, federal_tax, horizon_value, project_balances,
    run_session,
};
pub use types::{
    CalculationResult, CrossoverBreakdown, CrossoverResult, CrossoverYear, CrossoverYearRecord,
    Endurance, EnduranceMetrics, FilingStatus, Inputs, Session,
};
