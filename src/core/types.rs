use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilingStatus {
    Single,
    MarriedJointly,
    MarriedSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::MarriedJointly,
        FilingStatus::MarriedSeparately,
        FilingStatus::HeadOfHousehold,
    ];
}

/// One submitted set of user inputs. Replaced wholesale on resubmission,
/// never patched.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub pre_tax_income: f64,
    /// `None` when the wealth field was left blank; normalized to zero during
    /// calculation. Distinct from an explicit zero.
    pub wealth_account: Option<f64>,
    pub state_income_tax: f64,
    pub filing_status: FilingStatus,
}

/// The derived calculation record. Every money field is rounded to whole
/// currency units except `after_tax_income`, which keeps its fractional
/// precision because downstream projections consume it directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub federal_tax: f64,
    pub total_tax: f64,
    pub after_tax_income: f64,
    pub target_spending: f64,
    pub target_saving: f64,
    pub estimated_saving: f64,
    pub estimated_spending: f64,
    pub wealth_account: f64,
}

/// Outcome of the systematic-withdrawal endurance estimate.
///
/// Deliberately a different type from [`CrossoverYear`]: assets that never
/// deplete and independence that never arrives are different facts, even
/// though the original encoding collapsed both to -1.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Endurance {
    /// Investment growth on the asset base covers spending forever.
    Indefinite,
    /// Assets are exhausted within the given year.
    DepletedAfter(u32),
}

impl Endurance {
    pub fn years(self) -> Option<u32> {
        match self {
            Endurance::Indefinite => None,
            Endurance::DepletedAfter(years) => Some(years),
        }
    }

    pub fn is_indefinite(self) -> bool {
        self == Endurance::Indefinite
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CrossoverYear {
    /// First year passive income meets or exceeds earned income. Year 0 means
    /// already financially independent at the starting asset level.
    Achieved(u32),
    Never,
}

impl CrossoverYear {
    pub fn year(self) -> Option<u32> {
        match self {
            CrossoverYear::Achieved(year) => Some(year),
            CrossoverYear::Never => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossoverYearRecord {
    pub year: u32,
    pub assets: f64,
    pub passive_income: f64,
    pub earned_income: f64,
}

#[derive(Debug, Clone)]
pub struct CrossoverResult {
    pub crossover_year: CrossoverYear,
    /// Year 0 through the crossover horizon, always fully populated.
    pub yearly_records: Vec<CrossoverYearRecord>,
}

#[derive(Debug, Clone)]
pub struct CrossoverBreakdown {
    pub worker: CrossoverResult,
    pub investor: CrossoverResult,
}

/// Endurance evaluated against both the current wealth and the projected
/// wealth at the end of the projection horizon, for both savings paths.
#[derive(Debug, Clone)]
pub struct EnduranceMetrics {
    pub worker_current: Endurance,
    pub investor_current: Endurance,
    pub worker_future: Endurance,
    pub investor_future: Endurance,
    pub worker_wealth_at_horizon: f64,
    pub investor_wealth_at_horizon: f64,
}

/// Everything derived from one submission. Owned by the caller; recomputed in
/// full on every submission, so there is no partial-update state to manage.
#[derive(Debug, Clone)]
pub struct Session {
    pub result: CalculationResult,
    pub worker_projection: Vec<f64>,
    pub investor_projection: Vec<f64>,
    pub crossover: CrossoverBreakdown,
    pub endurance: EnduranceMetrics,
}
