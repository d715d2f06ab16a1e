//! Compression and normalization math
//!
//! Every function here is pure. Callers pass the affordability value as it is
//! currently stored in the document; nothing is cached between sources.

/// Decimal places for cost-of-living ratios and location factors
pub const RATIO_PRECISION: u32 = 2;

/// Decimal places for the exchange-rate average. It divides every salary,
/// so it keeps more digits than the ratios.
pub const EXCHANGE_RATE_PRECISION: u32 = 6;

/// Coefficient applied to the gap below affordability (and in both directions for `Uniform`)
pub const BELOW_AFFORDABILITY_COEFFICIENT: f64 = 0.33;

/// Coefficient applied to the gap above affordability under `Paired`
pub const ABOVE_AFFORDABILITY_COEFFICIENT: f64 = 0.67;

/// How a raw ratio is pulled towards the affordability reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionPolicy {
    /// 0.33 of the gap is kept below affordability, 0.67 above
    #[default]
    Paired,
    /// 0.33 of the gap is kept in both directions
    Uniform,
}

impl CompressionPolicy {
    /// Build a policy from the `asymmetric` flag: `true` selects the single-coefficient variant
    pub fn from_asymmetric(asymmetric: bool) -> Self {
        if asymmetric { CompressionPolicy::Uniform } else { CompressionPolicy::Paired }
    }

    /// Coefficient for a value on the given side of affordability
    pub fn coefficient(self, above_affordability: bool) -> f64 {
        match self {
            CompressionPolicy::Paired if above_affordability => ABOVE_AFFORDABILITY_COEFFICIENT,
            _ => BELOW_AFFORDABILITY_COEFFICIENT,
        }
    }
}

/// How a scraped US salary becomes a stored base salary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SalaryBasis {
    /// Monthly salary converted to the reference currency
    #[default]
    Reference,
    /// Same, scaled by the affordability ratio
    AffordabilityAdjusted(f64),
}

/// Shrink the distance between `value` and `affordability`
///
/// Returns `(value - affordability) * k + affordability` with `k` chosen by `policy`.
/// `affordability` itself is a fixed point.
pub fn compress_towards_affordability(value: f64, affordability: f64, policy: CompressionPolicy) -> f64 {
    if value == affordability {
        return value;
    }

    let k = policy.coefficient(value > affordability);
    (value - affordability) * k + affordability
}

/// Rescale a ratio so the affordability reference maps to 1.0
pub fn normalize_against_affordability_ratio(ratio: f64, affordability_ratio: f64) -> f64 {
    ratio / affordability_ratio
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Monthly base salary in the reference currency from a US annual salary
pub fn base_salary(annual_usd: f64, eur_to_usd: f64, basis: SalaryBasis) -> i64 {
    let monthly = annual_usd / 12.0 / eur_to_usd;
    let adjusted = match basis {
        SalaryBasis::Reference => monthly,
        SalaryBasis::AffordabilityAdjusted(ratio) => monthly * ratio,
    };
    adjusted.round() as i64
}

/// Stored `(cost_of_living, compressed_cost_of_living)` for a raw country ratio
pub fn country_cost_of_living(raw_ratio: f64, affordability: f64, policy: CompressionPolicy) -> (f64, f64) {
    (
        round_to(raw_ratio, RATIO_PRECISION),
        round_to(compress_towards_affordability(raw_ratio, affordability, policy), RATIO_PRECISION),
    )
}

/// Stored `locationFactor` for a raw equivalent-salary ratio
pub fn location_factor(raw_ratio: f64, affordability_ratio: f64, policy: CompressionPolicy) -> f64 {
    let compressed = compress_towards_affordability(raw_ratio, affordability_ratio, policy);
    round_to(normalize_against_affordability_ratio(compressed, affordability_ratio), RATIO_PRECISION)
}
