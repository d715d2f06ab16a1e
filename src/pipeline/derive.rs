use crate::config::{keys, ConfigDocument, ConfigPath, Scalar};
use crate::error::{RefreshError, Result};
use crate::extract::Target;
use crate::normalize::{self, SalaryBasis};
use crate::settings::RefreshSettings;

/// Staged writes for one observation
pub(crate) type Updates = Vec<(ConfigPath, Scalar)>;

/// Turn a raw observation into the document fields it determines
///
/// Affordability and the exchange rate are read from `doc` as it stands now,
/// so a source sees the values written by the sources before it.
pub(crate) fn derive(target: Target, raw: f64, doc: &ConfigDocument, settings: &RefreshSettings) -> Result<Updates> {
    let root = ConfigPath::root();

    let updates = match target {
        Target::ExchangeRate => vec![(
            root.key(keys::EUR_TO_USD_10_YEAR_AVG),
            Scalar::Float(normalize::round_to(raw, normalize::EXCHANGE_RATE_PRECISION)),
        )],
        Target::Country { index } => {
            let affordability = positive(doc, &[keys::AFFORDABILITY, keys::AFFORDABILITY_RATIO])?;
            let (cost, compressed) = normalize::country_cost_of_living(raw, affordability, settings.compression);
            let country = root.key(keys::COUNTRIES).index(index);
            vec![
                (country.clone().key("cost_of_living"), Scalar::Float(cost)),
                (country.key("compressed_cost_of_living"), Scalar::Float(compressed)),
            ]
        }
        Target::City { index } => {
            let ratio = positive(doc, &[keys::AFFORDABILITY_RATIO, keys::AFFORDABILITY])?;
            let factor = normalize::location_factor(raw, ratio, settings.compression);
            vec![(root.key(keys::CITIES).index(index).key("locationFactor"), Scalar::Float(factor))]
        }
        Target::Role { career, role } => {
            let eur_to_usd = positive(doc, &[keys::EUR_TO_USD_10_YEAR_AVG])?;
            let basis = if settings.affordability_adjusted_salaries {
                SalaryBasis::AffordabilityAdjusted(positive(doc, &[keys::AFFORDABILITY_RATIO, keys::AFFORDABILITY])?)
            } else {
                SalaryBasis::Reference
            };
            let path = root.key(keys::CAREERS).index(career).key("roles").index(role).key("baseSalary");
            vec![(path, Scalar::Int(normalize::base_salary(raw, eur_to_usd, basis)))]
        }
    };

    Ok(updates)
}

/// First present key of `keys`, required to be a positive number since it is used as a divisor
fn positive(doc: &ConfigDocument, keys: &[&str]) -> Result<f64> {
    let value = doc.first_f64(keys)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RefreshError::ConfigFieldType { path: keys.join(" or "), expected: "positive number" })
    }
}
