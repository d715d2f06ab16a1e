//! Data sources and their extraction scripts
//!
//! Every source is one [`SourceKind`] driving the same page-script machinery
//! with its own template:
//! - script: the `NAVIGATE → CONFIGURE_QUERY → SUBMIT → AWAIT_READY → READ_VALUE` state machine
//! - templates: URLs and locators per site
//! - parse: page text to numbers

pub mod parse;
pub mod script;
pub mod templates;

pub use script::{Extraction, PageAction, PageScript, PageStep, Phase};

use crate::config::{keys, Career, City, ConfigDocument, ConfigPath, Country};
use crate::error::Result;
use crate::settings::ReferenceCity;
use std::fmt;

/// One source of refreshed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    ExchangeRate,
    CountryCostOfLiving,
    CityCostOfLiving,
    RoleSalary,
}

impl SourceKind {
    /// Every source in dependency order
    pub const ALL: [SourceKind; 4] = [
        SourceKind::ExchangeRate,
        SourceKind::CountryCostOfLiving,
        SourceKind::CityCostOfLiving,
        SourceKind::RoleSalary,
    ];

    /// Source with the given [`name`](Self::name)
    pub fn from_name(name: &str) -> Option<Self> {
        SourceKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::ExchangeRate => "exchange-rate",
            SourceKind::CountryCostOfLiving => "countries",
            SourceKind::CityCostOfLiving => "cities",
            SourceKind::RoleSalary => "salaries",
        }
    }

    /// Source whose result this one reads from the document
    pub fn depends_on(self) -> Option<SourceKind> {
        match self {
            SourceKind::RoleSalary => Some(SourceKind::ExchangeRate),
            _ => None,
        }
    }

    /// Collection whose last-updated date is stamped on success
    pub fn collection(self) -> Option<&'static str> {
        match self {
            SourceKind::ExchangeRate => None,
            SourceKind::CountryCostOfLiving => Some(keys::COUNTRIES),
            SourceKind::CityCostOfLiving => Some(keys::CITIES),
            SourceKind::RoleSalary => Some(keys::CAREERS),
        }
    }

    /// Work units for this source, read from the current document
    pub fn plan(self, doc: &ConfigDocument, reference: &ReferenceCity) -> Result<Plan> {
        let root = ConfigPath::root();
        let plan = match self {
            SourceKind::ExchangeRate => Plan {
                prelude: None,
                units: vec![WorkUnit {
                    label: keys::EUR_TO_USD_10_YEAR_AVG.to_string(),
                    target: Target::ExchangeRate,
                    extraction: templates::exchange_rate(),
                }],
            },
            SourceKind::CountryCostOfLiving => {
                let countries: Vec<Country> = doc.section(&root.key(keys::COUNTRIES))?;
                let units = countries
                    .into_iter()
                    .enumerate()
                    .map(|(index, country)| WorkUnit {
                        extraction: templates::country_cost_of_living(&country.name),
                        label: country.name,
                        target: Target::Country { index },
                    })
                    .collect();
                Plan { prelude: None, units }
            }
            SourceKind::CityCostOfLiving => {
                let cities: Vec<City> = doc.section(&root.key(keys::CITIES))?;
                let units = cities
                    .into_iter()
                    .enumerate()
                    .map(|(index, city)| WorkUnit {
                        extraction: templates::city_cost_of_living(
                            &reference.country,
                            &reference.city,
                            &city.country,
                            &city.name,
                        ),
                        label: format!("{}, {}", city.name, city.country),
                        target: Target::City { index },
                    })
                    .collect();
                Plan { prelude: None, units }
            }
            SourceKind::RoleSalary => {
                let careers: Vec<Career> = doc.section(&root.key(keys::CAREERS))?;
                let units = careers
                    .into_iter()
                    .enumerate()
                    .flat_map(|(career_index, career)| {
                        career.roles.into_iter().enumerate().map(move |(role_index, role)| WorkUnit {
                            extraction: templates::role_salary(&role.salary_com_key),
                            label: format!("{} / {}", career.name, role.name),
                            target: Target::Role { career: career_index, role: role_index },
                        })
                    })
                    .collect();
                Plan { prelude: Some(templates::salary_popup_prelude()), units }
            }
        };
        Ok(plan)
    }

    /// Turn the text read by this source's script into its raw observation
    pub fn parse(self, text: &str) -> Result<f64> {
        match self {
            SourceKind::ExchangeRate => parse::parse_exchange_rate(text),
            SourceKind::CountryCostOfLiving => Ok(parse::parse_relative_difference(text)?.ratio()),
            SourceKind::CityCostOfLiving => parse::parse_equivalent_salary_ratio(text),
            SourceKind::RoleSalary => parse::parse_salary(text),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Document entry a work unit refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    ExchangeRate,
    Country { index: usize },
    City { index: usize },
    Role { career: usize, role: usize },
}

/// One page lookup producing one observation
#[derive(Debug, Clone)]
pub struct WorkUnit {
    /// Human-readable name, e.g. the country
    pub label: String,
    pub target: Target,
    pub extraction: Extraction,
}

/// Everything a source will do in one run
#[derive(Debug, Clone)]
pub struct Plan {
    /// Steps run once before the units
    pub prelude: Option<PageScript>,
    pub units: Vec<WorkUnit>,
}

impl Plan {
    /// Progress steps across prelude and units
    pub fn step_count(&self) -> usize {
        self.prelude.as_ref().map_or(0, PageScript::len)
            + self.units.iter().map(|unit| unit.extraction.step_count()).sum::<usize>()
    }
}
