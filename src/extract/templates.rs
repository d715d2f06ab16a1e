//! Page scripts for each supported site
//!
//! URLs and locators live here and nowhere else. When a site changes its
//! layout, this is the file to update.

use super::script::{Extraction, PageAction, PageScript};
use crate::navigator::{Locator, Role};

pub const OFX_YEARLY_AVERAGES_URL: &str =
    "https://www.ofx.com/en-us/forex-news/historical-exchange-rates/yearly-average-rates/";

const NUMBEO_BASE_URL: &str = "https://www.numbeo.com/cost-of-living";

const SALARY_CALCULATOR_BASE_URL: &str = "https://www.salary.com/tools/salary-calculator";

/// Role page used to trigger and dismiss salary.com popups before the real lookups
const SALARY_WARMUP_KEY: &str = "web-designer-i";

/// Country every cost-of-living comparison is made against
pub const REFERENCE_COUNTRY: &str = "United States";

/// Third row of numbeo's index differences: cost of living including rent
const NUMBEO_COST_INCLUDING_RENT: &str =
    ".table_indices_diff > tbody:nth-child(1) > tr:nth-child(3) > td:nth-child(1)";

const NUMBEO_EQUIVALENT_SALARY: &str = ".summary_big";

/// Encode a query parameter value, spaces as `+`
fn query_value(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

/// Yearly EUR to USD average from ofx.com
pub fn exchange_rate() -> Extraction {
    PageScript::new()
        .navigate(OFX_YEARLY_AVERAGES_URL)
        .configure(
            "swap to EUR -> USD",
            PageAction::Click(Locator::id("historical-rate-swap-button")),
        )
        .configure("select yearly frequency", PageAction::Check(Locator::label("Yearly")))
        .submit("retrieve data", PageAction::Click(Locator::role(Role::Button, "Retrieve data")))
        .await_ready(Locator::role(Role::Cell, "Average"))
        .read(Locator::role(Role::Cell, "Average").next_sibling("td"))
}

pub fn country_url(country: &str) -> String {
    format!(
        "{}/compare_countries_result.jsp?country1={}&country2={}",
        NUMBEO_BASE_URL,
        query_value(REFERENCE_COUNTRY),
        query_value(country)
    )
}

/// Cost of living of `country` relative to the United States
pub fn country_cost_of_living(country: &str) -> Extraction {
    let difference = Locator::css(NUMBEO_COST_INCLUDING_RENT);
    PageScript::new()
        .navigate(country_url(country))
        .await_ready(difference.clone())
        .read(difference)
}

pub fn city_url(reference_country: &str, reference_city: &str, country: &str, city: &str) -> String {
    format!(
        "{}/compare_cities.jsp?country1={}&city1={}&country2={}&city2={}",
        NUMBEO_BASE_URL,
        query_value(reference_country),
        query_value(reference_city),
        query_value(country),
        query_value(city)
    )
}

/// Salary needed in `city` to match a salary in the reference city
pub fn city_cost_of_living(reference_country: &str, reference_city: &str, country: &str, city: &str) -> Extraction {
    let summary = Locator::css(NUMBEO_EQUIVALENT_SALARY);
    PageScript::new()
        .navigate(city_url(reference_country, reference_city, country, city))
        .await_ready(summary.clone())
        .read(summary)
}

pub fn salary_url(key: &str) -> String {
    format!("{}/{}", SALARY_CALCULATOR_BASE_URL, key)
}

/// Open salary.com once and close its popups so later pages are readable
pub fn salary_popup_prelude() -> PageScript {
    PageScript::new()
        .navigate(salary_url(SALARY_WARMUP_KEY))
        .configure(
            "close demo form",
            PageAction::Click(Locator::id("sal-demoform-popup").within(Locator::any_role(Role::Img)).first()),
        )
        .optional()
        .configure("close banner", PageAction::Click(Locator::role(Role::Button, "Close")))
        .optional()
}

/// US median salary of the role behind `key`
pub fn role_salary(key: &str) -> Extraction {
    let salary = Locator::id("top_salary_value");
    PageScript::new()
        .navigate(salary_url(key))
        .await_ready(salary.clone())
        .read(salary)
}
