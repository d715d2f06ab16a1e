//! Views of the collection entries the refresh plans from
//!
//! Only the fields that identify an entry are read. The derived fields
//! (`cost_of_living`, `locationFactor`, `baseSalary`, ...) are overwritten by
//! the refresh, so whatever they hold beforehand is ignored.

use serde::{Deserialize, Serialize};

/// Entry of the `countries` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub name: String,
}

/// Entry of the `cities` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct City {
    pub name: String,
    pub country: String,
}

/// Entry of the `careers` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Career {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub name: String,
    /// Page key on salary.com
    pub salary_com_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_deserialization() {
        let yaml = "name: Junior\nsalary_com_key: software-engineer-i\nbaseSalary: 4100\n";
        let role: Role = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(role.salary_com_key, "software-engineer-i");
    }

    #[test]
    fn test_stale_derived_values_are_ignored() {
        let role: Role =
            serde_yaml::from_str("name: Junior\nsalary_com_key: software-engineer-i\nbaseSalary: 4000.0\n").unwrap();
        assert_eq!(role.name, "Junior");

        let city: City = serde_yaml::from_str("name: Lisbon\ncountry: Portugal\nlocationFactor: TBD\n").unwrap();
        assert_eq!(city.country, "Portugal");

        let country: Country = serde_yaml::from_str("name: Spain\ncost_of_living: n/a\n").unwrap();
        assert_eq!(country.name, "Spain");
    }
}
