use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// Company profile data from profile-capable providers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: Symbol,

    /// Company name
    pub name: String,

    /// Business sector (e.g., "Technology")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Industry within sector (e.g., "Consumer Electronics")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Business description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Number of full-time employees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u64>,

    /// Company website URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// Provider that supplied this profile
    pub source: String,
}

impl CompanyProfile {
    /// Create a profile with only the required fields.
    pub fn new(symbol: Symbol, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
            sector: None,
            industry: None,
            description: None,
            employee_count: None,
            website: None,
            source: source.into(),
        }
    }

    /// Set the sector
    pub fn sector(mut self, sector: Option<String>) -> Self {
        self.sector = sector.filter(|s| !s.trim().is_empty());
        self
    }

    /// Set the industry
    pub fn industry(mut self, industry: Option<String>) -> Self {
        self.industry = industry.filter(|s| !s.trim().is_empty());
        self
    }

    /// Set the description
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|s| !s.trim().is_empty());
        self
    }

    /// Set the website
    pub fn website(mut self, website: Option<String>) -> Self {
        self.website = website.filter(|s| !s.trim().is_empty());
        self
    }

    /// Set the employee count
    pub fn employee_count(mut self, employee_count: Option<u64>) -> Self {
        self.employee_count = employee_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_profile_builder() {
        let profile = CompanyProfile::new(Symbol::parse("AAPL").unwrap(), "Apple Inc.", "FINNHUB")
            .sector(Some("Technology".to_string()))
            .industry(Some(String::new()))
            .employee_count(Some(161_000));

        assert_eq!(profile.name, "Apple Inc.");
        assert_eq!(profile.sector, Some("Technology".to_string()));
        assert_eq!(profile.industry, None);
        assert_eq!(profile.employee_count, Some(161_000));
    }

    #[test]
    fn test_company_profile_serialization() {
        let profile = CompanyProfile::new(Symbol::parse("MSFT").unwrap(), "Microsoft", "ALPHA_VANTAGE")
            .website(Some("https://www.microsoft.com".to_string()));

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("Microsoft"));
        assert!(json.contains("website"));
        // Optional None fields should not be serialized
        assert!(!json.contains("employeeCount"));
    }
}
