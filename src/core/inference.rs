use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::{FileCategory, InferenceConfig, InferenceRule};
use super::patterns::ScanProfile;

/// The backend a set of frontend calls implies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredBackendContract {
    pub required_routes: BTreeSet<String>,
    pub required_env: Vec<String>,
    /// Entity name to field names
    pub entities: BTreeMap<String, BTreeSet<String>>,
    /// Entities backed by a table
    pub models: BTreeSet<String>,
    pub tables: BTreeSet<String>,
    /// Always carries every category, even when empty
    pub files: BTreeMap<FileCategory, BTreeSet<String>>,
}

impl InferredBackendContract {
    fn apply(&mut self, rule: &InferenceRule) {
        for entity in &rule.entities {
            self.entities
                .entry(entity.name.clone())
                .or_default()
                .extend(entity.fields.iter().cloned());

            if let Some(table) = &entity.table {
                self.models.insert(entity.name.clone());
                self.tables.insert(table.clone());
            }
        }

        for (category, names) in &rule.files {
            self.files.entry(*category).or_default().extend(names.iter().cloned());
        }
    }
}

/// Derives backend artifacts from observed call URLs using a rule table
pub struct BackendInferrer {
    rules: Vec<InferenceRule>,
    baseline_env: Vec<String>,
    contract_env: Vec<String>,
    baseline_files: BTreeMap<FileCategory, Vec<String>>,
}

impl BackendInferrer {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            rules: config.rules.clone(),
            baseline_env: config.baseline_env.clone(),
            contract_env: config.contract_env.clone(),
            baseline_files: config.baseline_files.clone(),
        }
    }

    /// A rule fires once if its trigger occurs in any URL; firing again
    /// for further matching URLs changes nothing.
    pub fn infer<I, S>(&self, urls: I, profile: ScanProfile) -> InferredBackendContract
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut contract = InferredBackendContract {
            required_routes: urls.into_iter().map(|u| u.as_ref().to_string()).collect(),
            required_env: self.baseline_env.clone(),
            ..Default::default()
        };

        if profile == ScanProfile::Contract {
            contract.required_env.extend(self.contract_env.iter().cloned());
        }

        for category in FileCategory::ALL {
            contract.files.insert(category, BTreeSet::new());
        }
        for (category, names) in &self.baseline_files {
            contract.files.entry(*category).or_default().extend(names.iter().cloned());
        }

        for rule in &self.rules {
            if contract.required_routes.iter().any(|url| url.contains(&rule.trigger)) {
                debug!("Inference rule '{}' fired", rule.trigger);
                contract.apply(rule);
            }
        }

        contract
    }
}

impl Default for BackendInferrer {
    fn default() -> Self {
        Self::new(&InferenceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityRule;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_booking_triggers_model_and_table() {
        let contract = BackendInferrer::default()
            .infer(["/api/booking/123"], ScanProfile::Architecture);

        assert_eq!(contract.models, set(&["Booking"]));
        assert_eq!(contract.tables, set(&["bookings"]));
        assert_eq!(contract.required_env, vec!["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME"]);
    }

    #[test]
    fn test_contract_profile_adds_jwt_secret() {
        let contract = BackendInferrer::default().infer(Vec::<String>::new(), ScanProfile::Contract);
        assert_eq!(contract.required_env.last().map(String::as_str), Some("JWT_SECRET"));
        assert_eq!(contract.required_env.len(), 5);
    }

    #[test]
    fn test_booking_entities_and_files() {
        let contract = BackendInferrer::default().infer(
            ["/api/bookings", "/api/bookings/export", "/api/users"],
            ScanProfile::Contract,
        );

        assert_eq!(
            contract.entities.get("Booking").unwrap(),
            &set(&["id", "tbrId", "vendorId", "trekCompanyName", "completedDate", "basefare", "status"])
        );
        assert_eq!(
            contract.entities.get("Tax").unwrap(),
            &set(&["gst", "commissionGst", "tcs", "tds", "totalLiability"])
        );
        assert_eq!(contract.files[&FileCategory::Services], set(&["bookingService.js", "taxService.js"]));
        assert_eq!(contract.files[&FileCategory::Models], set(&["Booking.js"]));
        assert_eq!(contract.files[&FileCategory::Middleware], set(&["auth.js"]));
        // Tax has no table, so it is an entity but not a model
        assert!(!contract.models.contains("Tax"));
    }

    #[test]
    fn test_no_trigger_keeps_baseline_only() {
        let contract = BackendInferrer::default()
            .infer(["/api/users", "/api/Booking"], ScanProfile::Contract);

        assert!(contract.entities.is_empty());
        assert!(contract.models.is_empty());
        assert_eq!(contract.files.len(), 6);
        assert!(contract.files[&FileCategory::Routes].is_empty());
        assert_eq!(contract.files[&FileCategory::Config], set(&["db.js"]));
        assert_eq!(contract.required_routes, set(&["/api/Booking", "/api/users"]));
    }

    #[test]
    fn test_custom_rules_merge_monotonically() {
        let mut config = InferenceConfig::default();
        config.rules.push(InferenceRule {
            trigger: "invoice".to_string(),
            entities: vec![EntityRule {
                name: "Booking".to_string(),
                fields: vec!["invoiceId".to_string()],
                table: Some("bookings".to_string()),
            }],
            files: BTreeMap::from([(FileCategory::Routes, vec!["invoiceRoutes.js".to_string()])]),
        });

        let contract = BackendInferrer::new(&config)
            .infer(["/api/bookings", "/api/invoices"], ScanProfile::Contract);

        let booking = contract.entities.get("Booking").unwrap();
        assert!(booking.contains("invoiceId"));
        assert!(booking.contains("tbrId"));
        assert_eq!(contract.files[&FileCategory::Routes], set(&["bookingRoutes.js", "invoiceRoutes.js"]));
        assert_eq!(contract.tables, set(&["bookings"]));
    }
}
