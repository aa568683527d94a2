use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use cabinet::contentieux::ContentieuxService;
use cabinet::immobilier::{ImmobilierService, InactiveLeasePolicy, Periode};
use cabinet::import::{EntityKind, SpreadsheetImporter};
use cabinet::recouvrement::RecouvrementService;
use cabinet::store::MemoryStore;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Domain services wired over one shared in-memory store.
pub(crate) struct Services {
    pub(crate) contentieux: Arc<ContentieuxService<MemoryStore>>,
    pub(crate) immobilier: Arc<ImmobilierService<MemoryStore>>,
    pub(crate) recouvrement: Arc<RecouvrementService<MemoryStore>>,
    pub(crate) importer: Arc<SpreadsheetImporter<MemoryStore>>,
}

impl Services {
    pub(crate) fn in_memory(policy: InactiveLeasePolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let immobilier = Arc::new(ImmobilierService::new(store.clone(), policy));
        Self {
            contentieux: Arc::new(ContentieuxService::new(store.clone())),
            importer: Arc::new(SpreadsheetImporter::new(immobilier.clone())),
            immobilier,
            recouvrement: Arc::new(RecouvrementService::new(store)),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_periode(raw: &str) -> Result<Periode, String> {
    raw.parse::<Periode>().map_err(|err| err.to_string())
}

pub(crate) fn parse_kind(raw: &str) -> Result<EntityKind, String> {
    EntityKind::from_slug(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_policy(raw: &str) -> Result<InactiveLeasePolicy, String> {
    InactiveLeasePolicy::parse(raw).ok_or_else(|| {
        format!("'{raw}' must be include_ending_period or exclude_ending_period")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_value_parsers_report_bad_input() {
        assert_eq!(
            parse_date("2025-06-02"),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"))
        );
        assert!(parse_date("02/06/2025").is_err());
        assert!(parse_periode("2025-13").is_err());
        assert_eq!(parse_kind("Lots"), Ok(EntityKind::Lots));
        assert!(parse_kind("baux").unwrap_err().contains("baux"));
        assert_eq!(
            parse_policy("exclude"),
            Ok(InactiveLeasePolicy::ExcludeEndingPeriod)
        );
    }

    #[test]
    fn services_share_one_store() {
        let services = Services::in_memory(InactiveLeasePolicy::default());
        services
            .immobilier
            .create_locataire(cabinet::immobilier::NewLocataire {
                nom: "Diop".to_string(),
                prenom: None,
                telephone: None,
                email: None,
            })
            .expect("locataire created");

        let csv = "nom\nNdiaye\n";
        let report = services
            .importer
            .import(
                EntityKind::Locataires,
                csv.as_bytes(),
                cabinet::import::ImportFormat::Csv,
            )
            .expect("import runs");
        assert_eq!(report.created, 1);
        assert_eq!(
            services.immobilier.list_locataires().expect("list").len(),
            2
        );
    }
}
