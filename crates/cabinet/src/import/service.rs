use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::reader::{read_sheet, ImportFormat, Sheet, SheetRow};
use super::schema::{Column, EntityKind};
use super::ImportError;
use crate::error::ServiceError;
use crate::immobilier::{
    ImmobilierRepository, ImmobilierService, LotStatut, LotType, NewImmeuble, NewLocataire,
    NewLot,
};

/// A single problem found on a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Created,
    Failed,
}

/// Outcome for one data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// 1-based spreadsheet row; the header is row 1.
    pub row: usize,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Per-row results of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub kind: EntityKind,
    pub total_rows: usize,
    pub created: usize,
    pub failed: usize,
    pub rows: Vec<RowOutcome>,
}

impl ImportReport {
    fn new(kind: EntityKind, rows: Vec<RowOutcome>) -> Self {
        let created = rows
            .iter()
            .filter(|row| row.status == RowStatus::Created)
            .count();
        Self {
            kind,
            total_rows: rows.len(),
            created,
            failed: rows.len() - created,
            rows,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows
            .iter()
            .filter(|row| row.status == RowStatus::Failed)
    }
}

/// Loads buildings, lots and tenants from spreadsheets through the
/// [`ImmobilierService`], one row at a time. A failing row is reported and
/// never stops the run.
pub struct SpreadsheetImporter<R> {
    service: Arc<ImmobilierService<R>>,
}

impl<R> SpreadsheetImporter<R>
where
    R: ImmobilierRepository + 'static,
{
    pub fn new(service: Arc<ImmobilierService<R>>) -> Self {
        Self { service }
    }

    pub fn import(
        &self,
        kind: EntityKind,
        bytes: &[u8],
        format: ImportFormat,
    ) -> Result<ImportReport, ImportError> {
        let sheet = read_sheet(bytes, format, kind)?;
        let outcomes = sheet
            .rows
            .iter()
            .map(|row| self.import_row(kind, &sheet, row))
            .collect::<Vec<_>>();

        let report = ImportReport::new(kind, outcomes);
        info!(
            kind = kind.slug(),
            total = report.total_rows,
            created = report.created,
            failed = report.failed,
            "spreadsheet import finished"
        );
        Ok(report)
    }

    fn import_row(&self, kind: EntityKind, sheet: &Sheet, row: &SheetRow) -> RowOutcome {
        let values = RowValues { sheet, row };
        let created = match (&row.defect, kind) {
            (Some(defect), _) => Err(vec![defect.clone()]),
            (None, EntityKind::Immeubles) => self.create_immeuble(&values),
            (None, EntityKind::Lots) => self.create_lot(&values),
            (None, EntityKind::Locataires) => self.create_locataire(&values),
        };

        match created {
            Ok(id) => RowOutcome {
                row: row.number,
                status: RowStatus::Created,
                id: Some(id),
                errors: Vec::new(),
            },
            Err(errors) => {
                warn!(
                    kind = kind.slug(),
                    row = row.number,
                    errors = errors.len(),
                    "import row rejected"
                );
                RowOutcome {
                    row: row.number,
                    status: RowStatus::Failed,
                    id: None,
                    errors,
                }
            }
        }
    }

    fn create_immeuble(&self, values: &RowValues<'_>) -> Result<u64, Vec<FieldError>> {
        let mut errors = Vec::new();
        let columns = EntityKind::Immeubles.columns();
        let nom = values.required(&columns[0], &mut errors);
        let adresse = values.required(&columns[1], &mut errors);
        let (Some(nom), Some(adresse)) = (nom, adresse) else {
            return Err(errors);
        };

        let request = NewImmeuble {
            nom,
            adresse,
            ville: values.optional("ville"),
            proprietaire: values.optional("proprietaire"),
        };
        self.service
            .create_immeuble(request)
            .map(|immeuble| immeuble.id.0)
            .map_err(service_errors)
    }

    fn create_lot(&self, values: &RowValues<'_>) -> Result<u64, Vec<FieldError>> {
        let mut errors = Vec::new();
        let columns = EntityKind::Lots.columns();
        let immeuble_nom = values.required(&columns[0], &mut errors);
        let numero = values.required(&columns[1], &mut errors);
        let type_lot = values
            .choice(&columns[2], &mut errors)
            .and_then(|code| LotType::parse(&code));
        let etage = values.parsed::<i32>("etage", &mut errors);
        let superficie = values.decimal("superficie", &mut errors);
        let loyer_mensuel = match values.required(&columns[5], &mut errors) {
            Some(_) => values.decimal("loyer_mensuel", &mut errors),
            None => None,
        };
        let statut = values
            .choice(&columns[6], &mut errors)
            .and_then(|code| LotStatut::parse(&code));

        let immeuble = match immeuble_nom {
            Some(nom) => match self.service.find_immeuble_by_nom(&nom) {
                Ok(Some(immeuble)) => Some(immeuble),
                Ok(None) => {
                    errors.push(field_error("immeuble", format!("immeuble '{nom}' not found")));
                    None
                }
                Err(err) => return Err(service_errors(err)),
            },
            None => None,
        };

        let (Some(immeuble), Some(numero), Some(type_lot), Some(loyer_mensuel)) =
            (immeuble, numero, type_lot, loyer_mensuel)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let request = NewLot {
            immeuble_id: immeuble.id,
            numero,
            type_lot,
            etage,
            superficie,
            loyer_mensuel,
            statut,
        };
        self.service
            .create_lot(request)
            .map(|lot| lot.id.0)
            .map_err(service_errors)
    }

    fn create_locataire(&self, values: &RowValues<'_>) -> Result<u64, Vec<FieldError>> {
        let mut errors = Vec::new();
        let columns = EntityKind::Locataires.columns();
        let Some(nom) = values.required(&columns[0], &mut errors) else {
            return Err(errors);
        };

        let request = NewLocataire {
            nom,
            prenom: values.optional("prenom"),
            telephone: values.optional("telephone"),
            email: values.optional("email"),
        };
        self.service
            .create_locataire(request)
            .map(|locataire| locataire.id.0)
            .map_err(service_errors)
    }
}

struct RowValues<'a> {
    sheet: &'a Sheet,
    row: &'a SheetRow,
}

impl RowValues<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.sheet
            .column_index(key)
            .and_then(|index| self.row.cells.get(index))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn required(&self, column: &Column, errors: &mut Vec<FieldError>) -> Option<String> {
        let value = self.optional(column.name);
        if value.is_none() && column.required {
            let message = if self.sheet.column_index(column.name).is_none() {
                format!("missing column {}", column.name)
            } else {
                format!("{} is required", column.name)
            };
            errors.push(field_error(column.name, message));
        }
        value
    }

    /// Upper-cased value checked against the column's accepted set.
    fn choice(&self, column: &Column, errors: &mut Vec<FieldError>) -> Option<String> {
        let value = self.required(column, errors)?.to_ascii_uppercase();
        if column.allowed.contains(&value.as_str()) {
            Some(value)
        } else {
            errors.push(field_error(
                column.name,
                format!(
                    "invalid value '{value}' for {}, expected one of {}",
                    column.name,
                    column.allowed.join(", ")
                ),
            ));
            None
        }
    }

    fn parsed<T: FromStr>(&self, key: &str, errors: &mut Vec<FieldError>) -> Option<T> {
        let raw = self.get(key)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push(field_error(key, format!("'{raw}' is not a valid {key}")));
                None
            }
        }
    }

    /// Accepts a decimal comma and thousands spaces.
    fn decimal(&self, key: &str, errors: &mut Vec<FieldError>) -> Option<Decimal> {
        let raw = self.get(key)?;
        let normalized = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .replace(',', ".");
        match Decimal::from_str(&normalized) {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push(field_error(key, format!("'{raw}' is not a valid amount")));
                None
            }
        }
    }
}

fn field_error(field: &str, message: impl Into<String>) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.into(),
    }
}

fn service_errors(err: ServiceError) -> Vec<FieldError> {
    match err {
        ServiceError::Validation(fields) => fields
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |message| field_error(field, message.as_str()))
            })
            .collect(),
        other => vec![field_error("row", other.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immobilier::InactiveLeasePolicy;
    use crate::store::MemoryStore;

    fn importer() -> (SpreadsheetImporter<MemoryStore>, Arc<ImmobilierService<MemoryStore>>) {
        let service = Arc::new(ImmobilierService::new(
            Arc::new(MemoryStore::new()),
            InactiveLeasePolicy::default(),
        ));
        (SpreadsheetImporter::new(service.clone()), service)
    }

    #[test]
    fn missing_required_value_reports_row_and_field() {
        let (importer, service) = importer();
        let csv = "nom,adresse,ville\nAtlas,3 rue des Lilas,Thiès\nSans adresse,,Dakar\n";

        let report = importer
            .import(EntityKind::Immeubles, csv.as_bytes(), ImportFormat::Csv)
            .expect("import runs");

        assert_eq!(report.created, 1);
        assert_eq!(report.failed, 1);
        let failure = report.failures().next().expect("one failure");
        assert_eq!(failure.row, 3);
        assert_eq!(failure.errors[0].field, "adresse");
        assert_eq!(service.list_immeubles().expect("list").len(), 1);
    }

    #[test]
    fn absent_column_fails_each_row() {
        let (importer, _) = importer();
        let csv = "nom,ville\nAtlas,Thiès\nPalmiers,Dakar\n";

        let report = importer
            .import(EntityKind::Immeubles, csv.as_bytes(), ImportFormat::Csv)
            .expect("import runs");

        assert_eq!(report.failed, 2);
        assert!(report
            .failures()
            .all(|row| row.errors.iter().any(|error| error.message == "missing column adresse")));
    }

    #[test]
    fn lots_resolve_building_and_check_enums() {
        let (importer, service) = importer();
        service
            .create_immeuble(NewImmeuble {
                nom: "Résidence Atlas".to_string(),
                adresse: "3 rue des Lilas".to_string(),
                ville: None,
                proprietaire: None,
            })
            .expect("immeuble created");
        let csv = "immeuble,numero,type,etage,superficie,loyer_mensuel,statut\n\
résidence atlas,A1,f2,1,\"54,5\",350000,\n\
Résidence Atlas,A2,INVALID,2,,350000,LIBRE\n\
Résidence Atlas,A3,F3,2,,400000,MAINTENANCE\n\
Inconnu,B1,F1,,,200000,\n\
Résidence Atlas,A4,STUDIO,x,,abc,\n";

        let report = importer
            .import(EntityKind::Lots, csv.as_bytes(), ImportFormat::Csv)
            .expect("import runs");

        assert_eq!(report.total_rows, 5);
        assert_eq!(report.created, 1);
        let by_row = |number: usize| {
            report
                .rows
                .iter()
                .find(|row| row.row == number)
                .expect("row reported")
        };
        assert_eq!(by_row(2).status, RowStatus::Created);
        assert!(by_row(3).errors[0].message.contains("INVALID"));
        assert_eq!(by_row(4).errors[0].field, "statut");
        assert_eq!(by_row(5).errors[0].field, "immeuble");
        let fields = by_row(6)
            .errors
            .iter()
            .map(|error| error.field.as_str())
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["etage", "loyer_mensuel"]);
    }

    #[test]
    fn duplicate_name_is_reported_not_fatal() {
        let (importer, _) = importer();
        let csv = "nom,adresse\nAtlas,1 rue A\nATLAS,2 rue B\nPalmiers,3 rue C\n";

        let report = importer
            .import(EntityKind::Immeubles, csv.as_bytes(), ImportFormat::Csv)
            .expect("import runs");

        assert_eq!(report.created, 2);
        let failure = report.failures().next().expect("duplicate fails");
        assert_eq!(failure.row, 3);
        assert_eq!(failure.errors[0].field, "row");
    }
}
