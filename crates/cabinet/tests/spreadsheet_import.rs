use std::io::Cursor;
use std::sync::Arc;

use cabinet::immobilier::{ImmobilierService, InactiveLeasePolicy, LotFilter, LotStatut, LotType};
use cabinet::import::{generate_template, EntityKind, ImportFormat, RowStatus, SpreadsheetImporter};
use cabinet::store::MemoryStore;
use calamine::{Reader, Xlsx};

fn importer() -> (
    SpreadsheetImporter<MemoryStore>,
    Arc<ImmobilierService<MemoryStore>>,
) {
    let service = Arc::new(ImmobilierService::new(
        Arc::new(MemoryStore::new()),
        InactiveLeasePolicy::default(),
    ));
    (SpreadsheetImporter::new(service.clone()), service)
}

#[test]
fn generated_templates_import_their_example_rows() {
    let (importer, service) = importer();

    for kind in [EntityKind::Immeubles, EntityKind::Lots, EntityKind::Locataires] {
        let template = generate_template(kind).expect("template builds");
        let report = importer
            .import(kind, &template, ImportFormat::Xlsx)
            .expect("template imports");
        assert_eq!(report.total_rows, 1, "{kind:?}");
        assert_eq!(report.created, 1, "{kind:?}: {:?}", report.rows);
        assert_eq!(report.rows[0].row, 2);
    }

    let lots = service.list_lots(&LotFilter::default()).expect("lots");
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].type_lot, LotType::F3);
    assert_eq!(lots[0].statut, LotStatut::Libre);
    assert_eq!(service.list_locataires().expect("locataires").len(), 1);
}

#[test]
fn template_sheets_are_named_after_the_kind() {
    let template = generate_template(EntityKind::Immeubles).expect("template builds");
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(template)).expect("valid xlsx");
    assert_eq!(
        workbook.sheet_names(),
        vec!["Immeubles".to_string(), "Aide".to_string()]
    );
}

#[test]
fn invalid_lot_type_is_reported_with_its_row() {
    let (importer, service) = importer();
    let immeubles = "nom,adresse\nRésidence Les Palmiers,14 avenue de la République\n";
    importer
        .import(EntityKind::Immeubles, immeubles.as_bytes(), ImportFormat::Csv)
        .expect("immeubles import");

    let lots = "immeuble,numero,type,etage,superficie,loyer_mensuel,statut\n\
Résidence Les Palmiers,A101,F3,1,72.5,450000,LIBRE\n\
Résidence Les Palmiers,A102,INVALID,1,,450000,\n\
Résidence Les Palmiers,A103,BUREAU,2,,300000,OCCUPE\n";
    let report = importer
        .import(EntityKind::Lots, lots.as_bytes(), ImportFormat::Csv)
        .expect("lots import");

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 1);
    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.row, 3);
    assert_eq!(failure.status, RowStatus::Failed);
    assert_eq!(failure.errors[0].field, "type");
    assert!(failure.errors[0].message.contains("INVALID"));
    assert_eq!(
        service.list_lots(&LotFilter::default()).expect("lots").len(),
        2
    );
}

#[test]
fn latin1_row_fails_alone_and_the_rest_import() {
    let (importer, service) = importer();
    let csv: &[u8] = b"nom,adresse\n\
Atlas,1 rue Carnot\n\
Caf\xe9 du Port,2 quai Est\n\
Palmiers,14 avenue de la R\xc3\xa9publique\n";

    let report = importer
        .import(EntityKind::Immeubles, csv, ImportFormat::Csv)
        .expect("import runs");

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 1);
    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.row, 3);
    assert_eq!(failure.errors[0].field, "nom");
    assert!(failure.errors[0].message.contains("UTF-8"));

    let noms = service
        .list_immeubles()
        .expect("immeubles")
        .into_iter()
        .map(|immeuble| immeuble.nom)
        .collect::<Vec<_>>();
    assert_eq!(noms.len(), 2);
    assert!(noms.contains(&"Palmiers".to_string()));
}
