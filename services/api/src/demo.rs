use crate::infra::{parse_date, parse_policy, Services};
use cabinet::contentieux::{
    AudienceFilter, AudienceStatistics, AudienceStatut, NewAffaire, NewAudience, NewResultat,
    TypeAudience, TypeResultat,
};
use cabinet::error::AppError;
use cabinet::immobilier::{
    ImmeubleBilan, ImmobilierDashboard, InactiveLeasePolicy, LotStatut, LotType, NewBail,
    NewDepense, NewEncaissement, NewImmeuble, NewLocataire, NewLot, Periode,
};
use cabinet::recouvrement::{NewCreance, NewDossier, NewPaiement, RecouvrementStatistics};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Rent policy for leases ending mid-period
    #[arg(long, value_parser = parse_policy)]
    pub(crate) policy: Option<InactiveLeasePolicy>,
}

/// Figures printed at the end of a demo run.
#[derive(Debug)]
pub(crate) struct DemoOutcome {
    pub(crate) audiences: AudienceStatistics,
    pub(crate) reminders: usize,
    pub(crate) dashboard: ImmobilierDashboard,
    pub(crate) bilan: ImmeubleBilan,
    pub(crate) recouvrement: RecouvrementStatistics,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = today.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN));
    let services = Services::in_memory(args.policy.unwrap_or_default());

    let outcome = seed_demo(&services, now)?;
    render_demo(&services, &outcome, now)
}

fn amount(value: i64) -> Decimal {
    Decimal::from(value)
}

pub(crate) fn seed_demo(services: &Services, now: NaiveDateTime) -> Result<DemoOutcome, AppError> {
    let today = now.date();
    let contentieux = &services.contentieux;

    let affaire = contentieux.create_affaire(
        NewAffaire {
            reference: "RG 2025/0142".to_string(),
            intitule: "SCI Palmiers c/ Diop".to_string(),
            juridiction: Some("Tribunal de grande instance".to_string()),
        },
        now,
    )?;
    let hearing = |date: NaiveDate, type_audience: TypeAudience, rappel: bool| NewAudience {
        affaire_id: affaire.id,
        date,
        heure: NaiveTime::from_hms_opt(10, 30, 0),
        type_audience,
        juridiction: None,
        salle: Some("Salle 2".to_string()),
        notes: None,
        rappel_enrolement: rappel,
        date_rappel_enrolement: rappel.then(|| today + Duration::days(1)),
    };

    contentieux.schedule_audience(
        hearing(today - Duration::days(7), TypeAudience::MiseEnEtat, false),
        now,
    )?;
    let adjourned = contentieux.schedule_audience(
        hearing(today - Duration::days(14), TypeAudience::Plaidoirie, false),
        now,
    )?;
    contentieux.record_resultat(
        adjourned.id,
        NewResultat {
            type_resultat: TypeResultat::Renvoi,
            nouvelle_date: Some(today + Duration::days(10)),
            motif_renvoi: Some("Conclusions adverses non communiquées".to_string()),
            texte_delibere: None,
        },
        now,
    )?;
    contentieux.schedule_audience(
        hearing(today + Duration::days(3), TypeAudience::Refere, true),
        now,
    )?;

    let immobilier = &services.immobilier;
    let periode = Periode::containing(today);
    let immeuble = immobilier.create_immeuble(NewImmeuble {
        nom: "Résidence Les Palmiers".to_string(),
        adresse: "14 avenue de la République".to_string(),
        ville: Some("Dakar".to_string()),
        proprietaire: Some("SCI Palmiers".to_string()),
    })?;
    let lot = |numero: &str, type_lot: LotType, loyer: i64, statut: Option<LotStatut>| NewLot {
        immeuble_id: immeuble.id,
        numero: numero.to_string(),
        type_lot,
        etage: Some(1),
        superficie: None,
        loyer_mensuel: amount(loyer),
        statut,
    };
    let a1 = immobilier.create_lot(lot("A1", LotType::F3, 450_000, None))?;
    let a2 = immobilier.create_lot(lot("A2", LotType::Studio, 200_000, None))?;
    let maintenance = Some(LotStatut::Maintenance);
    immobilier.create_lot(lot("B1", LotType::Magasin, 300_000, maintenance))?;

    for (nom, prenom, lot_id, paye) in [
        ("Ndiaye", "Fatou", a1.id, 450_000),
        ("Diop", "Moussa", a2.id, 120_000),
    ] {
        let locataire = immobilier.create_locataire(NewLocataire {
            nom: nom.to_string(),
            prenom: Some(prenom.to_string()),
            telephone: None,
            email: None,
        })?;
        immobilier.create_bail(NewBail {
            locataire_id: locataire.id,
            lot_id,
            montant_loyer: None,
            jour_echeance: None,
            date_debut: periode.first_day(),
            date_fin: None,
        })?;
        immobilier.record_encaissement(NewEncaissement {
            lot_id,
            periode,
            montant: amount(paye),
            date_encaissement: periode.first_day(),
            mode_paiement: Some("VIREMENT".to_string()),
        })?;
    }
    immobilier.record_depense(NewDepense {
        immeuble_id: immeuble.id,
        libelle: "Entretien ascenseur".to_string(),
        montant: amount(75_000),
        date_depense: periode.first_day(),
    })?;

    let recouvrement = &services.recouvrement;
    let dossier = recouvrement.create_dossier(
        NewDossier {
            reference: "REC-2025-007".to_string(),
            creancier: "SCI Palmiers".to_string(),
            debiteur: "Moussa Diop".to_string(),
            creances: vec![NewCreance {
                libelle: "Loyers impayés".to_string(),
                montant: amount(300_000),
                date_echeance: None,
            }],
        },
        now,
    )?;
    recouvrement.add_creance(
        dossier.dossier.id,
        NewCreance {
            libelle: "Frais de procédure".to_string(),
            montant: amount(100_000),
            date_echeance: None,
        },
    )?;
    recouvrement.record_paiement(
        dossier.dossier.id,
        NewPaiement {
            montant: amount(150_000),
            date_paiement: today,
            mode_paiement: Some("ESPECES".to_string()),
            reference: None,
        },
    )?;

    Ok(DemoOutcome {
        audiences: contentieux.statistics(now)?,
        reminders: contentieux.reminders(None, now)?.len(),
        dashboard: immobilier.dashboard(periode)?,
        bilan: immobilier.bilan(immeuble.id, periode)?,
        recouvrement: recouvrement.statistics()?,
    })
}

fn render_demo(
    services: &Services,
    outcome: &DemoOutcome,
    now: NaiveDateTime,
) -> Result<(), AppError> {
    println!("=== Contentieux ({}) ===", now.date());
    for audience in services.contentieux.list_audiences(&AudienceFilter::default(), now)? {
        println!(
            "  #{} {} {:?} - {}",
            audience.id.0,
            audience.date,
            audience.type_audience,
            audience.statut.label()
        );
    }
    for statut in AudienceStatut::ordered() {
        println!("  {}: {}", statut.label(), outcome.audiences.count(statut));
    }
    println!("  Rappels d'enrôlement en attente: {}", outcome.reminders);

    let dashboard = &outcome.dashboard;
    println!("\n=== Immobilier ({}) ===", dashboard.periode);
    println!(
        "  Lots: {} ({} occupés, {} libres, {} en maintenance), taux d'occupation {}%",
        dashboard.occupation.total_lots,
        dashboard.occupation.occupes,
        dashboard.occupation.libres,
        dashboard.occupation.maintenance,
        dashboard.occupation.taux_occupation
    );
    println!(
        "  Loyers attendus {} / encaissés {} / impayés {} ({} bail(s)), recouvrement {}%",
        dashboard.loyers.total_attendu,
        dashboard.loyers.total_payes,
        dashboard.loyers.total_impayes,
        dashboard.loyers.nb_impayes,
        dashboard.taux_recouvrement
    );
    println!(
        "  Bilan {}: loyers {} - dépenses {} = {}",
        outcome.bilan.nom,
        outcome.bilan.loyers_encaisses,
        outcome.bilan.depenses,
        outcome.bilan.resultat
    );

    let stats = &outcome.recouvrement;
    println!("\n=== Recouvrement ===");
    println!(
        "  {} dossier(s), {} soldé(s); à recouvrer {}, payé {}, reste {} ({}%)",
        stats.nb_dossiers,
        stats.nb_soldes,
        stats.total_a_recouvrer,
        stats.total_paiements,
        stats.solde_restant,
        stats.taux_recouvrement
    );
    Ok(())
}
