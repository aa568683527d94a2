use serde::Serialize;

const LOT_TYPES: &[&str] = &[
    "STUDIO", "F1", "F2", "F3", "F4", "F5", "MAGASIN", "BUREAU", "AUTRE",
];
const IMPORTABLE_LOT_STATUTS: &[&str] = &["LIBRE", "OCCUPE"];

/// One column of an import sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub required: bool,
    /// Accepted values for enumerated columns; empty means free text.
    pub allowed: &'static [&'static str],
    pub description: &'static str,
}

impl Column {
    const fn text(name: &'static str, required: bool, description: &'static str) -> Self {
        Self {
            name,
            required,
            allowed: &[],
            description,
        }
    }

    const fn choice(
        name: &'static str,
        required: bool,
        allowed: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            required,
            allowed,
            description,
        }
    }
}

const IMMEUBLE_COLUMNS: &[Column] = &[
    Column::text("nom", true, "Nom unique de l'immeuble"),
    Column::text("adresse", true, "Adresse postale"),
    Column::text("ville", false, "Ville"),
    Column::text("proprietaire", false, "Nom du propriétaire"),
];

const LOT_COLUMNS: &[Column] = &[
    Column::text("immeuble", true, "Nom d'un immeuble existant"),
    Column::text("numero", true, "Numéro du lot, unique dans l'immeuble"),
    Column::choice("type", true, LOT_TYPES, "Type de lot"),
    Column::text("etage", false, "Étage (nombre entier)"),
    Column::text("superficie", false, "Surface en m²"),
    Column::text("loyer_mensuel", true, "Loyer mensuel hors charges"),
    Column::choice(
        "statut",
        false,
        IMPORTABLE_LOT_STATUTS,
        "Statut initial, LIBRE par défaut",
    ),
];

const LOCATAIRE_COLUMNS: &[Column] = &[
    Column::text("nom", true, "Nom du locataire"),
    Column::text("prenom", false, "Prénom"),
    Column::text("telephone", false, "Téléphone"),
    Column::text("email", false, "Adresse email"),
];

/// Entity families that can be bulk-loaded from a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Immeubles,
    Lots,
    Locataires,
}

impl EntityKind {
    pub const fn all() -> [Self; 3] {
        [Self::Immeubles, Self::Lots, Self::Locataires]
    }

    /// Path segment and CLI name.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Immeubles => "immeubles",
            Self::Lots => "lots",
            Self::Locataires => "locataires",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::all().into_iter().find(|kind| kind.slug() == wanted)
    }

    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::Immeubles => "Immeubles",
            Self::Lots => "Lots",
            Self::Locataires => "Locataires",
        }
    }

    pub const fn columns(self) -> &'static [Column] {
        match self {
            Self::Immeubles => IMMEUBLE_COLUMNS,
            Self::Lots => LOT_COLUMNS,
            Self::Locataires => LOCATAIRE_COLUMNS,
        }
    }

    /// Sample values written under the header of a template, one per column.
    pub const fn example_row(self) -> &'static [&'static str] {
        match self {
            Self::Immeubles => &[
                "Résidence Les Palmiers",
                "14 avenue de la République",
                "Dakar",
                "SCI Palmiers",
            ],
            Self::Lots => &[
                "Résidence Les Palmiers",
                "A101",
                "F3",
                "1",
                "72.5",
                "450000",
                "LIBRE",
            ],
            Self::Locataires => &["Ndiaye", "Fatou", "+221 77 000 00 00", "fatou@example.org"],
        }
    }

    pub fn file_name(self) -> String {
        format!("modele_import_{}.xlsx", self.slug())
    }
}

/// Header cell to column key: trimmed, lower-cased, required marker and
/// spaces folded away.
pub(crate) fn normalize_header(raw: &str) -> String {
    raw.replace('\u{feff}', "")
        .trim()
        .trim_end_matches('*')
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immobilier::{LotStatut, LotType};

    #[test]
    fn lot_type_values_match_domain_codes() {
        let codes = LotType::ordered().map(LotType::code);
        assert_eq!(LOT_TYPES, codes.as_slice());
    }

    #[test]
    fn importable_statuts_are_domain_codes() {
        for code in IMPORTABLE_LOT_STATUTS {
            assert!(LotStatut::parse(code).is_some(), "{code} is a lot status");
        }
        assert!(!IMPORTABLE_LOT_STATUTS.contains(&LotStatut::Maintenance.code()));
    }

    #[test]
    fn example_rows_fill_every_column() {
        for kind in EntityKind::all() {
            assert_eq!(kind.columns().len(), kind.example_row().len(), "{kind:?}");
        }
    }

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header(" Loyer Mensuel* "), "loyer_mensuel");
        assert_eq!(normalize_header("\u{feff}NOM"), "nom");
    }

    #[test]
    fn kinds_parse_from_slug() {
        assert_eq!(EntityKind::parse("LOTS"), Some(EntityKind::Lots));
        assert_eq!(EntityKind::parse("baux"), None);
        assert_eq!(EntityKind::Locataires.file_name(), "modele_import_locataires.xlsx");
    }
}
