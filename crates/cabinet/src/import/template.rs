use rust_xlsxwriter::{Format, Workbook};

use super::schema::EntityKind;
use super::ImportError;

pub const HELP_SHEET: &str = "Aide";

/// Build the xlsx skeleton for `kind`: a header row matching the column
/// schema with one example row, plus an `Aide` sheet describing each column.
pub fn generate_template(kind: EntityKind) -> Result<Vec<u8>, ImportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(kind.sheet_name())?;
    for (index, (column, example)) in kind
        .columns()
        .iter()
        .zip(kind.example_row())
        .enumerate()
    {
        let col = index as u16;
        sheet.write_string_with_format(0, col, column.name, &header)?;
        sheet.write_string(1, col, *example)?;
        sheet.set_column_width(col, 22)?;
    }

    let help = workbook.add_worksheet();
    help.set_name(HELP_SHEET)?;
    for (col, title) in ["Colonne", "Obligatoire", "Valeurs acceptées", "Description"]
        .into_iter()
        .enumerate()
    {
        help.write_string_with_format(0, col as u16, title, &header)?;
        help.set_column_width(col as u16, 28)?;
    }
    for (index, column) in kind.columns().iter().enumerate() {
        let row = index as u32 + 1;
        help.write_string(row, 0, column.name)?;
        help.write_string(row, 1, if column.required { "oui" } else { "non" })?;
        help.write_string(row, 2, column.allowed.join(", "))?;
        help.write_string(row, 3, column.description)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    #[test]
    fn template_has_data_and_help_sheets() {
        let bytes = generate_template(EntityKind::Lots).expect("template builds");
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("valid xlsx");

        assert_eq!(workbook.sheet_names(), vec!["Lots".to_string(), "Aide".to_string()]);

        let range = workbook.worksheet_range("Lots").expect("lots sheet");
        let header = range.rows().next().expect("header row");
        assert_eq!(header[0], Data::String("immeuble".to_string()));
        assert_eq!(header.len(), EntityKind::Lots.columns().len());

        let help = workbook.worksheet_range(HELP_SHEET).expect("help sheet");
        let type_row = help
            .rows()
            .find(|row| row[0] == Data::String("type".to_string()))
            .expect("type documented");
        assert!(type_row[2].to_string().contains("MAGASIN"));
    }
}
