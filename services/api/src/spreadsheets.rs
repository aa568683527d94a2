use crate::infra::{parse_kind, parse_policy, Services};
use cabinet::error::AppError;
use cabinet::immobilier::InactiveLeasePolicy;
use cabinet::import::{generate_template, EntityKind, ImportFormat, ImportReport, RowStatus};
use clap::Args;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    /// Entity family: immeubles, lots or locataires
    #[arg(long, value_parser = parse_kind)]
    pub(crate) kind: EntityKind,
    /// Destination file. Defaults to modele_import_<kind>.xlsx
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
#[group(required = true, multiple = true)]
pub(crate) struct ImportFiles {
    /// Buildings sheet
    #[arg(long)]
    pub(crate) immeubles: Option<PathBuf>,
    /// Lots sheet; buildings named here must exist or be imported alongside
    #[arg(long)]
    pub(crate) lots: Option<PathBuf>,
    /// Tenants sheet
    #[arg(long)]
    pub(crate) locataires: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ImportArgs {
    #[command(flatten)]
    pub(crate) files: ImportFiles,
    /// Force csv or xlsx instead of guessing from the file extension
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<ImportFormat>,
    /// Rent policy for leases ending mid-period
    #[arg(long, value_parser = parse_policy)]
    pub(crate) policy: Option<InactiveLeasePolicy>,
}

impl ImportFiles {
    /// Files in dependency order: buildings before the lots that name them.
    fn in_order(&self) -> Vec<(EntityKind, &Path)> {
        [
            (EntityKind::Immeubles, self.immeubles.as_deref()),
            (EntityKind::Lots, self.lots.as_deref()),
            (EntityKind::Locataires, self.locataires.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.map(|path| (kind, path)))
        .collect()
    }
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let path = write_template(&args)?;
    println!(
        "Wrote {} template to {}",
        args.kind.slug(),
        path.display()
    );
    Ok(())
}

pub(crate) fn write_template(args: &TemplateArgs) -> Result<PathBuf, AppError> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(args.kind.file_name()));
    let bytes = generate_template(args.kind)?;
    std::fs::write(&path, bytes)?;
    info!(kind = args.kind.slug(), path = %path.display(), "template written");
    Ok(path)
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let services = Services::in_memory(args.policy.unwrap_or_default());
    let reports = import_files(&services, &args)?;
    for report in &reports {
        print!("{}", render_report(report));
    }

    let failed = reports.iter().map(|report| report.failed).sum::<usize>();
    if failed == 0 {
        println!("All rows imported.");
    } else {
        println!("{failed} row(s) need fixing before the sheets can be loaded.");
    }
    Ok(())
}

pub(crate) fn import_files(
    services: &Services,
    args: &ImportArgs,
) -> Result<Vec<ImportReport>, AppError> {
    let mut reports = Vec::new();
    for (kind, path) in args.files.in_order() {
        let bytes = std::fs::read(path)?;
        let format = args.format.unwrap_or_else(|| detect_format(path));
        info!(kind = kind.slug(), path = %path.display(), ?format, "importing sheet");
        reports.push(services.importer.import(kind, &bytes, format)?);
    }
    Ok(reports)
}

fn detect_format(path: &Path) -> ImportFormat {
    mime_guess::from_path(path)
        .first()
        .map_or(ImportFormat::Xlsx, |mime| ImportFormat::from_mime(&mime))
}

fn parse_format(raw: &str) -> Result<ImportFormat, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "csv" => Ok(ImportFormat::Csv),
        "xlsx" => Ok(ImportFormat::Xlsx),
        other => Err(format!("unknown format '{other}', expected csv or xlsx")),
    }
}

pub(crate) fn render_report(report: &ImportReport) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{}: {} row(s), {} created, {} failed",
        report.kind.slug(),
        report.total_rows,
        report.created,
        report.failed
    );
    for row in &report.rows {
        match row.status {
            RowStatus::Created => {
                let id = row.id.map_or_else(|| "-".to_string(), |id| id.to_string());
                let _ = writeln!(output, "  row {}: created #{id}", row.row);
            }
            RowStatus::Failed => {
                for error in &row.errors {
                    let _ = writeln!(
                        output,
                        "  row {}: {} - {}",
                        row.row, error.field, error.message
                    );
                }
            }
        }
    }
    output
}
