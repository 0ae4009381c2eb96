//! `supas summary`, `supas options`, `supas roster`: read-only views of the table.

use serde::Serialize;
use supas_census::reconcile::ReconcileSummary;
use supas_census::table::{aggregate, roster, FilterOptions, FilterStage};
use supas_census::{DerivedRow, FilterCriteria, TableSummary};

use crate::util::{format_rupiah, or_blank, pad_right};
use crate::{load_session, CliError, InputArgs};

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(crate::exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

// ============================================================================
// summary
// ============================================================================

#[derive(Serialize)]
struct SummaryOutput<'a> {
    criteria: &'a FilterCriteria,
    reconcile: &'a ReconcileSummary,
    summary: &'a TableSummary,
    warnings: &'a [String],
}

pub fn cmd_summary(
    input: &InputArgs,
    criteria: FilterCriteria,
    json: bool,
    fail_on_empty: bool,
) -> Result<(), CliError> {
    let session = load_session(input)?;
    let rows = session.output.table.filter(&criteria);
    let summary = aggregate(&rows);

    if json {
        print_json(&SummaryOutput {
            criteria: &criteria,
            reconcile: &session.output.reconcile,
            summary: &summary,
            warnings: &session.output.warnings,
        })?;
    } else if !summary.is_empty() {
        println!("Total rows:          {}", summary.total_rows);
        println!("Rows before filter:  {}", session.output.table.len());
        println!(
            "Members found:       {} ({:.1}%)",
            summary.found_rows, summary.found_percentage
        );
        println!("Household heads:     {}", summary.household_heads);
        println!("Households:          {}", summary.households);
        println!("  head rows:         {}", summary.head_rows);
        println!("  heads found:       {}", summary.heads_found);
        println!("  others found:      {}", summary.others_found);
    }

    if summary.is_empty() {
        if fail_on_empty {
            return Err(CliError::no_matches("no rows match the given criteria"));
        }
        eprintln!("no rows match the given criteria");
    }
    Ok(())
}

// ============================================================================
// options
// ============================================================================

#[derive(Serialize)]
struct OptionsOutput<'a> {
    criteria: &'a FilterCriteria,
    options: &'a FilterOptions,
    matching_rows: usize,
}

pub fn cmd_options(input: &InputArgs, criteria: FilterCriteria, json: bool) -> Result<(), CliError> {
    let session = load_session(input)?;
    let cascade = session.output.table.cascade(&criteria);

    if json {
        return print_json(&OptionsOutput {
            criteria: &criteria,
            options: &cascade.options,
            matching_rows: cascade.rows.len(),
        });
    }

    for stage in FilterStage::ALL {
        let values = cascade.options.for_stage(stage);
        println!("{stage} ({}):", values.len());
        for value in values {
            println!("  {value}");
        }
    }
    eprintln!("{} row(s) match", cascade.rows.len());
    Ok(())
}

// ============================================================================
// roster
// ============================================================================

#[derive(Serialize)]
struct AgeRange {
    min: i64,
    max: i64,
}

#[derive(Serialize)]
struct RosterOutput<'a> {
    criteria: &'a FilterCriteria,
    members: &'a [&'a DerivedRow],
    age_range: Option<AgeRange>,
}

const ROSTER_COLUMNS: [(&str, usize); 15] = [
    ("No.", 4),
    ("Nama", 20),
    ("Status", 16),
    ("Jenis Kelamin", 13),
    ("Tgl", 4),
    ("Bulan", 10),
    ("Tahun", 6),
    ("Umur", 5),
    ("Gaji Uang", 14),
    ("Gaji Barang", 14),
    ("Hari", 5),
    ("Jam", 4),
    ("SD", 5),
    ("SMP", 5),
    ("SMA", 5),
];

fn roster_cells(row: &DerivedRow) -> [String; 15] {
    let member = &row.flat.member;
    let text = |field: &Option<String>| field.clone().unwrap_or_default();
    [
        text(&member.sequence),
        text(&member.name),
        text(&member.relationship),
        text(&member.sex),
        text(&member.birth_day),
        text(&member.birth_month),
        text(&member.birth_year),
        or_blank(row.age),
        row.cash_income.map(format_rupiah).unwrap_or_default(),
        row.goods_income.map(format_rupiah).unwrap_or_default(),
        row.work_days.to_string(),
        row.work_hours.to_string(),
        or_blank(row.grad_primary),
        or_blank(row.grad_lower_secondary),
        or_blank(row.grad_upper_secondary),
    ]
}

fn print_table_line<'a>(cells: impl IntoIterator<Item = &'a str>) {
    let line: Vec<String> = cells
        .into_iter()
        .zip(ROSTER_COLUMNS.iter())
        .map(|(cell, (_, width))| pad_right(cell, *width))
        .collect();
    println!("{}", line.join("  ").trim_end());
}

pub fn cmd_roster(
    input: &InputArgs,
    criteria: FilterCriteria,
    json: bool,
    fail_on_empty: bool,
) -> Result<(), CliError> {
    let session = load_session(input)?;
    let rows = session.output.table.filter(&criteria);
    let detail = roster(&rows);

    if json {
        print_json(&RosterOutput {
            criteria: &criteria,
            members: &detail.members,
            age_range: detail.age_range.map(|(min, max)| AgeRange { min, max }),
        })?;
    } else if !detail.members.is_empty() {
        let head = criteria.household_head.as_deref().unwrap_or_default();
        println!("Household:  {head}");
        if let Some(first) = detail.members.first() {
            let location = &first.flat.location;
            println!(
                "Location:   {}, {}",
                location.sub_district.as_deref().unwrap_or("-"),
                location.sub_region.as_deref().unwrap_or("-"),
            );
        }
        println!();

        print_table_line(ROSTER_COLUMNS.iter().map(|(name, _)| *name));
        for member in &detail.members {
            let cells = roster_cells(member);
            print_table_line(cells.iter().map(String::as_str));
        }

        println!();
        println!("Members found: {}", detail.members.len());
        if let Some((min, max)) = detail.age_range {
            println!("Age range:     {min} - {max} years");
        }
    }

    if detail.members.is_empty() {
        let message = if rows.is_empty() {
            "no rows match the given criteria"
        } else {
            "no household member has presence 'Ditemukan'"
        };
        if fail_on_empty {
            return Err(CliError::no_matches(message));
        }
        eprintln!("{message}");
    }
    Ok(())
}
