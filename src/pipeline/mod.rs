// Cleaning pipeline: validate, rename, recode, save

pub mod recode;
pub mod rename;
pub mod validate;

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::schema::{self, SurveySchema, ValidationStep};
use crate::table::RecordTable;
use validate::{GateOutcome, GateReport};

/// Result of a complete cleaning run.
#[derive(Debug, Serialize)]
pub struct CleanReport {
    pub rows: usize,
    pub columns: usize,
    pub repaired_cells: usize,
    pub gate_flagged_rows: usize,
    pub output_file: Option<String>,
}

/// The survey cleaning pipeline. Runs strictly sequentially:
/// load → validate → rename → recode → save. The table is privately
/// owned by the invocation and never touched again after the save.
pub struct Pipeline {
    schema: &'static SurveySchema,
}

impl Pipeline {
    /// Build a pipeline over the verified questionnaire schema. Fails
    /// with a configuration error if the static tables are inconsistent.
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: schema::survey_schema()?,
        })
    }

    /// Run the full pipeline and write the cleaned table to `output`.
    #[instrument(skip(self), fields(input = %input.display()))]
    pub fn run(&self, input: &Path, output: &Path) -> Result<CleanReport> {
        info!("🚀 Starting cleaning pipeline");
        println!("🚀 Starting cleaning pipeline");

        // Step 1: Load the raw export
        let mut table = RecordTable::load(input)?;
        println!(
            "📥 Loaded {} rows, {} columns from {}",
            table.row_count(),
            table.column_count(),
            input.display()
        );
        let rows_in = table.row_count();

        // Step 2: Validate and repair coded answers
        let (repaired_cells, gate_flagged_rows) = self.validate(&mut table)?;
        info!(
            "✅ Validation done ({} cells repaired, {} rows gate-flagged)",
            repaired_cells, gate_flagged_rows
        );
        println!(
            "✅ Validation done ({} cells repaired, {} rows gate-flagged)",
            repaired_cells, gate_flagged_rows
        );

        // Step 3: Rename coded columns to descriptive labels
        rename::rename_columns(&mut table, &self.schema.renames);

        // Step 4: Recode answers into descriptive strings
        recode::recode_values(&mut table, &self.schema.recodes)?;

        // Step 5: Save the cleaned table
        table.save(output)?;
        println!("💾 Cleaned data saved to {}", output.display());

        debug_assert_eq!(table.row_count(), rows_in);
        Ok(CleanReport {
            rows: table.row_count(),
            columns: table.column_count(),
            repaired_cells,
            gate_flagged_rows,
            output_file: Some(output.display().to_string()),
        })
    }

    /// Load and validate only; reports what a full run would repair
    /// without writing anything.
    #[instrument(skip(self), fields(input = %input.display()))]
    pub fn check(&self, input: &Path) -> Result<CleanReport> {
        info!("🔍 Checking raw survey export");
        println!("🔍 Checking {}", input.display());

        let mut table = RecordTable::load(input)?;
        let (repaired_cells, gate_flagged_rows) = self.validate(&mut table)?;

        Ok(CleanReport {
            rows: table.row_count(),
            columns: table.column_count(),
            repaired_cells,
            gate_flagged_rows,
            output_file: None,
        })
    }

    /// Apply the validation plan step by step, in schema order.
    fn validate(&self, table: &mut RecordTable) -> Result<(usize, usize)> {
        let mut repaired = 0;
        let mut flagged = 0;

        for step in &self.schema.steps {
            match step {
                ValidationStep::Columns { columns, domain } => {
                    repaired += validate::repair_columns(table, columns, *domain)?;
                }
                ValidationStep::Gated {
                    target,
                    gate,
                    domain,
                } => match validate::repair_gated_column(
                    table,
                    target,
                    gate,
                    *domain,
                    schema::ID_COLUMN,
                )? {
                    GateOutcome::Repaired { cells } => repaired += cells,
                    GateOutcome::Flagged(report) => {
                        flagged += report.rows.len();
                        print_gate_report(&report);
                    }
                },
            }
        }

        Ok((repaired, flagged))
    }
}

/// Print the conditional validator's diagnostic report for the operator.
fn print_gate_report(report: &GateReport) {
    println!(
        "\n⚠️  The following responses are invalid: {} answers inconsistent with the {} gate",
        report.target_column, report.gate_column
    );
    for row in &report.rows {
        println!("   Respondent {}:", row.respondent_id);
        for (column, value) in &row.cells {
            println!("      {column} = {value}");
        }
    }
    println!();
}
