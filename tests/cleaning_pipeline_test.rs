use std::collections::HashMap;
use std::fs;

use anyhow::Result;
use tempfile::tempdir;

use finsurvey_cleaner::pipeline::Pipeline;

const HEADER: &str = "ID,Q1,Q2,Q3,Q4,Q5,Q6,Q7,\
                      Q8_1,Q8_2,Q8_3,Q8_4,Q8_5,Q8_6,Q8_7,Q8_8,Q8_9,Q8_10,Q8_11,\
                      Q9,Q10,Q11,Q12,Q13,Q14,Q15,Q16,Q17,Q18,Q19,\
                      mobile_money,savings,borrowing,insurance,mobile_money_classification,\
                      Latitude,Longitude";

/// A small but complete survey export: three respondents, one invalid
/// marital status code (Q3 = 9, column mode 2).
fn raw_survey_csv() -> String {
    let rows = [
        "1,34,1,9,3,1,1,1,1,0,1,0,0,0,0,0,0,0,0,2,-1,-1,1,2,1,4,1,5,1,2,1,1,0,0,3,-6.82,39.28",
        "2,27,2,2,1,4,2,1,0,1,0,0,0,0,0,0,0,0,0,-1,3,-1,2,-1,1,1,-1,-1,4,4,0,1,0,1,1,-2.51,32.93",
        "3,51,2,2,6,5,2,2,0,0,0,1,0,0,0,0,0,0,0,-1,-1,2,1,1,2,-1,2,1,2,1,1,0,1,0,2,-6.16,35.75",
    ];
    format!("{HEADER}\n{}\n", rows.join("\n"))
}

fn read_output(path: &std::path::Path) -> Result<(Vec<String>, Vec<HashMap<String, String>>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }
    Ok((headers, rows))
}

#[test]
fn test_end_to_end_cleaning_run() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("raw.csv");
    let output = temp_dir.path().join("cleaned.csv");
    fs::write(&input, raw_survey_csv())?;

    let pipeline = Pipeline::new()?;
    let report = pipeline.run(&input, &output)?;

    // Row count is invariant end to end; the invalid Q3 was repaired
    assert_eq!(report.rows, 3);
    assert_eq!(report.repaired_cells, 1);
    assert_eq!(report.gate_flagged_rows, 0);

    let (headers, rows) = read_output(&output)?;

    // Every coded column name is replaced by its descriptive label
    assert!(!headers.iter().any(|h| h == "Q3"));
    assert!(headers.iter().any(|h| h == "Marital status"));
    assert_eq!(headers[0], "User ID");
    // Unmapped columns keep their names
    assert!(headers.iter().any(|h| h == "Latitude"));

    // The invalid Q3 = 9 was mode-repaired to 2, then recoded
    assert_eq!(rows[0]["Marital status"], "Divorced");
    // Row order is preserved
    assert_eq!(rows[0]["User ID"], "1");
    assert_eq!(rows[2]["User ID"], "3");

    // Spot-check recodes across the questionnaire
    assert_eq!(rows[0]["Gender"], "Male");
    assert_eq!(rows[1]["Gender"], "Female");
    assert_eq!(rows[0]["Salaries/wages"], "Yes");
    assert_eq!(rows[1]["Salaries/wages"], "No");
    assert_eq!(rows[0]["Employment type"], "Private company/business");
    assert_eq!(rows[1]["Employment type"], "Not applicable");
    assert_eq!(rows[0]["Mobile money classification"], "Uses both");
    assert_eq!(
        rows[1]["Mobile money classification"],
        "Does not use mobile money"
    );
    assert_eq!(rows[2]["Mobile money classification"], "Uses mobile money only");

    // Cells with no recode entry pass through unchanged
    assert_eq!(rows[0]["Age"], "34");
    assert_eq!(rows[0]["Latitude"], "-6.82");

    Ok(())
}

#[test]
fn test_dashboard_contract_columns() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("raw.csv");
    let output = temp_dir.path().join("cleaned.csv");
    fs::write(&input, raw_survey_csv())?;

    Pipeline::new()?.run(&input, &output)?;
    let (headers, rows) = read_output(&output)?;

    // Columns the dashboard reads by name
    for expected in [
        "Mobile money classification",
        "Age",
        "Gender",
        "Marital status",
        "Ownership of land/plot",
        "Latitude",
        "Longitude",
    ] {
        assert!(headers.iter().any(|h| h == expected), "missing {expected}");
    }

    // The ten income-source columns carry Yes/No strings only
    for column in [
        "Salaries/wages",
        "Trading/selling produce",
        "Service providing income",
        "Piece work/Casual labor",
        "Rental income",
        "Interest from savings/investments",
        "Pension",
        "Social welfare grant",
        "Receive money from others",
        "Expenses covered by others",
    ] {
        for row in &rows {
            assert!(
                row[column] == "Yes" || row[column] == "No",
                "{column} holds '{}'",
                row[column]
            );
        }
    }

    let classifications = [
        "Does not use any financial service",
        "Does not use mobile money",
        "Uses mobile money only",
        "Uses both",
    ];
    for row in &rows {
        assert!(classifications.contains(&row["Mobile money classification"].as_str()));
    }

    Ok(())
}

#[test]
fn test_gate_violation_reports_and_continues() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("raw.csv");
    let output = temp_dir.path().join("cleaned.csv");

    // Respondent 2 reports an employment type despite answering "no" to
    // wage income
    let csv = raw_survey_csv().replace(
        "2,27,2,2,1,4,2,1,0,1,0,0,0,0,0,0,0,0,0,-1,",
        "2,27,2,2,1,4,2,1,0,1,0,0,0,0,0,0,0,0,0,5,",
    );
    fs::write(&input, csv)?;

    let report = Pipeline::new()?.run(&input, &output)?;

    assert_eq!(report.gate_flagged_rows, 1);
    assert_eq!(report.rows, 3);

    // The run continued: the offending column is renamed and recoded,
    // just never repaired
    let (_, rows) = read_output(&output)?;
    assert_eq!(rows[1]["Employment type"], "Commercial farmer");

    Ok(())
}

#[test]
fn test_check_does_not_write_output() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("raw.csv");
    fs::write(&input, raw_survey_csv())?;

    let report = Pipeline::new()?.check(&input)?;

    assert_eq!(report.rows, 3);
    assert_eq!(report.repaired_cells, 1);
    assert!(report.output_file.is_none());
    // Only the input exists in the scratch directory
    assert_eq!(fs::read_dir(temp_dir.path())?.count(), 1);

    Ok(())
}
