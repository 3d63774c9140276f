//! Offline fitting of the feature-subset scaler from the training dataset

use crate::models::StandardScaler;
use anyhow::{bail, Context, Result};
use std::io::Read;
use tracing::{info, warn};

/// Outcome of fitting a scaler on a CSV dataset
#[derive(Debug)]
pub struct ScalerFit {
    pub scaler: StandardScaler,
    /// Schema columns absent from the dataset
    pub missing_features: Vec<String>,
    pub rows: usize,
}

/// Fit a [`StandardScaler`] on the `schema` columns of a CSV dataset.
///
/// Columns are taken in schema order. Schema names the dataset lacks are
/// skipped with a warning, so the scaler may end up narrower than the schema.
pub fn fit_from_csv<R: Read>(reader: R, schema: &[&str]) -> Result<ScalerFit> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers().context("Failed to read CSV header")?.clone();

    let mut selected = Vec::new();
    let mut missing_features = Vec::new();
    for &name in schema {
        match headers.iter().position(|h| h == name) {
            Some(index) => selected.push((name, index)),
            None => missing_features.push(name.to_string()),
        }
    }

    if !missing_features.is_empty() {
        warn!(missing = ?missing_features, "Dataset lacks some schema features");
        info!(
            available = selected.len(),
            "Using {} available features",
            selected.len()
        );
    }
    if selected.is_empty() {
        bail!("dataset contains none of the {} schema features", schema.len());
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); selected.len()];
    let mut rows = 0;

    for record in csv.records() {
        let record = record.context("Failed to read CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        for (column, (name, index)) in columns.iter_mut().zip(&selected) {
            let cell = record.get(*index).unwrap_or("");
            let value = parse_cell(cell)
                .with_context(|| format!("line {line}, column {name:?}: {cell:?} is not numeric"))?;
            column.push(value);
        }
        rows += 1;
    }

    if rows == 0 {
        bail!("dataset has no rows");
    }

    let names = selected.iter().map(|(name, _)| name.to_string()).collect();
    let scaler = StandardScaler::fit(names, &columns)?;

    Ok(ScalerFit {
        scaler,
        missing_features,
        rows,
    })
}

/// Empty and NaN cells are missing values; booleans read as 1/0.
fn parse_cell(cell: &str) -> Option<f64> {
    match cell {
        "" => Some(f64::NAN),
        "True" | "true" => Some(1.0),
        "False" | "false" => Some(0.0),
        _ => cell.parse::<f64>().ok().filter(|v| !v.is_infinite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: [&str; 3] = ["BMI", "Calories", "sodium_mg"];

    #[test]
    fn test_fit_selects_schema_columns_in_order() {
        let data = "\
sodium_mg,Workout_Type,BMI,Calories
100,Yoga,20,1800
300,HIIT,30,2200
";
        let fit = fit_from_csv(data.as_bytes(), &SCHEMA).unwrap();

        assert_eq!(fit.rows, 2);
        assert!(fit.missing_features.is_empty());
        assert_eq!(fit.scaler.feature_names, ["BMI", "Calories", "sodium_mg"]);
        assert_eq!(fit.scaler.mean, vec![25.0, 2000.0, 200.0]);
        assert_eq!(fit.scaler.scale, vec![5.0, 200.0, 100.0]);
        assert_eq!(fit.scaler.n_samples_seen, 2);
    }

    #[test]
    fn test_missing_columns_narrow_the_scaler() {
        let data = "BMI,sodium_mg\n20,100\n22,100\n";
        let fit = fit_from_csv(data.as_bytes(), &SCHEMA).unwrap();

        assert_eq!(fit.missing_features, ["Calories"]);
        assert_eq!(fit.scaler.n_features(), 2);
        assert_eq!(fit.scaler.scale[1], 1.0);
    }

    #[test]
    fn test_empty_and_boolean_cells() {
        let data = "BMI,Calories,sodium_mg\n20,True,\n, False,5\n30,True,NaN\n";
        let fit = fit_from_csv(data.as_bytes(), &SCHEMA).unwrap();

        assert_eq!(fit.scaler.mean[0], 25.0);
        assert!((fit.scaler.mean[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(fit.scaler.mean[2], 5.0);
    }

    #[test]
    fn test_non_numeric_cell_fails() {
        let data = "BMI,Calories,sodium_mg\n20,lots,5\n";
        let err = fit_from_csv(data.as_bytes(), &SCHEMA).unwrap_err();
        assert!(format!("{err:#}").contains("Calories"));
    }

    #[test]
    fn test_no_schema_columns_fails() {
        let data = "a,b\n1,2\n";
        assert!(fit_from_csv(data.as_bytes(), &SCHEMA).is_err());
    }
}
