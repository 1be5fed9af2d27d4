//! Series transformation
//!
//! Maps the raw columns of a test's tables onto the normalized datasets the
//! report and the viewer draw: plot groups, the info table and the
//! measurement table.

pub mod smoothing;

use serde::{Serialize, Deserialize};

use crate::models::{RawTable, Value, MISSING_CELL};
use crate::schema::{dsc_oit, mfi, vicat, ColumnRef};

pub use smoothing::SmoothingParams;

/// One labelled x/y series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDataset {
    /// Legend label
    pub label: String,

    /// X values
    pub x: Vec<f64>,

    /// Y values, same length as `x`
    pub y: Vec<f64>,
}

impl PlotDataset {
    /// Build a dataset from two columns, dropping every pair in which
    /// either value is not numeric
    pub fn from_columns(label: &str, x: &[&Value], y: &[&Value]) -> Self {
        let (x, y) = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some((a.as_f64()?, b.as_f64()?)))
            .unzip();

        PlotDataset {
            label: label.to_string(),
            x,
            y,
        }
    }

    /// Whether the dataset has no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Copy with the y values smoothed
    pub fn smoothed(&self, params: SmoothingParams) -> Self {
        PlotDataset {
            label: self.label.clone(),
            x: self.x.clone(),
            y: smoothing::smooth(&self.y, params),
        }
    }
}

/// Datasets drawn on one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotGroup {
    /// Chart title
    pub title: String,

    /// X axis title
    pub x_label: String,

    /// Y axis title
    pub y_label: String,

    /// Series on the chart
    pub datasets: Vec<PlotDataset>,
}

impl PlotGroup {
    /// Whether no dataset has a point to draw
    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(PlotDataset::is_empty)
    }

    /// Copy with every dataset smoothed
    pub fn smoothed(&self, params: SmoothingParams) -> Self {
        PlotGroup {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            datasets: self.datasets.iter().map(|d| d.smoothed(params)).collect(),
        }
    }
}

/// One row of the two-column info table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRow {
    /// Left label
    pub left_label: String,

    /// Left value
    pub left_value: String,

    /// Right label
    pub right_label: String,

    /// Right value
    pub right_value: String,
}

/// Label/value table printed under the report title
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoTable {
    /// Rows, top to bottom
    pub rows: Vec<InfoRow>,
}

/// Measurement table with a row-label column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    /// Header of the row-label column
    pub row_header: String,

    /// Headers of the value columns
    pub headers: Vec<String>,

    /// One label per row
    pub row_labels: Vec<String>,

    /// Cell text, one inner vector per row
    pub cells: Vec<Vec<String>>,

    /// Width ratios including the row-label column
    pub column_ratios: Option<Vec<f64>>,
}

impl DataTable {
    /// Header row including the row-label column
    pub fn full_headers(&self) -> Vec<String> {
        std::iter::once(self.row_header.clone())
            .chain(self.headers.iter().cloned())
            .collect()
    }

    /// Rows with their labels prepended
    pub fn full_rows(&self) -> Vec<Vec<String>> {
        self.row_labels
            .iter()
            .zip(&self.cells)
            .map(|(label, row)| std::iter::once(label.clone()).chain(row.iter().cloned()).collect())
            .collect()
    }
}

/// Everything a report draws for one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedData {
    /// Charts, in page order
    pub plots: Vec<PlotGroup>,

    /// Header information
    pub info_table: InfoTable,

    /// Measurement table, for tests reported as a table
    pub data_table: Option<DataTable>,
}

/// Values of the column `column` resolves to; empty when unresolved
fn column<'a>(table: &'a RawTable, column: ColumnRef) -> Vec<&'a Value> {
    table
        .resolve_column(column.key, column.token)
        .map(|idx| table.column_values(idx))
        .unwrap_or_default()
}

/// DSC-OIT charts: temperatures and heat flow over time, heat flow over
/// sample temperature
pub fn dsc_oit_plots(detail: &RawTable) -> Vec<PlotGroup> {
    let time = column(detail, dsc_oit::TEST_TIME);
    let sample = column(detail, dsc_oit::SAMPLE_TEMPERATURE);
    let reference = column(detail, dsc_oit::REFERENCE_TEMPERATURE);
    let watt = column(detail, dsc_oit::WATT);

    vec![
        PlotGroup {
            title: "Sıcaklık-Zaman Grafiği".to_string(),
            x_label: "Zaman [sn]".to_string(),
            y_label: "Sıcaklık [°C]".to_string(),
            datasets: vec![
                PlotDataset::from_columns("Numune Sıcaklığı", &time, &sample),
                PlotDataset::from_columns("Referans Sıcaklığı", &time, &reference),
            ],
        },
        PlotGroup {
            title: "Isı-Zaman Grafiği".to_string(),
            x_label: "Zaman [sn]".to_string(),
            y_label: "Isı [Watt]".to_string(),
            datasets: vec![PlotDataset::from_columns("Watt", &time, &watt)],
        },
        PlotGroup {
            title: "Isı-Sıcaklık Grafiği".to_string(),
            x_label: "Sıcaklık [°C]".to_string(),
            y_label: "Isı [Watt]".to_string(),
            datasets: vec![PlotDataset::from_columns("Isı", &sample, &watt)],
        },
    ]
}

/// VICAT chart: penetration over temperature
pub fn vicat_plots(detail: &RawTable) -> Vec<PlotGroup> {
    let temperature = column(detail, vicat::TEMPERATURE);
    let penetration = column(detail, vicat::PENETRATION);

    vec![PlotGroup {
        title: "Sıcaklık-Batma Grafiği".to_string(),
        x_label: "Sıcaklık [°C]".to_string(),
        y_label: "Batma [mm]".to_string(),
        datasets: vec![PlotDataset::from_columns("Batma", &temperature, &penetration)],
    }]
}

/// Last temperature of a VICAT detail table; NULL when there is none
pub fn vicat_final_temperature(detail: Option<&RawTable>) -> Value {
    detail
        .and_then(|table| column(table, vicat::TEMPERATURE).last().map(|v| (*v).clone()))
        .unwrap_or(Value::Null)
}

/// MFI measurement table
pub fn mfi_table(detail: &RawTable) -> DataTable {
    let columns: Vec<Vec<&Value>> = [mfi::WEIGHT, mfi::CUT_TIME, mfi::MVR, mfi::MFR]
        .into_iter()
        .map(|c| column(detail, c))
        .collect();
    let ids = column(detail, mfi::ROW_ID);

    let row_labels = (0..detail.len())
        .map(|i| match ids.get(i) {
            Some(v) if !v.is_blank() => v.to_string(),
            _ => (i + 1).to_string(),
        })
        .collect();

    let cells = (0..detail.len())
        .map(|i| {
            columns
                .iter()
                .map(|col| {
                    col.get(i)
                        .map(|v| v.to_cell_text())
                        .unwrap_or_else(|| MISSING_CELL.to_string())
                })
                .collect()
        })
        .collect();

    DataTable {
        row_header: mfi::ROW_HEADER.to_string(),
        headers: mfi::HEADERS.iter().map(|h| h.to_string()).collect(),
        row_labels,
        cells,
        column_ratios: Some(mfi::COLUMN_RATIOS.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dsc_detail() -> RawTable {
        RawTable::new(
            "testDetay",
            vec![
                "TestId".into(),
                "TestSuresi".into(),
                "NumuneSicakligi".into(),
                "ReferansSicakligi".into(),
                "Watt".into(),
            ],
            vec![
                vec![Value::Integer(1), Value::Real(0.0), Value::Real(25.0), Value::Real(24.0), Value::Real(0.1)],
                vec![Value::Integer(1), Value::Real(1.0), Value::Null, Value::Real(30.0), Value::Real(0.2)],
                vec![Value::Integer(1), Value::from("2"), Value::Real(35.0), Value::from("x"), Value::Real(0.3)],
            ],
        )
    }

    #[test]
    fn test_from_columns_drops_pairs() {
        let x = [Value::Integer(1), Value::Null, Value::from("3")];
        let y = [Value::Real(1.5), Value::Real(2.5), Value::from("4.5")];
        let xr: Vec<&Value> = x.iter().collect();
        let yr: Vec<&Value> = y.iter().collect();
        let ds = PlotDataset::from_columns("s", &xr, &yr);
        assert_eq!(ds.x, vec![1.0, 3.0]);
        assert_eq!(ds.y, vec![1.5, 4.5]);
    }

    #[test]
    fn test_dsc_oit_plots() {
        let plots = dsc_oit_plots(&dsc_detail());
        assert_eq!(plots.len(), 3);
        assert_eq!(plots[0].title, "Sıcaklık-Zaman Grafiği");

        let sample = &plots[0].datasets[0];
        assert_eq!(sample.x, vec![0.0, 2.0]);
        assert_eq!(sample.y, vec![25.0, 35.0]);

        let reference = &plots[0].datasets[1];
        assert_eq!(reference.x, vec![0.0, 1.0]);

        assert_eq!(plots[1].datasets[0].y, vec![0.1, 0.2, 0.3]);
        assert_eq!(plots[2].datasets[0].x, vec![25.0, 35.0]);
    }

    #[test]
    fn test_dsc_oit_plots_missing_columns() {
        let detail = RawTable::new("testDetay", vec!["TestId".into()], vec![vec![Value::Integer(1)]]);
        let plots = dsc_oit_plots(&detail);
        assert_eq!(plots.len(), 3);
        assert!(plots.iter().all(PlotGroup::is_empty));
    }

    #[test]
    fn test_vicat_plots_and_final_temperature() {
        let detail = RawTable::new(
            "Test_Detay",
            vec!["Test_Id".into(), "Sıcaklık".into(), "Batma".into()],
            vec![
                vec![Value::Integer(1), Value::Real(50.0), Value::Real(0.01)],
                vec![Value::Integer(1), Value::Real(60.0), Value::Real(0.5)],
            ],
        );
        let plots = vicat_plots(&detail);
        assert_eq!(plots[0].datasets[0].x, vec![50.0, 60.0]);
        assert_eq!(plots[0].datasets[0].y, vec![0.01, 0.5]);
        assert_eq!(plots[0].x_label, "Sıcaklık [°C]");

        assert_eq!(vicat_final_temperature(Some(&detail)), Value::Real(60.0));
        assert_eq!(vicat_final_temperature(None), Value::Null);
    }

    #[test]
    fn test_mfi_table() {
        let detail = RawTable::new(
            "TestDetay",
            vec![
                "Detay_Id".into(),
                "Detay_TestId".into(),
                "Detay_KesmeZamani".into(),
                "Detay_Agirlik".into(),
                "Detay_MVR".into(),
                "Detay_MFR".into(),
            ],
            vec![
                vec![Value::Integer(1), Value::Integer(564), Value::Integer(10), Value::Real(0.5), Value::Real(3.2), Value::Null],
                vec![Value::Null, Value::Integer(564), Value::Integer(10), Value::Real(0.6), Value::Real(3.3), Value::Real(2.9)],
            ],
        );
        let table = mfi_table(&detail);
        assert_eq!(table.row_labels, vec!["1", "2"]);
        assert_eq!(table.cells[0], vec!["0.5", "10", "3.2", "-"]);
        assert_eq!(table.full_headers()[0], "No");
        assert_eq!(table.full_headers().len(), 5);
        assert_eq!(table.full_rows()[1], vec!["2", "0.6", "10", "3.3", "2.9"]);
        assert_eq!(table.column_ratios.as_deref(), Some(&[3.0, 5.0, 8.0, 8.0, 8.0][..]));
    }

    #[test]
    fn test_smoothed_group_keeps_shape() {
        let group = PlotGroup {
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            datasets: vec![PlotDataset {
                label: "a".into(),
                x: (0..6).map(f64::from).collect(),
                y: vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0],
            }],
        };
        let smoothed = group.smoothed(SmoothingParams::default());
        assert_eq!(smoothed.datasets[0].x, group.datasets[0].x);
        assert_eq!(smoothed.datasets[0].y.len(), 6);
    }
}
