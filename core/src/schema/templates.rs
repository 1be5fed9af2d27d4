//! Report info-table templates
//!
//! Each test type has a two-column template of (label, source column)
//! entries rendered against the first header row of a test.

use crate::models::{RawTable, MISSING_CELL};
use crate::transform::{InfoRow, InfoTable};

/// One label of an info-table template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Label printed in bold
    pub label: &'static str,

    /// Column the value is read from; `None` always renders `-`
    pub column: Option<&'static str>,
}

const fn entry(label: &'static str, column: &'static str) -> TemplateEntry {
    TemplateEntry { label, column: Some(column) }
}

const fn blank(label: &'static str) -> TemplateEntry {
    TemplateEntry { label, column: None }
}

/// Two-column info-table template
#[derive(Debug)]
pub struct ReportTemplate {
    /// Left column entries
    pub left: &'static [TemplateEntry],

    /// Right column entries
    pub right: &'static [TemplateEntry],
}

impl ReportTemplate {
    /// Number of rows the rendered table has
    pub fn height(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    /// Render the template against the first row of `header`.
    ///
    /// A missing column, NULL, NaN or blank text renders `-`. When one side
    /// is shorter than the other its label and value cells are left empty.
    pub fn fill(&self, header: &RawTable) -> InfoTable {
        let rows = (0..self.height())
            .map(|i| {
                let (left_label, left_value) = render(self.left.get(i), header);
                let (right_label, right_value) = render(self.right.get(i), header);
                InfoRow {
                    left_label,
                    left_value,
                    right_label,
                    right_value,
                }
            })
            .collect();

        InfoTable { rows }
    }
}

fn render(entry: Option<&TemplateEntry>, header: &RawTable) -> (String, String) {
    let entry = match entry {
        Some(entry) => entry,
        None => return (String::new(), String::new()),
    };

    let value = entry
        .column
        .and_then(|column| header.column_index(column))
        .and_then(|idx| header.cell(0, idx))
        .map(|value| value.to_cell_text())
        .unwrap_or_else(|| MISSING_CELL.to_string());

    (entry.label.to_string(), value)
}

pub(super) static DSC_OIT_TEMPLATE: ReportTemplate = ReportTemplate {
    left: &[
        entry("Deney No:", "TestId"),
        entry("Numune Tarihi:", "UrunTarih"),
        entry("Test Baslama Tarihi:", "TestBaslamaZamani"),
        entry("Test Bitis Tarihi:", "TestBitisZamani"),
        entry("Ürün Kodu:", "UrunKodu"),
        entry("Numune Tanimi:", "NumuneTanim"),
        entry("Numune Kodu:", "NumuneKodu"),
        entry("Test Standardi:", "DeneyStandart"),
        entry("Numune No:", "NumuneNo"),
        entry("Hammadde Kodu:", "HammaddeKodu"),
        entry("Testi Yapan:", "TestiYapanStr"),
    ],
    right: &[
        blank("Test Süresi:"),
        blank("Azot Süresi:"),
        blank("OIT Süresi:"),
        entry("ΔH Erime Enerjisi:", "DeltaHAlan"),
        entry("Test Sicakligi:", "SetSicakligi"),
        entry("Erime Sicakligi:", "ErimeSicakligi"),
        blank("Referans Sicakligi:"),
        entry("Referans Agirligi:", "RefAgirlik"),
        entry("Numune Agirligi:", "NumuneAgirlik"),
        entry("Note:", "Aciklama"),
        entry("Testi Onaylayan:", "TestiOnaylayanStr"),
    ],
};

pub(super) static MFI_TEMPLATE: ReportTemplate = ReportTemplate {
    left: &[
        entry("Talep No:", "TalepNo"),
        entry("Standart Adi:", "StandartAdi"),
        entry("Numune Bilgisi:", "NumuneBilgisi"),
        entry("Sartlandirma:", "Sartlandirma"),
        entry("On Isitma Suresi:", "IsitmaSure"),
        entry("Diger Notlar:", "Diger"),
    ],
    right: &[
        entry("Test Tarihi:", "TestTarih"),
        entry("Deney Yuk(Kg):", "DeneyYuk"),
        entry("Kalip Boyut:", "KalipBoyu"),
        entry("Sicaklik(°C):", "DeneySicakligi"),
        entry("Kesme Zamani(sn):", "KesimSuresi"),
    ],
};

pub(super) static VICAT_TEMPLATE: ReportTemplate = ReportTemplate {
    left: &[
        entry("Test No:", "test_id"),
        entry("Test Baslama Tarihi:", "test_baslama_zamani"),
        entry("Test Bitis Tarihi:", "test_bitis_zamani"),
        entry("Ürün Tarihi:", "urun_tarih"),
        entry("Numune Tanimi:", "numune_tanimi"),
        entry("Numune Kodu:", "numune_kodu"),
        entry("Hammadde Kodu:", "hammadde_kodu"),
        entry("Numune No:", "numune_no"),
        blank("Profil Kodu:"),
        entry("Deney Standardi:", "deney_standardi"),
        blank("Renk Kodu:"),
        entry("Notes:", "aciklama"),
        entry("Testi Yapan:", "testi_yapan_str"),
    ],
    right: &[
        entry("Test Tipi:", "test_tipi"),
        entry("Hat No:", "hat_num"),
        entry("Isitma Hizi:", "isitma_hizi"),
        entry("Hammadde Gerilimi:", "hammadde_gerilimi"),
        entry("Numune Kalinligi:", "numune_kalinligi"),
        entry("Numune Genisligi:", "numune_genisligi"),
        entry("Destekler Arasi Mesafe:", "destekler_arasi_mesafe"),
        blank("Referans Agirligi:"),
        entry("Agirlik:", "agirlik"),
        entry("Dikey Yuk:", "hesap_dikey_yuk"),
        entry("Yatay Yuk:", "hesap_yatay_yuk"),
        entry("Son Sicaklik:", "son_sicaklik"),
        entry("Testi Onaylayan:", "testi_onaylayan_str"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn mfi_header() -> RawTable {
        RawTable::new(
            "TestAna",
            vec!["TestId".into(), "talepno".into(), "StandartAdi".into(), "DeneyYuk".into()],
            vec![vec![
                Value::Integer(564),
                Value::from("T-12"),
                Value::from(""),
                Value::Real(2.16),
            ]],
        )
    }

    #[test]
    fn test_fill_mfi() {
        let table = MFI_TEMPLATE.fill(&mfi_header());
        assert_eq!(table.rows.len(), 6);

        // column lookup ignores case
        assert_eq!(table.rows[0].left_value, "T-12");
        // blank text renders as missing
        assert_eq!(table.rows[1].left_value, "-");
        // absent column renders as missing
        assert_eq!(table.rows[2].left_value, "-");
        assert_eq!(table.rows[1].right_value, "2.16");

        // right side is one entry shorter
        assert_eq!(table.rows[5].right_label, "");
        assert_eq!(table.rows[5].right_value, "");
    }

    #[test]
    fn test_dsc_oit_reference_temperature_is_not_sample_code() {
        let header = RawTable::new(
            "TestAna",
            vec!["NumuneKodu".into(), "NumuneAgirlik".into()],
            vec![vec![Value::from("NK-7"), Value::Real(5.1)]],
        );
        let table = DSC_OIT_TEMPLATE.fill(&header);

        let reference = table.rows.iter().find(|r| r.right_label == "Referans Sicakligi:").unwrap();
        assert_eq!(reference.right_value, "-");
        assert_eq!(table.rows[6].left_value, "NK-7");

        let weight = table.rows.iter().find(|r| r.right_label == "Numune Agirligi:").unwrap();
        assert_eq!(weight.right_value, "5.1");
    }

    #[test]
    fn test_fill_without_rows() {
        let header = RawTable::new("TestAna", vec!["TalepNo".into()], vec![]);
        let table = MFI_TEMPLATE.fill(&header);
        assert!(table.rows.iter().all(|r| r.left_value == "-"));
    }

    #[test]
    fn test_blank_entries() {
        let header = RawTable::new(
            "TestAna",
            vec!["TestId".into(), "NumuneKodu".into()],
            vec![vec![Value::Integer(142), Value::from("NK-1")]],
        );
        let table = DSC_OIT_TEMPLATE.fill(&header);
        assert_eq!(table.rows[0].left_value, "142");
        assert_eq!(table.rows[6].left_value, "NK-1");
        assert_eq!(table.rows[6].right_label, "Referans Sicakligi:");
        assert_eq!(table.rows[6].right_value, "-");
    }

    #[test]
    fn test_template_heights() {
        assert_eq!(DSC_OIT_TEMPLATE.height(), 11);
        assert_eq!(MFI_TEMPLATE.height(), 6);
        assert_eq!(VICAT_TEMPLATE.height(), 13);
        assert_eq!(VICAT_TEMPLATE.left.len(), VICAT_TEMPLATE.right.len());
    }
}
