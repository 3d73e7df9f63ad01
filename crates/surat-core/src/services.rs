//! Service catalog: `layanan` categories, their `sub_layanan` detail lists,
//! and the documents each service requires from the requester.
//!
//! Staff submission checks the required documents server-side: every one
//! must be marked "Ada" before first-pass work is accepted.

/// Top-level service categories offered by the office.
pub const SERVICES: [&str; 4] = [
    "Layanan Data",
    "Layanan Konsultasi Statistik",
    "Layanan Perpustakaan",
    "Layanan Rekomendasi Kegiatan Statistik",
];

/// Detail services under each category.
pub fn sub_services(layanan: &str) -> &'static [&'static str] {
    match layanan {
        "Layanan Data" => &[
            "Permohonan Data Mikro",
            "Permohonan Data Agregat",
            "Permohonan Peta Digital",
        ],
        "Layanan Konsultasi Statistik" => &[
            "Konsultasi Metodologi",
            "Konsultasi Penggunaan Data",
        ],
        "Layanan Rekomendasi Kegiatan Statistik" => &[
            "Rekomendasi Survei",
            "Rekomendasi Kompromin",
        ],
        _ => &[],
    }
}

/// Documents the requester must provide for a service. Looked up by the
/// detail service first, then the category.
pub fn required_documents(layanan: &str, sub_layanan: Option<&str>) -> &'static [&'static str] {
    let key = sub_layanan.filter(|s| !s.is_empty()).unwrap_or(layanan);
    match key {
        "Permohonan Data Mikro" => &[
            "Surat permohonan resmi",
            "Proposal penggunaan data",
            "Identitas pemohon",
        ],
        "Permohonan Data Agregat" | "Permohonan Peta Digital" => {
            &["Surat permohonan resmi", "Identitas pemohon"]
        }
        "Rekomendasi Survei" | "Rekomendasi Kompromin" => &[
            "Surat permohonan resmi",
            "Rancangan kuesioner",
            "Kerangka sampel",
        ],
        "Layanan Konsultasi Statistik" | "Konsultasi Metodologi" | "Konsultasi Penggunaan Data" => {
            &["Surat permohonan resmi"]
        }
        _ => &[],
    }
}

/// Verification outcome recorded by staff for each required document.
pub const DOC_PRESENT: &str = "Ada";
pub const DOC_MISSING: &str = "Tidak Ada";

/// True when every required document for the service is marked "Ada" in the
/// staff verification map.
pub fn all_documents_verified(
    layanan: &str,
    sub_layanan: Option<&str>,
    verification: &std::collections::HashMap<String, String>,
) -> bool {
    required_documents(layanan, sub_layanan)
        .iter()
        .all(|doc| verification.get(*doc).map(String::as_str) == Some(DOC_PRESENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_required_documents_prefers_sub_layanan() {
        let docs = required_documents("Layanan Data", Some("Permohonan Data Mikro"));
        assert_eq!(docs.len(), 3);
        // Empty sub_layanan falls through to the category.
        let docs = required_documents("Layanan Konsultasi Statistik", Some(""));
        assert_eq!(docs, ["Surat permohonan resmi"]);
    }

    #[test]
    fn test_unknown_service_requires_nothing() {
        assert!(required_documents("Layanan Lain", None).is_empty());
        let verification = HashMap::new();
        assert!(all_documents_verified("Layanan Lain", None, &verification));
    }

    #[test]
    fn test_all_documents_verified() {
        let mut verification = HashMap::new();
        verification.insert("Surat permohonan resmi".to_string(), DOC_PRESENT.to_string());
        verification.insert("Identitas pemohon".to_string(), DOC_PRESENT.to_string());
        assert!(all_documents_verified(
            "Layanan Data",
            Some("Permohonan Data Agregat"),
            &verification
        ));

        verification.insert("Identitas pemohon".to_string(), DOC_MISSING.to_string());
        assert!(!all_documents_verified(
            "Layanan Data",
            Some("Permohonan Data Agregat"),
            &verification
        ));
    }
}
