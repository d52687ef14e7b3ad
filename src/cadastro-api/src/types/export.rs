use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::clients::ClientSearchFilters;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Excel,
    Csv,
    Pdf,
}

impl ExportFormat {
    /// The wire name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// File extension for downloads: `xlsx` for excel, the format name
    /// otherwise
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Media type of the generated file
    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excel" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!(
                "Invalid export format '{other}'. Use 'excel', 'csv', or 'pdf'"
            )),
        }
    }
}

/// Request body for exporting a filtered record set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// Output format
    pub format: ExportFormat,
    /// Filters selecting the records to export
    #[serde(default)]
    pub filters: ClientSearchFilters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&ExportFormat::Excel).unwrap(),
            r#""excel""#
        );
        let parsed: ExportFormat = serde_json::from_str(r#""pdf""#).unwrap();
        assert_eq!(parsed, ExportFormat::Pdf);
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Excel.extension(), "xlsx");
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("EXCEL".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("word".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_request_defaults_empty_filters() {
        let json = r#"{"format": "csv"}"#;
        let req: ExportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.format, ExportFormat::Csv);
        assert_eq!(req.filters, ClientSearchFilters::default());
    }
}
