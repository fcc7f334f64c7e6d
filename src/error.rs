use thiserror::Error;

/// Fatal problems with the sheet's layout. Either one aborts the whole run;
/// there is no partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error(
        "Could not find header row in the first {scanned} rows (looked for rank/title/score/subline/comment). \
         Rows seen: {preview}"
    )]
    SchemaNotFound { scanned: usize, preview: String },

    #[error("Required column '{field}' not found in header row {header_row}. Headers: [{headers}]")]
    RequiredColumnMissing {
        field: &'static str,
        header_row: usize,
        headers: String,
    },
}

impl SchemaError {
    pub fn missing(field: &'static str, header_row: usize, headers: &[String]) -> Self {
        SchemaError::RequiredColumnMissing {
            field,
            header_row,
            headers: headers.join(", "),
        }
    }
}
