use axum::extract::Multipart;

/// Multipart field carrying the uploaded CSV file.
pub const CSV_FILE_FIELD: &str = "csv_file";

/// Reads the `csv_file` field of a multipart upload.
///
/// The error string is shown to the user as a validation message.
pub async fn read_csv_upload(mut multipart: Multipart) -> Result<Vec<u8>, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid upload: {e}"))?
    {
        if field.name() != Some(CSV_FILE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read uploaded file: {e}"))?;
        if bytes.is_empty() {
            return Err("The uploaded file is empty.".to_string());
        }
        return Ok(bytes.to_vec());
    }
    Err("Please choose a CSV file to upload.".to_string())
}
