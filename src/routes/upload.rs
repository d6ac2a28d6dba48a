//! Upload route: receive a sales CSV and return its KPIs.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;
use crate::services::upload::{self, SpooledUpload, UploadReport};
use crate::AppState;

const MISSING_FILE: &str = "No file uploaded";

/// POST /api/upload — analyze a CSV sent as multipart field `file`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReport>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload without a multipart body");
        AppError::Validation(MISSING_FILE.to_string())
    })?;

    let mut spooled: Option<SpooledUpload> = None;
    let read = read_file_field(&state, &mut multipart, &mut spooled).await;

    let spooled = match (read, spooled) {
        (Ok(()), Some(spooled)) => spooled,
        (Ok(()), None) => return Err(AppError::Validation(MISSING_FILE.to_string())),
        (Err(e), spooled) => {
            if let Some(spooled) = spooled {
                upload::discard(&spooled.path).await;
            }
            tracing::warn!(error = %e, client_error = e.is_client_error(), "Rejected upload");
            return Err(e);
        }
    };

    let report = upload::process_upload(state.store.as_deref(), &spooled).await?;
    Ok(Json(report))
}

/// Walk the multipart body, spooling the first file sent as `file`.
async fn read_file_field(
    state: &AppState,
    multipart: &mut Multipart,
    spooled: &mut Option<SpooledUpload>,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if spooled.is_some() || field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let target = SpooledUpload::reserve(&state.config.upload_dir, &file_name);
        *spooled = Some(target.clone());
        let size = spool_field(field, &target).await?;
        if let Some(spooled) = spooled.as_mut() {
            spooled.size = size;
        }
    }
    Ok(())
}

/// Stream one field to disk chunk by chunk, returning the bytes written.
async fn spool_field(mut field: Field<'_>, target: &SpooledUpload) -> Result<u64, AppError> {
    if let Some(dir) = target.path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {e}")))?;
    }
    let mut file = tokio::fs::File::create(&target.path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to spool upload: {e}")))?;

    let mut size = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to spool upload: {e}")))?;
        size += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to spool upload: {e}")))?;

    Ok(size)
}
