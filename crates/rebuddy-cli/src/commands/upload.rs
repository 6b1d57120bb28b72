use anyhow::anyhow;
use rebuddy_capture::{CaptureController, CapturedFile, UploadOutcome};
use rebuddy_models::QuickLabel;

use crate::cli::UploadArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_outcome;

pub(crate) async fn handle_upload(ctx: &AppContext, args: UploadArgs) -> CliResult<()> {
    let label = args.label.trim();
    if label.is_empty() {
        return Err(CliError::validation("label cannot be empty"));
    }
    if !args.file.is_file() {
        return Err(CliError::validation(format!(
            "photo not found: {}",
            args.file.display()
        )));
    }
    if args.check {
        let catalog = ctx.load_catalog().await?;
        let quick = QuickLabel::ALL.iter().any(|quick| quick.as_value() == label);
        if catalog.find(label).is_none() && !quick {
            return Err(CliError::validation(format!(
                "label '{label}' is not in the server catalog"
            )));
        }
    }

    let mut controller = CaptureController::new();
    controller
        .select_file(CapturedFile::from_path(&args.file))
        .map_err(CliError::failure)?;
    let outcome = controller
        .submit(label, &ctx.pipeline())
        .await
        .map_err(CliError::failure)?;

    match outcome {
        UploadOutcome::Uploaded { .. } => {
            println!("{}", render_outcome(outcome, ctx.output)?);
            Ok(())
        }
        UploadOutcome::Failed { message } => Err(CliError::failure(anyhow!(message.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use base64::{Engine as _, engine::general_purpose};
    use httpmock::prelude::*;
    use rebuddy_test_support::jpeg_bytes;
    use serde_json::json;
    use std::path::PathBuf;

    use crate::cli::OutputFormat;
    use crate::client::test_support::context_for;

    fn photo(dir: &tempfile::TempDir) -> Result<PathBuf> {
        let path = dir.path().join("bottle.jpg");
        std::fs::write(&path, jpeg_bytes())?;
        Ok(path)
    }

    fn args(file: PathBuf, label: &str, check: bool) -> UploadArgs {
        UploadArgs {
            file,
            label: label.to_string(),
            check,
        }
    }

    #[tokio::test]
    async fn upload_posts_encoded_photo_and_label() -> Result<()> {
        let server = MockServer::start_async().await;
        let encoded = general_purpose::STANDARD.encode(jpeg_bytes());
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload")
                .json_body(json!({"image_base64": encoded, "label": "recyclable"}));
            then.status(200).json_body(json!({
                "success": true,
                "s3_key": "k1",
                "label": "recyclable"
            }));
        });

        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, OutputFormat::Json)?;
        handle_upload(&ctx, args(photo(&dir)?, "recyclable", false))
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn server_error_is_a_failure_with_status() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(500).body("Failed to upload image");
        });

        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, OutputFormat::Table)?;
        let err = handle_upload(&ctx, args(photo(&dir)?, "recyclable", false))
            .await
            .expect_err("500 must fail");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("500"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_photo_and_blank_label_are_validation_errors() -> Result<()> {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server, OutputFormat::Table)?;

        let err = handle_upload(&ctx, args(PathBuf::from("/missing/photo.jpg"), "tin-can", false))
            .await
            .expect_err("missing file");
        assert_eq!(err.exit_code(), 2);

        let dir = tempfile::tempdir()?;
        let err = handle_upload(&ctx, args(photo(&dir)?, "   ", false))
            .await
            .expect_err("blank label");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn check_rejects_labels_outside_the_catalog() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/labels");
            then.status(200).json_body(json!({
                "items": [{"value": "bottle", "display_name": "Plastic Bottle"}],
                "total_count": 1
            }));
        });
        let upload = server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(200);
        });

        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, OutputFormat::Table)?;
        let err = handle_upload(&ctx, args(photo(&dir)?, "tin-can", true))
            .await
            .expect_err("unknown label");
        assert_eq!(err.exit_code(), 2);
        upload.assert_hits(0);
        Ok(())
    }
}
