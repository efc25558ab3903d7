//! Main application orchestration and execution

use crate::{
    cloud::{
        auth::{Authenticator, CredentialStore, LocalWebserverFlow, TokenClient},
        CloudConnector, CloudUploader, DriveConnector, RemoteFile, UploadSummary,
    },
    error::Result,
    logging::{Logger, LoggerFactory},
    measurement::{measure, CommandRunner, ResultParser, SpeedTestRunner},
    models::{Config, MeasurementResult},
    storage::{AppendOutcome, CsvLogger},
    types::MeasurementOutcome,
};
use std::path::PathBuf;

/// What one invocation did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: MeasurementOutcome,
    pub result: MeasurementResult,
    pub log_path: PathBuf,
    pub append: AppendOutcome,
    /// Remote file holding the uploaded log, when uploading is enabled
    pub uploaded_file: Option<RemoteFile>,
    pub deleted_files: usize,
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    logger: Logger,
}

impl App {
    pub fn new(config: Config, logger: Logger) -> Self {
        Self { config, logger }
    }

    /// Build the application with loggers from a shared factory
    pub async fn with_factory(config: Config, factory: &LoggerFactory) -> Self {
        let logger = factory.create_logger("APP").await;
        logger
            .add_context_field("log_file".to_string(), config.log_file.display().to_string())
            .await;
        Self::new(config, logger)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one measurement with the configured speed-test command and Drive account
    pub async fn run(&self) -> Result<RunReport> {
        let runner = CommandRunner::from_config(&self.config);

        if !self.config.upload_enabled {
            return self.run_once(&runner, None).await;
        }

        let token_client = TokenClient::new()?;
        let authenticator = Authenticator::new(
            CredentialStore::new(&self.config.credentials_file),
            token_client.clone(),
            Box::new(LocalWebserverFlow::new(&self.config.client_secrets_file, token_client)),
            self.logger.clone(),
        );
        let connector = DriveConnector::new(authenticator, self.config.drive_api_base.clone());

        self.run_once(&runner, Some(&connector)).await
    }

    /// Measure, print and log the row, then mirror the log through `connector`.
    ///
    /// A failed measurement is recorded as zeros and does not fail the run.
    /// Connecting happens only after the row is on disk.
    pub async fn run_once(
        &self,
        runner: &dyn SpeedTestRunner,
        connector: Option<&dyn CloudConnector>,
    ) -> Result<RunReport> {
        let parser = ResultParser::new()?;

        crate::log_info!(self.logger, "Running speed test: {}", runner.describe());

        let outcome = measure(runner, &parser).await;
        match &outcome {
            MeasurementOutcome::Measured(metrics) => {
                self.logger.info("Speed test finished").metrics(metrics).log().await;
            }
            MeasurementOutcome::Failed { reason } => {
                self.logger
                    .warn("Speed test failed, recording zeros")
                    .field("reason", reason)
                    .log()
                    .await;
            }
        }

        let result = MeasurementResult::now(outcome.metrics());
        println!("{}", result.display_line());

        let csv = CsvLogger::new(&self.config.log_file, Some(self.config.csv_header()));
        let append = csv.append(&result.csv_record())?;
        self.logger
            .debug("Row written")
            .field("path", csv.path().display().to_string())
            .field("created", append == AppendOutcome::Created)
            .log()
            .await;

        let mut report = RunReport {
            outcome,
            result,
            log_path: self.config.log_file.clone(),
            append,
            uploaded_file: None,
            deleted_files: 0,
        };

        let Some(connector) = connector else {
            crate::log_debug!(self.logger, "Upload disabled, leaving {} local only", report.log_path.display());
            return Ok(report);
        };

        let summary = match self.mirror(connector).await {
            Ok(summary) => summary,
            Err(e) => {
                self.logger
                    .error("Upload failed, the row is only in the local log")
                    .error_info(&e)
                    .log()
                    .await;
                return Err(e);
            }
        };

        report.uploaded_file = Some(summary.file);
        report.deleted_files = summary.deleted;
        Ok(report)
    }

    async fn mirror(&self, connector: &dyn CloudConnector) -> Result<UploadSummary> {
        let storage = connector.connect().await?;
        let name = self.config.remote_file_name()?;
        CloudUploader::new(storage.as_ref(), &self.logger)
            .replace(&self.config.log_file, &name, &self.config.drive_folder)
            .await
    }
}
