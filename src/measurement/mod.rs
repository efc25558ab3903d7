//! Speed-test execution and output parsing

pub mod parser;
pub mod runner;

pub use parser::ResultParser;
pub use runner::{CommandRunner, SpeedTestRunner};

use crate::types::MeasurementOutcome;

/// Run one measurement; never fails, errors become `MeasurementOutcome::Failed`
pub async fn measure(runner: &dyn SpeedTestRunner, parser: &ResultParser) -> MeasurementOutcome {
    match runner.run().await {
        Ok(output) => match parser.parse(&output) {
            Ok(metrics) => MeasurementOutcome::Measured(metrics),
            Err(e) => MeasurementOutcome::failed(e),
        },
        Err(e) => MeasurementOutcome::failed(e),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRunner;
    use super::*;
    use crate::types::SpeedMetrics;

    #[tokio::test]
    async fn test_successful_measurement() {
        let runner = FakeRunner::output("Ping: 12.3 ms\nDownload: 45.6 Mbit/s\nUpload: 7.8 Mbit/s\n");
        let outcome = measure(&runner, &ResultParser::new().unwrap()).await;

        assert_eq!(outcome, MeasurementOutcome::Measured(SpeedMetrics::new(12.3, 45.6, 7.8)));
    }

    #[tokio::test]
    async fn test_execution_error_becomes_zero_outcome() {
        let runner = FakeRunner::failing("speedtest-cli: command not found");
        let outcome = measure(&runner, &ResultParser::new().unwrap()).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.metrics(), SpeedMetrics::ZERO);
        assert!(outcome.failure_reason().unwrap().contains("command not found"));
    }

    #[test]
    fn test_first_match_wins_with_blocking_runtime() {
        let runner = FakeRunner::output(
            "Ping: 20.0 ms\nDownload: 50.0 Mbit/s\nUpload: 5.0 Mbit/s\nPing: 99.0 ms\n",
        );
        let outcome = tokio_test::block_on(measure(&runner, &ResultParser::new().unwrap()));

        assert_eq!(outcome.metrics().ping_ms, 20.0);
    }

    #[tokio::test]
    async fn test_malformed_output_becomes_zero_outcome() {
        let runner = FakeRunner::output("garbage");
        let outcome = measure(&runner, &ResultParser::new().unwrap()).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.metrics(), SpeedMetrics::ZERO);
    }
}
