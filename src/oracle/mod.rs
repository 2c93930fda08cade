//! Reading generation: the upstream service the quiz consults.
//!
//! `ReadingOracle` is the seam between the session and whatever produces
//! readings. `LlmOracle` is the production implementation. The helpers at
//! the bottom apply the fallback policy so the session only ever sees a
//! reading or a failure it can turn into an empty slot.

pub mod llm;
pub mod prompts;

pub use llm::{LlmOracle, OracleConfig};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::GenerationError;
use crate::quiz::model::Profile;
use crate::quiz::reading::{ChartReading, PalmReading};

/// Produces chart and palm readings.
#[async_trait]
pub trait ReadingOracle: Send + Sync {
    async fn generate_chart(&self, profile: &Profile) -> Result<ChartReading, GenerationError>;

    /// `image` is a data URL or bare base64 JPEG.
    async fn analyze_palm(&self, image: &str) -> Result<PalmReading, GenerationError>;
}

/// Generate a chart, swapping in the canned reading on failure when
/// `substitute_fallback` is set.
pub async fn chart_with_fallback(
    oracle: Arc<dyn ReadingOracle>,
    profile: Profile,
    substitute_fallback: bool,
) -> Result<ChartReading, GenerationError> {
    match oracle.generate_chart(&profile).await {
        Ok(reading) => Ok(reading),
        Err(e) if substitute_fallback => {
            warn!(error = %e, "Chart generation failed, using fallback reading");
            Ok(ChartReading::fallback())
        }
        Err(e) => Err(e),
    }
}

/// Analyze a palm photo, with the same fallback rule as `chart_with_fallback`.
pub async fn palm_with_fallback(
    oracle: Arc<dyn ReadingOracle>,
    image: String,
    substitute_fallback: bool,
) -> Result<PalmReading, GenerationError> {
    match oracle.analyze_palm(&image).await {
        Ok(reading) => Ok(reading),
        Err(e) if substitute_fallback => {
            warn!(error = %e, "Palm analysis failed, using fallback reading");
            Ok(PalmReading::fallback())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl ReadingOracle for Broken {
        async fn generate_chart(&self, _: &Profile) -> Result<ChartReading, GenerationError> {
            Err(GenerationError::EmptyResponse { reading: "chart" })
        }

        async fn analyze_palm(&self, _: &str) -> Result<PalmReading, GenerationError> {
            Err(GenerationError::Malformed {
                reading: "palm",
                reason: "not json".into(),
            })
        }
    }

    #[tokio::test]
    async fn fallback_substituted_when_enabled() {
        let oracle: Arc<dyn ReadingOracle> = Arc::new(Broken);
        let chart = chart_with_fallback(oracle.clone(), Profile::default(), true)
            .await
            .unwrap();
        assert_eq!(chart, ChartReading::fallback());

        let palm = palm_with_fallback(oracle, "AAAA".into(), true).await.unwrap();
        assert_eq!(palm, PalmReading::fallback());
    }

    #[tokio::test]
    async fn failure_passes_through_when_disabled() {
        let oracle: Arc<dyn ReadingOracle> = Arc::new(Broken);
        assert!(
            chart_with_fallback(oracle.clone(), Profile::default(), false)
                .await
                .is_err()
        );
        assert!(palm_with_fallback(oracle, "AAAA".into(), false).await.is_err());
    }
}
