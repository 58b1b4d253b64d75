use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};

use crate::bundle::{Bundler, CommandBundler};
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::identity::{validate_url, AppIdentity};
use crate::probe::PageProbe;
use crate::scaffold::{prepare_app_dir, write_scaffold};
use crate::{
    ConversionOutcome, ConvertError, ConvertRequest, EngineConfig, EngineEvent, RequestId, Stage,
};

/// Receives stage updates while a conversion runs.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// The webpage-to-app conversion operation.
pub struct AppConverter {
    config: EngineConfig,
    probe: PageProbe,
    bundler: Arc<dyn Bundler>,
}

impl AppConverter {
    pub fn new(config: EngineConfig) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        let bundler = Arc::new(CommandBundler::new(config.bundle_command.clone()));
        Self::with_parts(config, fetcher, bundler)
    }

    /// Builds a converter around caller-supplied IO seams.
    pub fn with_parts(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
        bundler: Arc<dyn Bundler>,
    ) -> Self {
        Self {
            config,
            probe: PageProbe::new(fetcher),
            bundler,
        }
    }

    pub async fn convert(
        &self,
        request_id: RequestId,
        request: &ConvertRequest,
        sink: &dyn ProgressSink,
    ) -> Result<ConversionOutcome, ConvertError> {
        let report = |stage: Stage| sink.emit(EngineEvent::Progress { request_id, stage });

        engine_info!("Converting webpage request_id={} url={}", request_id, request.url);
        report(Stage::Validating);
        let url = validate_url(&request.url)?;
        let identity = AppIdentity::from_url(&url);

        let page_title = if self.config.probe_page {
            report(Stage::Probing);
            match self.probe.probe(url.as_str()).await {
                Ok(result) => {
                    engine_info!(
                        "Probe reached {} ({}), title {:?}",
                        result.final_url,
                        result.encoding_label,
                        result.title
                    );
                    result.title
                }
                Err(err) => {
                    engine_warn!("Probe of {} failed, using default title: {}", url, err);
                    None
                }
            }
        } else {
            None
        };
        let window_title = page_title
            .clone()
            .unwrap_or_else(|| identity.product_name.clone());

        report(Stage::Scaffolding);
        let app_dir = prepare_app_dir(&self.config.output_root, &identity)?;
        let scaffold = write_scaffold(
            &app_dir,
            &identity,
            &url,
            &window_title,
            self.config.bundle_target,
        )?;

        let (installer_path, message) = if self.config.bundle {
            report(Stage::Bundling);
            engine_info!("Building app for {}...", identity.domain);
            self.bundler.bundle(&scaffold.project_dir).await?;
            let installer = self.config.bundle_target.installer_path(
                &scaffold.project_dir,
                &identity.app_name,
                &identity.version,
            );
            let message = format!(
                "App created successfully! You can find the installer at: {}",
                installer.display()
            );
            (Some(installer), message)
        } else {
            let message = format!("App scaffold created at: {}", app_dir.display());
            (None, message)
        };

        report(Stage::Done);
        engine_info!("Conversion request_id={} finished: {}", request_id, message);
        Ok(ConversionOutcome {
            app_dir,
            installer_path,
            page_title,
            message,
        })
    }
}
