use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use std::time::Duration;
use wash_booking::app::build_orchestrator;
use wash_booking::domain::model::JobRequestPayload;
use wash_booking::utils::logger;
use wash_booking::{BookingConfig, JobSubmissionOrchestrator, SubmissionResponse};

/// 回應前等通知送出的上限；Lambda 回應後可能被凍結
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(20);

/// 每次呼叫處理一筆工作提交；回應格式與 HTTP 端點相同
async fn function_handler(
    orchestrator: &JobSubmissionOrchestrator,
    event: LambdaEvent<JobRequestPayload>,
) -> Result<SubmissionResponse, Error> {
    tracing::info!(request_id = %event.context.request_id, "Handling job submission");

    let outcome = orchestrator
        .submit_tracked(&event.payload)
        .await
        .settle(NOTIFICATION_DRAIN_TIMEOUT)
        .await;
    let response = SubmissionResponse::from(&outcome);

    tracing::info!(
        request_id = %event.context.request_id,
        success = outcome.is_success(),
        "Job submission finished"
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 憑證缺少時在冷啟動就失敗
    let config = BookingConfig::from_env()?;
    let orchestrator = Arc::new(build_orchestrator(&config)?);

    run(service_fn(move |event: LambdaEvent<JobRequestPayload>| {
        let orchestrator = Arc::clone(&orchestrator);
        async move { function_handler(&orchestrator, event).await }
    }))
    .await
}
