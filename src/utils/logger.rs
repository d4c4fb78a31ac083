use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 服務本身 + axum 的 request trace；相依套件只留 warn 以上
const CLI_FILTER: &str = "wash_booking=info,tower_http=info,warn";
/// verbose 時加上送往外部服務的 HTTP 細節
const CLI_VERBOSE_FILTER: &str = "wash_booking=debug,tower_http=debug,reqwest=debug,info";
/// lambda_runtime 會記錄每次呼叫的開始與錯誤
const LAMBDA_FILTER: &str = "wash_booking=info,lambda_runtime=info,warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        env_filter(CLI_VERBOSE_FILTER)
    } else {
        env_filter(CLI_FILTER)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                // verbose 時混入 tower_http/reqwest 的訊息，要看得出來源
                .with_target(verbose)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_lambda_logger() {
    tracing_subscriber::registry()
        .with(env_filter(LAMBDA_FILTER))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .without_time() // CloudWatch 自己加時間戳記
                .json(),
        )
        .init();
}
