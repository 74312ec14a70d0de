use recovery_wallet_core::Chain;
use std::fs;
use std::sync::{Once, OnceLock};
use tracing::{debug, error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling, rolling::Rotation};
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

static INIT: Once = Once::new();

// The non-blocking file writer stops flushing once its guard is dropped
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub service_name: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_directory: String,
    pub enable_colors: bool,
    pub enable_thread_ids: bool,
    pub enable_file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            service_name: "recovery-relay".to_string(),
            enable_console: true,
            enable_file: false,
            log_directory: "logs".to_string(),
            enable_colors: true,
            enable_thread_ids: false,
            enable_file_line: false,
        }
    }
}

impl LogConfig {
    fn level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn default_directives(&self) -> String {
        let level = self.level();
        format!("recovery_relay={level},recovery_wallet_core={level},actix_web=info,warn")
    }
}

pub struct Logger;

impl Logger {
    pub fn init(log_level: &str) {
        Self::init_with(LogConfig {
            level: log_level.to_string(),
            ..LogConfig::default()
        });
    }

    pub fn init_with(config: LogConfig) {
        INIT.call_once(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

            let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

            if config.enable_console {
                let console_layer = fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_thread_ids(config.enable_thread_ids)
                    .with_file(config.enable_file_line)
                    .with_line_number(config.enable_file_line)
                    .with_target(true)
                    .with_ansi(config.enable_colors)
                    .with_writer(std::io::stdout);
                layers.push(Box::new(console_layer));
            }

            if config.enable_file {
                match fs::create_dir_all(&config.log_directory) {
                    Ok(()) => {
                        let file_appender = rolling::RollingFileAppender::new(
                            Rotation::DAILY,
                            &config.log_directory,
                            format!("{}.log", config.service_name.replace('-', "_")),
                        );
                        let (non_blocking_file_appender, guard) = non_blocking(file_appender);
                        let _ = FILE_GUARD.set(guard);
                        let file_layer = fmt::layer()
                            .with_timer(UtcTime::rfc_3339())
                            .with_thread_ids(config.enable_thread_ids)
                            .with_file(config.enable_file_line)
                            .with_line_number(config.enable_file_line)
                            .with_target(true)
                            .with_ansi(false)
                            .with_writer(non_blocking_file_appender);
                        layers.push(Box::new(file_layer));
                    }
                    Err(e) => eprintln!("Failed to create log directory {}: {e}", config.log_directory),
                }
            }

            // `try_init` also installs the `log` bridge used by the wallet core
            let subscriber = Registry::default().with(layers).with(env_filter);
            if let Err(e) = subscriber.try_init() {
                eprintln!("Logger already initialized: {e}");
            }
        });
    }

    pub fn operation_received(request_id: &str, operation: &str) {
        info!(request_id, operation, "Operation received");
    }

    pub fn operation_completed(request_id: &str, operation: &str, duration_ms: u128) {
        info!(request_id, operation, duration_ms = duration_ms as u64, "Operation completed");
    }

    pub fn operation_failed(request_id: &str, operation: &str, error: &str) {
        warn!(request_id, operation, "Operation failed: {}", error);
    }

    pub fn chain_fetch_failed(chain: Chain, attempt: u32, max_attempts: u32, error: &str) {
        warn!(chain = %chain, attempt, max_attempts, "Chain fetch failed: {}", error);
    }

    pub fn transaction_submitted(chain: Chain, tx_hash: &str) {
        info!(chain = %chain, tx_hash, "Transaction submitted");
    }

    pub fn transaction_confirmed(chain: Chain, tx_hash: &str) {
        info!(chain = %chain, tx_hash, "Transaction confirmed");
    }

    pub fn transaction_failed(chain: Chain, tx_hash: &str, error: &str) {
        error!(chain = %chain, tx_hash, "Transaction failed: {}", error);
    }

    pub fn rpc_call(chain: Chain, method: &str) {
        debug!(chain = %chain, method, "RPC call");
    }
}
