use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use taskboard_config::{AppConfig, ConfigValidator, LogFormat};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod shutdown;

use app::Application;
use shutdown::ShutdownManager;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("taskboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("内存任务管理 REST API")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径 (默认查找 config/taskboard.toml 或 taskboard.toml)"),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDR")
                .help("监听地址，覆盖配置中的 server.bind_address"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");

    // 加载配置
    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<默认>")
        )
    })?;

    // 命令行参数优先于配置文件
    if let Some(bind) = matches.get_one::<String>("bind") {
        config.server.bind_address = bind.clone();
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.parse::<LogFormat>()?;
    }
    config.validate().context("命令行参数校验失败")?;

    // 初始化日志系统
    init_logging(
        &config.observability.log_level,
        config.observability.log_format,
    )?;

    info!("启动任务管理服务");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    let app = Arc::new(Application::new(config));
    let shutdown_manager = ShutdownManager::new();

    run_until_shutdown(app, shutdown_manager, wait_for_shutdown_signal()).await?;

    info!("任务管理服务已退出");
    Ok(())
}

/// 运行应用直到收到关闭信号或服务器提前退出，服务器的运行错误原样返回
async fn run_until_shutdown(
    app: Arc<Application>,
    shutdown_manager: ShutdownManager,
    signal: impl Future<Output = ()>,
) -> Result<()> {
    let mut app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        tokio::spawn(async move { app.run(shutdown_rx).await })
    };

    // 等待关闭信号或服务器提前退出
    let finished = tokio::select! {
        _ = signal => {
            info!("收到关闭信号，开始优雅关闭...");
            None
        }
        joined = &mut app_handle => Some(joined),
    };

    shutdown_manager.shutdown().await;

    let joined = match finished {
        Some(joined) => joined,
        // 等待应用关闭，设置超时
        None => match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("应用关闭超时，强制退出");
                return Ok(());
            }
        },
    };

    match joined.context("应用任务异常终止")? {
        Ok(()) => {
            info!("应用已优雅关闭");
            Ok(())
        }
        Err(e) => {
            error!("应用运行失败: {e:#}");
            Err(e)
        }
    }
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
    }

    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn config_bound_to(bind_address: String) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.bind_address = bind_address;
        config
    }

    #[tokio::test]
    async fn test_bind_failure_is_returned_as_error() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = occupied.local_addr().unwrap().to_string();

        let app = Arc::new(Application::new(config_bound_to(address.clone())));
        let result = run_until_shutdown(app, ShutdownManager::new(), std::future::pending()).await;

        let err = result.expect_err("binding an occupied port must fail");
        assert!(format!("{err:#}").contains(&address));
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_cleanly() {
        let app = Arc::new(Application::new(config_bound_to("127.0.0.1:0".to_string())));
        let result = run_until_shutdown(
            app,
            ShutdownManager::new(),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

        assert!(result.is_ok());
    }
}
