use std::sync::Arc;

use anyhow::{Context, Result};
use taskboard_api::create_app_with_config;
use taskboard_config::AppConfig;
use taskboard_domain::{InMemoryTaskRepository, TaskRepository};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{info, warn};

/// 主应用程序
pub struct Application {
    config: AppConfig,
    task_repo: Arc<dyn TaskRepository>,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        let task_repo: Arc<dyn TaskRepository> = if config.store.seed_sample_tasks {
            info!("使用示例任务初始化内存存储");
            Arc::new(InMemoryTaskRepository::with_sample_tasks())
        } else {
            Arc::new(InMemoryTaskRepository::new())
        };

        if !config.auth.enabled {
            warn!("API key 认证已禁用，所有路由均为公开访问");
        }

        Self { config, task_repo }
    }

    /// 运行API服务器，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let bind_address = &self.config.server.bind_address;
        let app = create_app_with_config(Arc::clone(&self.task_repo), &self.config);

        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;

        info!("API服务器启动在 http://{}", bind_address);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}
