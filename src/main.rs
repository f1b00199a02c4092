use axum::{routing::{get, post}, Router};
use split_bill_rust::{api, AppConfig};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/split", post(api::split))
        .route("/split/pdf", post(api::split_pdf))
        .route("/upload/parse", post(api::upload_parse))
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /split        - 仅计算分账");
    info!("  POST /split/pdf    - 计算并下载结算单");
    info!("  POST /upload/parse - 上传小票并解析");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
