use log::info;
use wedding_invitation_service::routes::create_router;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Wedding Invitation Service");

    let app = create_router().await;

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        info!("Running under the Lambda runtime");
        return lambda_http::run(app).await;
    }

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
