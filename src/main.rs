use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use lucky_tree_backend::{
    config::Config,
    handlers,
    middlewares::create_cors,
    services::*,
    storage::Stores,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 打开数据目录
    let stores = Stores::open(&config.storage.data_dir).expect("Failed to open data directory");

    // 启动前校验已有数据
    if let Err(e) = stores
        .load_catalog()
        .and_then(|_| stores.load_ledger_strict(config.game.max_attempts))
    {
        log::error!("Invalid data files in {}: {e}", config.storage.data_dir);
        return Err(std::io::Error::other(e.to_string()));
    }

    // 创建服务
    let countdown_service = CountdownService::new(stores.clone());
    let lucky_draw_service =
        LuckyDrawService::new(stores.clone(), countdown_service.clone(), &config.game);
    let admin_service = AdminService::new(stores.clone(), config.game.max_attempts);
    let auth_service = AuthService::new(config.admin.clone());

    log::info!(
        "Starting HTTP server at {}:{} (max attempts: {})",
        config.server.host,
        config.server.port,
        config.game.max_attempts
    );

    let cors_origins = config.server.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(create_cors(&cors_origins))
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(lucky_draw_service.clone()))
            .app_data(web::Data::new(countdown_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
