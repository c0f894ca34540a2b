// src/main.rs
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use rn_zone::api::scanner_handler::scanner_handler;
use rn_zone::api::stock_handlers::{
    search_handler, status_handler, stock_detail_handler, stocks_handler,
};
use rn_zone::data::provider::MarketDataProvider;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("rn_zone=debug,info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse()
        .unwrap_or(3001);

    let provider = web::Data::new(MarketDataProvider::from_env());

    log::info!("Starting RN zone server on http://{}:{}", host, port);
    println!("Available endpoints:");
    println!("  GET http://{}:{}/api/search?q=삼성", host, port);
    println!("  GET http://{}:{}/api/stocks", host, port);
    println!("  GET http://{}:{}/api/stock/005930", host, port);
    println!("  GET http://{}:{}/api/scanner", host, port);
    println!("  GET http://{}:{}/api/status", host, port);

    HttpServer::new(move || {
        // The dashboard dev server runs on Vite's default port.
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://127.0.0.1:5173")
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(provider.clone())
            .route("/api/search", web::get().to(search_handler))
            .route("/api/stocks", web::get().to(stocks_handler))
            .route("/api/stock/{code}", web::get().to(stock_detail_handler))
            .route("/api/scanner", web::get().to(scanner_handler))
            .route("/api/status", web::get().to(status_handler))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
