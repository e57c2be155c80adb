// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;

const DEFAULT_HISTORY_LIMIT: usize = 20;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,

    /// How many recent thread items the responder sees.
    pub history_limit: usize,

    /// Optional JSON widget template overriding the structural MCQ card.
    pub widget_template_path: Option<PathBuf>,

    /// Optional JSON array replacing the built-in default questions.
    pub question_bank_path: Option<PathBuf>,

    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let history_limit = env::var("HISTORY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);

        let widget_template_path = env::var("WIDGET_TEMPLATE_PATH").ok().map(PathBuf::from);
        let question_bank_path = env::var("QUESTION_BANK_PATH").ok().map(PathBuf::from);

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        Self {
            jwt_secret,
            rust_log,
            bind_addr,
            history_limit,
            widget_template_path,
            question_bank_path,
            cors_origins,
        }
    }

    /// Configuration used by tests and local tooling: no template, built-in bank.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            rust_log: "error".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            history_limit: DEFAULT_HISTORY_LIMIT,
            widget_template_path: None,
            question_bank_path: None,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
