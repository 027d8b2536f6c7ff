// ==========================================
// 包装线称重控制 - 命令行入口
// ==========================================
// 用法:
//   packaging-weight-control list [text]     历史记录摘要（JSON）
//   packaging-weight-control show <id>       控制记录明细（JSON）
// ==========================================

use std::process::ExitCode;

use packaging_weight_control::api::{ApiError, ControlFilter};
use packaging_weight_control::app::{get_default_db_path, AppState};
use packaging_weight_control::logging;

enum Command {
    List(Option<String>),
    Show(i64),
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args.first().map(String::as_str) {
        None | Some("list") => Ok(Command::List(args.get(1).cloned())),
        Some("show") => {
            let raw = args.get(1).ok_or("缺少 control_id")?;
            raw.parse::<i64>()
                .map(Command::Show)
                .map_err(|_| format!("无效的 control_id: {}", raw))
        }
        Some(other) => Err(format!("未知命令: {}", other)),
    }
}

async fn run(state: &AppState, command: Command) -> Result<String, ApiError> {
    let api = &state.weight_control_api;
    let value = match command {
        Command::List(text) => {
            let filter = text.map(ControlFilter::text);
            serde_json::to_string_pretty(&api.list_controls(filter.as_ref()).await?)
        }
        Command::Show(id) => serde_json::to_string_pretty(&api.get_control_detail(id).await?),
    };
    value.map_err(|e| ApiError::InternalError(format!("JSON 序列化失败: {}", e)))
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("{} v{}", packaging_weight_control::APP_NAME, packaging_weight_control::VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("用法: packaging-weight-control [list [text] | show <control_id>]");
            return ExitCode::from(2);
        }
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&state, command).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "命令执行失败");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
