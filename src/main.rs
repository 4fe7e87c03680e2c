use clap::Parser;
use course_registration::utils::logger;
use course_registration::{
    CliConfig, ConfiguredClock, CourseRegistrationHandler, RegistrationOutcome, SqliteStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 解析並驗證配置 (日誌尚未初始化，直接輸出到 stderr)
    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(settings.verbose, settings.log_level.as_deref());
    } else {
        logger::init_cli_logger(settings.verbose, settings.log_level.as_deref());
    }

    tracing::info!("Starting course-registration");
    tracing::debug!("Resolved settings: {:?}", settings);

    let store = match SqliteStore::connect(&settings.database_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("❌ Failed to open database '{}': {}", settings.database_path, e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 未指定 --today 時使用系統日期
    let clock = ConfiguredClock::from_override(settings.today);
    if let Some(today) = settings.today {
        tracing::info!("🔧 Reference date overridden to {}", today);
    }

    let handler = CourseRegistrationHandler::new(store, clock);

    match handler.handle(settings.request).await {
        Ok(RegistrationOutcome::Registered) => {
            println!("✅ {}", RegistrationOutcome::Registered);
            Ok(())
        }
        Ok(outcome) => {
            println!("❌ {}", outcome);
            // 業務規則失敗
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("❌ Registration aborted: {}", e);
            Err(e.into())
        }
    }
}
