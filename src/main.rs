use chrono::Local;
use clap::Parser;
use matches_per_day::core::{output, ConfigProvider};
use matches_per_day::utils::{logger, validation::Validate};
use matches_per_day::{CliConfig, DateRangeForm, HttpPoster, TrackerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting matches-per-day CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    let settings = match config.validate().and_then(|_| config.resolve_settings()) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    tracing::debug!("Resolved settings: {:?}", settings);

    let poster = match HttpPoster::new(&settings) {
        Ok(poster) => poster,
        Err(e) => fail(&e),
    };

    // 建立表單：預設區間為昨天 00:00 到今天 23:59:59.999
    let now = Local::now();
    let mut form = DateRangeForm::new(poster, settings.endpoint(), &now);
    match config.requested_range(&now) {
        Ok(Some(range)) => form.on_change(range),
        Ok(None) => {}
        Err(e) => fail(&e),
    }

    match form.submit().await {
        Ok(response) => {
            let rendered = match output::render(&response, config.format) {
                Ok(rendered) => rendered,
                Err(e) => fail(&e),
            };
            println!("{}", rendered);
            tracing::info!("✅ Submitted {}", form.range());
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn fail(e: &TrackerError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Submit failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
