use anyhow::Result;
use tempfile::TempDir;
use wash_booking::app::build_state;
use wash_booking::core::quote::{quote_for, QuoteOutcome};
use wash_booking::domain::model::PricePoint;
use wash_booking::utils::validation::Validate;
use wash_booking::BookingConfig;

fn write_config(dir: &TempDir, pricing: &str) -> Result<String> {
    let content = format!(
        r#"
[server]
bind = "127.0.0.1:0"

[timezone]
name = "America/Chicago"
utc_offset_minutes = 300

{pricing}

[staff]
schedulers = ["Alex"]

[record_service]
endpoint = "http://127.0.0.1:9"
token = "${{WASH_BOOKING_IT_NOTION_TOKEN}}"
database_id = "db-42"
handled_by = "Crew B"

[calendar_service]
endpoint = "http://127.0.0.1:9"
access_token = "ya29.token"
calendar_id = "crew@example.com"
timeout_seconds = 5
"#
    );
    let path = dir.path().join("booking.toml");
    std::fs::write(&path, content)?;
    Ok(path.to_string_lossy().to_string())
}

#[test]
fn test_config_file_with_env_and_csv_table() -> Result<()> {
    std::env::set_var("WASH_BOOKING_IT_NOTION_TOKEN", "secret_from_env");

    let dir = TempDir::new()?;
    let table_path = dir.path().join("prices.csv");
    std::fs::write(
        &table_path,
        "panes,inside_outside,outside_only\n10,140,95\n11,150,100\n20,260,175\n",
    )?;
    let pricing = format!(
        "[pricing]\ntable_path = \"{}\"",
        table_path.to_string_lossy().replace('\\', "/")
    );

    let config = BookingConfig::from_file(write_config(&dir, &pricing)?)?;
    config.validate()?;

    assert_eq!(config.record_service.token, "secret_from_env");
    assert_eq!(config.record_service.handled_by, "Crew B");
    assert_eq!(config.record_service.payment_status, "Not Paid");
    assert_eq!(config.calendar_service.timeout_seconds, Some(5));

    let table = config.price_table()?;
    assert_eq!(table.len(), 3);
    assert_eq!(
        quote_for(&table, 11),
        QuoteOutcome::Priced(PricePoint::new(150.0, 100.0))
    );
    // 表中的空缺
    assert_eq!(quote_for(&table, 15), QuoteOutcome::Unpriced);

    let state = build_state(&config)?;
    assert_eq!(state.price_table, table);
    assert_eq!(state.orchestrator.settings().handled_by, "Crew B");
    Ok(())
}

#[test]
fn test_price_table_must_be_csv() -> Result<()> {
    std::env::set_var("WASH_BOOKING_IT_NOTION_TOKEN", "secret_from_env");

    let dir = TempDir::new()?;
    let config = BookingConfig::from_file(write_config(
        &dir,
        "[pricing]\ntable_path = \"prices.json\"",
    )?)?;
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_missing_config_file() {
    assert!(BookingConfig::from_file("/definitely/not/here/booking.toml").is_err());
}
