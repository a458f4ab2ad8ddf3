// src/utils/mod.rs
use log::info;
use std::str::FromStr;

pub fn setup_logging(level: &str, log_file: Option<&str>) -> Result<(), fern::InitError> {
    let level = log::LevelFilter::from_str(level).unwrap_or(log::LevelFilter::Info);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    info!("Logging initialized at level {}.", level);
    Ok(())
}

/// Human-readable amount given raw units and decimal precision.
pub fn to_ui_amount(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}

/// Parses a u64 that the RPC node may send either as a JSON string or a number.
pub fn json_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Same as [`json_u64`] for u128 fields (sqrt prices, liquidity).
pub fn json_u128(value: &serde_json::Value) -> Option<u128> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
}

/// Shortens a 0x-prefixed object id for log lines.
pub fn short_address(address: &str) -> String {
    if address.len() <= 14 {
        return address.to_string();
    }
    match (address.get(..8), address.get(address.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{}…{}", head, tail),
        _ => address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_parse_from_strings_and_numbers() {
        assert_eq!(json_u64(&json!("18446744073709551615")), Some(u64::MAX));
        assert_eq!(json_u64(&json!(42)), Some(42));
        assert_eq!(json_u64(&json!(-1)), None);
        assert_eq!(json_u64(&json!(null)), None);
        assert_eq!(
            json_u128(&json!("79226673515401279992447579055")),
            Some(79226673515401279992447579055)
        );
    }

    #[test]
    fn ui_amount_scales_by_decimals() {
        assert_eq!(to_ui_amount(2_000_000_000, 9), 2.0);
        assert_eq!(to_ui_amount(1_500_000, 6), 1.5);
    }

    #[test]
    fn short_address_keeps_short_ids() {
        assert_eq!(short_address("0x2"), "0x2");
        let long = "0xcf994611fd4c48e277ce3ffd4d4364c914af2c3cbb05f7bf6facd371de688630";
        assert_eq!(short_address(long), "0xcf9946…8630");
    }
}
