const CORS_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET,POST,OPTIONS,PUT,PATCH,DELETE"),
    ("access-control-allow-headers", "*"),
    ("access-control-max-age", "3600"),
];

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

fn default_sqlite_path() -> String {
    std::env::var("BOARDROOM_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}

fn clamp_page_size(page_size: Option<usize>) -> usize {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

fn paginate(
    total: usize,
    cursor: Option<usize>,
    page_size: Option<usize>,
) -> Result<(usize, usize, Option<usize>), HttpApiError> {
    let start = cursor.unwrap_or(0);
    if start > total {
        return Err(HttpApiError::invalid_query(
            "cursor is out of bounds",
            Some(format!("cursor={start} total={total}")),
        ));
    }

    let end = start.saturating_add(clamp_page_size(page_size)).min(total);
    Ok((start, end, (end < total).then_some(end)))
}

fn parse_event_type_filter(
    requested_type: Option<&str>,
) -> Result<Option<&'static str>, HttpApiError> {
    let Some(value) = requested_type else {
        return Ok(None);
    };

    let normalized = value.trim().to_lowercase();
    let event_type = match normalized.as_str() {
        "" => return Ok(None),
        "game_created" | "gamecreated" => "game_created",
        "property_purchase" | "propertypurchase" => "property_purchase",
        "ipo_created" | "ipocreated" => "ipo_created",
        "debt_issued" | "debtissued" => "debt_issued",
        "debt_payment" | "debtpayment" => "debt_payment",
        "trade" => "trade",
        "payment" => "payment",
        "turn_end" | "turnend" => "turn_end",
        _ => {
            return Err(HttpApiError::invalid_query(
                "invalid event type filter",
                Some(format!("event_type={value}")),
            ))
        }
    };

    Ok(Some(event_type))
}

fn reconnect_token(version: u64, sequence: Option<u64>, label: &str) -> String {
    let mut token = format!("{label}:{version}");
    if let Some(sequence) = sequence {
        token.push_str(&format!(":{sequence}"));
    }
    token
}
