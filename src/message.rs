use std::collections::HashMap;

/// Subject and body pulled out of a raw RFC 5322 style message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMessage {
    pub headers: HashMap<String, String>,
    pub subject: Option<String>,
    pub body: String,
}

/// Split a raw message into headers and body.
///
/// Header names are lowercased, folded continuation lines are joined with a
/// single space and repeated headers are concatenated. Encoded words and MIME
/// parts are left as they are.
pub fn parse_message(raw: &str) -> ParsedMessage {
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut body = String::new();
    let mut in_headers = true;
    let mut last_header_key: Option<String> = None;

    for line in raw.lines() {
        if !in_headers {
            body.push_str(line);
            body.push('\n');
            continue;
        }

        if line.trim().is_empty() {
            in_headers = false;
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(existing) = last_header_key.as_ref().and_then(|k| headers.get_mut(k)) {
                existing.push(' ');
                existing.push_str(line.trim());
            }
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) => {
                let key = key.trim().to_lowercase();
                let value = value.trim();
                headers
                    .entry(key.clone())
                    .and_modify(|existing| {
                        existing.push(' ');
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
                last_header_key = Some(key);
            }
            None => {
                // Not a header at all: treat the whole input as a body.
                log::debug!("No header block found, scoring input as body only");
                return ParsedMessage {
                    headers: HashMap::new(),
                    subject: None,
                    body: raw.to_string(),
                };
            }
        }
    }

    let subject = headers.get("subject").cloned();
    ParsedMessage {
        headers,
        subject,
        body,
    }
}
