use url::Url;

/// Resolves the human project name out of an environment's database locator.
///
/// Locators look like `https://acme-prod.firebaseio.com`; the project name is
/// the first host label. Unparseable or host-less locators fall back to the
/// raw input so display labels never go blank for a populated field.
pub fn database_url_to_project_name(database_url: &str) -> String {
    let trimmed = database_url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => return trimmed.to_string(),
    };

    match parsed.host_str() {
        Some(host) => host.split('.').next().unwrap_or(host).to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_first_host_label() {
        assert_eq!(database_url_to_project_name("https://acme-prod.firebaseio.com"), "acme-prod");
        assert_eq!(database_url_to_project_name("https://acme-staging.firebaseio.com/"), "acme-staging");
    }

    #[test]
    fn falls_back_to_raw_input_when_unparseable() {
        assert_eq!(database_url_to_project_name("not a url"), "not a url");
        assert_eq!(database_url_to_project_name("  spaced  "), "spaced");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(database_url_to_project_name(""), "");
    }
}
