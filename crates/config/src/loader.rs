use std::path::Path;

use anyhow::bail;

use crate::Config;

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let scheme = config.api.base_url.scheme();

    if scheme != "http" && scheme != "https" {
        bail!("api.base_url must use http or https, got '{scheme}'");
    }

    if config.api.base_url.cannot_be_a_base() {
        bail!("api.base_url must be an absolute address with a host");
    }

    for (name, path) in [
        ("auth.status_path", &config.auth.status_path),
        ("auth.login_path", &config.auth.login_path),
        ("auth.logout_path", &config.auth.logout_path),
    ] {
        if !path.starts_with('/') {
            bail!("{name} must start with '/', got '{path}'");
        }
    }

    if config.identity.store_path.as_os_str().is_empty() {
        bail!("identity.store_path must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use indoc::indoc;
    use insta::assert_snapshot;

    use crate::Config;

    #[test]
    fn defaults_from_empty_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://localhost:4280/");
        assert_eq!(config.api.timeout, None);
        assert_eq!(config.auth.status_path, "/.auth/me");
        assert_eq!(config.auth.login_path, "/.auth/login/github");
        assert_eq!(config.auth.logout_path, "/.auth/logout");
        assert_eq!(
            config.identity.store_path.to_str().unwrap(),
            ".saletrack/identity.json"
        );
    }

    #[test]
    fn timeout_parses_human_durations() {
        let config_str = indoc! {r#"
            [api]
            timeout = "30s"
        "#};

        let config: Config = toml::from_str(config_str).unwrap();
        assert_eq!(config.api.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let config_str = indoc! {r#"
            [api]
            base_uri = "http://localhost:8000"
        "#};

        let result = toml::from_str::<Config>(config_str);
        assert!(result.is_err());
    }

    #[test]
    fn endpoint_urls_join_onto_the_base() {
        let config_str = indoc! {r#"
            [api]
            base_url = "https://shop.example.com"
        "#};

        let config: Config = toml::from_str(config_str).unwrap();

        assert_eq!(
            config.auth_status_url().unwrap().as_str(),
            "https://shop.example.com/.auth/me"
        );
        assert_eq!(
            config.login_url().unwrap().as_str(),
            "https://shop.example.com/.auth/login/github"
        );
        assert_eq!(
            config.logout_url().unwrap().as_str(),
            "https://shop.example.com/.auth/logout"
        );
    }

    #[test]
    fn non_http_scheme_fails_validation() {
        let config_str = indoc! {r#"
            [api]
            base_url = "ftp://localhost:4280"
        "#};

        let config: Config = toml::from_str(config_str).unwrap();
        let error = super::validate(&config).unwrap_err().to_string();

        assert_snapshot!(error, @"api.base_url must use http or https, got 'ftp'");
    }

    #[test]
    fn relative_auth_path_fails_validation() {
        let config_str = indoc! {r#"
            [auth]
            status_path = ".auth/me"
        "#};

        let config: Config = toml::from_str(config_str).unwrap();
        let error = super::validate(&config).unwrap_err().to_string();

        assert_snapshot!(error, @"auth.status_path must start with '/', got '.auth/me'");
    }
}
