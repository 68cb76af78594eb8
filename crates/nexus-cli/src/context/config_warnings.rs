use nexus_config::{ENV_PREFIX, NexusConfig, SECTIONS};

/// `NEXUS_*` variables that are not configuration keys.
const NON_CONFIG_VARS: &[&str] = &["NEXUS_LOG", "NEXUS_TEST_DATABASE_URL"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &NexusConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &NexusConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env_keys = env
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with(ENV_PREFIX) && !NON_CONFIG_VARS.contains(&key.as_str()))
        .collect::<Vec<_>>();
    env_keys.sort();

    let mut warnings = Vec::new();

    for key in &env_keys {
        let rest = &key[ENV_PREFIX.len()..];
        match rest.split_once("__") {
            Some((section, _)) if !SECTIONS.contains(&section) => warnings.push(format!(
                "{key} does not match any config section ({}).",
                SECTIONS.join(", ")
            )),
            Some(_) => {}
            None => {
                if let Some(section) = SECTIONS
                    .iter()
                    .find(|section| rest.starts_with(&format!("{section}_")))
                {
                    let field = &rest[section.len() + 1..];
                    warnings.push(format!(
                        "{key} is ignored. Use double underscores (example: {ENV_PREFIX}{section}__{field})."
                    ));
                }
            }
        }
    }

    if !config.openai.is_configured() && has_env_prefix(&env_keys, "NEXUS_OPENAI") {
        warnings.push(
            "OpenAI config appears default while NEXUS_OPENAI* env vars exist. Use double underscores (example: NEXUS_OPENAI__API_KEY)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use nexus_config::NexusConfig;
    use pretty_assertions::assert_eq;

    use super::collect_unconfigured_warnings;

    fn vars(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .map(|key| ((*key).to_string(), String::from("x")))
            .collect()
    }

    #[test]
    fn single_underscore_keys_are_flagged() {
        let warnings = collect_unconfigured_warnings(
            &NexusConfig::default(),
            vars(&["NEXUS_MYSQL_HOST", "NEXUS_MYSQL__PORT"]),
        );
        assert_eq!(
            warnings,
            vec![String::from(
                "NEXUS_MYSQL_HOST is ignored. Use double underscores (example: NEXUS_MYSQL__HOST)."
            )]
        );
    }

    #[test]
    fn unknown_sections_are_flagged() {
        let warnings =
            collect_unconfigured_warnings(&NexusConfig::default(), vars(&["NEXUS_MYSQLX__HOST"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("does not match any config section"));
    }

    #[test]
    fn well_formed_and_unrelated_vars_are_quiet() {
        let mut config = NexusConfig::default();
        config.openai.api_key = String::from("sk-test");
        let warnings = collect_unconfigured_warnings(
            &config,
            vars(&[
                "NEXUS_LOG",
                "NEXUS_TEST_DATABASE_URL",
                "NEXUS_OPENAI__MODEL",
                "NEXUS_GENERAL__DEFAULT_ROWS",
                "HOME",
            ]),
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn openai_vars_without_a_key_are_flagged() {
        let mut config = NexusConfig::default();
        config.openai.api_key = String::new();
        let warnings = collect_unconfigured_warnings(&config, vars(&["NEXUS_OPENAI_API_KEY"]));

        // The typo itself plus the unconfigured section, unless OPENAI_API_KEY
        // is set in the test environment.
        assert!(warnings[0].contains("NEXUS_OPENAI__API_KEY"));
        assert!(warnings.len() <= 2);
    }
}
