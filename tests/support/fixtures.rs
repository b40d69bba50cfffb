//! Test fixtures and constants.

/// Config with a server, one secret, and one injector.
pub const BASIC_CONFIG: &str = r#"
secret_server:
  url: https://tss.example.com/SecretServer
secrets:
  - id: s1
    secret_id: 1
    field: password
groups:
  - name: dev
    injectors:
      - name: api
        configs:
          - env_key: API_KEY
            env_secret: s1
"#;

/// Config missing the secret server url.
pub const NO_URL_CONFIG: &str = r#"
secrets:
  - { id: s1, secret_id: 1, field: password }
"#;

/// Not valid YAML for the config schema.
pub const MALFORMED_CONFIG: &str = "secret_server: [unterminated\n";
