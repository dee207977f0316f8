//! Integration tests for eureka-config

use eureka_config::*;
use std::env;
use std::io::Write;

#[test]
fn test_from_env() {
    unsafe {
        env::set_var("EUREKA_APP_NAME", "billing");
        env::set_var("EUREKA_URL", "http://eureka:8080/eureka/v2");
        env::set_var("EUREKA_INSTANCE_PORT", "9000");
    }

    let config = ClientConfig::from_env();

    // Cleanup
    unsafe {
        env::remove_var("EUREKA_APP_NAME");
        env::remove_var("EUREKA_URL");
        env::remove_var("EUREKA_INSTANCE_PORT");
    }

    let config = config.unwrap();
    assert_eq!(config.app_name, "billing");
    assert_eq!(config.port, Some(9000));
    assert_eq!(
        config.discovery().unwrap(),
        Discovery::Static {
            url: "http://eureka:8080/eureka/v2"
        }
    );
}

#[test]
fn test_env_loader_with_prefix() {
    let loader = EnvLoader::new(Some("MYAPP".to_string()));

    unsafe {
        env::set_var("MYAPP_EUREKA_REGION", "eu-west-1");
    }

    let vars = loader.load().unwrap();

    unsafe {
        env::remove_var("MYAPP_EUREKA_REGION");
    }

    assert_eq!(vars.get("eureka_region").map(String::as_str), Some("eu-west-1"));
    assert!(!vars.contains_key("myapp_eureka_region"));
}

#[test]
fn test_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
app_name = "billing"
eureka_domain_name = "example.com"
region = "us-east-1"
eureka_port = 8080
prefer_same_zone = false
"#
    )
    .unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.app_name, "billing");
    assert_eq!(config.eureka_port, Some(8080));
    assert!(!config.prefer_same_zone);
    assert_eq!(config.context, DEFAULT_CONTEXT);
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"app_name": "billing", "eureka_url": "http://eureka:8080/eureka/v2", "datacenter": "MyOwn"}}"#
    )
    .unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.datacenter, DataCenter::MyOwn);
}

#[test]
fn test_from_env_file() {
    let mut file = tempfile::Builder::new().suffix(".env").tempfile().unwrap();
    writeln!(file, "EUREKA_APP_NAME=billing").unwrap();
    writeln!(file, "EUREKA_DOMAIN_NAME=example.com").unwrap();
    writeln!(file, "EUREKA_REGION=us-east-1").unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.discovery().unwrap(),
        Discovery::Dns {
            domain: "example.com",
            region: "us-east-1"
        }
    );
}

#[test]
fn test_env_file_matches_dotenv_parsing() {
    let mut file = tempfile::Builder::new().suffix(".env").tempfile().unwrap();
    writeln!(file, "EUREKA_APP_NAME=billing").unwrap();
    writeln!(file, "EUREKA_URL=http://eureka:8080/eureka/v2 # primary").unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.eureka_url.as_deref(), Some("http://eureka:8080/eureka/v2"));

    let from_dotenv: Vec<(String, String)> = dotenvy::from_path_iter(file.path())
        .unwrap()
        .map(|item| item.unwrap())
        .collect();
    assert!(from_dotenv.contains(&(
        "EUREKA_URL".to_string(),
        "http://eureka:8080/eureka/v2".to_string()
    )));
}

#[test]
fn test_file_without_discovery_fails_validation() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"app_name": "billing"}}"#).unwrap();

    let err = ClientConfig::from_file(file.path()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::ParseError("eureka_port".to_string());
    let display = format!("{}", err);
    assert!(display.contains("eureka_port"));
}
