//! Registry query responses.
//!
//! Eureka encodes a one-element list as a bare object, so every list in
//! these types accepts either form.

use crate::instance::InstanceRecord;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registered applications, as returned by `GET apps` and the VIP queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Applications {
    #[serde(
        rename = "versions__delta",
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub versions_delta: Option<String>,
    #[serde(
        rename = "apps__hashcode",
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub apps_hashcode: Option<String>,
    #[serde(rename = "application", default, deserialize_with = "one_or_many")]
    pub applications: Vec<Application>,
}

impl Applications {
    /// Application by name (case-insensitive).
    pub fn application(&self, name: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| app.name.eq_ignore_ascii_case(name))
    }

    /// All instances of all applications.
    pub fn instances(&self) -> impl Iterator<Item = &InstanceRecord> {
        self.applications.iter().flat_map(|app| app.instances.iter())
    }
}

/// One application and its instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "instance", default, deserialize_with = "one_or_many")]
    pub instances: Vec<InstanceRecord>,
}

impl Application {
    pub fn instance(&self, instance_id: &str) -> Option<&InstanceRecord> {
        self.instances.iter().find(|i| i.instance_id == instance_id)
    }
}

/// `{"applications": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationsEnvelope {
    pub applications: Applications,
}

/// `{"application": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationEnvelope {
    pub application: Application,
}

/// `{"instance": {...}}`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct InstanceEnvelope<T> {
    pub instance: T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
