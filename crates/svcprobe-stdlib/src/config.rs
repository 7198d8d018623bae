//! `config` service: runtime settings
//!
//! Values live behind a `RwLock` so `set` works through the shared
//! reference every service call receives.

use std::any::Any;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use svcprobe_sdk::{
    arg, arg_str, ClassBuilder, ClassInfo, Modifiers, Param, Service, ServiceError, ServiceResult,
    Value,
};
use tracing::debug;

static CLASS: Lazy<ClassInfo> = Lazy::new(|| {
    ClassBuilder::<ConfigService>::new()
        .constructor(&[Param::optional("values", svcprobe_sdk::DefaultValue::Null)])
        .method("get", &[Param::required("key")], |svc, args| {
            svc.get(&arg_str(args, 0, "key")?)
        })
        .method("getAll", &[], |svc, _args| Ok(svc.all()))
        .method(
            "set",
            &[Param::required("key"), Param::required("value")],
            |svc, args| {
                let key = arg_str(args, 0, "key")?;
                let value = arg(args, 1, "value")?.clone();
                Ok(svc.set(&key, value).unwrap_or_default())
            },
        )
        .method("has", &[Param::required("key")], |svc, args| {
            Ok(Value::Bool(svc.has(&arg_str(args, 0, "key")?)))
        })
        .member("snapshot", Modifiers::PROTECTED, &[], |svc, _args| Ok(svc.all()))
        .build()
});

/// Key/value settings store
pub struct ConfigService {
    values: RwLock<BTreeMap<String, Value>>,
}

impl ConfigService {
    /// Store seeded with the site defaults
    pub fn new() -> Self {
        Self::with_values([
            ("siteTitle", Value::from("Svcprobe Demo")),
            ("debug", Value::Bool(false)),
            ("itemsPerPage", Value::Int(10)),
        ])
    }

    /// Store seeded with `values`
    pub fn with_values<K, I>(values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Value for `key`; raises 404 when unset
    pub fn get(&self, key: &str) -> ServiceResult {
        self.values.read().get(key).cloned().ok_or_else(|| {
            ServiceError::new(format!("Config key '{}' is not set", key)).with_code(404)
        })
    }

    /// Every setting, ordered by key
    pub fn all(&self) -> Value {
        Value::Map(
            self.values
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Store a value, returning the previous one
    pub fn set(&self, key: &str, value: Value) -> Option<Value> {
        debug!(key, "config value set");
        self.values.write().insert(key.to_string(), value)
    }

    /// Check if `key` is set
    pub fn has(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for ConfigService {
    fn class_info(&self) -> &ClassInfo {
        &CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
