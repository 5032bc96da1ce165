use actix_web::HttpRequest;
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    En,
    Id,
    De,
    Jp,
}

impl Lang {
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "id" => Self::Id,
            "de" => Self::De,
            "jp" => Self::Jp,
            _ => Self::En,
        }
    }
}

fn load_message_file(lang: Lang, namespace: &str) -> Value {
    let lang_folder = match lang {
        Lang::En => "en",
        Lang::De => "de",
        Lang::Id => "id",
        Lang::Jp => "ja",
    };

    let file_path = Path::new("locales")
        .join(lang_folder)
        .join(format!("{namespace}.json"));

    match fs::read_to_string(&file_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(json) => {
                debug!("loaded messages from {:?}", file_path);
                json
            }
            Err(err) => {
                warn!("failed to parse {:?}: {}", file_path, err);
                Value::Null
            }
        },
        Err(_) => Value::Null,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Namespace {
    Validation,
    Workspace,
    Project,
    Notification,
}

#[derive(Debug)]
pub struct Messages {
    pub validation: Value,
    pub workspace: Value,
    pub project: Value,
    pub notification: Value,
}

impl Messages {
    pub fn new(lang: Lang) -> Self {
        Self {
            validation: load_message_file(lang, "validation"),
            workspace: load_message_file(lang, "workspace"),
            project: load_message_file(lang, "project"),
            notification: load_message_file(lang, "notification"),
        }
    }

    fn namespace_value(&self, namespace: Namespace) -> &Value {
        match namespace {
            Namespace::Validation => &self.validation,
            Namespace::Workspace => &self.workspace,
            Namespace::Project => &self.project,
            Namespace::Notification => &self.notification,
        }
    }

    /// Flat dotted-key lookup with an inline fallback so every message has
    /// a stable default even without catalog files on disk.
    pub fn get_str(&self, namespace: Namespace, key: &str, default: &str) -> String {
        self.namespace_value(namespace)
            .get(key)
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_validation_message(&self, key: &str, default: &str) -> String {
        self.get_str(Namespace::Validation, key, default)
    }
}

pub fn get_lang(req: &HttpRequest) -> Lang {
    req.headers()
        .get("Accept-Language")
        .and_then(|value| value.to_str().ok())
        .map(|code| Lang::from_code(code.split([',', '-', ';']).next().unwrap_or("en").trim()))
        .unwrap_or(Lang::En)
}
