//! The intl helpers as registrable template helpers

use std::fmt;
use std::sync::Arc;
use serde_json::Value;
use crate::engine::FormatOptions;
use crate::format::IntlHelpers;
use crate::scope::{MessageHandle, ParentData};
use crate::template::registry::{Helper, HelperRegistry};
use crate::template::value::HelperValue;
use crate::utils::errors::{IntlError, Result};
use crate::utils::logging::log_helper_failure;

/// All helpers this crate provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntlHelperKind {
    IntlGet,
    FormatDate,
    FormatTime,
    FormatRelative,
    FormatNumber,
    FormatMessage,
    FormatHtmlMessage,
}

impl IntlHelperKind {
    pub const ALL: [IntlHelperKind; 7] = [
        IntlHelperKind::IntlGet,
        IntlHelperKind::FormatDate,
        IntlHelperKind::FormatTime,
        IntlHelperKind::FormatRelative,
        IntlHelperKind::FormatNumber,
        IntlHelperKind::FormatMessage,
        IntlHelperKind::FormatHtmlMessage,
    ];

    /// Name the helper is registered under
    pub fn name(self) -> &'static str {
        match self {
            IntlHelperKind::IntlGet => "intlGet",
            IntlHelperKind::FormatDate => "formatDate",
            IntlHelperKind::FormatTime => "formatTime",
            IntlHelperKind::FormatRelative => "formatRelative",
            IntlHelperKind::FormatNumber => "formatNumber",
            IntlHelperKind::FormatMessage => "formatMessage",
            IntlHelperKind::FormatHtmlMessage => "formatHTMLMessage",
        }
    }
}

impl fmt::Display for IntlHelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One intl helper bound to shared [`IntlHelpers`]
#[derive(Debug, Clone)]
pub struct IntlHelper {
    kind: IntlHelperKind,
    intl: Arc<IntlHelpers>,
}

impl IntlHelper {
    pub fn new(kind: IntlHelperKind, intl: Arc<IntlHelpers>) -> Self {
        Self { kind, intl }
    }

    pub fn kind(&self) -> IntlHelperKind {
        self.kind
    }

    fn dispatch(&self, scope: &dyn ParentData, params: &[HelperValue], hash: &FormatOptions) -> Result<HelperValue> {
        let intl = &self.intl;
        match self.kind {
            IntlHelperKind::IntlGet => {
                let path = match params.first().and_then(HelperValue::as_json) {
                    Some(Value::String(path)) => path,
                    _ => return Err(IntlError::invalid_argument("{{intlGet}} must be provided a path")),
                };
                intl.intl_get(scope, path)
            }
            IntlHelperKind::FormatDate => intl
                .format_date(scope, primary(params), preset(params), hash)
                .map(HelperValue::from),
            IntlHelperKind::FormatTime => intl
                .format_time(scope, primary(params), preset(params), hash)
                .map(HelperValue::from),
            IntlHelperKind::FormatRelative => intl
                .format_relative(scope, primary(params), preset(params), hash)
                .map(HelperValue::from),
            IntlHelperKind::FormatNumber => intl
                .format_number(scope, primary(params), preset(params), hash)
                .map(HelperValue::from),
            IntlHelperKind::FormatMessage => {
                let message = message_param(params, self.kind)?;
                intl.format_message(scope, message, hash).map(HelperValue::from)
            }
            IntlHelperKind::FormatHtmlMessage => {
                let message = message_param(params, self.kind)?;
                intl.format_html_message(scope, message, hash).map(HelperValue::from)
            }
        }
    }
}

impl Helper for IntlHelper {
    fn call(&self, scope: &dyn ParentData, params: &[HelperValue], hash: &FormatOptions) -> Result<HelperValue> {
        self.dispatch(scope, params, hash).map_err(|e| {
            log_helper_failure(self.kind.name(), &e);
            e
        })
    }
}

/// Register every intl helper with `registry`
pub fn register_with(registry: &mut dyn HelperRegistry, intl: Arc<IntlHelpers>) {
    for kind in IntlHelperKind::ALL {
        registry.register_helper(kind.name(), Box::new(IntlHelper::new(kind, Arc::clone(&intl))));
    }
}

static MISSING: Value = Value::Null;

/// First positional argument; absent or non-data arguments read as null
fn primary(params: &[HelperValue]) -> &Value {
    params.first().and_then(HelperValue::as_json).unwrap_or(&MISSING)
}

/// Second positional argument, used as a preset name when it is a string
fn preset(params: &[HelperValue]) -> Option<&str> {
    match params.get(1) {
        Some(HelperValue::Json(Value::String(name))) => Some(name.as_str()),
        _ => None,
    }
}

fn message_param(params: &[HelperValue], kind: IntlHelperKind) -> Result<Option<MessageHandle>> {
    match params.first() {
        None | Some(HelperValue::Json(Value::Null)) => Ok(None),
        Some(value) => value.as_message().map(Some).ok_or_else(|| {
            IntlError::invalid_argument(format!("{{{{{}}}}} must be provided a message or intlName", kind))
        }),
    }
}
