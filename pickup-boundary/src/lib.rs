use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "entity-conversions")]
mod conv;

#[cfg(feature = "entity-conversions")]
pub use self::conv::NotConfigured;

pub const JSON_RPC_VERSION: &str = "2.0";

/// Request envelope of JSON routes (`type='json'`).
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Clone, PartialEq))]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: String,
    pub method: String,
    pub params: P,
    pub id: u64,
}

impl<P> JsonRpcRequest<P> {
    pub fn call(id: u64, params: P) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            method: "call".to_string(),
            params,
            id,
        }
    }
}

/// The endpoints of this API don't take any parameters.
#[derive(Debug, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "extra-derive", derive(Clone, Copy, PartialEq, Eq))]
pub struct NoParams {}

/// Response envelope of JSON routes.
///
/// Exactly one of `result` or `error` is expected,
/// but a `null` result is valid.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Clone, PartialEq))]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

impl<T> JsonRpcResponse<T> {
    pub fn with_result(id: u64, result: T) -> Self {
        Self {
            jsonrpc: Some(JSON_RPC_VERSION.to_string()),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Clone, PartialEq))]
pub struct Error {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Clone, PartialEq))]
pub struct ErrorData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            message,
            data,
        } = self;
        write!(f, "{message} ({code})")?;
        if let Some(detail) = data.as_ref().and_then(|d| d.message.as_deref()) {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Contact and location details returned by `/shop/pickup_point_info/<carrier_id>`.
///
/// Missing values are sent either as absent fields or as empty strings
/// and zero coordinates.
#[rustfmt::skip]
#[derive(Debug, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "extra-derive", derive(Clone, PartialEq))]
#[serde(default)]
pub struct PickupPointInfo {
    /// Set if the carrier has no pickup point configured.
    pub error             : bool,
    pub carrier_name      : Option<String>,
    pub partner_name      : Option<String>,
    pub address_line1     : Option<String>,
    pub address_line2     : Option<String>,
    pub phone             : Option<String>,
    pub email             : Option<String>,
    pub pickup_hours      : Option<String>,
    pub full_address      : Option<String>,
    pub partner_image_url : Option<String>,
    pub latitude          : Option<f64>,
    pub longitude         : Option<f64>,
}
