//! Translation of a `ContainerSpec` into Proxmox creation parameters.
//!
//! The builder is a pure function over the spec, the allocated vmid, and the
//! secret variables. It produces a `CreationRequest`: an ordered, immutable
//! list of `key=value` pairs in the shape `POST /nodes/{node}/lxc` expects.

mod builder;
mod interpolate;


pub use builder::build;

/// Parameters whose values are never printed.
const REDACTED_KEYS: &[&str] = &["password"];

/// Parameter set for one container creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    params: Vec<(String, String)>,
}

impl CreationRequest {
    pub(crate) fn new(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    /// All parameters in emission order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of a parameter, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Encode as an `application/x-www-form-urlencoded` body.
    ///
    /// Every value is percent-encoded, which covers the free-text fields
    /// (SSH keys with spaces and newlines, descriptions) as well as the `=`
    /// and `,` inside property strings like `net0`.
    pub fn to_form_body(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `key=value` lines with secret values masked, for dry runs and logs.
    pub fn redacted_lines(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|(k, v)| {
                if REDACTED_KEYS.contains(&k.as_str()) {
                    format!("{}=********", k)
                } else {
                    format!("{}={}", k, v.replace('\n', "\\n"))
                }
            })
            .collect()
    }
}
