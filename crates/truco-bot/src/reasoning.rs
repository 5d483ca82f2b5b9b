use serde::{Deserialize, Serialize};

/// One entry in a move's reasoning trail.
///
/// The engine never formats human-readable text: `Template` entries carry a
/// key plus named parameters for whatever presentation layer consumes them,
/// and `Plain` entries are opaque pass-through strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReasonFragment {
    Plain {
        text: String,
    },
    Template {
        key: String,
        #[serde(default)]
        params: Vec<(String, String)>,
    },
}

impl ReasonFragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn template(key: impl Into<String>) -> Self {
        Self::Template {
            key: key.into(),
            params: Vec::new(),
        }
    }

    pub fn template_with(
        key: impl Into<String>,
        params: impl IntoIterator<Item = (&'static str, String)>,
    ) -> Self {
        Self::Template {
            key: key.into(),
            params: params
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}
