//! File entity model.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize};

use super::kind::FileKind;

/// Separator between the display title and the encoded URL of a link resource.
const LINK_SEPARATOR: &str = "##";

/// A file (or folder) listed in a subject's materials.
///
/// `id` is stable across fetches and is the only identity used when
/// diffing two listings of the same subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntity {
    /// Opaque identifier assigned by the file-hosting backend.
    pub id: String,
    /// Display name; link resources embed an encoded URL.
    pub name: String,
    /// MIME type as reported by the backend.
    #[serde(default)]
    pub mime_type: String,
    /// Immediate container (category folder) ids.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Size in bytes, when the backend reports one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_size"
    )]
    pub size: Option<u64>,
}

impl FileEntity {
    /// Create a file entity with just an id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: String::new(),
            parents: Vec::new(),
            size: None,
        }
    }

    /// Builder-style mime type setter.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Classify the entity from its mime type and name.
    pub fn kind(&self) -> FileKind {
        if self.link_url().is_some() {
            return FileKind::Link;
        }
        FileKind::from_mime_type(&self.mime_type)
    }

    /// Name without any embedded link payload.
    pub fn display_name(&self) -> &str {
        match self.name.split_once(LINK_SEPARATOR) {
            Some((title, _)) if self.link_url().is_some() => title.trim_end(),
            _ => &self.name,
        }
    }

    /// URL embedded in the name of a link resource, if any.
    ///
    /// The name has the form `"<title>##<base64url(url)>"`.
    pub fn link_url(&self) -> Option<String> {
        let (_, encoded) = self.name.split_once(LINK_SEPARATOR)?;
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim()).ok()?;
        let url = String::from_utf8(bytes).ok()?;
        (url.starts_with("http://") || url.starts_with("https://")).then_some(url)
    }

    /// Build the name of a link resource from a title and a URL.
    pub fn encode_link_name(title: &str, url: &str) -> String {
        format!("{title}{LINK_SEPARATOR}{}", URL_SAFE_NO_PAD.encode(url))
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.display_name();
        name.rsplit('.')
            .next()
            .filter(|ext| *ext != name)
            .map(|ext| ext.to_lowercase())
    }
}

/// The backend reports sizes as decimal strings; older payloads use numbers.
fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Number(u64),
        Text(String),
    }

    match Option::<RawSize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSize::Number(n)) => Ok(Some(n)),
        Some(RawSize::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
