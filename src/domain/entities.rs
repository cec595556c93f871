//! Domain entities: families and their members

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Key as it appears in a snapshot: data sources hand out numeric ids,
/// form inputs hand out strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Int(i64),
    Text(String),
}

impl From<RawKey> for String {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Int(n) => n.to_string(),
            RawKey::Text(s) => s.trim().to_string(),
        }
    }
}

/// Identifier of a member, unique within its family.
///
/// Opaque key: `4` and `"4"` in a snapshot denote the same member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey", into = "String")]
pub struct MemberId(String);

/// Identifier of a family.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey", into = "String")]
pub struct FamilyId(String);

macro_rules! impl_key {
    ($name:ident) => {
        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl From<RawKey> for $name {
            fn from(raw: RawKey) -> Self {
                Self(raw.into())
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(key: u64) -> Self {
                Self(key.to_string())
            }
        }

        impl From<i32> for $name {
            fn from(key: i32) -> Self {
                Self(key.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_key!(MemberId);
impl_key!(FamilyId);

/// Parent references: absent, `null` and `""` all mean "no parent recorded".
fn parent_ref<'de, D>(deserializer: D) -> Result<Option<MemberId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawKey>::deserialize(deserializer)?;
    Ok(raw.map(MemberId::from).filter(|id| !id.is_blank()))
}

/// A person within one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "parent_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub father_id: Option<MemberId>,
    #[serde(
        default,
        deserialize_with = "parent_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub mother_id: Option<MemberId>,
    #[serde(default)]
    pub is_deceased: bool,
    /// Descriptive fields (`birthDate`, `deathDate`, `age`, `role`, ...),
    /// passed through without interpretation.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            father_id: None,
            mother_id: None,
            is_deceased: false,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_father(mut self, id: impl Into<MemberId>) -> Self {
        self.father_id = Some(id.into());
        self
    }

    pub fn with_mother(mut self, id: impl Into<MemberId>) -> Self {
        self.mother_id = Some(id.into());
        self
    }

    pub fn deceased(mut self) -> Self {
        self.is_deceased = true;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Attribute rendered as plain text; `null` counts as missing.
    pub fn attribute_str(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(value_to_text)
    }

    /// Recorded parent ids, father first.
    pub fn parent_ids(&self) -> impl Iterator<Item = &MemberId> {
        self.father_id.iter().chain(self.mother_id.iter())
    }
}

/// Plain-text form of an opaque attribute value.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A family and its ordered members.
///
/// Member order is the tie-break for every ordering derived from the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Founders as entered on the family record (display only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Family {
    pub fn new(id: impl Into<FamilyId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            origin: None,
            color: None,
            father_name: None,
            mother_name: None,
            members: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn deceased_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_deceased).count()
    }
}
