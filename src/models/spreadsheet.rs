use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level of a feed request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn value(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

/// Level of detail returned by a feed request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Full,
    Basic,
}

impl Projection {
    pub fn value(&self) -> &'static str {
        match self {
            Projection::Full => "full",
            Projection::Basic => "basic",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for Projection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Projection::Full),
            "basic" => Ok(Projection::Basic),
            other => Err(format!("unknown projection '{}'", other)),
        }
    }
}

/// Identifies the spreadsheet a client works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRef {
    key: String,
    title: String,
    visibility: Visibility,
    projection: Projection,
}

impl SpreadsheetRef {
    /// Reference with `private` visibility and `full` projection.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_access(key, title, Visibility::default(), Projection::default())
    }

    pub fn with_access(
        key: impl Into<String>,
        title: impl Into<String>,
        visibility: Visibility,
        projection: Projection,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            visibility,
            projection,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }
}

/// Credentials handed to the feed service as-is.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    Anonymous,
    Password {
        username: String,
        password: String,
    },
    Token(String),
}

impl Credentials {
    /// Token wins over username/password; a lone username or password is ignored.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        token: Option<String>,
    ) -> Self {
        match (username, password, token) {
            (_, _, Some(token)) => Credentials::Token(token),
            (Some(username), Some(password), None) => Credentials::Password { username, password },
            _ => Credentials::Anonymous,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::Password { username, .. } => Some(username),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => f.write_str("Anonymous"),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}
